//! Configuration schema definitions.
//!
//! This module defines the process settings for the composer daemon.
//! All types derive Serde traits for deserialization from `composer.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration for the composer daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ComposerConfig {
    /// Where the base skeleton comes from.
    pub skeleton: SkeletonConfig,

    /// Feature parameter source.
    pub features: FeaturesConfig,

    /// Where composed configurations are written.
    pub output: OutputConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Skeleton source.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SkeletonConfig {
    /// JSON skeleton file; the built-in default skeleton when unset.
    pub path: Option<String>,
}

/// Feature parameter source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// JSON file mapping feature ids to parameters.
    pub params_path: Option<String>,

    /// Re-apply the params file when it changes.
    pub watch: bool,

    /// Poll interval for file systems without change notifications.
    pub poll_interval_secs: u64,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            params_path: None,
            watch: true,
            poll_interval_secs: 2,
        }
    }
}

/// Output of composed configurations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File rewritten after every committed update.
    pub path: Option<String>,

    /// Indented JSON.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: true,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            request_timeout_secs: 10,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ComposerConfig = toml::from_str("").unwrap();

        assert!(config.skeleton.path.is_none());
        assert!(config.features.watch);
        assert!(!config.admin.enabled);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_sections() {
        let raw = r#"
            [features]
            params_path = "features.json"
            watch = false

            [observability]
            log_format = "json"
        "#;
        let config: ComposerConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.features.params_path.as_deref(), Some("features.json"));
        assert!(!config.features.watch);
        assert_eq!(config.features.poll_interval_secs, 2);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
