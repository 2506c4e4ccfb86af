//! Configuration loading from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::ComposerConfig;
use crate::config::validation::{validate_config, validate_skeleton, ValidationError};
use crate::features::{FeatureId, FeatureParams};
use crate::skeleton::BaseSkeleton;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid params for {feature}: {source}")]
    Params {
        feature: FeatureId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate process settings from a TOML file.
pub fn load_config(path: &Path) -> Result<ComposerConfig, ConfigError> {
    let content = read(path)?;
    let config: ComposerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate a JSON skeleton.
pub fn load_skeleton(path: &Path) -> Result<BaseSkeleton, ConfigError> {
    let content = read(path)?;
    let skeleton: BaseSkeleton = serde_json::from_str(&content)?;

    validate_skeleton(&skeleton).map_err(ConfigError::Validation)?;

    Ok(skeleton)
}

/// Load feature parameters, returned in precedence order.
pub fn load_feature_params(path: &Path) -> Result<Vec<FeatureParams>, ConfigError> {
    parse_feature_params(&read(path)?)
}

/// Parse `{ "<featureId>": { ...params } }`. Features may be omitted.
pub fn parse_feature_params(content: &str) -> Result<Vec<FeatureParams>, ConfigError> {
    let raw: BTreeMap<FeatureId, Value> = serde_json::from_str(content)?;

    raw.into_iter()
        .map(|(feature, value)| {
            FeatureParams::from_json(feature, value)
                .map_err(|source| ConfigError::Params { feature, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Protocol;
    use std::io::Write;

    #[test]
    fn test_params_in_precedence_order() {
        let params = parse_feature_params(
            r#"{
                "stealthProMax": { "obfuscationLevel": "high" },
                "neuralEngine": { "enabled": true }
            }"#,
        )
        .unwrap();

        let ids: Vec<_> = params.iter().map(FeatureParams::id).collect();
        assert_eq!(ids, vec![FeatureId::NeuralEngine, FeatureId::StealthProMax]);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let err = parse_feature_params(r#"{ "warpDrive": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_bad_params_name_the_feature() {
        let err = parse_feature_params(r#"{ "infrastructure": { "failover": 3 } }"#).unwrap_err();
        match err {
            ConfigError::Params { feature, .. } => assert_eq!(feature, FeatureId::Infrastructure),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npath = \"out.json\"\npretty = false").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.path.as_deref(), Some("out.json"));
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[observability]\nlog_level = \"shouty\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("shouty"));
    }

    #[test]
    fn test_load_skeleton_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "outbounds": [{{ "protocol": "trojan", "settings": {{ "servers": [] }} }}] }}"#
        )
        .unwrap();

        let skeleton = load_skeleton(file.path()).unwrap();
        assert_eq!(skeleton.outbounds[0].protocol, Protocol::Trojan);
        assert_eq!(skeleton.inbounds[0].port, 1080);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_skeleton(Path::new("/nonexistent/skeleton.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/skeleton.json"));
    }
}
