//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, log levels and the admin credential
//! - Check skeleton shape (ports, policy levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ComposerConfig, PLACEHOLDER_API_KEY};
use crate::skeleton::BaseSkeleton;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("observability.log_level: unknown level `{0}`")]
    UnknownLogLevel(String),

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingApiKey,

    #[error("output.path must differ from features.params_path")]
    OutputOverwritesParams,

    #[error("inbounds[{index}]: port must be non-zero")]
    ZeroPort { index: usize },

    #[error("inbounds[{index}]: port {port} already used")]
    DuplicatePort { index: usize, port: u16 },

    #[error("policy.levels must define at least one level")]
    NoPolicyLevels,
}

pub fn validate_config(config: &ComposerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "admin.bind_address",
                value: config.admin.bind_address.clone(),
            });
        }
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::MissingApiKey);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if let (Some(output), Some(params)) = (&config.output.path, &config.features.params_path) {
        if output == params {
            errors.push(ValidationError::OutputOverwritesParams);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_skeleton(skeleton: &BaseSkeleton) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, inbound) in skeleton.inbounds.iter().enumerate() {
        if inbound.port == 0 {
            errors.push(ValidationError::ZeroPort { index });
        } else if !seen.insert(inbound.port) {
            errors.push(ValidationError::DuplicatePort {
                index,
                port: inbound.port,
            });
        }
    }

    if skeleton.policy.levels.is_empty() {
        errors.push(ValidationError::NoPolicyLevels);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ComposerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ComposerConfig::default();
        config.admin.enabled = true;
        config.admin.bind_address = "localhost".into();
        config.observability.log_level = "loud".into();
        config.output.path = Some("same.json".into());
        config.features.params_path = Some("same.json".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    field: "admin.bind_address",
                    value: "localhost".into(),
                },
                ValidationError::MissingApiKey,
                ValidationError::UnknownLogLevel("loud".into()),
                ValidationError::OutputOverwritesParams,
            ]
        );
    }

    #[test]
    fn test_skeleton_ports_checked() {
        let mut skeleton = BaseSkeleton::default();
        skeleton.inbounds.push(skeleton.inbounds[0].clone());
        let mut zero = skeleton.inbounds[0].clone();
        zero.port = 0;
        skeleton.inbounds.push(zero);

        let errors = validate_skeleton(&skeleton).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicatePort { index: 1, port: 1080 },
                ValidationError::ZeroPort { index: 2 },
            ]
        );
    }

    #[test]
    fn test_skeleton_needs_policy_level() {
        let mut skeleton = BaseSkeleton::default();
        skeleton.policy.levels.clear();
        assert_eq!(
            validate_skeleton(&skeleton).unwrap_err(),
            vec![ValidationError::NoPolicyLevels]
        );
        assert!(validate_skeleton(&BaseSkeleton::default()).is_ok());
    }
}
