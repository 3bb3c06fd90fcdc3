//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject settings that would break key derivation or discovery
//! - Validate value ranges (poll interval > 0)
//! - Require keys the schema would otherwise default (`environment`)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoaderConfig → Result<(), Vec<ValidationError>>
//! - Presence checks run on the raw document, since serde has already filled defaults
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::LoaderConfig;

/// Longest accepted file extension, keeping artifact file names within limits.
pub const MAX_EXTENSION_LEN: usize = 32;

/// Top-level keys every configuration document must set explicitly.
pub const REQUIRED_KEYS: &[&str] = &["environment"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required key {0} is missing")]
    MissingKey(&'static str),

    #[error("project-dirs must list at least one directory")]
    NoProjectDirs,

    #[error("{field} must not be empty")]
    EmptyExtension { field: &'static str },

    #[error("{field} must be a bare extension, got {value:?}")]
    InvalidExtension { field: &'static str, value: String },

    #[error("namespace-separator {0:?} collides with cache key encoding")]
    InvalidSeparator(char),

    #[error("bootstrap-lock.poll-ms must be greater than zero")]
    ZeroPollInterval,
}

/// Validate a parsed document: required keys present, then [`validate_config`].
pub fn validate_document(
    raw: &serde_json::Map<String, serde_json::Value>,
    config: &LoaderConfig,
) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = REQUIRED_KEYS
        .iter()
        .filter(|key| !raw.contains_key(**key))
        .map(|key| ValidationError::MissingKey(*key))
        .collect();

    if let Err(rest) = validate_config(config) {
        errors.extend(rest);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &LoaderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.project_dirs.is_empty() {
        errors.push(ValidationError::NoProjectDirs);
    }

    check_extension("artifact-extension", &config.artifact_extension, &mut errors);
    check_extension("source-extension", &config.source_extension, &mut errors);

    let sep = config.namespace_separator;
    if sep.is_ascii_alphanumeric() || sep == '_' || sep == '%' {
        errors.push(ValidationError::InvalidSeparator(sep));
    }

    if config.bootstrap_lock.enabled && config.bootstrap_lock.poll_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_extension(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::EmptyExtension { field });
    } else if value.len() > MAX_EXTENSION_LEN || value.contains(['.', '/', '\\']) {
        errors.push(ValidationError::InvalidExtension {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid() -> LoaderConfig {
        LoaderConfig {
            project_dirs: vec![PathBuf::from("/srv/app")],
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = LoaderConfig::default();
        config.artifact_extension = ".proxy".into();
        config.source_extension = String::new();
        config.namespace_separator = '_';
        config.bootstrap_lock.poll_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::NoProjectDirs));
        assert!(errors.contains(&ValidationError::InvalidSeparator('_')));
        assert!(errors.contains(&ValidationError::ZeroPollInterval));
    }

    #[test]
    fn test_document_without_environment_is_rejected() {
        let raw: serde_json::Value = serde_json::json!({"project-dirs": ["/srv/app"]});
        let config: LoaderConfig = serde_json::from_value(raw.clone()).unwrap();
        let raw = raw.as_object().unwrap();

        assert_eq!(
            validate_document(raw, &config).unwrap_err(),
            vec![ValidationError::MissingKey("environment")]
        );
    }

    #[test]
    fn test_poll_interval_ignored_when_lock_disabled() {
        let mut config = valid();
        config.bootstrap_lock.enabled = false;
        config.bootstrap_lock.poll_ms = 0;
        assert!(validate_config(&config).is_ok());
    }
}
