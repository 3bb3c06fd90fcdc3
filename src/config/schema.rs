//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the loader.
//! All types derive Serde traits for deserialization from config files.
//! Keys are kebab-case on disk (`project-dirs`, `cache-dir`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration for the contract loader.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderConfig {
    /// Deployment environment. `development` forces a rebuild on every start.
    pub environment: Environment,

    /// Directories holding the project's source structures.
    pub project_dirs: Vec<PathBuf>,

    /// Flat directory holding generated proxy artifacts.
    pub cache_dir: PathBuf,

    /// File extension of generated artifacts (without the dot).
    pub artifact_extension: String,

    /// File extension of source structures (without the dot).
    pub source_extension: String,

    /// Separator between namespace segments of a structure name.
    pub namespace_separator: char,

    /// The cache is cold while it holds at most this many artifacts.
    pub warm_threshold: usize,

    /// Cross-process rebuild lock.
    pub bootstrap_lock: LockConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            project_dirs: Vec::new(),
            cache_dir: PathBuf::from("/opt/contract-loader/cache"),
            artifact_extension: "proxy".to_string(),
            source_extension: "src".to_string(),
            namespace_separator: '\\',
            warm_threshold: 0,
            bootstrap_lock: LockConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Deployment environment.
///
/// Anything other than `development` and `production` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    Development,
    Production,
    Other(String),
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "development" => Environment::Development,
            "production" => Environment::Production,
            _ => Environment::Other(value),
        }
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.as_str().to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rebuild lock configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LockConfig {
    /// Take `.bootstrap.lock` in the cache directory before rebuilding.
    pub enabled: bool,

    /// How long to wait for another process's rebuild, in milliseconds.
    pub wait_ms: u64,

    /// Poll interval while waiting, in milliseconds.
    pub poll_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wait_ms: 30_000,
            poll_ms: 50,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_roundtrips_unknown_names() {
        let env: Environment = serde_json::from_str("\"staging\"").unwrap();
        assert_eq!(env, Environment::Other("staging".into()));
        assert!(!env.is_development());
        assert_eq!(serde_json::to_string(&env).unwrap(), "\"staging\"");
    }

    #[test]
    fn test_minimal_document_uses_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"environment": "development", "project-dirs": ["/srv/app"]}"#)
                .unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.project_dirs, vec![PathBuf::from("/srv/app")]);
        assert_eq!(config.artifact_extension, "proxy");
        assert_eq!(config.namespace_separator, '\\');
        assert!(config.bootstrap_lock.enabled);
    }
}
