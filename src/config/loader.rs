//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::LoaderConfig;
use crate::config::validation::{validate_config, validate_document, ValidationError};

/// Path consulted when neither `--config` nor `CONTRACT_LOADER_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/opt/contract-loader/etc/loader.conf.json";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "CONTRACT_LOADER_CONFIG";

/// Error type for configuration loading and lookup.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    /// Malformed JSON or TOML, or a document that does not fit the schema.
    Parse(Box<dyn std::error::Error + Send + Sync>),
    Validation(Vec<ValidationError>),
    KeyNotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::KeyNotFound(key) => write!(f, "Configuration key not found: {}", key),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(Box::new(e))
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(Box::new(e))
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Loaded, validated, read-only configuration.
///
/// Holds both the typed [`LoaderConfig`] and the raw document so that
/// callers can look up keys the schema does not model.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: LoaderConfig,
    raw: serde_json::Map<String, serde_json::Value>,
}

impl ConfigStore {
    /// Load and validate configuration from a JSON or TOML file.
    ///
    /// The format is picked by extension: `.toml` is TOML, anything else JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        let raw: serde_json::Value = if path.extension().is_some_and(|ext| ext == "toml") {
            let doc: toml::Value = toml::from_str(&content)?;
            serde_json::to_value(doc)?
        } else {
            serde_json::from_str(&content)?
        };

        let config: LoaderConfig = serde_json::from_value(raw.clone())?;
        let raw = into_object(raw);
        validate_document(&raw, &config).map_err(ConfigError::Validation)?;

        tracing::debug!(path = %path.display(), environment = %config.environment, "Configuration loaded");

        Ok(Self { config, raw })
    }

    /// Build a store from an in-memory configuration.
    pub fn from_config(config: LoaderConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let raw = serde_json::to_value(&config)?;
        Ok(Self {
            config,
            raw: into_object(raw),
        })
    }

    /// Resolve the config path from an explicit argument, the environment, or the default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Raw value of a top-level key.
    pub fn get(&self, key: &str) -> Result<&serde_json::Value, ConfigError> {
        self.raw
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    /// Typed view of the configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

fn into_object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
