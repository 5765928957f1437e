// src/config/loader.rs
//! TOML configuration loader with layered merge and environment overrides

use crate::config::{constants::paths, TrialConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The TOML document could not be parsed or deserialized.
    #[error("configuration parse error: {0}")]
    Parse(String),

    /// The configuration could not be serialized for merging or export.
    #[error("configuration serialize error: {0}")]
    Serialize(String),

    /// Reading or writing a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The merged document failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err.to_string())
    }
}

/// Loads and merges trial configuration from TOML files.
///
/// Later paths override earlier ones, missing files are skipped, and
/// `HFAC_`-prefixed environment variables override everything; the merged
/// document is validated before it is returned. Timing warnings do not
/// block loading; they are logged.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Loader over the default search paths.
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
        }
    }

    /// Loader over explicit paths, in order of precedence.
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
        }
    }

    /// Load, merge, and validate the trial configuration.
    pub fn load(&self) -> Result<TrialConfig, ConfigError> {
        let merged = self.load_and_merge_configs()?;

        let config: TrialConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

        for warning in config.validate()? {
            tracing::warn!(%warning, "trial configuration warning");
        }

        Ok(config)
    }

    /// Validate a configuration file without adopting it.
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config: TrialConfig = self.load_config_file(path)?.try_into()?;
        config.validate()?;
        Ok(())
    }

    /// Export a configuration to a loadable TOML document.
    pub fn export_config<P: AsRef<Path>>(
        &self,
        config: &TrialConfig,
        path: P,
    ) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_and_merge_configs(&self) -> Result<toml::Value, ConfigError> {
        // Start from the built-in defaults so partial files stay loadable.
        let mut merged = toml::Value::try_from(TrialConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        for config_path in &self.config_paths {
            match self.load_config_file(config_path) {
                Ok(file_config) => Self::merge_toml_values(&mut merged, file_config),
                Err(ConfigError::FileNotFound(_)) => continue, // optional file
                Err(e) => return Err(e),
            }
        }

        Self::apply_environment_overrides(&mut merged);

        Ok(merged)
    }

    fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<toml::Value, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;

        Ok(config)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            if let Some(stripped) = key.strip_prefix("HFAC_") {
                let config_key = stripped.to_lowercase().replace("__", ".");
                Self::set_nested_value(config, &config_key, Self::parse_env_value(&value));
            }
        }
    }

    fn parse_env_value(value: &str) -> toml::Value {
        if let Ok(int_val) = value.parse::<i64>() {
            toml::Value::Integer(int_val)
        } else if let Ok(float_val) = value.parse::<f64>() {
            toml::Value::Float(float_val)
        } else if let Ok(bool_val) = value.parse::<bool>() {
            toml::Value::Boolean(bool_val)
        } else {
            toml::Value::String(value.to_string())
        }
    }

    fn set_nested_value(config: &mut toml::Value, path: &str, value: toml::Value) {
        let parts: Vec<&str> = path.split('.').collect();
        let mut current = config;

        for (i, part) in parts.iter().enumerate() {
            if i == parts.len() - 1 {
                if let toml::Value::Table(table) = current {
                    table.insert(part.to_string(), value.clone());
                }
            } else if let toml::Value::Table(table) = current {
                current = table
                    .entry(part.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
            }
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
