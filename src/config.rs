//! Configuration management and validation.
//!
//! Provides configuration structures for matching parameters, storage
//! location and export settings, loaded in layers: defaults, an optional
//! TOML file, then environment variables. CLI flags are applied last by the
//! command layer.

use crate::constants::{
    self, APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DATABASE_FILE, DEFAULT_MAX_SIMILARITY_ADDRESSES,
    DEFAULT_OUTPUT_DIR, DEFAULT_SIMILARITY_THRESHOLD, MAX_SIMILARITY_SCORE, files,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How discrepancy labels spread across similar addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationMode {
    /// One pass over the similar pairs in discovery order
    #[default]
    SinglePass,
    /// Repeat passes until no label changes
    Closure,
}

/// Address matching configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity score (0-100) for two addresses to be treated as one location
    pub similarity_threshold: u8,

    /// Label propagation strategy across similar addresses
    pub propagation_mode: PropagationMode,

    /// Reject batches with more distinct addresses than this (0 = unlimited)
    pub max_similarity_addresses: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            propagation_mode: PropagationMode::SinglePass,
            max_similarity_addresses: DEFAULT_MAX_SIMILARITY_ADDRESSES,
        }
    }
}

/// Discrepancy store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding current and previous discrepancies
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let database_path = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_DATABASE_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE));
        Self { database_path }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the export files
    pub output_dir: PathBuf,
    pub analyzed_file: String,
    pub new_discrepancies_file: String,
    pub resolved_discrepancies_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            analyzed_file: files::ANALYZED_DATA.to_string(),
            new_discrepancies_file: files::NEW_DISCREPANCIES.to_string(),
            resolved_discrepancies_file: files::RESOLVED_DISCREPANCIES.to_string(),
        }
    }
}

/// Global configuration for the GLN reconciler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub storage: StorageConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Default configuration file location (`<config_dir>/gln-recon/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::configuration("Could not determine user configuration directory")
        })?;
        Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;
        let config: Config = toml::from_str(&contents)?;
        debug!("Loaded configuration file {}", path.display());
        Ok(config)
    }

    /// Load configuration in layers: defaults, optional file, environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides using the supplied lookup
    ///
    /// The lookup is injected so tests do not have to mutate the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(constants::env::THRESHOLD) {
            let threshold = value.trim().parse::<u8>().map_err(|_| {
                Error::configuration(format!(
                    "{} must be an integer between 0 and 100, got '{}'",
                    constants::env::THRESHOLD,
                    value
                ))
            })?;
            self.matching.similarity_threshold = threshold;
        }
        if let Some(value) = lookup(constants::env::DATABASE) {
            self.storage.database_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(constants::env::OUTPUT) {
            self.output.output_dir = PathBuf::from(value);
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.matching.similarity_threshold > MAX_SIMILARITY_SCORE {
            return Err(Error::configuration(format!(
                "similarity_threshold must be at most {}, got {}",
                MAX_SIMILARITY_SCORE, self.matching.similarity_threshold
            )));
        }

        let file_names = [
            ("analyzed_file", &self.output.analyzed_file),
            ("new_discrepancies_file", &self.output.new_discrepancies_file),
            (
                "resolved_discrepancies_file",
                &self.output.resolved_discrepancies_file,
            ),
        ];
        for (field, name) in file_names {
            if name.trim().is_empty() {
                return Err(Error::configuration(format!("{} must not be empty", field)));
            }
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::configuration("database_path must not be empty"));
        }

        Ok(())
    }

    /// Create configuration with a custom similarity threshold
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.matching.similarity_threshold = threshold;
        self
    }

    /// Create configuration with a custom propagation mode
    pub fn with_propagation_mode(mut self, mode: PropagationMode) -> Self {
        self.matching.propagation_mode = mode;
        self
    }

    /// Create configuration with a custom database path
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.storage.database_path = path;
        self
    }

    /// Create configuration with a custom output directory
    pub fn with_output_dir(mut self, path: PathBuf) -> Self {
        self.output.output_dir = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.matching.similarity_threshold, 90);
        assert_eq!(config.matching.propagation_mode, PropagationMode::SinglePass);
        assert_eq!(config.output.analyzed_file, "analyzed_data.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[matching]\nsimilarity_threshold = 85\npropagation_mode = \"closure\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.matching.similarity_threshold, 85);
        assert_eq!(config.matching.propagation_mode, PropagationMode::Closure);
        assert_eq!(
            config.matching.max_similarity_addresses,
            DEFAULT_MAX_SIMILARITY_ADDRESSES
        );
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[matching\nsimilarity_threshold = ").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GLN_RECON_THRESHOLD", "80"),
            ("GLN_RECON_DATABASE", "/tmp/recon.db"),
        ]);
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.matching.similarity_threshold, 80);
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/recon.db"));
        assert_eq!(config.output.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_env_threshold_must_be_numeric() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "GLN_RECON_THRESHOLD").then(|| "ninety".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_above_100() {
        let config = Config::default().with_threshold(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_file_name() {
        let mut config = Config::default();
        config.output.new_discrepancies_file = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
