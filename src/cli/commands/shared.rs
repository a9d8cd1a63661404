//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading and progress bars used by
//! more than one command.

use crate::config::Config;
use crate::constants::PROGRESS_TEMPLATE;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the level derived from `-v`/`-q`.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gln_recon={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Overrides a command may apply on top of file and environment settings
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threshold: Option<u8>,
    pub propagation_mode: Option<crate::config::PropagationMode>,
    pub database_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Resolve the configuration file: explicit path, else the default location if it exists
pub fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using the layered approach (defaults -> file -> env -> args)
pub fn load_configuration(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    info!("Loading configuration");

    let config_file = resolve_config_file(config_file);
    match &config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    let mut config = Config::load_layered(config_file.as_deref())?;
    apply_cli_overrides(&mut config, overrides);
    config.validate()?;

    debug!(
        "Matching: threshold {}, mode {:?}, database {}",
        config.matching.similarity_threshold,
        config.matching.propagation_mode,
        config.storage.database_path.display()
    );
    Ok(config)
}

/// Apply command-line overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(threshold) = overrides.threshold {
        config.matching.similarity_threshold = threshold;
    }
    if let Some(mode) = overrides.propagation_mode {
        config.matching.propagation_mode = mode;
    }
    if let Some(path) = &overrides.database_path {
        config.storage.database_path = path.clone();
    }
    if let Some(path) = &overrides.output_dir {
        config.output.output_dir = path.clone();
    }
}

/// Create a progress bar for the similarity pass
///
/// The engine sets the length once the number of distinct addresses is known.
pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropagationMode;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            threshold: Some(75),
            propagation_mode: Some(PropagationMode::Closure),
            database_path: Some(PathBuf::from("/tmp/recon.db")),
            output_dir: None,
        };

        apply_cli_overrides(&mut config, &overrides);

        assert_eq!(config.matching.similarity_threshold, 75);
        assert_eq!(config.matching.propagation_mode, PropagationMode::Closure);
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/recon.db"));
        assert_eq!(config.output, Config::default().output);
    }

    #[test]
    fn test_explicit_config_file_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recon.toml");
        std::fs::write(&path, "[matching]\nsimilarity_threshold = 80\n").unwrap();

        assert_eq!(resolve_config_file(Some(&path)), Some(path.clone()));

        let config = load_configuration(
            Some(&path),
            &ConfigOverrides {
                threshold: Some(95),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.matching.similarity_threshold, 95);
    }

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_configuration(Some(&missing), &ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_progress_bar_starts_empty() {
        let pb = create_progress_bar("Comparing addresses");
        assert_eq!(pb.length(), Some(0));
    }
}
