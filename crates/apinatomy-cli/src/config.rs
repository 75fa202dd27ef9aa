//! Configuration file loading for the CLI
//!
//! Finds and loads TOML configuration files from an explicit path, the
//! local directory or the platform configuration directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use apinatomy::{ApinatomyError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for ApinatomyError {
    fn from(err: ConfigError) -> Self {
        ApinatomyError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (apinatomy/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if an explicit path is provided but does not exist, or a
/// config file exists but cannot be parsed or holds invalid values.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ApinatomyError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("apinatomy/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("org", "open-physiology", "apinatomy") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ApinatomyError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let build = config.build();
    let positive = [
        ("default_link_length", build.default_link_length()),
        ("internal_axis_factor", build.internal_axis_factor()),
        ("length_scale", build.length_scale()),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::Validation(format!(
                "`build.{name}` must be a positive number, found {value}"
            )));
        }
    }
    if build.max_drain_passes() == 0 {
        return Err(ConfigError::Validation(
            "`build.max_drain_passes` must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_config() {
        let file = config_file(
            "[build]\nlength_scale = 1.5\n\n[export]\npretty = false\n",
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.build().length_scale(), 1.5);
        assert!(!config.export().pretty());
        assert!(config.export().include_generated());
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.toml")));
        match result {
            Err(ApinatomyError::Config(msg)) => assert!(msg.contains("nope.toml")),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let file = config_file("[build\nlength_scale = ");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ApinatomyError::Config(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_scale() {
        let file = config_file("[build]\nlength_scale = 0.0\n");
        match load_config(Some(file.path())) {
            Err(ApinatomyError::Config(msg)) => assert!(msg.contains("length_scale")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
