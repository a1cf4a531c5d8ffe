use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cleaner: CleanerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Program invoked as `<cargo> clean`
    pub cargo: String,
    /// Retry with `clean --offline` when the default invocation fails
    pub offline_retry: bool,
    /// Retry with `clean --release` when the offline retry fails
    pub release_retry: bool,
    /// Directory names pruned from the walk
    pub exclude: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            cargo: "cargo".to_string(),
            offline_retry: true,
            release_retry: true,
            exclude: vec![],
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/cargo-sweeper/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cargo-sweeper").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.clone(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cleaner.cargo.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "cleaner.cargo must name a program".into(),
            ));
        }
        if self.cleaner.exclude.iter().any(|e| e.contains('/')) {
            return Err(ConfigError::Invalid(
                "cleaner.exclude entries are directory names, not paths".into(),
            ));
        }
        Ok(())
    }
}
