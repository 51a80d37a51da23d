//! Global Configuration (~/.muffin/config.toml)
//!
//! Handles user-level output preferences stored in `~/.muffin/config.toml`.

use crate::project::OutputConfig;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.muffin/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Output defaults for every project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Path of the global configuration file
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".muffin").join("config.toml"))
    }

    /// Default verbosity, if the user set one
    pub fn verbose(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.verbose)
    }

    /// Default color preference, if the user set one
    pub fn color(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.color)
    }
}
