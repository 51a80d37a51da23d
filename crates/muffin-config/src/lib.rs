//! Muffin Configuration System
//!
//! Provides configuration management for the muffin test harness:
//! - Project configuration (muffin.toml)
//! - Global user configuration (~/.muffin/config.toml)
//! - Environment overrides and precedence
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.muffin/config.toml)
//! 3. Project config (./muffin.toml)
//! 4. Environment variables (MUFFIN_*, NO_COLOR)
//! 5. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use muffin_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("tests live in {}", config.root().display());
//! ```

pub mod global;
pub mod loader;
pub mod project;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "muffin.toml";

/// Default directory (relative to the project root) holding the test groups
pub const DEFAULT_ROOT: &str = "unit_tests";

/// Default suffix a test-case class name must end with
pub const DEFAULT_SUFFIX: &str = "Test";

/// Directory basenames never descended into by default
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["__cache__", "results"];

/// File basenames never treated as test modules by default
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["README.md", ".gitignore", "prelude.muf", "base.muf"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// What to do when two directories in the tree share a basename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateGroupPolicy {
    /// Concatenate the file lists under one group
    #[default]
    Merge,
    /// Refuse to build the index
    Reject,
}

/// Check that a configured basename can only ever name a single path component
pub fn validate_basename(field: &str, name: &str) -> ConfigResult<()> {
    let reason = if name.is_empty() {
        Some("names must not be empty")
    } else if name == "." || name == ".." {
        Some("'.' and '..' are not basenames")
    } else if name.contains('/') || name.contains('\\') {
        Some("names must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("{:?}: {}", name, reason),
        }),
        None => Ok(()),
    }
}

/// Check that a class-name suffix is a non-empty identifier fragment
pub fn validate_suffix(suffix: &str) -> ConfigResult<()> {
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidValue {
            field: "suffix".to_string(),
            reason: format!("{:?} is not an identifier fragment", suffix),
        });
    }
    Ok(())
}

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;
