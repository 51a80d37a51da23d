//! Error types for discovery and execution

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the harness
///
/// Per-test failures are never errors; they are counted in tallies.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Config(#[from] muffin_config::ConfigError),

    #[error("directories {first} and {second} both define group '{name}'")]
    DuplicateGroup {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("could not find test group '{name}'")]
    GroupNotFound { name: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("tally invariant violated: {failures} failure(s) and {errors} error(s) out of {total} test(s)")]
    InvariantViolation {
        total: usize,
        failures: usize,
        errors: usize,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading a test module
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("test module {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read test module {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("error while loading {path}: {message}")]
    Execution { path: PathBuf, message: String },
}

impl LoadError {
    /// Path of the module that failed to load
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound(path) => path,
            LoadError::Io { path, .. }
            | LoadError::Syntax { path, .. }
            | LoadError::Execution { path, .. } => path,
        }
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
