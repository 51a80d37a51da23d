//! Project Configuration (muffin.toml)
//!
//! Handles project-level configuration stored in `muffin.toml` at the project root.

use crate::{validate_basename, validate_suffix, ConfigError, ConfigResult, DuplicateGroupPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from muffin.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Test discovery configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryConfig>,

    /// Output configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Test discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Directory holding the test groups, relative to muffin.toml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Directory basenames pruned from the walk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_dirs: Option<Vec<String>>,

    /// File basenames never loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_files: Option<Vec<String>>,

    /// Suffix test-case class names must end with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Handling of directories that share a basename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_groups: Option<DuplicateGroupPolicy>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Let tests write to stdout/stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Colorize summary lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let Some(discovery) = &self.discovery else {
            return Ok(());
        };

        if let Some(suffix) = &discovery.suffix {
            validate_suffix(suffix)?;
        }
        for name in discovery.excluded_dirs.iter().flatten() {
            validate_basename("excluded_dirs", name)?;
        }
        for name in discovery.excluded_files.iter().flatten() {
            validate_basename("excluded_files", name)?;
        }
        if let Some(root) = &discovery.root {
            if root.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "root".to_string(),
                    reason: "root must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Mutable access to the discovery section, creating it on demand
    pub fn discovery_mut(&mut self) -> &mut DiscoveryConfig {
        self.discovery.get_or_insert_with(Default::default)
    }

    /// Mutable access to the output section, creating it on demand
    pub fn output_mut(&mut self) -> &mut OutputConfig {
        self.output.get_or_insert_with(Default::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_project_config() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[discovery]
root = "suites"
excluded_dirs = ["target"]
excluded_files = ["notes.txt"]
suffix = "Spec"
duplicate_groups = "reject"

[output]
verbose = true
color = false
"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let discovery = config.discovery.as_ref().unwrap();
        assert_eq!(discovery.root, Some(PathBuf::from("suites")));
        assert_eq!(discovery.excluded_dirs, Some(vec!["target".to_string()]));
        assert_eq!(discovery.excluded_files, Some(vec!["notes.txt".to_string()]));
        assert_eq!(discovery.suffix.as_deref(), Some("Spec"));
        assert_eq!(discovery.duplicate_groups, Some(DuplicateGroupPolicy::Reject));
        assert_eq!(
            config.output,
            Some(OutputConfig {
                verbose: Some(true),
                color: Some(false),
            })
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ProjectConfig, _> = toml::from_str("[discovery]\npattern = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        let config: ProjectConfig = toml::from_str("[discovery]\nsuffix = \"\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "suffix"
        ));
    }

    #[test]
    fn test_excluded_path_rejected() {
        let config: ProjectConfig =
            toml::from_str("[discovery]\nexcluded_dirs = [\"a/b\"]\n").unwrap();
        assert!(config.validate().is_err());
    }
}
