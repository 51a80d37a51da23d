//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::ProjectConfig;
use crate::{
    validate_suffix, ConfigResult, DuplicateGroupPolicy, CONFIG_FILE_NAME, DEFAULT_EXCLUDED_DIRS,
    DEFAULT_EXCLUDED_FILES, DEFAULT_ROOT, DEFAULT_SUFFIX,
};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.muffin/config.toml) - lowest priority
/// 2. Project config (./muffin.toml) - overrides global
/// 3. Environment variables (MUFFIN_*, NO_COLOR) - overrides project
/// 4. CLI flags - highest priority (handled by caller through `Config::override_*`)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration (with environment overrides applied)
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where muffin.toml was found)
    pub project_root: Option<PathBuf>,

    /// Directory relative roots resolve against when no project was found
    base_dir: PathBuf,

    /// Root given on the command line or through MUFFIN_ROOT
    root_override: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global configuration file instead of ~/.muffin/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find muffin.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config().unwrap_or_default();

        let mut config = Config {
            project: project_config,
            global: global_config,
            project_root,
            base_dir: start_dir.to_path_buf(),
            root_override: None,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config().unwrap_or_default();

        let project_root = config_path.parent().map(|p| p.to_path_buf());
        let base_dir = project_root.clone().unwrap_or_else(|| PathBuf::from("."));

        let mut config = Config {
            project: project_config,
            global: global_config,
            project_root,
            base_dir,
            root_override: None,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                // Reached filesystem root without finding muffin.toml
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.muffin/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn env_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Configuration made only of built-in defaults, rooted at `base_dir`
    pub fn defaults(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
            base_dir: base_dir.into(),
            root_override: None,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Recognized: MUFFIN_VERBOSE, MUFFIN_SUFFIX, MUFFIN_ROOT and NO_COLOR.
    fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(verbose) = env::var("MUFFIN_VERBOSE") {
            self.project.output_mut().verbose = Some(env_flag(&verbose));
        }

        if let Ok(suffix) = env::var("MUFFIN_SUFFIX") {
            self.override_suffix(suffix)?;
        }

        if let Ok(root) = env::var("MUFFIN_ROOT") {
            if !root.is_empty() {
                self.override_root(root);
            }
        }

        if env::var_os("NO_COLOR").is_some() {
            self.project.output_mut().color = Some(false);
        }

        Ok(())
    }

    /// Replace the test root (CLI flag or environment)
    pub fn override_root(&mut self, root: impl Into<PathBuf>) {
        self.root_override = Some(root.into());
    }

    /// Replace the class-name suffix
    pub fn override_suffix(&mut self, suffix: impl Into<String>) -> ConfigResult<()> {
        let suffix = suffix.into();
        validate_suffix(&suffix)?;
        self.project.discovery_mut().suffix = Some(suffix);
        Ok(())
    }

    /// Force verbose output on or off
    pub fn override_verbose(&mut self, verbose: bool) {
        self.project.output_mut().verbose = Some(verbose);
    }

    /// Force colored output on or off
    pub fn override_color(&mut self, color: bool) {
        self.project.output_mut().color = Some(color);
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a muffin.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Directory holding the test groups
    pub fn root(&self) -> PathBuf {
        if let Some(root) = &self.root_override {
            return root.clone();
        }

        let configured = self
            .project
            .discovery
            .as_ref()
            .and_then(|d| d.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        if configured.is_absolute() {
            configured
        } else {
            self.project_root
                .as_deref()
                .unwrap_or(&self.base_dir)
                .join(configured)
        }
    }

    /// Directory basenames pruned from discovery
    pub fn excluded_dirs(&self) -> Vec<String> {
        self.project
            .discovery
            .as_ref()
            .and_then(|d| d.excluded_dirs.clone())
            .unwrap_or_else(|| DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect())
    }

    /// File basenames never loaded as test modules
    pub fn excluded_files(&self) -> Vec<String> {
        self.project
            .discovery
            .as_ref()
            .and_then(|d| d.excluded_files.clone())
            .unwrap_or_else(|| DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect())
    }

    /// Suffix test-case class names must end with
    pub fn suffix(&self) -> &str {
        self.project
            .discovery
            .as_ref()
            .and_then(|d| d.suffix.as_deref())
            .unwrap_or(DEFAULT_SUFFIX)
    }

    /// Policy for directories sharing a basename
    pub fn duplicate_groups(&self) -> DuplicateGroupPolicy {
        self.project
            .discovery
            .as_ref()
            .and_then(|d| d.duplicate_groups)
            .unwrap_or_default()
    }

    /// Effective verbosity (project > global > default)
    pub fn verbose(&self) -> bool {
        self.project
            .output
            .as_ref()
            .and_then(|o| o.verbose)
            .or_else(|| self.global.verbose())
            .unwrap_or(false)
    }

    /// Effective color preference (project > global > default)
    pub fn color(&self) -> bool {
        self.project
            .output
            .as_ref()
            .and_then(|o| o.color)
            .or_else(|| self.global.color())
            .unwrap_or(true)
    }
}
