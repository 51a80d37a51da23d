//! Command implementations and the setup they share

pub mod group;
pub mod list;
pub mod run;

use crate::GlobalArgs;
use anyhow::{Context, Result};
use muffin_config::{Config, ConfigLoader};
use muffin_core::{Console, Harness, SilentReporter};
use muffin_script::ScriptLoader;
use std::env;
use std::io;
use std::process::ExitCode;

/// Some tests failed or errored
pub const EXIT_FAILURES: u8 = 1;

/// Configuration, lookup or load error
pub const EXIT_ERROR: u8 = 2;

/// How a successful command invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Outcome::Passed
        } else {
            Outcome::Failed
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Passed => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(EXIT_FAILURES),
        }
    }
}

/// Load configuration and layer the command-line flags on top
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    let mut config = match &args.config {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let cwd = env::current_dir().context("Failed to read the current directory")?;
            loader.load_from_directory(&cwd)?
        }
    };

    if let Some(root) = &args.root {
        config.override_root(root);
    }
    if let Some(suffix) = &args.suffix {
        config.override_suffix(suffix)?;
    }
    if args.verbose {
        config.override_verbose(true);
    }
    if args.no_color {
        config.override_color(false);
    }
    if !config.color() {
        colored::control::set_override(false);
    }

    tracing::debug!(root = %config.root().display(), suffix = config.suffix(), "configuration loaded");
    Ok(config)
}

/// Harness over the configured root using the script loader
///
/// In JSON mode test output goes to stderr so stdout carries only the report.
pub fn build_harness(config: &Config, json: bool) -> Result<Harness<ScriptLoader>> {
    let console = if json {
        Console::from_writers(io::stderr(), io::stderr())
    } else {
        Console::stdio()
    };
    let harness = Harness::from_config(config, ScriptLoader::new(console.clone()), console)?;
    Ok(if json {
        harness.with_reporter(SilentReporter)
    } else {
        harness
    })
}
