//! List command - show the indexed groups

use super::{load_config, Outcome};
use crate::GlobalArgs;
use anyhow::Result;
use colored::*;
use muffin_core::{FilesystemIndex, IndexOptions};
use std::path::Path;

pub fn run(args: &GlobalArgs) -> Result<Outcome> {
    let config = load_config(args)?;
    let index = FilesystemIndex::build(config.root(), IndexOptions::from_config(&config))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(index.groups())?);
        return Ok(Outcome::Passed);
    }

    if index.is_empty() {
        println!("No test groups under {}", index.root().display());
        return Ok(Outcome::Passed);
    }

    for (group, entries) in index.groups() {
        println!("{} ({} file(s))", group.bold(), entries.len());
        for entry in entries {
            println!("  {}", relative(&entry.path, index.root()).display());
        }
    }
    Ok(Outcome::Passed)
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
