//! Filesystem index - map test groups to their candidate module files

use crate::error::{HarnessError, HarnessResult};
use indexmap::IndexMap;
use muffin_config::{validate_basename, Config, DuplicateGroupPolicy};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A candidate test module and whether its output should be shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub verbose: bool,
}

/// Group name -> candidate files, in traversal order
pub type GroupMap = IndexMap<String, Vec<IndexEntry>>;

/// What to leave out of the index and how to label entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    pub excluded_dirs: Vec<String>,
    pub excluded_files: Vec<String>,
    pub verbose: bool,
    pub duplicate_groups: DuplicateGroupPolicy,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_config(&Config::defaults("."))
    }
}

impl IndexOptions {
    /// Discovery options from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            excluded_dirs: config.excluded_dirs(),
            excluded_files: config.excluded_files(),
            verbose: config.verbose(),
            duplicate_groups: config.duplicate_groups(),
        }
    }

    fn validate(&self) -> HarnessResult<()> {
        for name in &self.excluded_dirs {
            validate_basename("excluded_dirs", name)?;
        }
        for name in &self.excluded_files {
            validate_basename("excluded_files", name)?;
        }
        Ok(())
    }
}

/// Index of every test group under a root directory
///
/// Each directory below the root becomes a group named after its basename,
/// however deeply it is nested. Files sitting directly in the root belong to
/// no group.
#[derive(Debug, Clone)]
pub struct FilesystemIndex {
    root: PathBuf,
    options: IndexOptions,
    groups: GroupMap,
}

impl FilesystemIndex {
    /// Walk `root` and build the index
    pub fn build(root: impl Into<PathBuf>, options: IndexOptions) -> HarnessResult<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(HarnessError::Configuration(format!(
                "test root {} does not exist",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(HarnessError::Configuration(format!(
                "test root {} is not a directory",
                root.display()
            )));
        }
        options.validate()?;

        let groups = walk(&root, &options)?;
        Ok(Self {
            root,
            options,
            groups,
        })
    }

    /// Re-walk the root, replacing the current groups
    pub fn rebuild(&mut self) -> HarnessResult<()> {
        self.groups = walk(&self.root, &self.options)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// Files of one group, by exact name
    pub fn group(&self, name: &str) -> Option<&[IndexEntry]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn basename(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn walk(root: &Path, options: &IndexOptions) -> HarnessResult<GroupMap> {
    let excluded_dirs: HashSet<&str> = options.excluded_dirs.iter().map(String::as_str).collect();
    let excluded_files: HashSet<&str> =
        options.excluded_files.iter().map(String::as_str).collect();

    let mut groups = GroupMap::new();
    let mut group_dirs: HashMap<String, PathBuf> = HashMap::new();

    // Files before subdirectories, each sorted by name.
    let walker = WalkDir::new(root)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir() && excluded_dirs.contains(basename(e).as_str()))
        });

    for entry in walker {
        let entry = entry.map_err(|err| HarnessError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let name = basename(&entry);
        if entry.file_type().is_dir() {
            match group_dirs.get(&name) {
                None => {
                    tracing::debug!(group = %name, dir = %entry.path().display(), "group found");
                    group_dirs.insert(name.clone(), entry.path().to_path_buf());
                    groups.insert(name, Vec::new());
                }
                Some(first) => match options.duplicate_groups {
                    DuplicateGroupPolicy::Merge => {
                        tracing::warn!(
                            group = %name,
                            first = %first.display(),
                            second = %entry.path().display(),
                            "directories share a basename; merging into one group"
                        );
                    }
                    DuplicateGroupPolicy::Reject => {
                        return Err(HarnessError::DuplicateGroup {
                            name,
                            first: first.clone(),
                            second: entry.path().to_path_buf(),
                        });
                    }
                },
            }
            continue;
        }

        if !entry.path().is_file() {
            continue;
        }
        if entry.depth() == 1 {
            tracing::debug!(file = %entry.path().display(), "file outside any group ignored");
            continue;
        }
        if excluded_files.contains(name.as_str()) {
            tracing::debug!(file = %entry.path().display(), "excluded file skipped");
            continue;
        }

        let group = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        groups.entry(group).or_default().push(IndexEntry {
            path: entry.path().to_path_buf(),
            verbose: options.verbose,
        });
    }

    Ok(groups)
}
