//! Harness - index, load, resolve, execute and tally, per group or for everything

use crate::console::Console;
use crate::engine::ExecutionEngine;
use crate::error::{HarnessError, HarnessResult};
use crate::index::{FilesystemIndex, IndexEntry, IndexOptions};
use crate::module::ModuleLoader;
use crate::reporter::{ConsoleReporter, Reporter};
use crate::resolver::{Resolution, TestCaseResolver};
use crate::tally::{CaseResult, RunTally};
use muffin_config::Config;
use serde::Serialize;
use std::path::PathBuf;

/// Label of the grand-total summary line
pub const TOTAL_LABEL: &str = "total";

/// Everything needed to build a harness
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub root: PathBuf,
    pub index: IndexOptions,
    pub suffix: String,
}

impl HarnessOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.root(),
            index: IndexOptions::from_config(config),
            suffix: config.suffix().to_string(),
        }
    }
}

/// A module that could not be loaded during a full run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub tally: RunTally,
    /// Modules that carried the skip marker
    pub skipped: Vec<PathBuf>,
    /// Modules that failed to load (full runs only)
    pub load_errors: Vec<FileError>,
}

impl GroupReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tally: RunTally::default(),
            skipped: Vec::new(),
            load_errors: Vec::new(),
        }
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunReport {
    pub groups: Vec<GroupReport>,
    pub total: RunTally,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.total.is_success()
    }
}

/// What a single module contributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Skipped,
    Ran(RunTally),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadErrorPolicy {
    /// Abort the group with the load error
    Propagate,
    /// Count the module as one errored test and keep going
    Record,
}

/// Test discovery and execution over one root directory
pub struct Harness<L: ModuleLoader> {
    index: FilesystemIndex,
    loader: L,
    resolver: TestCaseResolver,
    engine: ExecutionEngine,
    reporter: Box<dyn Reporter>,
}

impl<L: ModuleLoader> Harness<L> {
    /// Validate the options and index the root
    ///
    /// `console` must be the console `loader` hands to the modules it loads.
    pub fn new(options: HarnessOptions, loader: L, console: Console) -> HarnessResult<Self> {
        let resolver = TestCaseResolver::new(&options.suffix)?;
        let index = FilesystemIndex::build(options.root, options.index)?;
        tracing::debug!(root = %index.root().display(), groups = index.len(), "index built");

        Ok(Self {
            index,
            loader,
            resolver,
            engine: ExecutionEngine::new(console),
            reporter: Box::new(ConsoleReporter::new(true)),
        })
    }

    /// Harness configured from a loaded configuration
    pub fn from_config(config: &Config, loader: L, console: Console) -> HarnessResult<Self> {
        let reporter = ConsoleReporter::new(config.color());
        Ok(Self::new(HarnessOptions::from_config(config), loader, console)?.with_reporter(reporter))
    }

    /// Replace the reporter
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn index(&self) -> &FilesystemIndex {
        &self.index
    }

    /// Run every group, then report the grand total
    ///
    /// The index is rebuilt first. A module that fails to load counts as one
    /// errored test of its group and the run continues.
    pub fn run_all_tests(&mut self) -> HarnessResult<RunReport> {
        self.index.rebuild()?;
        let names: Vec<String> = self.index.group_names().map(str::to_string).collect();
        tracing::info!(groups = names.len(), "running all test groups");

        let mut report = RunReport::default();
        for name in names {
            let group = self.run_group(&name, LoadErrorPolicy::Record)?;
            self.reporter.summary(&name, &group.tally);
            report.total.absorb(&group.tally);
            report.groups.push(group);
        }

        self.reporter.summary(TOTAL_LABEL, &report.total);
        Ok(report)
    }

    /// Run the single group called `name`
    ///
    /// An unknown name is [`HarnessError::GroupNotFound`]; a module that fails
    /// to load aborts the group with [`HarnessError::Load`].
    pub fn test_certain_class(&mut self, name: &str) -> HarnessResult<GroupReport> {
        let report = self.run_group(name, LoadErrorPolicy::Propagate)?;
        self.reporter.summary(name, &report.tally);
        Ok(report)
    }

    /// Load, resolve and run one module
    pub fn conduct_test(&mut self, entry: &IndexEntry) -> HarnessResult<FileOutcome> {
        let module = self.loader.load(&entry.path)?;

        let cases = match self.resolver.resolve(module.as_ref()) {
            Resolution::Skipped => {
                tracing::info!(module = %entry.path.display(), "module carries the skip marker");
                self.reporter.module_skipped(&entry.path);
                return Ok(FileOutcome::Skipped);
            }
            Resolution::Cases(cases) => cases,
        };

        let mut tally = RunTally::default();
        for resolved in cases {
            self.reporter.case_started(&resolved.name);
            let result = self.engine.run(resolved.case.as_ref(), entry.verbose)?;
            tally.add(result);
        }
        Ok(FileOutcome::Ran(tally))
    }

    fn run_group(&mut self, name: &str, policy: LoadErrorPolicy) -> HarnessResult<GroupReport> {
        let entries = self
            .index
            .group(name)
            .ok_or_else(|| HarnessError::GroupNotFound {
                name: name.to_string(),
            })?
            .to_vec();

        let _span = tracing::info_span!("group", name = %name).entered();
        self.reporter.group_started(name, entries.len());

        let mut report = GroupReport::new(name);
        for entry in &entries {
            match self.conduct_test(entry) {
                Ok(FileOutcome::Skipped) => report.skipped.push(entry.path.clone()),
                Ok(FileOutcome::Ran(tally)) => report.tally.absorb(&tally),
                Err(HarnessError::Load(err)) if policy == LoadErrorPolicy::Record => {
                    tracing::warn!(module = %entry.path.display(), error = %err, "module failed to load");
                    self.reporter.load_failed(&entry.path, &err);
                    report.tally.add(CaseResult::load_error());
                    report.load_errors.push(FileError {
                        path: entry.path.clone(),
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }
}
