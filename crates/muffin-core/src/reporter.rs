//! Test reporter - progress notes and colored summary lines

use crate::error::LoadError;
use crate::tally::RunTally;
use colored::*;
use std::io::{self, Stdout, Write};
use std::path::Path;

/// Receives progress events and tallies from the harness
pub trait Reporter {
    /// A group is about to run
    fn group_started(&mut self, _group: &str, _files: usize) {}

    /// A module opted out with the skip marker
    fn module_skipped(&mut self, _path: &Path) {}

    /// A test-case class is about to run
    fn case_started(&mut self, _case: &str) {}

    /// A module failed to load and the run continued without it
    fn load_failed(&mut self, _path: &Path, _error: &LoadError) {}

    /// Render the tally of a group or of the whole run
    fn summary(&mut self, label: &str, tally: &RunTally);
}

/// Human-readable reporter
pub struct ConsoleReporter<W: Write = Stdout> {
    out: W,
    /// Colorize summary lines
    color: bool,
}

impl ConsoleReporter<Stdout> {
    /// Reporter writing to stdout
    pub fn new(color: bool) -> Self {
        Self::with_writer(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        // Reporting must never abort a run.
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    fn paint(&self, text: &str, success: bool) -> String {
        if !self.color {
            text.to_string()
        } else if success {
            text.green().to_string()
        } else {
            text.red().to_string()
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn group_started(&mut self, group: &str, _files: usize) {
        self.emit(&format!("[INFO] Testing all of {}", group));
    }

    fn module_skipped(&mut self, path: &Path) {
        self.emit(&format!("[INFO] Ignoring {}", path.display()));
    }

    fn case_started(&mut self, case: &str) {
        self.emit(&format!("[INFO] Conducting {}", case));
    }

    fn load_failed(&mut self, path: &Path, error: &LoadError) {
        let line = format!("[ERROR] Could not load {}: {}", path.display(), error);
        let line = self.paint(&line, false);
        self.emit(&line);
    }

    fn summary(&mut self, label: &str, tally: &RunTally) {
        let message = self.paint(&tally.summary_message(), tally.is_success());
        let label = if self.color {
            label.bold().to_string()
        } else {
            label.to_string()
        };
        self.emit(&format!("{}: {}", label, message));
    }
}

/// Reporter that drops everything (machine-readable output, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn summary(&mut self, _label: &str, _tally: &RunTally) {}
}
