//! Test discovery and execution for muffin
//!
//! Walks a root directory whose subdirectories are test groups, loads every
//! candidate file as a test module, picks out the test-case classes by name,
//! runs their test methods and tallies the results per group and overall.
//!
//! Loading is pluggable through [`ModuleLoader`]; the harness itself only
//! sees [`TestModule`] and [`TestCase`] values.

pub mod console;
pub mod engine;
pub mod error;
pub mod harness;
pub mod index;
pub mod module;
pub mod reporter;
pub mod resolver;
pub mod runner;
pub mod tally;

pub use console::{Console, QuietGuard, SharedBuffer};
pub use engine::ExecutionEngine;
pub use error::{HarnessError, HarnessResult, LoadError};
pub use harness::{FileError, FileOutcome, GroupReport, Harness, HarnessOptions, RunReport};
pub use index::{FilesystemIndex, GroupMap, IndexEntry, IndexOptions};
pub use module::{MethodOutcome, ModuleLoader, TestCase, TestModule, SKIP_MARKER};
pub use reporter::{ConsoleReporter, Reporter, SilentReporter};
pub use resolver::{Resolution, ResolvedTestCase, TestCaseResolver};
pub use runner::{MethodFailure, SuiteResult, TestRunner, TestSuite, TextTestRunner};
pub use tally::{CaseResult, RunTally};
