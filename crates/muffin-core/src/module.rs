//! Loaded test modules and the test-case capability
//!
//! A loader turns a file into a [`TestModule`]; the module exposes the names
//! it defines and, for the ones that are test-case classes, a [`TestCase`]
//! handle the engine can expand and run.

use crate::error::LoadError;
use std::path::Path;
use std::rc::Rc;

/// Top-level name a module defines to opt out of the run
pub const SKIP_MARKER: &str = "IGNORE_ME";

/// Outcome of one test method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutcome {
    Passed,
    /// An assertion did not hold
    Failed(String),
    /// The method aborted with a runtime error
    Errored(String),
}

impl MethodOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, MethodOutcome::Passed)
    }
}

/// A class bundling related test methods
pub trait TestCase {
    /// Name the class was defined under
    fn name(&self) -> &str;

    /// Names of its test methods, in definition order
    fn test_method_names(&self) -> Vec<String>;

    /// Run one method against a fresh instance of the class
    fn run_test(&self, method: &str) -> MethodOutcome;
}

/// An executed module and the symbols it defined
pub trait TestModule {
    /// File the module was loaded from
    fn path(&self) -> &Path;

    /// Whether the module asked to be left out of the run
    fn has_skip_marker(&self) -> bool;

    /// Every top-level name, in the module's listing order
    fn symbol_names(&self) -> Vec<String>;

    /// The test-case class bound to `name`, if that symbol is one
    fn test_case(&self, name: &str) -> Option<Rc<dyn TestCase>>;
}

/// Loads files as test modules
///
/// Every call loads afresh: top-level code runs again and nothing is cached.
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn TestModule>, LoadError>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Box<L> {
    fn load(&self, path: &Path) -> Result<Box<dyn TestModule>, LoadError> {
        (**self).load(path)
    }
}
