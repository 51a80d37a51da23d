//! Execution engine - run one test-case class and count the outcome

use crate::console::Console;
use crate::error::HarnessResult;
use crate::module::TestCase;
use crate::runner::{TestRunner, TestSuite, TextTestRunner};
use crate::tally::CaseResult;

/// Runs test-case classes through a [`TestRunner`], optionally in quiet mode
pub struct ExecutionEngine {
    runner: Box<dyn TestRunner>,
    console: Console,
}

impl ExecutionEngine {
    /// Engine using the sequential text runner
    pub fn new(console: Console) -> Self {
        let runner = TextTestRunner::new(console.clone());
        Self::with_runner(Box::new(runner), console)
    }

    /// Engine using a custom runner
    ///
    /// `console` must be the one the loaded modules write to, otherwise quiet
    /// mode has nothing to silence.
    pub fn with_runner(runner: Box<dyn TestRunner>, console: Console) -> Self {
        Self { runner, console }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Run every test method of `case`
    ///
    /// When `verbose` is false the console is silenced for the duration of
    /// the run and restored afterwards, even if the runner panics.
    pub fn run(&self, case: &dyn TestCase, verbose: bool) -> HarnessResult<CaseResult> {
        let suite = TestSuite::from_test_case(case);
        let total = suite.count_test_cases();
        tracing::debug!(case = case.name(), methods = total, verbose, "running test case");

        let result = {
            let _quiet = (!verbose).then(|| self.console.silence());
            self.runner.run(&suite)
        };

        CaseResult::new(total, result.failures.len(), result.errors.len())
    }
}
