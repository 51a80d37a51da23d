//! Test runner - run the methods of one test-case class

use crate::console::Console;
use crate::module::{MethodOutcome, TestCase};
use std::time::{Duration, Instant};

/// The test methods of one class, in the order they will run
pub struct TestSuite<'a> {
    case: &'a dyn TestCase,
    methods: Vec<String>,
}

impl<'a> TestSuite<'a> {
    /// Expand a test case into its methods
    ///
    /// Which methods count as tests is decided by the case itself.
    pub fn from_test_case(case: &'a dyn TestCase) -> Self {
        Self {
            methods: case.test_method_names(),
            case,
        }
    }

    pub fn count_test_cases(&self) -> usize {
        self.methods.len()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn case(&self) -> &'a dyn TestCase {
        self.case
    }
}

/// A method that did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodFailure {
    pub case: String,
    pub method: String,
    pub message: String,
}

/// Everything a runner learned from one suite
#[derive(Debug, Clone, Default)]
pub struct SuiteResult {
    pub tests_run: usize,
    /// Assertion failures
    pub failures: Vec<MethodFailure>,
    /// Runtime errors
    pub errors: Vec<MethodFailure>,
    pub duration: Duration,
}

impl SuiteResult {
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }
}

/// Executes a suite
pub trait TestRunner {
    fn run(&self, suite: &TestSuite<'_>) -> SuiteResult;
}

/// Sequential runner printing one status line per method to the console's
/// error stream, followed by the details of every failure
pub struct TextTestRunner {
    console: Console,
}

impl TextTestRunner {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    fn line(&self, text: &str) {
        // Status lines are best effort; a closed stderr must not fail the run.
        let _ = self.console.write_err(text);
    }
}

impl TestRunner for TextTestRunner {
    fn run(&self, suite: &TestSuite<'_>) -> SuiteResult {
        let start = Instant::now();
        let case = suite.case();
        let mut result = SuiteResult::default();

        for method in suite.methods() {
            let outcome = case.run_test(method);
            result.tests_run += 1;

            let status = match &outcome {
                MethodOutcome::Passed => "ok",
                MethodOutcome::Failed(_) => "FAIL",
                MethodOutcome::Errored(_) => "ERROR",
            };
            self.line(&format!("{} ({}) ... {}\n", method, case.name(), status));

            match outcome {
                MethodOutcome::Passed => {}
                MethodOutcome::Failed(message) => result.failures.push(MethodFailure {
                    case: case.name().to_string(),
                    method: method.clone(),
                    message,
                }),
                MethodOutcome::Errored(message) => result.errors.push(MethodFailure {
                    case: case.name().to_string(),
                    method: method.clone(),
                    message,
                }),
            }
        }

        for (label, failures) in [("ERROR", &result.errors), ("FAIL", &result.failures)] {
            for failure in failures {
                self.line(&format!(
                    "{}: {} ({})\n    {}\n",
                    label, failure.method, failure.case, failure.message
                ));
            }
        }

        result.duration = start.elapsed();
        self.line(&format!(
            "Ran {} test(s) in {:.3}s\n",
            result.tests_run,
            result.duration.as_secs_f64()
        ));
        result
    }
}
