//! Test counts per case, per group and per run

use crate::error::{HarnessError, HarnessResult};
use serde::Serialize;

fn check(total: usize, failures: usize, errors: usize) -> HarnessResult<()> {
    match failures.checked_add(errors) {
        Some(bad) if bad <= total => Ok(()),
        _ => Err(HarnessError::InvariantViolation {
            total,
            failures,
            errors,
        }),
    }
}

/// Outcome counts of one test-case class (or of one file that failed to load)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CaseResult {
    total: usize,
    failures: usize,
    errors: usize,
}

impl CaseResult {
    /// Nothing ran
    pub const EMPTY: CaseResult = CaseResult {
        total: 0,
        failures: 0,
        errors: 0,
    };

    /// Build a result, rejecting more failing tests than tests
    pub fn new(total: usize, failures: usize, errors: usize) -> HarnessResult<Self> {
        check(total, failures, errors)?;
        Ok(Self {
            total,
            failures,
            errors,
        })
    }

    /// Contribution of a module that could not be loaded: one errored test
    pub fn load_error() -> Self {
        Self {
            total: 1,
            failures: 0,
            errors: 1,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Assertion failures
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Tests aborted by a runtime error
    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn passed(&self) -> usize {
        self.total - self.failures - self.errors
    }
}

/// Running (total, failures, errors) for a group or a whole run
///
/// Only ever grows; a new run starts from a fresh tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunTally {
    total: usize,
    failures: usize,
    errors: usize,
}

impl RunTally {
    /// Build a tally directly, checking the invariant
    pub fn new(total: usize, failures: usize, errors: usize) -> HarnessResult<Self> {
        check(total, failures, errors)?;
        Ok(Self {
            total,
            failures,
            errors,
        })
    }

    /// Accumulate one case result
    pub fn add(&mut self, result: CaseResult) {
        self.total += result.total;
        self.failures += result.failures;
        self.errors += result.errors;
    }

    /// Accumulate another tally (a group into the run total)
    pub fn absorb(&mut self, other: &RunTally) {
        self.total += other.total;
        self.failures += other.failures;
        self.errors += other.errors;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Tests that neither failed nor errored
    pub fn passed(&self) -> usize {
        self.total - self.not_passed()
    }

    /// Failures and errors together
    pub fn not_passed(&self) -> usize {
        self.failures + self.errors
    }

    pub fn is_success(&self) -> bool {
        self.not_passed() == 0
    }

    /// Human-readable one-line summary
    pub fn summary_message(&self) -> String {
        if self.is_success() {
            format!("All {} test(s) have passed", self.total)
        } else {
            format!("{}/{} test(s) have passed", self.passed(), self.total)
        }
    }
}

impl FromIterator<CaseResult> for RunTally {
    fn from_iter<I: IntoIterator<Item = CaseResult>>(iter: I) -> Self {
        let mut tally = RunTally::default();
        for result in iter {
            tally.add(result);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use proptest::prelude::*;

    #[test]
    fn test_case_result_rejects_too_many_failures() {
        assert!(matches!(
            CaseResult::new(2, 2, 1),
            Err(HarnessError::InvariantViolation {
                total: 2,
                failures: 2,
                errors: 1
            })
        ));
        assert!(RunTally::new(0, 1, 0).is_err());
    }

    #[test]
    fn test_overflowing_counts_are_rejected() {
        assert!(CaseResult::new(usize::MAX, usize::MAX, 1).is_err());
    }

    #[test]
    fn test_summary_all_passed() {
        let tally = RunTally::new(3, 0, 0).unwrap();
        assert_snapshot!(tally.summary_message(), @"All 3 test(s) have passed");
    }

    #[test]
    fn test_summary_with_failures() {
        let tally: RunTally = [
            CaseResult::new(3, 1, 0).unwrap(),
            CaseResult::EMPTY,
        ]
        .into_iter()
        .collect();
        assert_snapshot!(tally.summary_message(), @"2/3 test(s) have passed");
    }

    #[test]
    fn test_errors_count_against_passed() {
        let mut tally = RunTally::default();
        tally.add(CaseResult::new(4, 1, 1).unwrap());
        tally.add(CaseResult::load_error());
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.passed(), 2);
        assert_eq!(tally.not_passed(), 3);
        assert!(!tally.is_success());
    }

    #[test]
    fn test_empty_tally_is_success() {
        let tally = RunTally::default();
        assert!(tally.is_success());
        assert_eq!(tally.summary_message(), "All 0 test(s) have passed");
    }

    fn case_result() -> impl Strategy<Value = CaseResult> {
        (0usize..50, 0usize..50, 0usize..50).prop_map(|(passed, failures, errors)| {
            CaseResult::new(passed + failures + errors, failures, errors).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_tally_counts_stay_consistent(results in prop::collection::vec(case_result(), 0..20)) {
            let tally: RunTally = results.iter().copied().collect();
            prop_assert_eq!(tally.passed() + tally.failures() + tally.errors(), tally.total());
            prop_assert!(RunTally::new(tally.total(), tally.failures(), tally.errors()).is_ok());
            for result in &results {
                prop_assert_eq!(result.passed() + result.failures() + result.errors(), result.total());
            }
        }

        #[test]
        fn prop_absorb_matches_add(left in prop::collection::vec(case_result(), 0..10),
                                   right in prop::collection::vec(case_result(), 0..10)) {
            let mut grand: RunTally = left.iter().copied().collect();
            let group: RunTally = right.iter().copied().collect();
            grand.absorb(&group);
            let flat: RunTally = left.iter().chain(right.iter()).copied().collect();
            prop_assert_eq!(grand, flat);
        }
    }
}
