//! Test-case resolution - pick the test classes out of a loaded module

use crate::error::HarnessResult;
use crate::module::{TestCase, TestModule};
use muffin_config::validate_suffix;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

/// A test-case class found in a module
#[derive(Clone)]
pub struct ResolvedTestCase {
    pub name: String,
    pub case: Rc<dyn TestCase>,
}

impl fmt::Debug for ResolvedTestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTestCase")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a module contributes to a run
#[derive(Debug)]
pub enum Resolution {
    /// The module carries the skip marker
    Skipped,
    Cases(Vec<ResolvedTestCase>),
}

/// Selects module symbols named `<anything><suffix>` that are test-case classes
#[derive(Debug, Clone)]
pub struct TestCaseResolver {
    pattern: Regex,
}

impl TestCaseResolver {
    pub fn new(suffix: &str) -> HarnessResult<Self> {
        validate_suffix(suffix)?;
        let pattern = Regex::new(&format!("^.*{}$", regex::escape(suffix)))
            .map_err(|e| crate::HarnessError::Configuration(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// Whether a symbol name follows the naming convention
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    pub fn resolve(&self, module: &dyn TestModule) -> Resolution {
        if module.has_skip_marker() {
            return Resolution::Skipped;
        }

        let mut cases = Vec::new();
        for name in module.symbol_names() {
            if !self.matches(&name) {
                continue;
            }
            match module.test_case(&name) {
                Some(case) => cases.push(ResolvedTestCase { name, case }),
                None => {
                    tracing::debug!(symbol = %name, module = %module.path().display(), "name matches but is not a test case");
                }
            }
        }
        Resolution::Cases(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::MethodOutcome;
    use rstest::rstest;
    use std::path::{Path, PathBuf};

    struct NamedCase(String);

    impl TestCase for NamedCase {
        fn name(&self) -> &str {
            &self.0
        }
        fn test_method_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn run_test(&self, _method: &str) -> MethodOutcome {
            MethodOutcome::Passed
        }
    }

    struct FakeModule {
        path: PathBuf,
        skip: bool,
        classes: Vec<&'static str>,
        values: Vec<&'static str>,
    }

    impl TestModule for FakeModule {
        fn path(&self) -> &Path {
            &self.path
        }
        fn has_skip_marker(&self) -> bool {
            self.skip
        }
        fn symbol_names(&self) -> Vec<String> {
            self.classes
                .iter()
                .chain(self.values.iter())
                .map(|s| s.to_string())
                .collect()
        }
        fn test_case(&self, name: &str) -> Option<Rc<dyn TestCase>> {
            self.classes
                .iter()
                .any(|c| *c == name)
                .then(|| Rc::new(NamedCase(name.to_string())) as Rc<dyn TestCase>)
        }
    }

    fn module(classes: Vec<&'static str>, values: Vec<&'static str>) -> FakeModule {
        FakeModule {
            path: PathBuf::from("fake.muf"),
            skip: false,
            classes,
            values,
        }
    }

    #[rstest]
    #[case("MathTest", true)]
    #[case("Test", true)]
    #[case("TestMath", false)]
    #[case("MathTests", false)]
    #[case("mathtest", false)]
    fn test_suffix_pattern(#[case] name: &str, #[case] expected: bool) {
        let resolver = TestCaseResolver::new("Test").unwrap();
        assert_eq!(resolver.matches(name), expected);
    }

    #[test]
    fn test_custom_suffix() {
        let resolver = TestCaseResolver::new("Spec").unwrap();
        assert!(resolver.matches("ParserSpec"));
        assert!(!resolver.matches("ParserTest"));
    }

    #[test]
    fn test_invalid_suffix() {
        assert!(TestCaseResolver::new("").is_err());
        assert!(TestCaseResolver::new("a.b").is_err());
    }

    #[test]
    fn test_resolves_only_matching_classes() {
        let resolver = TestCaseResolver::new("Test").unwrap();
        let module = module(vec!["MathTest", "Helper", "StringTest"], vec!["ConstTest"]);

        let Resolution::Cases(cases) = resolver.resolve(&module) else {
            panic!("expected cases");
        };
        let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["MathTest", "StringTest"]);
        assert_eq!(cases[0].case.name(), "MathTest");
    }

    #[test]
    fn test_skip_marker_short_circuits() {
        let resolver = TestCaseResolver::new("Test").unwrap();
        let mut module = module(vec!["MathTest"], vec![]);
        module.skip = true;
        assert!(matches!(resolver.resolve(&module), Resolution::Skipped));
    }

    #[test]
    fn test_module_without_cases() {
        let resolver = TestCaseResolver::new("Test").unwrap();
        let module = module(vec![], vec!["helper"]);
        assert!(matches!(resolver.resolve(&module), Resolution::Cases(c) if c.is_empty()));
    }
}
