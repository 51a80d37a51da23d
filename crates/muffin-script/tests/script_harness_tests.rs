//! Script modules driven through the full harness

use muffin_core::{
    Console, ConsoleReporter, Harness, HarnessError, HarnessOptions, IndexOptions, RunTally,
    SharedBuffer,
};
use muffin_script::ScriptLoader;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn harness(root: &Path, verbose: bool) -> (Harness<ScriptLoader>, SharedBuffer, SharedBuffer, SharedBuffer) {
    let (console, out, err) = Console::buffered();
    let report = SharedBuffer::default();
    let options = HarnessOptions {
        root: root.to_path_buf(),
        index: IndexOptions {
            verbose,
            ..IndexOptions::default()
        },
        suffix: "Test".to_string(),
    };
    let harness = Harness::new(options, ScriptLoader::new(console.clone()), console)
        .unwrap()
        .with_reporter(ConsoleReporter::with_writer(report.clone(), false));
    (harness, out, err, report)
}

fn tally(total: usize, failures: usize, errors: usize) -> RunTally {
    RunTally::new(total, failures, errors).unwrap()
}

const MATH_TEST: &str = r#"
fn square(x) { return x * x; }

class MathTest {
    fn test_square() { assert_eq(square(3), 9); }
    fn test_wrong() { assert_eq(square(2), 5); }
    fn test_zero() { assert_eq(square(0), 0); }
}

class MathHelper {
    fn test_never_runs() { fail("helper classes are not test cases"); }
}
"#;

#[test]
fn test_two_group_scenario() {
    let dir = tree(&[
        ("A/a1Test.muf", MATH_TEST),
        ("A/helper.muf", "fn helper() { return 1; }\n"),
    ]);
    fs::create_dir(dir.path().join("B")).unwrap();

    let (mut harness, _out, _err, report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();

    assert_eq!(run.groups[0].tally, tally(3, 1, 0));
    assert_eq!(run.groups[1].tally, tally(0, 0, 0));
    assert_eq!(run.total, tally(3, 1, 0));
    assert!(report
        .contents()
        .trim_end()
        .ends_with("total: 2/3 test(s) have passed"));
}

#[test]
fn test_errors_count_separately_from_failures() {
    let dir = tree(&[(
        "g/mixedTest.muf",
        r#"
        class MixedTest {
            fn test_ok() {}
            fn test_fails() { assert(1 > 2, "math is broken"); }
            fn test_errors() { let n = undefined_thing; }
        }
        "#,
    )]);

    let (mut harness, _out, _err, _report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();
    assert_eq!(run.total, tally(3, 1, 1));
}

#[test]
fn test_skip_marker() {
    let dir = tree(&[
        ("g/slowTest.muf", "let IGNORE_ME = true;\nclass SlowTest { fn test_x() { fail(\"ran\"); } }\n"),
        ("g/quickTest.muf", "class QuickTest { fn test_x() {} }\n"),
    ]);

    let (mut harness, _out, _err, report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();
    assert_eq!(run.total, tally(1, 0, 0));
    assert!(report.contents().contains("[INFO] Ignoring"));
}

#[test]
fn test_broken_module_recorded_in_full_run() {
    let dir = tree(&[
        ("a/syntaxTest.muf", "class SyntaxTest { fn test_x( }\n"),
        ("a/raisesTest.muf", "raise(\"cannot import\");\n"),
        ("b/fineTest.muf", "class FineTest { fn test_x() {} }\n"),
    ]);

    let (mut harness, _out, _err, report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();

    assert_eq!(run.groups[0].tally, tally(2, 0, 2));
    assert_eq!(run.groups[0].load_errors.len(), 2);
    assert_eq!(run.groups[1].tally, tally(1, 0, 0));
    let lines = report.contents();
    assert!(lines.contains("syntax error in"));
    assert!(lines.contains("cannot import"));
}

#[test]
fn test_deeply_nested_module_is_a_load_error() {
    let depth = 3000;
    let nested = format!("let x = {}1{};\n", "(".repeat(depth), ")".repeat(depth));
    let dir = tree(&[
        ("a/deepTest.muf", nested.as_str()),
        ("b/fineTest.muf", "class FineTest { fn test_x() {} }\n"),
    ]);

    let (mut harness, _out, _err, report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();

    assert_eq!(run.groups[0].tally, tally(1, 0, 1));
    assert_eq!(run.groups[0].load_errors.len(), 1);
    assert_eq!(run.groups[1].tally, tally(1, 0, 0));
    assert_eq!(run.total, tally(2, 0, 1));
    assert!(report.contents().contains("Nesting exceeds"));
}

#[test]
fn test_broken_module_propagates_for_named_group() {
    let dir = tree(&[("a/raisesTest.muf", "raise(\"cannot import\");\n")]);
    let (mut harness, _out, _err, _report) = harness(dir.path(), false);
    assert!(matches!(
        harness.test_certain_class("a"),
        Err(HarnessError::Load(_))
    ));
}

#[test]
fn test_quiet_mode_keeps_load_output_only() {
    let dir = tree(&[(
        "g/chattyTest.muf",
        "print(\"loading\");\nclass ChattyTest { fn test_x() { print(\"inside\"); eprint(\"oops\"); } }\n",
    )]);

    let (mut harness, out, err, _report) = harness(dir.path(), false);
    harness.run_all_tests().unwrap();
    assert_eq!(out.contents(), "loading\n");
    assert_eq!(err.contents(), "");
}

#[test]
fn test_verbose_mode_shows_everything() {
    let dir = tree(&[(
        "g/chattyTest.muf",
        "class ChattyTest { fn test_x() { print(\"inside\"); } }\n",
    )]);

    let (mut harness, out, err, _report) = harness(dir.path(), true);
    harness.run_all_tests().unwrap();
    assert_eq!(out.contents(), "inside\n");
    assert!(err.contents().contains("test_x (ChattyTest) ... ok"));
}

#[test]
fn test_module_state_does_not_leak_between_runs() {
    let dir = tree(&[(
        "g/counterTest.muf",
        r#"
        let runs = 0;
        class CounterTest {
            fn test_first_run() { runs = runs + 1; assert_eq(runs, 1); }
        }
        "#,
    )]);

    let (mut harness, _out, _err, _report) = harness(dir.path(), false);
    let first = harness.test_certain_class("g").unwrap();
    let second = harness.test_certain_class("g").unwrap();
    assert_eq!(first.tally, tally(1, 0, 0));
    assert_eq!(second.tally, tally(1, 0, 0));
}

#[test]
fn test_excluded_helpers_are_not_loaded() {
    let dir = tree(&[
        ("g/base.muf", "raise(\"should never load\");\n"),
        ("g/prelude.muf", "raise(\"should never load\");\n"),
        ("g/README.md", "# notes\n"),
        ("g/realTest.muf", "class RealTest { fn test_x() {} }\n"),
        ("g/results/oldTest.muf", "raise(\"should never load\");\n"),
    ]);

    let (mut harness, _out, _err, _report) = harness(dir.path(), false);
    let run = harness.run_all_tests().unwrap();
    assert_eq!(run.total, tally(1, 0, 0));
}
