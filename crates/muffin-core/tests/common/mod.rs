//! Shared fixtures: a line-based stand-in for a real module loader
//!
//! Module file format, one directive per line:
//! - `class <Name> <outcome>...` defines a test-case class; outcomes are
//!   `pass`, `fail` or `error`, one per test method
//! - `value <Name>` defines a non-class symbol
//! - `print <text>` writes to the console when the module loads
//! - `skip` defines the skip marker
//! - `raise <text>` makes loading fail

#![allow(dead_code)]

use muffin_core::{Console, LoadError, MethodOutcome, ModuleLoader, TestCase, TestModule};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

pub struct StubCase {
    name: String,
    outcomes: Vec<String>,
    console: Console,
}

impl TestCase for StubCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn test_method_names(&self) -> Vec<String> {
        (0..self.outcomes.len())
            .map(|i| format!("test_{}", i))
            .collect()
    }

    fn run_test(&self, method: &str) -> MethodOutcome {
        let _ = self.console.write_out(&format!("{}.{} running\n", self.name, method));
        let index: usize = method["test_".len()..].parse().unwrap();
        match self.outcomes[index].as_str() {
            "pass" => MethodOutcome::Passed,
            "fail" => MethodOutcome::Failed(format!("{} failed", method)),
            _ => MethodOutcome::Errored(format!("{} errored", method)),
        }
    }
}

pub struct StubModule {
    path: PathBuf,
    skip: bool,
    symbols: Vec<(String, Option<Rc<StubCase>>)>,
}

impl TestModule for StubModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn has_skip_marker(&self) -> bool {
        self.skip
    }

    fn symbol_names(&self) -> Vec<String> {
        self.symbols.iter().map(|(name, _)| name.clone()).collect()
    }

    fn test_case(&self, name: &str) -> Option<Rc<dyn TestCase>> {
        self.symbols
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, case)| case.clone())
            .map(|case| case as Rc<dyn TestCase>)
    }
}

pub struct StubLoader {
    console: Console,
    loads: Rc<Cell<usize>>,
}

impl StubLoader {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of load calls
    pub fn load_counter(&self) -> Rc<Cell<usize>> {
        self.loads.clone()
    }
}

impl ModuleLoader for StubLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn TestModule>, LoadError> {
        self.loads.set(self.loads.get() + 1);
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut module = StubModule {
            path: path.to_path_buf(),
            skip: false,
            symbols: Vec::new(),
        };
        for line in source.lines() {
            let mut words = line.split_whitespace();
            match words.next() {
                Some("class") => {
                    let name = words.next().unwrap().to_string();
                    let case = StubCase {
                        name: name.clone(),
                        outcomes: words.map(str::to_string).collect(),
                        console: self.console.clone(),
                    };
                    module.symbols.push((name, Some(Rc::new(case))));
                }
                Some("value") => module.symbols.push((words.next().unwrap().to_string(), None)),
                Some("print") => {
                    let _ = self
                        .console
                        .write_out(&format!("{}\n", words.collect::<Vec<_>>().join(" ")));
                }
                Some("skip") => module.skip = true,
                Some("raise") => {
                    return Err(LoadError::Execution {
                        path: path.to_path_buf(),
                        message: words.collect::<Vec<_>>().join(" "),
                    })
                }
                _ => {}
            }
        }
        Ok(Box::new(module))
    }
}

/// Write `files` (relative path, contents) under a fresh temporary root
pub fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}
