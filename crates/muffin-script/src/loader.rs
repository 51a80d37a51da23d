//! Loading `.muf` files as test modules

use crate::ast::ClassDecl;
use crate::interpreter::Interpreter;
use crate::value::{RuntimeError, Value};
use muffin_core::{Console, LoadError, MethodOutcome, ModuleLoader, TestCase, TestModule, SKIP_MARKER};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Prefix that marks a method as a test method
pub const TEST_METHOD_PREFIX: &str = "test";

/// Loads muffin script files, running their top-level code on every load
#[derive(Debug, Clone)]
pub struct ScriptLoader {
    console: Console,
}

impl ScriptLoader {
    /// Loader whose modules print through `console`
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    /// Load a module from source text; `path` is only used for reporting
    pub fn load_source(&self, path: &Path, source: &str) -> Result<ScriptModule, LoadError> {
        let program = crate::parse(source).map_err(|diagnostics| {
            let message = diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            LoadError::Syntax {
                path: path.to_path_buf(),
                message,
            }
        })?;

        let mut interpreter = Interpreter::new(self.console.clone());
        interpreter
            .run(&program)
            .map_err(|err| LoadError::Execution {
                path: path.to_path_buf(),
                message: describe(&err),
            })?;

        tracing::debug!(module = %path.display(), symbols = interpreter.global_names().len(), "module loaded");
        Ok(ScriptModule {
            path: path.to_path_buf(),
            interpreter: Rc::new(RefCell::new(interpreter)),
        })
    }
}

impl ModuleLoader for ScriptLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn TestModule>, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(Box::new(self.load_source(path, &source)?))
    }
}

/// An executed script and its top-level bindings
pub struct ScriptModule {
    path: PathBuf,
    interpreter: Rc<RefCell<Interpreter>>,
}

impl ScriptModule {
    /// A top-level binding's value
    pub fn global(&self, name: &str) -> Option<Value> {
        self.interpreter.borrow().global(name).cloned()
    }
}

impl TestModule for ScriptModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn has_skip_marker(&self) -> bool {
        self.interpreter.borrow().global(SKIP_MARKER).is_some()
    }

    fn symbol_names(&self) -> Vec<String> {
        self.interpreter.borrow().global_names()
    }

    fn test_case(&self, name: &str) -> Option<Rc<dyn TestCase>> {
        match self.global(name)? {
            Value::Class(class) => Some(Rc::new(ScriptTestCase {
                class,
                interpreter: Rc::clone(&self.interpreter),
            })),
            _ => None,
        }
    }
}

/// A script class run as a test case
pub struct ScriptTestCase {
    class: Rc<ClassDecl>,
    interpreter: Rc<RefCell<Interpreter>>,
}

impl ScriptTestCase {
    fn run_method(&self, method: &str) -> Result<(), RuntimeError> {
        let mut interpreter = self.interpreter.borrow_mut();
        let instance = interpreter.instantiate(&self.class, Vec::new(), self.class.span)?;

        if self.class.method("setup").is_some() {
            interpreter.call_method(&instance, "setup", Vec::new())?;
        }

        let result = interpreter.call_method(&instance, method, Vec::new());

        if self.class.method("teardown").is_some() {
            let teardown = interpreter.call_method(&instance, "teardown", Vec::new());
            result?;
            teardown?;
            return Ok(());
        }
        result.map(|_| ())
    }
}

impl TestCase for ScriptTestCase {
    fn name(&self) -> &str {
        &self.class.name
    }

    fn test_method_names(&self) -> Vec<String> {
        self.class
            .methods
            .iter()
            .filter(|m| m.name.starts_with(TEST_METHOD_PREFIX))
            .map(|m| m.name.clone())
            .collect()
    }

    fn run_test(&self, method: &str) -> MethodOutcome {
        match self.run_method(method) {
            Ok(()) => MethodOutcome::Passed,
            Err(err) if err.is_assertion() => MethodOutcome::Failed(describe(&err)),
            Err(err) => MethodOutcome::Errored(describe(&err)),
        }
    }
}

fn describe(err: &RuntimeError) -> String {
    format!("line {}: {}", err.span(), err)
}
