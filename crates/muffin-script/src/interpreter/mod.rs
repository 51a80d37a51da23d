//! AST interpreter (tree-walking)
//!
//! Runs a module's top-level items, then serves calls into the classes and
//! functions it defined. Locals live in a stack of block scopes that is
//! swapped out on every function call; globals keep definition order.

mod expr;
mod stmt;

use crate::ast::{ClassDecl, FunctionDecl, Item, Program};
use crate::span::Span;
use crate::stdlib::Builtin;
use crate::value::{Instance, RuntimeError, Value};
use indexmap::IndexMap;
use muffin_core::Console;
use std::collections::HashMap;
use std::rc::Rc;

/// Iterations a single `while` loop may run before it is aborted
pub const MAX_LOOP_ITERATIONS: u64 = 1_000_000;

/// Nested calls allowed before the call is aborted
pub const MAX_CALL_DEPTH: usize = 128;

/// Control flow signal for `return`
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ControlFlow {
    None,
    Return(Value),
}

/// Interpreter state for one loaded module
pub struct Interpreter {
    /// Top-level bindings, in definition order
    pub(super) globals: IndexMap<String, Value>,
    /// Block scopes of the running function; empty at top level
    pub(super) locals: Vec<HashMap<String, Value>>,
    /// Instance `self` refers to in the running method
    pub(super) receiver: Option<Rc<Instance>>,
    pub(super) control_flow: ControlFlow,
    pub(super) depth: usize,
    pub(super) console: Console,
}

impl Interpreter {
    /// Interpreter whose `print`/`eprint` write to `console`
    pub fn new(console: Console) -> Self {
        Self {
            globals: IndexMap::new(),
            locals: Vec::new(),
            receiver: None,
            control_flow: ControlFlow::None,
            depth: 0,
            console,
        }
    }

    /// Run a module's top-level items in order
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for item in &program.items {
            match item {
                Item::Function(func) => {
                    self.globals
                        .insert(func.name.clone(), Value::Function(Rc::clone(func)));
                }
                Item::Class(class) => {
                    self.globals
                        .insert(class.name.clone(), Value::Class(Rc::clone(class)));
                }
                Item::Statement(stmt) => {
                    self.eval_statement(stmt)?;
                    if self.control_flow != ControlFlow::None {
                        self.control_flow = ControlFlow::None;
                        return Err(RuntimeError::ReturnOutsideFunction { span: stmt_span(stmt) });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Every top-level name, in definition order
    pub fn global_names(&self) -> Vec<String> {
        self.globals.keys().cloned().collect()
    }

    /// Create an instance of `class`, running `init` if the class has one
    pub fn instantiate(
        &mut self,
        class: &Rc<ClassDecl>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Rc<Instance>, RuntimeError> {
        let saved_locals = std::mem::replace(&mut self.locals, vec![HashMap::new()]);
        let saved_receiver = self.receiver.take();
        let fields = self.eval_fields(class);
        self.locals = saved_locals;
        self.receiver = saved_receiver;

        let instance = Rc::new(Instance::new(Rc::clone(class), fields?));
        match class.method("init") {
            Some(init) => {
                let init = Rc::clone(init);
                self.call_function(&init, Some(Rc::clone(&instance)), args, span)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::ArityMismatch {
                    name: class.name.clone(),
                    expected: "0".to_string(),
                    found: args.len(),
                    span,
                });
            }
            None => {}
        }
        Ok(instance)
    }

    /// Call the method `name` on `instance`
    pub fn call_method(
        &mut self,
        instance: &Rc<Instance>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let span = instance.class.span;
        let method = instance
            .class
            .method(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownField {
                class: instance.class.name.clone(),
                name: name.to_string(),
                span,
            })?;
        self.call_function(&method, Some(Rc::clone(instance)), args, span)
    }

    fn eval_fields(&mut self, class: &ClassDecl) -> Result<IndexMap<String, Value>, RuntimeError> {
        let mut fields = IndexMap::new();
        for field in &class.fields {
            let value = self.eval_expr(&field.init)?;
            fields.insert(field.name.clone(), value);
        }
        Ok(fields)
    }

    /// Call any callable value
    pub(super) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(func) => self.call_function(&func, None, args, span),
            Value::BoundMethod(bound) => {
                self.call_function(&bound.method, Some(bound.receiver), args, span)
            }
            Value::Class(class) => Ok(Value::Instance(self.instantiate(&class, args, span)?)),
            Value::Builtin(builtin) => builtin.call(&self.console, args, span),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name().to_string(),
                span,
            }),
        }
    }

    /// Run a function body in a fresh frame
    pub(super) fn call_function(
        &mut self,
        func: &Rc<FunctionDecl>,
        receiver: Option<Rc<Instance>>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len().to_string(),
                found: args.len(),
                span,
            });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                limit: MAX_CALL_DEPTH,
                span,
            });
        }

        let frame: HashMap<String, Value> = func.params.iter().cloned().zip(args).collect();
        let saved_locals = std::mem::replace(&mut self.locals, vec![frame]);
        let saved_receiver = std::mem::replace(&mut self.receiver, receiver);
        self.depth += 1;

        let result = self.eval_block(&func.body);

        self.depth -= 1;
        self.locals = saved_locals;
        self.receiver = saved_receiver;
        let flow = std::mem::replace(&mut self.control_flow, ControlFlow::None);

        result?;
        match flow {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::None => Ok(Value::Null),
        }
    }

    pub(super) fn get_variable(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        for scope in self.locals.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value.clone());
            }
        }

        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }

        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(Value::Builtin(builtin));
        }

        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span,
        })
    }

    pub(super) fn set_variable(&mut self, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
        for scope in self.locals.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }

        if let Some(slot) = self.globals.get_mut(name) {
            *slot = value;
            return Ok(());
        }

        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span,
        })
    }

    /// Bind `name` in the innermost scope, or globally at top level
    pub(super) fn define_variable(&mut self, name: &str, value: Value) {
        match self.locals.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }
}

fn stmt_span(stmt: &crate::ast::Stmt) -> Span {
    use crate::ast::Stmt;
    match stmt {
        Stmt::Let { span, .. }
        | Stmt::Assign { span, .. }
        | Stmt::If { span, .. }
        | Stmt::While { span, .. }
        | Stmt::Return { span, .. } => *span,
        Stmt::Expr(expr) => expr.span(),
    }
}
