//! Runtime values and runtime errors

use crate::ast::{ClassDecl, FunctionDecl};
use crate::span::Span;
use crate::stdlib::Builtin;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// A script value
///
/// Arrays have value semantics: assignment copies, mutation goes through
/// [`Rc::make_mut`]. Instances are shared references.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Function(Rc<FunctionDecl>),
    Class(Rc<ClassDecl>),
    Instance(Rc<Instance>),
    BoundMethod(BoundMethod),
    Builtin(Builtin),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::BoundMethod(_) => "method",
            Value::Builtin(_) => "builtin",
        }
    }

    /// `false` and `null` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Rendering used inside arrays and assertion messages (strings quoted)
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => {
                Rc::ptr_eq(&a.receiver, &b.receiver) && Rc::ptr_eq(&a.method, &b.method)
            }
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::repr).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<{} instance>", instance.class.name),
            Value::BoundMethod(bound) => {
                write!(f, "<method {}.{}>", bound.receiver.class.name, bound.method.name)
            }
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
        }
    }
}

/// An object created by calling a class
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<ClassDecl>,
    fields: RefCell<IndexMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<ClassDecl>, fields: IndexMap<String, Value>) -> Self {
        Self {
            class,
            fields: RefCell::new(fields),
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Set a field, adding it if the class did not declare it
    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

/// A method looked up on an instance, ready to call
#[derive(Debug, Clone)]
pub struct BoundMethod {
    pub receiver: Rc<Instance>,
    pub method: Rc<FunctionDecl>,
}

/// Runtime error type with source span information
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// A test assertion did not hold
    #[error("Assertion failed: {msg}")]
    AssertionFailed { msg: String, span: Span },

    /// Raised explicitly by script code
    #[error("{msg}")]
    Raised { msg: String, span: Span },

    #[error("Type error: {msg}")]
    TypeError { msg: String, span: Span },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("Division by zero")]
    DivideByZero { span: Span },

    #[error("Index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize, span: Span },

    #[error("Invalid index: expected a non-negative integer")]
    InvalidIndex { span: Span },

    #[error("{name} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
        span: Span,
    },

    #[error("{class} has no field or method '{name}'")]
    UnknownField {
        class: String,
        name: String,
        span: Span,
    },

    #[error("Value of type {type_name} is not callable")]
    NotCallable { type_name: String, span: Span },

    #[error("Loop exceeded {limit} iterations")]
    LoopLimit { limit: u64, span: Span },

    #[error("Call depth exceeded {limit}")]
    StackOverflow { limit: usize, span: Span },

    #[error("'self' used outside of a method")]
    SelfOutsideMethod { span: Span },

    #[error("'return' used outside of a function")]
    ReturnOutsideFunction { span: Span },
}

impl RuntimeError {
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::AssertionFailed { span, .. }
            | RuntimeError::Raised { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::DivideByZero { span }
            | RuntimeError::OutOfBounds { span, .. }
            | RuntimeError::InvalidIndex { span }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::UnknownField { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::LoopLimit { span, .. }
            | RuntimeError::StackOverflow { span, .. }
            | RuntimeError::SelfOutsideMethod { span }
            | RuntimeError::ReturnOutsideFunction { span } => *span,
        }
    }

    /// Whether this is a test assertion failure rather than an error
    pub fn is_assertion(&self) -> bool {
        matches!(self, RuntimeError::AssertionFailed { .. })
    }

    pub(crate) fn type_error(msg: impl Into<String>, span: Span) -> Self {
        RuntimeError::TypeError {
            msg: msg.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Number(3.0), "3")]
    #[case(Value::Number(-0.5), "-0.5")]
    #[case(Value::Null, "null")]
    #[case(Value::string("hi"), "hi")]
    #[case(Value::array(vec![Value::Number(1.0), Value::string("a")]), "[1, \"a\"]")]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_arrays_compare_by_contents() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::array(vec![]));
        assert_ne!(Value::Number(1.0), Value::string("1"));
    }

    #[test]
    fn test_only_assertions_are_failures() {
        let span = Span::new(1, 1);
        assert!(RuntimeError::AssertionFailed {
            msg: "x".into(),
            span
        }
        .is_assertion());
        assert!(!RuntimeError::Raised {
            msg: "x".into(),
            span
        }
        .is_assertion());
    }
}
