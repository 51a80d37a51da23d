//! Built-in functions

use crate::span::Span;
use crate::value::{RuntimeError, Value};
use muffin_core::Console;
use std::rc::Rc;

/// Functions available in every module without being defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Eprint,
    Assert,
    AssertEq,
    AssertNe,
    Fail,
    Raise,
    Len,
    Str,
    Push,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Print,
        Builtin::Eprint,
        Builtin::Assert,
        Builtin::AssertEq,
        Builtin::AssertNe,
        Builtin::Fail,
        Builtin::Raise,
        Builtin::Len,
        Builtin::Str,
        Builtin::Push,
    ];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Eprint => "eprint",
            Builtin::Assert => "assert",
            Builtin::AssertEq => "assert_eq",
            Builtin::AssertNe => "assert_ne",
            Builtin::Fail => "fail",
            Builtin::Raise => "raise",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Push => "push",
        }
    }

    /// Accepted argument counts, `None` meaning any number
    fn arity(self) -> Option<(usize, usize)> {
        match self {
            Builtin::Print | Builtin::Eprint => None,
            Builtin::Assert => Some((1, 2)),
            Builtin::AssertEq | Builtin::AssertNe | Builtin::Push => Some((2, 2)),
            Builtin::Fail | Builtin::Raise | Builtin::Len | Builtin::Str => Some((1, 1)),
        }
    }

    pub fn call(self, console: &Console, args: Vec<Value>, span: Span) -> Result<Value, RuntimeError> {
        if let Some((min, max)) = self.arity() {
            if args.len() < min || args.len() > max {
                let expected = if min == max {
                    min.to_string()
                } else {
                    format!("{} to {}", min, max)
                };
                return Err(RuntimeError::ArityMismatch {
                    name: self.name().to_string(),
                    expected,
                    found: args.len(),
                    span,
                });
            }
        }

        if matches!(self, Builtin::Print | Builtin::Eprint) {
            let parts: Vec<String> = args.iter().map(Value::to_string).collect();
            let line = format!("{}\n", parts.join(" "));
            // A closed stream must not turn into a test error.
            let _ = if self == Builtin::Print {
                console.write_out(&line)
            } else {
                console.write_err(&line)
            };
            return Ok(Value::Null);
        }

        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or(Value::Null);

        match self {
            Builtin::Print | Builtin::Eprint => Ok(Value::Null),
            Builtin::Assert => {
                let condition = next();
                if condition.is_truthy() {
                    return Ok(Value::Null);
                }
                let msg = match next() {
                    Value::Null => format!("{} is not truthy", condition.repr()),
                    message => message.to_string(),
                };
                Err(RuntimeError::AssertionFailed { msg, span })
            }
            Builtin::AssertEq | Builtin::AssertNe => {
                let (left, right) = (next(), next());
                let equal = left == right;
                if equal == (self == Builtin::AssertEq) {
                    return Ok(Value::Null);
                }
                let op = if equal { "==" } else { "!=" };
                Err(RuntimeError::AssertionFailed {
                    msg: format!("{} {} {}", left.repr(), op, right.repr()),
                    span,
                })
            }
            Builtin::Fail => Err(RuntimeError::AssertionFailed {
                msg: next().to_string(),
                span,
            }),
            Builtin::Raise => Err(RuntimeError::Raised {
                msg: next().to_string(),
                span,
            }),
            Builtin::Len => match next() {
                Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                Value::Array(items) => Ok(Value::Number(items.len() as f64)),
                other => Err(RuntimeError::type_error(
                    format!("len() expects a string or array, got {}", other.type_name()),
                    span,
                )),
            },
            Builtin::Str => Ok(Value::string(next().to_string())),
            Builtin::Push => match next() {
                Value::Array(mut items) => {
                    Rc::make_mut(&mut items).push(next());
                    Ok(Value::Array(items))
                }
                other => Err(RuntimeError::type_error(
                    format!("push() expects an array, got {}", other.type_name()),
                    span,
                )),
            },
        }
    }
}
