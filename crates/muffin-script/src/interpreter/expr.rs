//! Expression evaluation

use crate::ast::*;
use crate::interpreter::Interpreter;
use crate::span::Span;
use crate::value::{BoundMethod, RuntimeError, Value};
use std::rc::Rc;

impl Interpreter {
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal, _) => Ok(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::string(s),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),
            Expr::Array(elements, _) => {
                let items = elements
                    .iter()
                    .map(|e| self.eval_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(items))
            }
            Expr::Identifier(name, span) => self.get_variable(name, *span),
            Expr::SelfRef(span) => self
                .receiver
                .clone()
                .map(Value::Instance)
                .ok_or(RuntimeError::SelfOutsideMethod { span: *span }),
            Expr::Unary { op, operand, span } => {
                let value = self.eval_expr(operand)?;
                match (op, value) {
                    (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Negate, other) => Err(RuntimeError::type_error(
                        format!("Cannot negate a value of type {}", other.type_name()),
                        *span,
                    )),
                    (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => self.eval_binary(*op, left, right, *span),
            Expr::Call { callee, args, span } => {
                let callee = self.eval_expr(callee)?;
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_value(callee, args, *span)
            }
            Expr::Member { object, name, span } => {
                let object = self.eval_expr(object)?;
                self.get_member(object, name, *span)
            }
            Expr::Index {
                target,
                index,
                span,
            } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                self.get_element(target, index, *span)
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        // Short-circuit
        match op {
            BinaryOp::And => {
                let left = self.eval_expr(left)?.is_truthy();
                return Ok(Value::Bool(left && self.eval_expr(right)?.is_truthy()));
            }
            BinaryOp::Or => {
                let left = self.eval_expr(left)?.is_truthy();
                return Ok(Value::Bool(left || self.eval_expr(right)?.is_truthy()));
            }
            _ => {}
        }

        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;

        match (op, &left, &right) {
            (BinaryOp::Eq, _, _) => Ok(Value::Bool(left == right)),
            (BinaryOp::Ne, _, _) => Ok(Value::Bool(left != right)),
            (BinaryOp::Add, Value::String(a), Value::String(b)) => {
                Ok(Value::string(format!("{}{}", a, b)))
            }
            (BinaryOp::Add, Value::Array(a), Value::Array(b)) => {
                Ok(Value::array(a.iter().chain(b.iter()).cloned().collect()))
            }
            (_, Value::Number(a), Value::Number(b)) => arithmetic(op, *a, *b, span),
            (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge, Value::String(a), Value::String(b)) => {
                Ok(Value::Bool(compare(op, (**a).cmp(&**b))))
            }
            _ => Err(RuntimeError::type_error(
                format!(
                    "Unsupported operand types for {}: {} and {}",
                    op_symbol(op),
                    left.type_name(),
                    right.type_name()
                ),
                span,
            )),
        }
    }

    pub(super) fn get_member(&mut self, object: Value, name: &str, span: Span) -> Result<Value, RuntimeError> {
        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.field(name) {
                    return Ok(value);
                }
                match instance.class.method(name) {
                    Some(method) => Ok(Value::BoundMethod(BoundMethod {
                        method: Rc::clone(method),
                        receiver: Rc::clone(&instance),
                    })),
                    None => Err(RuntimeError::UnknownField {
                        class: instance.class.name.clone(),
                        name: name.to_string(),
                        span,
                    }),
                }
            }
            other => Err(RuntimeError::type_error(
                format!("Cannot read field '{}' of a value of type {}", name, other.type_name()),
                span,
            )),
        }
    }

    fn get_element(&self, target: Value, index: Value, span: Span) -> Result<Value, RuntimeError> {
        match target {
            Value::Array(items) => {
                let slot = self.check_index(&index, items.len(), span)?;
                Ok(items[slot].clone())
            }
            Value::String(s) => {
                let len = s.chars().count();
                let slot = self.check_index(&index, len, span)?;
                Ok(s.chars()
                    .nth(slot)
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            other => Err(RuntimeError::type_error(
                format!("Cannot index a value of type {}", other.type_name()),
                span,
            )),
        }
    }

    /// Validate `index` against a container of `len` elements
    pub(super) fn check_index(&self, index: &Value, len: usize, span: Span) -> Result<usize, RuntimeError> {
        let n = match index {
            Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => *n as usize,
            _ => return Err(RuntimeError::InvalidIndex { span }),
        };
        if n >= len {
            return Err(RuntimeError::OutOfBounds { index: n, len, span });
        }
        Ok(n)
    }
}

fn arithmetic(op: BinaryOp, a: f64, b: f64, span: Span) -> Result<Value, RuntimeError> {
    let value = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => {
            return Err(RuntimeError::DivideByZero { span });
        }
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Mod => Value::Number(a % b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::And | BinaryOp::Or => Value::Bool(a != 0.0 && b != 0.0),
    };
    Ok(value)
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::Le => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        _ => ordering != Less,
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::tests::run_source;
    use crate::value::{RuntimeError, Value};
    use rstest::rstest;

    fn eval(expr: &str) -> Result<Value, RuntimeError> {
        let (result, _) = run_source(&format!("let result = {};", expr));
        result.map(|interpreter| interpreter.global("result").cloned().unwrap_or(Value::Null))
    }

    #[rstest]
    #[case("1 + 2 * 3", Value::Number(7.0))]
    #[case("(1 + 2) * 3", Value::Number(9.0))]
    #[case("7 % 4", Value::Number(3.0))]
    #[case("-2 - -3", Value::Number(1.0))]
    #[case("\"ab\" + \"cd\"", Value::string("abcd"))]
    #[case("[1] + [2]", Value::array(vec![Value::Number(1.0), Value::Number(2.0)]))]
    #[case("1 < 2 && 2 <= 2", Value::Bool(true))]
    #[case("\"apple\" < \"banana\"", Value::Bool(true))]
    #[case("null == null", Value::Bool(true))]
    #[case("1 == \"1\"", Value::Bool(false))]
    #[case("!null", Value::Bool(true))]
    #[case("[1, 2] == [1, 2]", Value::Bool(true))]
    #[case("\"hey\"[1]", Value::string("e"))]
    fn test_expressions(#[case] expr: &str, #[case] expected: Value) {
        assert_eq!(eval(expr).unwrap(), expected);
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        assert_eq!(eval("false && undefined_name").unwrap(), Value::Bool(false));
        assert_eq!(eval("true || undefined_name").unwrap(), Value::Bool(true));
    }

    #[rstest]
    #[case("1 / 0")]
    #[case("5 % 0")]
    fn test_division_by_zero(#[case] expr: &str) {
        assert!(matches!(eval(expr), Err(RuntimeError::DivideByZero { .. })));
    }

    #[test]
    fn test_type_errors() {
        let err = eval("1 + \"a\"").unwrap_err();
        assert_eq!(err.to_string(), "Type error: Unsupported operand types for +: number and string");
        assert!(matches!(eval("-\"a\""), Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_index_errors() {
        let err = eval("[1, 2][2]").unwrap_err();
        assert_eq!(err.to_string(), "Index 2 out of bounds for length 2");
        assert!(matches!(eval("[1][0.5]"), Err(RuntimeError::InvalidIndex { .. })));
        assert!(matches!(eval("[1][-1]"), Err(RuntimeError::InvalidIndex { .. })));
    }

    #[test]
    fn test_undefined_variable() {
        assert!(matches!(
            eval("missing"),
            Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "missing"
        ));
    }

    #[test]
    fn test_self_outside_method() {
        assert!(matches!(eval("self"), Err(RuntimeError::SelfOutsideMethod { .. })));
    }

    #[test]
    fn test_not_callable() {
        let err = eval("3()").unwrap_err();
        assert_eq!(err.to_string(), "Value of type number is not callable");
    }

    #[test]
    fn test_unknown_field() {
        let (result, _) = run_source("class A { let x = 1; }\nlet y = A().z;");
        match result {
            Err(err) => assert_eq!(err.to_string(), "A has no field or method 'z'"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_builtins() {
        assert_eq!(eval("len(\"héllo\")").unwrap(), Value::Number(5.0));
        assert_eq!(eval("len(push([1], 2))").unwrap(), Value::Number(2.0));
        assert_eq!(eval("str(1.5) + str(2)").unwrap(), Value::string("1.52"));
        assert!(matches!(eval("len(3)"), Err(RuntimeError::TypeError { .. })));
        assert!(matches!(eval("len()"), Err(RuntimeError::ArityMismatch { .. })));
    }

    #[test]
    fn test_assertion_builtins() {
        assert_eq!(eval("assert(true)").unwrap(), Value::Null);
        let err = eval("assert_eq(1, 2)").unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Assertion failed: 1 != 2");
        let err = eval("assert_ne(\"a\", \"a\")").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: \"a\" == \"a\"");
        let err = eval("assert(false, \"custom\")").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: custom");
        assert!(eval("fail(\"stop\")").unwrap_err().is_assertion());
    }

    #[test]
    fn test_raise_is_not_an_assertion() {
        let err = eval("raise(\"boom\")").unwrap_err();
        assert!(!err.is_assertion());
        assert_eq!(err.to_string(), "boom");
    }
}
