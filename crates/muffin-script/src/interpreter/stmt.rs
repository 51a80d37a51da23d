//! Statement execution

use crate::ast::*;
use crate::interpreter::{ControlFlow, Interpreter, MAX_LOOP_ITERATIONS};
use crate::value::{RuntimeError, Value};
use std::collections::HashMap;

impl Interpreter {
    pub(super) fn eval_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expr(value)?;
                self.define_variable(name, value);
                Ok(())
            }
            Stmt::Assign { target, value, span } => {
                let value = self.eval_expr(value)?;
                self.assign(target, value, *span)
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_block(then_block)
                } else if let Some(block) = else_block {
                    self.eval_block(block)
                } else {
                    Ok(())
                }
            }
            Stmt::While {
                condition,
                body,
                span,
            } => {
                let mut iterations: u64 = 0;
                while self.eval_expr(condition)?.is_truthy() {
                    iterations += 1;
                    if iterations > MAX_LOOP_ITERATIONS {
                        return Err(RuntimeError::LoopLimit {
                            limit: MAX_LOOP_ITERATIONS,
                            span: *span,
                        });
                    }
                    self.eval_block(body)?;
                    if self.control_flow != ControlFlow::None {
                        break;
                    }
                }
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                self.control_flow = ControlFlow::Return(value);
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }
        }
    }

    /// Run a block in its own scope, stopping at `return`
    pub(super) fn eval_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        self.locals.push(HashMap::new());
        let mut result = Ok(());
        for stmt in &block.statements {
            result = self.eval_statement(stmt);
            if result.is_err() || self.control_flow != ControlFlow::None {
                break;
            }
        }
        self.locals.pop();
        result
    }

    fn assign(&mut self, target: &AssignTarget, value: Value, span: crate::span::Span) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Name(name) => self.set_variable(name, value, span),
            AssignTarget::Member { object, name } => {
                let object = self.eval_expr(object)?;
                self.set_member(object, name, value, span)
            }
            AssignTarget::Index { target, index } => {
                let index = self.eval_expr(index)?;
                self.assign_element(target, index, value, span)
            }
        }
    }

    /// `container[index] = value`, writing the updated array back to `container`
    fn assign_element(
        &mut self,
        container: &Expr,
        index: Value,
        value: Value,
        span: crate::span::Span,
    ) -> Result<(), RuntimeError> {
        let mut items = match self.eval_expr(container)? {
            Value::Array(items) => items,
            other => {
                return Err(RuntimeError::type_error(
                    format!("Cannot assign into a value of type {}", other.type_name()),
                    span,
                ))
            }
        };
        let slot = self.check_index(&index, items.len(), span)?;
        std::rc::Rc::make_mut(&mut items)[slot] = value;
        let updated = Value::Array(items);

        match container {
            Expr::Identifier(name, _) => self.set_variable(name, updated, span),
            Expr::Member { object, name, .. } => {
                let object = self.eval_expr(object)?;
                self.set_member(object, name, updated, span)
            }
            Expr::Index { target, index, .. } => {
                let outer = self.eval_expr(index)?;
                self.assign_element(target, outer, updated, span)
            }
            _ => Err(RuntimeError::type_error("Invalid assignment target", span)),
        }
    }

    fn set_member(&mut self, object: Value, name: &str, value: Value, span: crate::span::Span) -> Result<(), RuntimeError> {
        match object {
            Value::Instance(instance) => {
                instance.set_field(name, value);
                Ok(())
            }
            other => Err(RuntimeError::type_error(
                format!("Cannot set field '{}' on a value of type {}", name, other.type_name()),
                span,
            )),
        }
    }
}
