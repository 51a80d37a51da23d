//! muffin script - the language test modules are written in
//!
//! A small dynamically typed language with functions, classes and arrays.
//! [`ScriptLoader`] plugs it into the harness: loading a `.muf` file lexes,
//! parses and runs its top-level code, and every class it defines can be
//! run as a test case.
//!
//! ```text
//! class StackTest {
//!     let items = [];
//!     fn setup() { self.items = push(self.items, 1); }
//!     fn test_push() { assert_eq(len(self.items), 1); }
//! }
//! ```

pub mod ast;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod span;
pub mod stdlib;
pub mod token;
pub mod value;

pub use diagnostic::Diagnostic;
pub use interpreter::{Interpreter, MAX_CALL_DEPTH, MAX_LOOP_ITERATIONS};
pub use loader::{ScriptLoader, ScriptModule, ScriptTestCase, TEST_METHOD_PREFIX};
pub use parser::MAX_NESTING_DEPTH;
pub use span::Span;
pub use value::{RuntimeError, Value};

/// Lex and parse `source`, returning every diagnostic on failure
pub fn parse(source: &str) -> Result<ast::Program, Vec<Diagnostic>> {
    let (tokens, mut diagnostics) = lexer::Lexer::new(source).tokenize();
    let (program, parse_diagnostics) = parser::Parser::new(tokens).parse();
    diagnostics.extend(parse_diagnostics);

    if diagnostics.is_empty() {
        Ok(program)
    } else {
        Err(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_lexer_and_parser_errors() {
        let diagnostics = parse("let a = #;\nlet = 2;").unwrap_err();
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics[0].message.contains("unexpected character"));
    }

    #[test]
    fn test_parse_ok() {
        let program = parse("fn f() { return 1; }").unwrap();
        assert_eq!(program.items.len(), 1);
    }
}
