//! Parsing (tokens to AST)
//!
//! Recursive descent for items and statements, Pratt parsing for expressions.
//! Errors are collected as diagnostics and parsing resumes at the next
//! statement boundary.

mod expr;
mod stmt;

use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Nested expressions and blocks allowed before parsing gives up
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser state for building an AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Vec<Diagnostic>,
    nesting: usize,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    Lowest,
    Or,         // ||
    And,        // &&
    Equality,   // == !=
    Comparison, // < <= > >=
    Term,       // + -
    Factor,     // * / %
    Unary,      // ! -
    Call,       // () [] .
}

impl Parser {
    /// `tokens` must end with [`TokenKind::Eof`], as produced by the lexer
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            nesting: 0,
        }
    }

    /// Parse tokens into a program
    pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
        let mut items = Vec::new();

        while !self.is_at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(_) => self.synchronize(),
            }
        }

        (Program { items }, self.diagnostics)
    }

    // === Top-level parsing ===

    fn parse_item(&mut self) -> Result<Item, ()> {
        if self.check(TokenKind::Fn) {
            Ok(Item::Function(Rc::new(self.parse_function()?)))
        } else if self.check(TokenKind::Class) {
            Ok(Item::Class(Rc::new(self.parse_class()?)))
        } else {
            Ok(Item::Statement(self.parse_statement()?))
        }
    }

    /// Parse `fn name(a, b) { ... }`
    fn parse_function(&mut self) -> Result<FunctionDecl, ()> {
        let span = self.consume(TokenKind::Fn, "Expected 'fn'")?.span;
        let name = self.consume_identifier("a function name")?.lexeme.clone();

        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let param = self.consume_identifier("a parameter name")?.lexeme.clone();
                if params.contains(&param) {
                    self.error(&format!("Duplicate parameter '{}'", param));
                    return Err(());
                }
                params.push(param);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    /// Parse `class Name { let field = expr; fn method() {} }`
    fn parse_class(&mut self) -> Result<ClassDecl, ()> {
        let span = self.consume(TokenKind::Class, "Expected 'class'")?.span;
        let name = self.consume_identifier("a class name")?.lexeme.clone();
        self.consume(TokenKind::LeftBrace, "Expected '{' after class name")?;

        let mut fields = Vec::new();
        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.check(TokenKind::Let) {
                let field_span = self.advance().span;
                let field = self.consume_identifier("a field name")?.lexeme.clone();
                self.consume(TokenKind::Equal, "Expected '=' after field name")?;
                let init = self.parse_expression()?;
                self.consume(TokenKind::Semicolon, "Expected ';' after field")?;
                fields.push(FieldDecl {
                    name: field,
                    init,
                    span: field_span,
                });
            } else if self.check(TokenKind::Fn) {
                let method = self.parse_function()?;
                if methods.iter().any(|m| m.name == method.name) {
                    self.error(&format!("Duplicate method '{}' in class {}", method.name, name));
                    return Err(());
                }
                methods.push(Rc::new(method));
            } else {
                self.error("Expected 'let' or 'fn' in class body");
                return Err(());
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after class body")?;

        Ok(ClassDecl {
            name,
            fields,
            methods,
            span,
        })
    }

    // === Token helpers ===

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    pub(super) fn consume_identifier(&mut self, what: &str) -> Result<&Token, ()> {
        self.consume(TokenKind::Identifier, &format!("Expected {}", what))
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(super) fn error(&mut self, message: &str) {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        let span = token.span;
        self.diagnostics
            .push(Diagnostic::error(format!("{}, found {}", message, found), span));
    }

    /// Run `parse` one nesting level deeper
    pub(super) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ()>) -> Result<T, ()> {
        if self.nesting >= MAX_NESTING_DEPTH {
            self.error(&format!("Nesting exceeds {} levels", MAX_NESTING_DEPTH));
            return Err(());
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    /// Skip ahead to the next statement boundary after an error
    pub(super) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Fn
                | TokenKind::Class
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
