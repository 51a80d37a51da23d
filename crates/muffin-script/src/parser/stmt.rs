//! Statement parsing

use crate::ast::*;
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Fn | TokenKind::Class => {
                self.error("Functions and classes can only be declared at the top level");
                Err(())
            }
            _ => self.parse_assign_or_expr(),
        }
    }

    pub(super) fn parse_block(&mut self) -> Result<Block, ()> {
        let span = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;
        self.nested(|parser| {
            let mut statements = Vec::new();

            while !parser.check(TokenKind::RightBrace) && !parser.is_at_end() {
                statements.push(parser.parse_statement()?);
            }

            parser.consume(TokenKind::RightBrace, "Expected '}' after block")?;
            Ok(Block { statements, span })
        })
    }

    fn parse_let(&mut self) -> Result<Stmt, ()> {
        let span = self.advance().span;
        let name = self.consume_identifier("a variable name")?.lexeme.clone();
        self.consume(TokenKind::Equal, "Expected '=' in variable declaration")?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Ok(Stmt::Let { name, value, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ()> {
        let span = self.advance().span;
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_block = if self.match_token(TokenKind::Else) {
            if self.check(TokenKind::If) {
                let nested_span = self.peek().span;
                let nested = self.nested(Self::parse_if)?;
                Some(Block {
                    statements: vec![nested],
                    span: nested_span,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            span,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ()> {
        let span = self.advance().span;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            span,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ()> {
        let span = self.advance().span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after return")?;
        Ok(Stmt::Return { value, span })
    }

    fn parse_assign_or_expr(&mut self) -> Result<Stmt, ()> {
        let expr = self.parse_expression()?;

        if self.check(TokenKind::Equal) {
            let span = self.advance().span;
            let target = match expr {
                Expr::Identifier(name, _) => AssignTarget::Name(name),
                Expr::Member { object, name, .. } => AssignTarget::Member {
                    object: *object,
                    name,
                },
                Expr::Index { target, index, .. } => AssignTarget::Index {
                    target: *target,
                    index: *index,
                },
                _ => {
                    self.error("Invalid assignment target");
                    return Err(());
                }
            };
            let value = self.parse_expression()?;
            self.consume(TokenKind::Semicolon, "Expected ';' after assignment")?;
            return Ok(Stmt::Assign {
                target,
                value,
                span,
            });
        }

        self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Stmt::Expr(expr))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::diagnostic::Diagnostic;

    fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
        let (tokens, _) = Lexer::new(source).tokenize();
        Parser::new(tokens).parse()
    }

    fn single_statement(source: &str) -> Stmt {
        let (program, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        match program.items.into_iter().next() {
            Some(Item::Statement(stmt)) => stmt,
            other => panic!("expected statement, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_targets() {
        assert!(matches!(
            single_statement("x = 1;"),
            Stmt::Assign { target: AssignTarget::Name(ref n), .. } if n == "x"
        ));
        assert!(matches!(
            single_statement("self.count = 1;"),
            Stmt::Assign { target: AssignTarget::Member { ref name, .. }, .. } if name == "count"
        ));
        assert!(matches!(
            single_statement("items[0] = 1;"),
            Stmt::Assign { target: AssignTarget::Index { .. }, .. }
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (_, diagnostics) = parse_source("f() = 1;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("Invalid assignment target"));
    }

    #[test]
    fn test_else_if_chain() {
        match single_statement("if a { } else if b { } else { x = 1; }") {
            Stmt::If {
                else_block: Some(block),
                ..
            } => match &block.statements[0] {
                Stmt::If { else_block, .. } => {
                    assert_eq!(else_block.as_ref().map(|b| b.statements.len()), Some(1))
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let (program, diagnostics) = parse_source("fn f() { return; }");
        assert!(diagnostics.is_empty());
        match &program.items[0] {
            Item::Function(func) => assert!(matches!(
                func.body.statements[0],
                Stmt::Return { value: None, .. }
            )),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_declarations_are_rejected() {
        let (_, diagnostics) = parse_source("fn outer() { fn inner() {} }");
        assert!(diagnostics[0].message.contains("top level"));
    }

    #[test]
    fn test_missing_semicolon() {
        let (_, diagnostics) = parse_source("let x = 1\nlet y = 2;");
        assert_eq!(diagnostics[0].message, "Expected ';' after variable declaration, found 'let'");
    }
}
