//! Expression parsing (Pratt parsing)

use crate::ast::*;
use crate::parser::{Parser, Precedence};
use crate::token::TokenKind;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    /// Parse an expression binding tighter than `precedence`
    pub(super) fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        self.nested(|parser| {
            let mut left = parser.parse_prefix()?;

            while precedence < parser.current_precedence() {
                left = parser.parse_infix(left)?;
            }

            Ok(left)
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::String(token.lexeme.clone()), token.span))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Bool(token.kind == TokenKind::True), token.span))
            }
            TokenKind::Null => Ok(Expr::Literal(Literal::Null, self.advance().span)),
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Identifier(token.lexeme.clone(), token.span))
            }
            TokenKind::SelfKw => Ok(Expr::SelfRef(self.advance().span)),
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::Minus | TokenKind::Bang => self.parse_unary(),
            _ => {
                self.error("Expected expression");
                Err(())
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::LeftParen => self.parse_call(left),
            TokenKind::LeftBracket => self.parse_index(left),
            TokenKind::Dot => self.parse_member(left),
            _ => self.parse_binary(left),
        }
    }

    pub(super) fn current_precedence(&self) -> Precedence {
        match self.peek().kind {
            TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::Dot => Precedence::Call,
            kind => binary_operator(kind).map_or(Precedence::Lowest, |(_, prec)| prec),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        match token.lexeme.parse::<f64>() {
            Ok(value) => Ok(Expr::Literal(Literal::Number(value), span)),
            Err(_) => {
                self.error("Invalid number literal");
                Err(())
            }
        }
    }

    fn parse_group(&mut self) -> Result<Expr, ()> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ()> {
        let span = self.consume(TokenKind::LeftBracket, "Expected '['")?.span;
        let elements = self.parse_list(TokenKind::RightBracket)?;
        self.consume(TokenKind::RightBracket, "Expected ']' after array elements")?;
        Ok(Expr::Array(elements, span))
    }

    fn parse_unary(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        let op = if token.kind == TokenKind::Minus {
            UnaryOp::Negate
        } else {
            UnaryOp::Not
        };

        let operand = self.parse_precedence(Precedence::Unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_binary(&mut self, left: Expr) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        let Some((op, precedence)) = binary_operator(token.kind) else {
            self.error("Expected an operator");
            return Err(());
        };

        let right = self.parse_precedence(precedence)?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ()> {
        let span = callee.span();
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let args = self.parse_list(TokenKind::RightParen)?;
        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_index(&mut self, target: Expr) -> Result<Expr, ()> {
        let span = self.consume(TokenKind::LeftBracket, "Expected '['")?.span;
        let index = self.parse_expression()?;
        self.consume(TokenKind::RightBracket, "Expected ']' after index")?;

        Ok(Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
            span,
        })
    }

    fn parse_member(&mut self, object: Expr) -> Result<Expr, ()> {
        self.consume(TokenKind::Dot, "Expected '.'")?;
        let token = self.consume_identifier("a member name after '.'")?;
        let name = token.lexeme.clone();
        let span = token.span;

        Ok(Expr::Member {
            object: Box::new(object),
            name,
            span,
        })
    }

    /// Comma-separated expressions up to (not including) `close`
    fn parse_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, ()> {
        let mut items = Vec::new();
        if !self.check(close) {
            loop {
                items.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(items)
    }
}

fn binary_operator(kind: TokenKind) -> Option<(BinaryOp, Precedence)> {
    let pair = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, Precedence::Or),
        TokenKind::AmpAmp => (BinaryOp::And, Precedence::And),
        TokenKind::EqualEqual => (BinaryOp::Eq, Precedence::Equality),
        TokenKind::BangEqual => (BinaryOp::Ne, Precedence::Equality),
        TokenKind::Less => (BinaryOp::Lt, Precedence::Comparison),
        TokenKind::LessEqual => (BinaryOp::Le, Precedence::Comparison),
        TokenKind::Greater => (BinaryOp::Gt, Precedence::Comparison),
        TokenKind::GreaterEqual => (BinaryOp::Ge, Precedence::Comparison),
        TokenKind::Plus => (BinaryOp::Add, Precedence::Term),
        TokenKind::Minus => (BinaryOp::Sub, Precedence::Term),
        TokenKind::Star => (BinaryOp::Mul, Precedence::Factor),
        TokenKind::Slash => (BinaryOp::Div, Precedence::Factor),
        TokenKind::Percent => (BinaryOp::Mod, Precedence::Factor),
        _ => return None,
    };
    Some(pair)
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::span::Span;

    fn parse_expr(source: &str) -> Expr {
        let (tokens, _) = Lexer::new(&format!("{};", source)).tokenize();
        let (program, diagnostics) = Parser::new(tokens).parse();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        match program.items.into_iter().next() {
            Some(Item::Statement(Stmt::Expr(expr))) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        match parse_expr("1 + 2 * 3") {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_binary_is_left_associative() {
        match parse_expr("10 - 4 - 3") {
            Expr::Binary {
                op: BinaryOp::Sub,
                left,
                ..
            } => assert!(matches!(*left, Expr::Binary { op: BinaryOp::Sub, .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        match parse_expr("(1 + 2) * 3") {
            Expr::Binary {
                op: BinaryOp::Mul,
                left,
                ..
            } => assert!(matches!(*left, Expr::Binary { op: BinaryOp::Add, .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_or_binds_loosest() {
        assert!(matches!(
            parse_expr("a && b || !c"),
            Expr::Binary { op: BinaryOp::Or, .. }
        ));
    }

    #[test]
    fn test_method_call_chain() {
        match parse_expr("self.stack.pop(1)[0]") {
            Expr::Index { target, .. } => match *target {
                Expr::Call { callee, args, .. } => {
                    assert_eq!(args.len(), 1);
                    assert!(matches!(*callee, Expr::Member { ref name, .. } if name == "pop"));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_array_literal() {
        match parse_expr("[1, \"two\", [3]]") {
            Expr::Array(elements, span) => {
                assert_eq!(elements.len(), 3);
                assert_eq!(span, Span::new(1, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unary_negation() {
        assert!(matches!(
            parse_expr("-x"),
            Expr::Unary { op: UnaryOp::Negate, .. }
        ));
    }
}
