//! String, number and identifier scanning

use super::Lexer;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Scan a string literal; the opening quote is already consumed
    pub(super) fn string(&mut self) -> Token {
        let mut value = String::new();
        let mut bad_escape = None;

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c != '\\' {
                value.push(c);
                continue;
            }
            if self.is_at_end() {
                break;
            }
            match self.advance() {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                other => {
                    bad_escape.get_or_insert(other);
                }
            }
        }

        if self.is_at_end() {
            return self.error_token("unterminated string");
        }
        self.advance();

        if let Some(c) = bad_escape {
            return self.error_token(&format!("invalid escape sequence '\\{}'", c));
        }

        Token::new(TokenKind::String, value, self.start_span())
    }

    /// Scan a number literal; the first digit is already consumed
    pub(super) fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.make_token(TokenKind::Number)
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let token = self.make_token(TokenKind::Identifier);
        match TokenKind::keyword(&token.lexeme) {
            Some(kind) => Token { kind, ..token },
            None => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::token::TokenKind;
    use rstest::rstest;

    #[rstest]
    #[case(r#""plain""#, "plain")]
    #[case(r#""a\nb""#, "a\nb")]
    #[case(r#""tab\there""#, "tab\there")]
    #[case(r#""say \"hi\"""#, "say \"hi\"")]
    #[case(r#""back\\slash""#, "back\\slash")]
    fn test_string_escapes(#[case] source: &str, #[case] expected: &str) {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, expected);
    }

    #[test]
    fn test_unterminated_string() {
        let (_, diagnostics) = Lexer::new("\"open").tokenize();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unterminated string");
    }

    #[test]
    fn test_invalid_escape() {
        let (_, diagnostics) = Lexer::new(r#""\q""#).tokenize();
        assert!(diagnostics[0].message.contains("invalid escape"));
    }

    #[rstest]
    #[case("42", "42")]
    #[case("3.14", "3.14")]
    #[case("7.", "7")]
    fn test_numbers(#[case] source: &str, #[case] lexeme: &str) {
        let (tokens, _) = Lexer::new(source).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, lexeme);
    }

    #[test]
    fn test_identifiers_and_keywords() {
        let (tokens, _) = Lexer::new("IGNORE_ME while self_ref").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "IGNORE_ME");
        assert_eq!(tokens[1].kind, TokenKind::While);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }
}
