use std::fmt::Display;

use thiserror::Error;

use crate::token::{Token, TokenType};

/// Lexical error. Carries no token; the offending text never became one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: i32,
    pub message: String,
}

impl ScanError {
    pub fn new(line: i32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Syntax error raised while parsing one declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_at_token(f, &self.token, &self.message)
    }
}

impl std::error::Error for ParseError {}

/// Static-analysis error found by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl ResolveError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_at_token(f, &self.token, &self.message)
    }
}

impl std::error::Error for ResolveError {}

// "at end" / "at '<lexeme>'" branches on the token, so this cannot be a
// thiserror format string.
fn write_at_token(
    f: &mut std::fmt::Formatter<'_>,
    token: &Token,
    message: &str,
) -> std::fmt::Result {
    if token.token_type == TokenType::EOF {
        write!(f, "[line {}] Error at end: {}", token.line, message)
    } else {
        write!(
            f,
            "[line {}] Error at '{}': {}",
            token.line, token.lexeme, message
        )
    }
}

/// Error raised while evaluating one top-level statement. Every variant
/// carries the token that locates it in the source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{message}\n[line {}]", .operator.line)]
    InvalidOperand { operator: Token, message: String },

    #[error("{message}\n[line {}]", .name.line)]
    UndefinedVariable { name: Token, message: String },

    #[error("{message}\n[line {}]", .name.line)]
    UndefinedProperty { name: Token, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_at_lexeme() {
        let token = Token::new(TokenType::Plus, "+", None, 3);
        let e = ParseError::new(token, "Expect expression.");
        assert_eq!(e.to_string(), "[line 3] Error at '+': Expect expression.");
    }

    #[test]
    fn parse_error_at_end() {
        let token = Token::new(TokenType::EOF, "", None, 7);
        let e = ParseError::new(token, "Expect ';' after expression.");
        assert_eq!(
            e.to_string(),
            "[line 7] Error at end: Expect ';' after expression."
        );
    }

    #[test]
    fn runtime_error_puts_line_on_second_line() {
        let token = Token::new(TokenType::Star, "*", None, 2);
        let e = RuntimeError::InvalidOperand {
            operator: token,
            message: "Operands must be numbers, but got string and nil.".to_owned(),
        };
        assert_eq!(
            e.to_string(),
            "Operands must be numbers, but got string and nil.\n[line 2]"
        );
    }
}
