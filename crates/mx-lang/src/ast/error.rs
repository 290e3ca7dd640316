use thiserror::Error;

use super::node::MAX_DEPTH;
use crate::{Token, lexer::error::LexerError};

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error("Unexpected token `{}`", if .0.is_eof() { "EOF".to_string() } else { .0.to_string() })]
    UnexpectedToken(Token),
    #[error("Unexpected EOF detected")]
    UnexpectedEOFDetected(Token),
    #[error("Expected a closing parenthesis `)` but got `{}` delimiter", if .0.is_eof() { "EOF".to_string() } else { .0.to_string() })]
    ExpectedClosingParen(Token),
    #[error("Expression nests deeper than {} levels", MAX_DEPTH)]
    NestingTooDeep(Token),
}

impl ParseError {
    /// Token the parser stopped at, if the failure happened after lexing.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Lexer(_) => None,
            ParseError::UnexpectedToken(token)
            | ParseError::UnexpectedEOFDetected(token)
            | ParseError::ExpectedClosingParen(token)
            | ParseError::NestingTooDeep(token) => Some(token),
        }
    }
}
