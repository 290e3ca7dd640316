use thiserror::Error;

use crate::range::Position;

#[derive(Error, Debug, PartialEq)]
pub enum LexerError {
    #[error("Unexpected character `{0}`")]
    UnexpectedCharacter(char, Position),
}

impl LexerError {
    pub fn position(&self) -> Position {
        match self {
            LexerError::UnexpectedCharacter(_, position) => *position,
        }
    }
}
