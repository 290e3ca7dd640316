use std::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

use crate::range::Range;

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub struct Token {
    pub range: Range,
    pub kind: TokenKind,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub enum TokenKind {
    Asterisk,
    Eof,
    Ident(SmolStr),
    LParen,
    Minus,
    Plus,
    RParen,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.kind)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match &self {
            TokenKind::Asterisk => write!(f, "*"),
            TokenKind::Eof => write!(f, ""),
            TokenKind::Ident(ident) => write!(f, "{}", ident),
            TokenKind::LParen => write!(f, "("),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::RParen => write!(f, ")"),
        }
    }
}
