use itertools::Itertools;
use miette::{Diagnostic, SourceOffset, SourceSpan};

use crate::{
    annotate::AnnotateError,
    ast::{error::ParseError, node::Name},
    codec::DecodeError,
    lexer::{error::LexerError, token::TokenKind, tokenize},
    range::{Position, Range},
};

#[derive(Debug, thiserror::Error)]
pub enum InnerError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Missing operands `{}`", .0.iter().join("`, `"))]
    MissingOperands(Vec<Name>),
}

/// Represents a high-level error with diagnostic information for the user.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
    /// The expression (or transport payload) the error refers to.
    pub source_code: String,
    /// The location in the source code for diagnostics.
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(source_code: impl Into<String>, cause: impl Into<InnerError>) -> Self {
        let source_code = source_code.into();
        let cause = cause.into();

        let range = match &cause {
            InnerError::Parse(ParseError::Lexer(LexerError::UnexpectedCharacter(_, position))) => {
                Some(Range::new(
                    *position,
                    Position::new(position.line, position.column + 1),
                ))
            }
            InnerError::Parse(err) => err.token().map(|token| token.range),
            InnerError::Annotate(AnnotateError::UnboundOperand(name)) => find_ident(&source_code, name),
            InnerError::MissingOperands(names) => names
                .first()
                .and_then(|name| find_ident(&source_code, name)),
            InnerError::Annotate(_) | InnerError::Decode(_) => None,
        };

        let location = match range {
            Some(range) => {
                let start = SourceOffset::from_location(&source_code, range.start.line as usize, range.start.column);
                let end = SourceOffset::from_location(&source_code, range.end.line as usize, range.end.column);
                SourceSpan::new(start, std::cmp::max(end.offset().saturating_sub(start.offset()), 1))
            }
            None => SourceSpan::new(SourceOffset::from(0), source_code.len()),
        };

        Self {
            cause,
            source_code,
            location,
        }
    }
}

fn find_ident(source_code: &str, name: &str) -> Option<Range> {
    tokenize(source_code).ok()?.into_iter().find_map(|token| match token.kind {
        TokenKind::Ident(ident) if ident.as_str() == name => Some(token.range),
        _ => None,
    })
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match &self.cause {
            InnerError::Parse(ParseError::Lexer(LexerError::UnexpectedCharacter(_, _))) => {
                "LexerError::UnexpectedCharacter"
            }
            InnerError::Parse(ParseError::UnexpectedToken(_)) => "ParseError::UnexpectedToken",
            InnerError::Parse(ParseError::UnexpectedEOFDetected(_)) => "ParseError::UnexpectedEOFDetected",
            InnerError::Parse(ParseError::ExpectedClosingParen(_)) => "ParseError::ExpectedClosingParen",
            InnerError::Parse(ParseError::NestingTooDeep(_)) => "ParseError::NestingTooDeep",
            InnerError::Annotate(AnnotateError::UnboundOperand(_)) => "AnnotateError::UnboundOperand",
            InnerError::Annotate(AnnotateError::ShapeMismatch { .. }) => "AnnotateError::ShapeMismatch",
            InnerError::Annotate(AnnotateError::CostOverflow(_)) => "AnnotateError::CostOverflow",
            InnerError::Decode(_) => "DecodeError",
            InnerError::MissingOperands(_) => "MissingOperands",
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Parse(ParseError::Lexer(_)) => {
                Some("Operand names use letters, digits and `_`; only `+`, `-`, `*` and parentheses are allowed.".to_string())
            }
            InnerError::Parse(ParseError::UnexpectedToken(_)) => {
                Some("Check for doubled operators or operands without an operator between them.".to_string())
            }
            InnerError::Parse(ParseError::UnexpectedEOFDetected(_)) => {
                Some("Input ended unexpectedly. Check for a trailing operator or an empty expression.".to_string())
            }
            InnerError::Parse(ParseError::ExpectedClosingParen(_)) => {
                Some("Add the missing `)`.".to_string())
            }
            InnerError::Parse(ParseError::NestingTooDeep(_)) => {
                Some("Split the expression into smaller requests or drop redundant parentheses.".to_string())
            }
            InnerError::Annotate(AnnotateError::UnboundOperand(name)) => {
                Some(format!("Bind a matrix named '{name}' in the request."))
            }
            InnerError::MissingOperands(names) => Some(format!(
                "Bind matrices named {} in the request.",
                names.iter().map(|name| format!("'{name}'")).join(", ")
            )),
            InnerError::Annotate(AnnotateError::ShapeMismatch { .. }) => Some(
                "`+` and `-` need equal shapes, `*` needs the left column count to match the right row count."
                    .to_string(),
            ),
            _ => None,
        };

        msg.map(|m| Box::new(m) as Box<dyn std::fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}
