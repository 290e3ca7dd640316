pub mod error;
pub mod token;

use error::LexerError;
use nom::Parser;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, multispace0},
    combinator::{map, recognize},
    multi::many0,
    sequence::{delimited, pair},
};
use smol_str::SmolStr;
use token::{Token, TokenKind};

use crate::range::Span;

macro_rules! define_token_parser {
    ($name:ident, $tag:expr, $kind:expr) => {
        fn $name(input: Span) -> IResult<Span, Token> {
            map(tag($tag), |span: Span| Token {
                range: span.into(),
                kind: $kind,
            })
            .parse(input)
        }
    };
}

/// Splits expression text into tokens, always terminated by [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    let (rest, mut tokens) = match tokens(Span::new(input)) {
        Ok(result) => result,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(unexpected(e.input)),
        Err(nom::Err::Incomplete(_)) => return Err(unexpected(Span::new(input))),
    };

    let rest = skip_spaces(rest);
    if !rest.fragment().is_empty() {
        return Err(unexpected(rest));
    }

    tokens.push(Token {
        range: rest.into(),
        kind: TokenKind::Eof,
    });

    Ok(tokens)
}

fn unexpected(span: Span) -> LexerError {
    LexerError::UnexpectedCharacter(span.fragment().chars().next().unwrap_or_default(), span.into())
}

fn skip_spaces(span: Span) -> Span {
    multispace0::<Span, nom::error::Error<Span>>(span)
        .map(|(rest, _)| rest)
        .unwrap_or(span)
}

define_token_parser!(plus, "+", TokenKind::Plus);
define_token_parser!(minus, "-", TokenKind::Minus);
define_token_parser!(asterisk, "*", TokenKind::Asterisk);
define_token_parser!(l_paren, "(", TokenKind::LParen);
define_token_parser!(r_paren, ")", TokenKind::RParen);

fn punctuations(input: Span) -> IResult<Span, Token> {
    alt((plus, minus, asterisk, l_paren, r_paren)).parse(input)
}

fn ident(input: Span) -> IResult<Span, Token> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |span: Span| Token {
            range: span.into(),
            kind: TokenKind::Ident(SmolStr::new(span.fragment())),
        },
    )
    .parse(input)
}

fn token(input: Span) -> IResult<Span, Token> {
    alt((punctuations, ident)).parse(input)
}

fn tokens(input: Span) -> IResult<Span, Vec<Token>> {
    many0(delimited(multispace0, token, multispace0)).parse(input)
}
