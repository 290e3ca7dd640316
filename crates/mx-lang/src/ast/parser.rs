use std::iter::Peekable;

use crate::lexer::token::{Token, TokenKind};

use super::error::ParseError;
use super::node::{MAX_DEPTH, Node, Operator};

/// A subtree together with its depth.
type Parsed = (Node, usize);

pub struct Parser<'a> {
    tokens: Peekable<core::slice::Iter<'a, Token>>,
    eof: Token,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: core::slice::Iter<'a, Token>) -> Self {
        let eof = Token {
            range: tokens.as_slice().last().map(|t| t.range).unwrap_or_default(),
            kind: TokenKind::Eof,
        };

        Self {
            tokens: tokens.peekable(),
            eof,
            nesting: 0,
        }
    }

    /// Parses a single expression and requires the token stream to end right after it.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let token = self.next_token()?;
        let (node, _) = self.parse_expr(token)?;

        match self.tokens.next() {
            Some(token) if !token.is_eof() => Err(ParseError::UnexpectedToken(token.clone())),
            _ => Ok(node),
        }
    }

    #[inline(always)]
    fn parse_expr(&mut self, token: &'a Token) -> Result<Parsed, ParseError> {
        let lhs = self.parse_primary_expr(token)?;
        self.parse_binary_op(1, lhs)
    }

    #[inline(always)]
    fn binary_op(kind: &TokenKind) -> Option<Operator> {
        match kind {
            TokenKind::Plus => Some(Operator::Add),
            TokenKind::Minus => Some(Operator::Sub),
            TokenKind::Asterisk => Some(Operator::Mul),
            _ => None,
        }
    }

    fn peek_binary_op(&mut self) -> Option<Operator> {
        self.tokens.peek().and_then(|token| Self::binary_op(&token.kind))
    }

    // Precedence climbing: operators of equal precedence fold to the left,
    // a tighter operator on the right captures the pending rhs.
    fn parse_binary_op(&mut self, min_prec: u8, mut lhs: Parsed) -> Result<Parsed, ParseError> {
        while let Some(op) = self.peek_binary_op() {
            let prec = op.precedence();

            if prec < min_prec {
                break;
            }

            let op_token = self.next_token()?;
            let rhs_token = self.next_token()?;
            let mut rhs = self.parse_primary_expr(rhs_token)?;

            loop {
                let next_prec = self
                    .peek_binary_op()
                    .map(|next| next.precedence())
                    .unwrap_or(0);

                if next_prec > prec {
                    rhs = self.parse_binary_op(next_prec, rhs)?;
                } else {
                    break;
                }
            }

            lhs = Self::join(op, op_token, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn join(
        op: Operator,
        token: &Token,
        (left, left_depth): Parsed,
        (right, right_depth): Parsed,
    ) -> Result<Parsed, ParseError> {
        let depth = 1 + left_depth.max(right_depth);
        if depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep(token.clone()));
        }

        Ok((Node::binary(op, left, right), depth))
    }

    fn parse_primary_expr(&mut self, token: &'a Token) -> Result<Parsed, ParseError> {
        match &token.kind {
            TokenKind::Ident(name) => Ok((Node::leaf(name.clone()), 1)),
            TokenKind::LParen => self.parse_paren(token),
            TokenKind::Eof => Err(ParseError::UnexpectedEOFDetected(token.clone())),
            _ => Err(ParseError::UnexpectedToken(token.clone())),
        }
    }

    fn parse_paren(&mut self, open: &'a Token) -> Result<Parsed, ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep(open.clone()));
        }

        let expr_token = self.next_token()?;
        let expr = self.parse_expr(expr_token)?;

        match self.tokens.next() {
            Some(token) if token.kind == TokenKind::RParen => {
                self.nesting -= 1;
                Ok(expr)
            }
            Some(token) => Err(ParseError::ExpectedClosingParen(token.clone())),
            None => Err(ParseError::ExpectedClosingParen(self.eof.clone())),
        }
    }

    fn next_token(&mut self) -> Result<&'a Token, ParseError> {
        match self.tokens.next() {
            Some(token) => Ok(token),
            None => Err(ParseError::UnexpectedEOFDetected(self.eof.clone())),
        }
    }
}
