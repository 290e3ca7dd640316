pub mod display;
pub mod error;
pub mod node;
pub mod parser;

use crate::lexer::tokenize;

use error::ParseError;
use node::Node;
use parser::Parser;

/// Compiles expression text into an unannotated tree.
pub fn parse_expr(code: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(code)?;
    Parser::new(tokens.iter()).parse()
}
