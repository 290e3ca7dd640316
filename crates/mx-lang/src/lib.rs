//! `mx-lang` is the planning layer of a distributed matrix-expression evaluator.
//!
//! It compiles expressions such as `(a*b)+c` into a syntax tree, annotates
//! every node with its resulting shape and operation count, extracts the
//! operand names a request has to carry, and moves trees across process
//! boundaries as JSON.
//!
//! ## Examples
//!
//! ```rust
//! use mx_lang::{AnnotateOptions, Matrix, Request, Shape};
//!
//! let request = Request::new("(a*b)+c")
//!     .with_operand("a", Matrix::zeros(2, 3))
//!     .with_operand("b", Matrix::zeros(3, 4))
//!     .with_operand("c", Matrix::zeros(2, 4));
//!
//! let plan = mx_lang::Plan::compile(&request, &AnnotateOptions::default()).unwrap();
//! assert_eq!(plan.shape(), Shape::new(2, 4));
//! assert_eq!(plan.op_count(), 32);
//!
//! // Ship the tree to a worker and rebuild it there.
//! let json = mx_lang::encode_to_string(plan.tree());
//! let tree = mx_lang::decode_str(&json).unwrap();
//! assert_eq!(&tree, plan.tree());
//! ```
mod annotate;
mod ast;
mod codec;
mod error;
mod eval;
mod leaves;
mod lexer;
mod matrix;
mod plan;
mod range;
mod request;
mod shape;

pub use annotate::{
    AnnotateError, Operands, Options as AnnotateOptions, UnboundPolicy, annotate, is_compatible, op_weight,
    result_shape,
};
pub use ast::error::ParseError;
pub use ast::node::{BinaryOp, Leaf, MAX_DEPTH, Name, Node, Operator};
pub use ast::parser::Parser;
pub use codec::{DecodeError, decode, decode_slice, decode_str, encode, encode_to_string, encode_untagged};
pub use error::{Error, InnerError};
pub use eval::{EvalError, Kernel, evaluate};
pub use leaves::{Leaves, leaf_names};
pub use lexer::error::LexerError;
pub use lexer::token::{Token, TokenKind};
pub use matrix::{Matrix, MatrixError};
pub use plan::Plan;
pub use range::{Position, Range};
pub use request::Request;
pub use shape::Shape;

pub type MxResult<T> = Result<T, Error>;

/// Compiles expression text into an unannotated tree.
pub fn parse(code: &str) -> MxResult<Node> {
    ast::parse_expr(code).map_err(|e| Error::from_error(code, e))
}

pub fn tokenize(code: &str) -> MxResult<Vec<Token>> {
    lexer::tokenize(code).map_err(|e| Error::from_error(code, ParseError::from(e)))
}

/// Parses `code` and annotates it against `operands` in one step.
pub fn compile<O: Operands + ?Sized>(code: &str, operands: &O, options: &AnnotateOptions) -> MxResult<Node> {
    let mut tree = parse(code)?;
    annotate::annotate(&mut tree, operands, options).map_err(|e| Error::from_error(code, e))?;
    Ok(tree)
}
