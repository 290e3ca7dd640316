use std::{collections::HashMap, hash::BuildHasher};

use thiserror::Error;
use tracing::trace;

use crate::{
    ast::node::{Name, Node, Operator},
    matrix::Matrix,
};

/// Arithmetic backend that carries out a single operation.
pub trait Kernel {
    type Error: std::error::Error + Send + Sync + 'static;

    fn apply(&self, op: Operator, left: &Matrix, right: &Matrix) -> Result<Matrix, Self::Error>;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    type Error = K::Error;

    fn apply(&self, op: Operator, left: &Matrix, right: &Matrix) -> Result<Matrix, Self::Error> {
        (**self).apply(op, left, right)
    }
}

#[derive(Error, Debug)]
pub enum EvalError<E: std::error::Error + 'static> {
    #[error("Operand `{0}` is not bound to a matrix")]
    UnboundOperand(Name),
    #[error("Kernel failed at `{op}`: {source}")]
    Kernel {
        op: Operator,
        #[source]
        source: E,
    },
}

/// Evaluates `node` bottom-up, handing every operation to `kernel`.
pub fn evaluate<K: Kernel, S: BuildHasher>(
    node: &Node,
    operands: &HashMap<String, Matrix, S>,
    kernel: &K,
) -> Result<Matrix, EvalError<K::Error>> {
    match node {
        Node::Leaf(leaf) => operands
            .get(leaf.name.as_str())
            .cloned()
            .ok_or_else(|| EvalError::UnboundOperand(leaf.name.clone())),
        Node::BinaryOp(op) => {
            let left = evaluate(&op.left, operands, kernel)?;
            let right = evaluate(&op.right, operands, kernel)?;

            trace!(op = %op.op, left = %left.shape(), right = %right.shape(), "Applying kernel");

            kernel
                .apply(op.op, &left, &right)
                .map_err(|source| EvalError::Kernel { op: op.op, source })
        }
    }
}
