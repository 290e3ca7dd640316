//! Shape and cost inference over a compiled tree.
//!
//! A single post-order pass assigns every node its resulting [`Shape`] and
//! its cumulative operation count:
//!
//! - `a+b`, `a-b`: shape of `a`, cost `rows * cols`
//! - `a*b`: `a.rows x b.cols`, cost `rows * cols * a.cols`
//!
//! Subtree costs are added on top, leaves cost nothing. The pass always
//! recomputes from the leaves, so running it again with the same bindings
//! yields the same tree.
use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use thiserror::Error;

use crate::{
    ast::node::{Name, Node, Operator},
    matrix::Matrix,
    shape::Shape,
};

#[derive(Error, Debug, PartialEq)]
pub enum AnnotateError {
    #[error("Operand `{0}` is not bound to a matrix")]
    UnboundOperand(Name),
    #[error("Cannot apply `{op}` to a {left} matrix and a {right} matrix")]
    ShapeMismatch {
        op: Operator,
        left: Shape,
        right: Shape,
    },
    #[error("Operation count overflow at `{0}`")]
    CostOverflow(Operator),
}

/// Source of operand shapes for the annotator.
pub trait Operands {
    fn shape_of(&self, name: &str) -> Option<Shape>;
}

impl<S: BuildHasher> Operands for HashMap<String, Matrix, S> {
    fn shape_of(&self, name: &str) -> Option<Shape> {
        self.get(name).map(Matrix::shape)
    }
}

impl<S: BuildHasher> Operands for HashMap<String, Shape, S> {
    fn shape_of(&self, name: &str) -> Option<Shape> {
        self.get(name).copied()
    }
}

impl Operands for BTreeMap<String, Matrix> {
    fn shape_of(&self, name: &str) -> Option<Shape> {
        self.get(name).map(Matrix::shape)
    }
}

impl Operands for BTreeMap<String, Shape> {
    fn shape_of(&self, name: &str) -> Option<Shape> {
        self.get(name).copied()
    }
}

impl<T: Operands + ?Sized> Operands for &T {
    fn shape_of(&self, name: &str) -> Option<Shape> {
        (**self).shape_of(name)
    }
}

/// What a leaf gets when its name has no binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnboundPolicy {
    #[default]
    Error,
    /// Keep going with a `0x0` shape.
    ZeroShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub unbound: UnboundPolicy,
    pub check_shapes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unbound: UnboundPolicy::Error,
            check_shapes: true,
        }
    }
}

impl Options {
    /// Zero shapes for unbound names and no compatibility checks.
    pub fn lenient() -> Self {
        Self {
            unbound: UnboundPolicy::ZeroShape,
            check_shapes: false,
        }
    }
}

/// Annotates `node` in place.
///
/// On error the nodes visited before the failure keep their new values.
pub fn annotate<O: Operands + ?Sized>(
    node: &mut Node,
    operands: &O,
    options: &Options,
) -> Result<(), AnnotateError> {
    match node {
        Node::Leaf(leaf) => {
            leaf.shape = match operands.shape_of(&leaf.name) {
                Some(shape) => shape,
                None => match options.unbound {
                    UnboundPolicy::Error => {
                        return Err(AnnotateError::UnboundOperand(leaf.name.clone()));
                    }
                    UnboundPolicy::ZeroShape => Shape::ZERO,
                },
            };
        }
        Node::BinaryOp(op) => {
            annotate(&mut op.left, operands, options)?;
            annotate(&mut op.right, operands, options)?;

            let (left, right) = (op.left.shape(), op.right.shape());

            if options.check_shapes && !is_compatible(op.op, &left, &right) {
                return Err(AnnotateError::ShapeMismatch {
                    op: op.op,
                    left,
                    right,
                });
            }

            op.shape = result_shape(op.op, left, right);
            op.op_count = op_weight(op.op, left, right)
                .and_then(|weight| weight.checked_add(op.left.op_count()))
                .and_then(|count| count.checked_add(op.right.op_count()))
                .ok_or(AnnotateError::CostOverflow(op.op))?;
        }
    }

    Ok(())
}

pub fn is_compatible(op: Operator, left: &Shape, right: &Shape) -> bool {
    match op {
        Operator::Add | Operator::Sub => left.can_add(right),
        Operator::Mul => left.can_mul(right),
    }
}

pub fn result_shape(op: Operator, left: Shape, right: Shape) -> Shape {
    match op {
        Operator::Add | Operator::Sub => left,
        Operator::Mul => Shape::new(left.rows, right.cols),
    }
}

/// Cost of the operation alone, without its operands' subtrees.
pub fn op_weight(op: Operator, left: Shape, right: Shape) -> Option<u64> {
    let shape = result_shape(op, left, right);
    let cells = (shape.rows as u64).checked_mul(shape.cols as u64)?;

    match op {
        Operator::Add | Operator::Sub => Some(cells),
        Operator::Mul => cells.checked_mul(left.cols as u64),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rustc_hash::FxHashMap;

    use super::*;
    use crate::ast::parse_expr;

    fn shapes(bindings: &[(&str, (usize, usize))]) -> FxHashMap<String, Shape> {
        bindings
            .iter()
            .map(|(name, shape)| (name.to_string(), Shape::from(*shape)))
            .collect()
    }

    fn annotated(code: &str, bindings: &[(&str, (usize, usize))], options: &Options) -> Result<Node, AnnotateError> {
        let mut tree = parse_expr(code).unwrap();
        annotate(&mut tree, &shapes(bindings), options)?;
        Ok(tree)
    }

    #[rstest]
    #[case::add("a+b", &[("a", (2, 3)), ("b", (2, 3))], Shape::new(2, 3), 6)]
    #[case::sub("a-b", &[("a", (4, 1)), ("b", (4, 1))], Shape::new(4, 1), 4)]
    #[case::mul("a*b", &[("a", (2, 3)), ("b", (3, 4))], Shape::new(2, 4), 24)]
    #[case::compound("(a*b)+c", &[("a", (2, 3)), ("b", (3, 4)), ("c", (2, 4))], Shape::new(2, 4), 32)]
    #[case::chain_as_written("a*b*c", &[("a", (10, 100)), ("b", (100, 5)), ("c", (5, 50))], Shape::new(10, 50), 5000 + 2500)]
    #[case::chain_regrouped("a*(b*c)", &[("a", (10, 100)), ("b", (100, 5)), ("c", (5, 50))], Shape::new(10, 50), 25000 + 50000)]
    #[case::leaf_only("a", &[("a", (7, 7))], Shape::new(7, 7), 0)]
    #[case::repeated_leaf("a+a", &[("a", (3, 3))], Shape::new(3, 3), 9)]
    fn test_annotate(
        #[case] code: &str,
        #[case] bindings: &[(&str, (usize, usize))],
        #[case] expected_shape: Shape,
        #[case] expected_count: u64,
    ) {
        let tree = annotated(code, bindings, &Options::default()).unwrap();
        assert_eq!(tree.shape(), expected_shape);
        assert_eq!(tree.op_count(), expected_count);
    }

    #[test]
    fn test_annotate_children() {
        let tree = annotated(
            "(a*b)+c",
            &[("a", (2, 3)), ("b", (3, 4)), ("c", (2, 4))],
            &Options::default(),
        )
        .unwrap();

        let Node::BinaryOp(root) = &tree else {
            panic!("expected a binary op");
        };
        assert_eq!(root.left.shape(), Shape::new(2, 4));
        assert_eq!(root.left.op_count(), 24);
        assert_eq!(root.right.shape(), Shape::new(2, 4));
        assert_eq!(root.right.op_count(), 0);
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let bindings = shapes(&[("a", (2, 3)), ("b", (3, 4)), ("c", (2, 4))]);
        let mut tree = parse_expr("a*b+c").unwrap();

        annotate(&mut tree, &bindings, &Options::default()).unwrap();
        let first = tree.clone();
        annotate(&mut tree, &bindings, &Options::default()).unwrap();

        assert_eq!(tree, first);
    }

    #[test]
    fn test_unbound_operand_error() {
        assert_eq!(
            annotated("a+b", &[("a", (2, 2))], &Options::default()),
            Err(AnnotateError::UnboundOperand("b".into()))
        );
    }

    #[test]
    fn test_unbound_operand_zero_shape() {
        let tree = annotated("a+b", &[("b", (2, 2))], &Options::lenient()).unwrap();
        assert_eq!(tree.shape(), Shape::ZERO);
        assert_eq!(tree.op_count(), 0);
    }

    #[rstest]
    #[case::add("a+b", &[("a", (2, 3)), ("b", (3, 2))], Operator::Add, Shape::new(2, 3), Shape::new(3, 2))]
    #[case::mul("a*b", &[("a", (2, 3)), ("b", (2, 3))], Operator::Mul, Shape::new(2, 3), Shape::new(2, 3))]
    #[case::nested("(a*b)-c", &[("a", (2, 3)), ("b", (3, 4)), ("c", (4, 2))], Operator::Sub, Shape::new(2, 4), Shape::new(4, 2))]
    fn test_shape_mismatch(
        #[case] code: &str,
        #[case] bindings: &[(&str, (usize, usize))],
        #[case] op: Operator,
        #[case] left: Shape,
        #[case] right: Shape,
    ) {
        assert_eq!(
            annotated(code, bindings, &Options::default()),
            Err(AnnotateError::ShapeMismatch { op, left, right })
        );
    }

    #[test]
    fn test_unchecked_mismatch_still_computes() {
        let options = Options {
            check_shapes: false,
            ..Default::default()
        };
        let tree = annotated("a*b", &[("a", (2, 3)), ("b", (2, 5))], &options).unwrap();
        assert_eq!(tree.shape(), Shape::new(2, 5));
        assert_eq!(tree.op_count(), 2 * 5 * 3);
    }

    #[test]
    fn test_cost_overflow() {
        let huge = usize::MAX / 2;
        assert_eq!(
            annotated("a*b", &[("a", (huge, huge)), ("b", (huge, huge))], &Options::default()),
            Err(AnnotateError::CostOverflow(Operator::Mul))
        );
    }

    #[test]
    fn test_matrix_operands() {
        let operands = FxHashMap::from_iter([
            ("a".to_string(), Matrix::zeros(2, 3)),
            ("b".to_string(), Matrix::zeros(3, 1)),
        ]);
        let mut tree = parse_expr("a*b").unwrap();
        annotate(&mut tree, &operands, &Options::default()).unwrap();
        assert_eq!(tree.shape(), Shape::new(2, 1));
        assert_eq!(tree.op_count(), 6);
    }
}
