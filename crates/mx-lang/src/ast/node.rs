use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use smol_str::SmolStr;

use crate::shape::Shape;

pub type Name = SmolStr;

/// Deepest tree the parser builds and the codec accepts, counting a lone
/// leaf as depth 1. Parenthesis nesting is capped at the same value.
pub const MAX_DEPTH: usize = 512;

/// Arithmetic operator of a [`BinaryOp`].
///
/// The wire tokens (`ADD`, `SUB`, `MUL`) are the only operator names the
/// codec accepts.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Sub, Operator::Mul];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "ADD",
            Operator::Sub => "SUB",
            Operator::Mul => "MUL",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
        }
    }

    #[inline(always)]
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul => 2,
        }
    }
}

impl FromStr for Operator {
    type Err = SmolStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Operator::Add),
            "SUB" => Ok(Operator::Sub),
            "MUL" => Ok(Operator::Mul),
            _ => Err(SmolStr::new(s)),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.symbol())
    }
}

/// A named matrix operand.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Leaf {
    pub name: Name,
    pub shape: Shape,
}

/// One arithmetic operation over two owned subtrees.
///
/// `shape` and `op_count` stay zero until the tree is annotated.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BinaryOp {
    pub op: Operator,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub shape: Shape,
    pub op_count: u64,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Node {
    Leaf(Leaf),
    BinaryOp(BinaryOp),
}

impl Node {
    pub fn leaf(name: impl Into<Name>) -> Self {
        Node::Leaf(Leaf {
            name: name.into(),
            shape: Shape::ZERO,
        })
    }

    pub fn binary(op: Operator, left: Node, right: Node) -> Self {
        Node::BinaryOp(BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            shape: Shape::ZERO,
            op_count: 0,
        })
    }

    pub fn shape(&self) -> Shape {
        match self {
            Node::Leaf(leaf) => leaf.shape,
            Node::BinaryOp(op) => op.shape,
        }
    }

    /// Cumulative scalar-operation cost of the subtree. Leaves cost nothing.
    pub fn op_count(&self) -> u64 {
        match self {
            Node::Leaf(_) => 0,
            Node::BinaryOp(op) => op.op_count,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Node::Leaf(_) => None,
            Node::BinaryOp(op) => Some(op.op),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::BinaryOp(op) => 1 + op.left.depth().max(op.right.depth()),
        }
    }

    /// Number of leaf occurrences, duplicates included.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<BinaryOp> for Node {
    fn from(op: BinaryOp) -> Self {
        Node::BinaryOp(op)
    }
}
