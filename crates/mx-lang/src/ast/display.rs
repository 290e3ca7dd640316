use std::fmt::{self, Display, Formatter};

use super::node::{Node, Operator};

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Prints the expression with the fewest parentheses that still parse back
/// into the same tree, e.g. `(a+b)*c` or `a-(b-c)`.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Node::Leaf(leaf) => write!(f, "{}", leaf.name),
            Node::BinaryOp(op) => {
                write_operand(f, &op.left, op.op, Side::Left)?;
                write!(f, "{}", op.op)?;
                write_operand(f, &op.right, op.op, Side::Right)
            }
        }
    }
}

fn write_operand(f: &mut Formatter<'_>, child: &Node, parent: Operator, side: Side) -> fmt::Result {
    if needs_parens(child, parent, side) {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

fn needs_parens(child: &Node, parent: Operator, side: Side) -> bool {
    match (child.operator(), side) {
        (None, _) => false,
        (Some(op), Side::Left) => op.precedence() < parent.precedence(),
        // the tree shape is what matters, so even `a+(b+c)` keeps its parentheses
        (Some(op), Side::Right) => op.precedence() <= parent.precedence(),
    }
}
