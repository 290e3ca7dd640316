use rustc_hash::FxHashSet;

use crate::ast::node::{Leaf, Name, Node};

/// Left-to-right iterator over the leaves of a tree.
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Leaf;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => return Some(leaf),
                Node::BinaryOp(op) => {
                    self.stack.push(&op.right);
                    self.stack.push(&op.left);
                }
            }
        }

        None
    }
}

impl Node {
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

/// Distinct operand names referenced by `root`.
pub fn leaf_names(root: &Node) -> FxHashSet<Name> {
    root.leaves().map(|leaf| leaf.name.clone()).collect()
}
