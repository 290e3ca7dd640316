//! JSON transport form of a tree.
//!
//! A leaf is written as
//!
//! ```json
//! {"Kind": "Leaf", "MatrixName": "a", "Size": {"Rows": 2, "Cols": 3}}
//! ```
//!
//! and a binary operation as
//!
//! ```json
//! {"Kind": "BinaryOp", "Op": "ADD", "Left": {..}, "Right": {..},
//!  "Size": {"Rows": 2, "Cols": 3}, "SubTreeCountOperations": 6}
//! ```
//!
//! Peers that predate the `Kind` tag are still understood: without it, a
//! node carrying `MatrixName` is a leaf and anything else a binary op.
//!
//! Trees up to [`MAX_DEPTH`] levels decode, which covers everything the
//! parser produces. Deeper input is rejected before it is parsed.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{
    ast::node::{BinaryOp, Leaf, MAX_DEPTH, Node, Operator},
    shape::Shape,
};

pub const KIND: &str = "Kind";
pub const LEAF: &str = "Leaf";
pub const BINARY_OP: &str = "BinaryOp";
pub const MATRIX_NAME: &str = "MatrixName";
pub const SIZE: &str = "Size";
pub const ROWS: &str = "Rows";
pub const COLS: &str = "Cols";
pub const OP: &str = "Op";
pub const LEFT: &str = "Left";
pub const RIGHT: &str = "Right";
pub const SUB_TREE_COUNT_OPERATIONS: &str = "SubTreeCountOperations";

const ROOT_PATH: &str = "$";

// A leaf's `Size` object sits one level below the leaf itself.
const MAX_JSON_NESTING: usize = MAX_DEPTH + 1;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected an object at `{path}`")]
    NotAnObject { path: String },
    #[error("Missing field `{field}` at `{path}`")]
    MissingField { path: String, field: &'static str },
    #[error("Field `{field}` at `{path}` must be {expected}")]
    InvalidField {
        path: String,
        field: &'static str,
        expected: &'static str,
    },
    #[error("Unknown operator `{op}` at `{path}`")]
    UnknownOperator { path: String, op: String },
    #[error("Unknown node kind `{kind}` at `{path}`")]
    UnknownKind { path: String, kind: String },
    #[error("Tree nests deeper than {} levels", MAX_DEPTH)]
    NestingTooDeep,
}

impl DecodeError {
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::Json(_) | DecodeError::NestingTooDeep => None,
            DecodeError::NotAnObject { path }
            | DecodeError::MissingField { path, .. }
            | DecodeError::InvalidField { path, .. }
            | DecodeError::UnknownOperator { path, .. }
            | DecodeError::UnknownKind { path, .. } => Some(path),
        }
    }
}

/// Encodes with the explicit `Kind` tag.
pub fn encode(node: &Node) -> Value {
    encode_node(node, true)
}

/// Encodes only the legacy field set, for peers that sniff `MatrixName`.
pub fn encode_untagged(node: &Node) -> Value {
    encode_node(node, false)
}

pub fn encode_to_string(node: &Node) -> String {
    encode(node).to_string()
}

pub fn decode(value: &Value) -> Result<Node, DecodeError> {
    decode_node(value, ROOT_PATH, 1)
}

pub fn decode_str(json: &str) -> Result<Node, DecodeError> {
    decode_slice(json.as_bytes())
}

pub fn decode_slice(json: &[u8]) -> Result<Node, DecodeError> {
    check_nesting(json)?;

    let mut deserializer = serde_json::Deserializer::from_slice(json);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;

    decode(&value)
}

/// Counts bracket nesting outside of strings so that serde_json, running
/// without its own recursion limit, never descends past [`MAX_JSON_NESTING`].
fn check_nesting(json: &[u8]) -> Result<(), DecodeError> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in json {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > MAX_JSON_NESTING {
                    return Err(DecodeError::NestingTooDeep);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    Ok(())
}

fn encode_node(node: &Node, tagged: bool) -> Value {
    let mut object = Map::new();

    match node {
        Node::Leaf(leaf) => {
            if tagged {
                object.insert(KIND.to_string(), LEAF.into());
            }
            object.insert(MATRIX_NAME.to_string(), leaf.name.as_str().into());
            object.insert(SIZE.to_string(), encode_shape(leaf.shape));
        }
        Node::BinaryOp(op) => {
            if tagged {
                object.insert(KIND.to_string(), BINARY_OP.into());
            }
            object.insert(OP.to_string(), op.op.as_str().into());
            object.insert(LEFT.to_string(), encode_node(&op.left, tagged));
            object.insert(RIGHT.to_string(), encode_node(&op.right, tagged));
            object.insert(SIZE.to_string(), encode_shape(op.shape));
            object.insert(SUB_TREE_COUNT_OPERATIONS.to_string(), op.op_count.into());
        }
    }

    Value::Object(object)
}

fn encode_shape(shape: Shape) -> Value {
    json!({ ROWS: shape.rows, COLS: shape.cols })
}

enum Kind {
    Leaf,
    BinaryOp,
}

fn decode_node(value: &Value, path: &str, depth: usize) -> Result<Node, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep);
    }

    let object = value.as_object().ok_or_else(|| DecodeError::NotAnObject {
        path: path.to_string(),
    })?;

    let kind = match object.get(KIND) {
        Some(Value::String(kind)) => match kind.as_str() {
            LEAF => Kind::Leaf,
            BINARY_OP => Kind::BinaryOp,
            _ => {
                return Err(DecodeError::UnknownKind {
                    path: path.to_string(),
                    kind: kind.clone(),
                });
            }
        },
        Some(_) => return Err(invalid(path, KIND, "a string")),
        None if object.contains_key(MATRIX_NAME) => Kind::Leaf,
        None => Kind::BinaryOp,
    };

    match kind {
        Kind::Leaf => {
            let name = required(object, path, MATRIX_NAME)?
                .as_str()
                .ok_or_else(|| invalid(path, MATRIX_NAME, "a string"))?;
            let shape = decode_shape(required(object, path, SIZE)?, &child_path(path, SIZE))?;

            Ok(Node::Leaf(Leaf {
                name: name.into(),
                shape,
            }))
        }
        Kind::BinaryOp => {
            let op_token = required(object, path, OP)?
                .as_str()
                .ok_or_else(|| invalid(path, OP, "a string"))?;
            let op = op_token
                .parse::<Operator>()
                .map_err(|op| DecodeError::UnknownOperator {
                    path: path.to_string(),
                    op: op.to_string(),
                })?;
            let left = decode_node(required(object, path, LEFT)?, &child_path(path, LEFT), depth + 1)?;
            let right = decode_node(required(object, path, RIGHT)?, &child_path(path, RIGHT), depth + 1)?;
            let shape = decode_shape(required(object, path, SIZE)?, &child_path(path, SIZE))?;
            let op_count = required(object, path, SUB_TREE_COUNT_OPERATIONS)?
                .as_u64()
                .ok_or_else(|| invalid(path, SUB_TREE_COUNT_OPERATIONS, "a non-negative integer"))?;

            Ok(Node::BinaryOp(BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                shape,
                op_count,
            }))
        }
    }
}

fn decode_shape(value: &Value, path: &str) -> Result<Shape, DecodeError> {
    let object = value.as_object().ok_or_else(|| DecodeError::NotAnObject {
        path: path.to_string(),
    })?;

    let dimension = |field: &'static str| -> Result<usize, DecodeError> {
        required(object, path, field)?
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid(path, field, "a non-negative integer"))
    };

    Ok(Shape::new(dimension(ROWS)?, dimension(COLS)?))
}

fn required<'a>(object: &'a Map<String, Value>, path: &str, field: &'static str) -> Result<&'a Value, DecodeError> {
    object.get(field).ok_or_else(|| DecodeError::MissingField {
        path: path.to_string(),
        field,
    })
}

fn invalid(path: &str, field: &'static str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidField {
        path: path.to_string(),
        field,
        expected,
    }
}

fn child_path(path: &str, field: &str) -> String {
    format!("{}.{}", path, field)
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

/// Runs under the caller's deserializer, so its nesting limit applies
/// (128 for `serde_json::from_str`). Use [`decode_str`] for deep trees.
impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode(&value).map_err(serde::de::Error::custom)
    }
}
