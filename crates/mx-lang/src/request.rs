use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    ast::{node::Name, parse_expr},
    error::Error,
    leaves::leaf_names,
    matrix::Matrix,
};

/// An expression plus the matrices its operand names refer to.
///
/// Sent as one unit to the remote `solveProblem` operation.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Request {
    #[serde(rename = "Expr")]
    expr: String,
    #[serde(rename = "Matrixes", default)]
    operands: FxHashMap<String, Matrix>,
}

impl Request {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            operands: FxHashMap::default(),
        }
    }

    pub fn with_operand(mut self, name: impl Into<String>, matrix: Matrix) -> Self {
        self.operands.insert(name.into(), matrix);
        self
    }

    pub fn with_operands(mut self, operands: impl IntoIterator<Item = (String, Matrix)>) -> Self {
        self.operands.extend(operands);
        self
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn operands(&self) -> &FxHashMap<String, Matrix> {
        &self.operands
    }

    pub fn operand(&self, name: &str) -> Option<&Matrix> {
        self.operands.get(name)
    }

    /// Operand names the expression references but the request does not bind, sorted.
    pub fn missing_operands(&self) -> Result<Vec<Name>, Error> {
        let tree = parse_expr(&self.expr).map_err(|e| Error::from_error(&self.expr, e))?;
        let mut missing = leaf_names(&tree)
            .into_iter()
            .filter(|name| !self.operands.contains_key(name.as_str()))
            .collect::<Vec<_>>();
        missing.sort();

        Ok(missing)
    }
}
