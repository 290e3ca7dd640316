use tracing::{debug, warn};

use crate::{
    annotate::{Options, UnboundPolicy, annotate},
    ast::{
        node::{Name, Node},
        parse_expr,
    },
    codec,
    error::{Error, InnerError},
    leaves::leaf_names,
    request::Request,
    shape::Shape,
};

/// A compiled and annotated request, ready to be evaluated or split up.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    tree: Node,
    operands: Vec<Name>,
}

impl Plan {
    /// Parses the request expression, checks that every operand it names is
    /// bound, and annotates the tree with shapes and costs.
    pub fn compile(request: &Request, options: &Options) -> Result<Self, Error> {
        let expr = request.expr();
        let mut tree = parse_expr(expr).map_err(|e| Error::from_error(expr, e))?;
        let operands = sorted_names(&tree);

        if options.unbound == UnboundPolicy::Error {
            let missing = operands
                .iter()
                .filter(|name| request.operand(name).is_none())
                .cloned()
                .collect::<Vec<_>>();

            if !missing.is_empty() {
                warn!(expr, missing = ?missing, "Request does not bind every operand");
                return Err(Error::from_error(expr, InnerError::MissingOperands(missing)));
            }
        }

        annotate(&mut tree, request.operands(), options).map_err(|e| Error::from_error(expr, e))?;

        debug!(
            expr = %tree,
            shape = %tree.shape(),
            op_count = tree.op_count(),
            depth = tree.depth(),
            "Compiled request"
        );

        Ok(Self { tree, operands })
    }

    /// Rebuilds a plan from a tree fragment received over the wire.
    pub fn decode(json: &str) -> Result<Self, Error> {
        let tree = codec::decode_str(json).map_err(|e| Error::from_error(json, e))?;
        debug!(expr = %tree, op_count = tree.op_count(), "Decoded tree fragment");

        Ok(Self::from_tree(tree))
    }

    pub fn from_tree(tree: Node) -> Self {
        let operands = sorted_names(&tree);
        Self { tree, operands }
    }

    pub fn encode(&self) -> String {
        codec::encode_to_string(&self.tree)
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn into_tree(self) -> Node {
        self.tree
    }

    pub fn shape(&self) -> Shape {
        self.tree.shape()
    }

    pub fn op_count(&self) -> u64 {
        self.tree.op_count()
    }

    /// Distinct operand names, sorted.
    pub fn operands(&self) -> &[Name] {
        &self.operands
    }
}

fn sorted_names(tree: &Node) -> Vec<Name> {
    let mut names = leaf_names(tree).into_iter().collect::<Vec<_>>();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotate::AnnotateError, matrix::Matrix};

    fn request(expr: &str) -> Request {
        Request::new(expr)
            .with_operand("a", Matrix::zeros(2, 3))
            .with_operand("b", Matrix::zeros(3, 4))
            .with_operand("c", Matrix::zeros(2, 4))
    }

    #[test]
    fn test_compile() {
        let plan = Plan::compile(&request("(a*b)+c"), &Options::default()).unwrap();
        assert_eq!(plan.shape(), Shape::new(2, 4));
        assert_eq!(plan.op_count(), 32);
        assert_eq!(plan.operands(), &[Name::new("a"), Name::new("b"), Name::new("c")]);
    }

    #[test]
    fn test_compile_missing_operands() {
        let err = Plan::compile(&request("a*d+e"), &Options::default()).unwrap_err();
        assert!(matches!(
            err.cause,
            InnerError::MissingOperands(ref names) if names == &[Name::new("d"), Name::new("e")]
        ));
    }

    #[test]
    fn test_compile_lenient() {
        let plan = Plan::compile(&request("d+e"), &Options::lenient()).unwrap();
        assert_eq!(plan.shape(), Shape::ZERO);
        assert_eq!(plan.op_count(), 0);
    }

    #[test]
    fn test_compile_shape_mismatch() {
        let err = Plan::compile(&request("a+b"), &Options::default()).unwrap_err();
        assert!(matches!(
            err.cause,
            InnerError::Annotate(AnnotateError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_decode() {
        let plan = Plan::compile(&request("a*b-c"), &Options::default()).unwrap();
        let decoded = Plan::decode(&plan.encode()).unwrap();
        assert_eq!(decoded, plan);
    }

    #[test]
    fn test_encode_decode_long_chain() {
        let expr = vec!["c"; 200].join("+");
        let plan = Plan::compile(&request(&expr), &Options::default()).unwrap();
        assert_eq!(plan.op_count(), 199 * 8);

        let decoded = Plan::decode(&plan.encode()).unwrap();
        assert_eq!(decoded, plan);
    }

    #[test]
    fn test_decode_malformed() {
        let err = Plan::decode(r#"{"Kind": "BinaryOp", "Op": "POW"}"#).unwrap_err();
        assert!(matches!(err.cause, InnerError::Decode(_)));
    }
}
