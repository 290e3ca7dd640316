//! Property-based tests for the mx-lang compiler and codec.
use mx_lang::{AnnotateOptions, MAX_DEPTH, Name, Node, Operator, Shape};
use proptest::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

mod strategies {
    use super::*;

    /// Generates operand names from a small pool so trees share leaves.
    pub fn name() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string),
            "[a-z_][a-z0-9_]{0,8}",
        ]
    }

    pub fn operator() -> impl Strategy<Value = Operator> {
        prop::sample::select(Operator::ALL.to_vec())
    }

    /// Generates unannotated trees up to depth 6.
    pub fn tree() -> impl Strategy<Value = Node> {
        name()
            .prop_map(Node::leaf)
            .prop_recursive(6, 64, 2, |inner| {
                (operator(), inner.clone(), inner).prop_map(|(op, left, right)| Node::binary(op, left, right))
            })
    }

    /// Generates trees hundreds of levels deep: a spine of operators where
    /// each step hangs a small subtree on the left or the right.
    pub fn deep_tree() -> impl Strategy<Value = Node> {
        let twig = name()
            .prop_map(Node::leaf)
            .prop_recursive(2, 4, 2, |inner| {
                (operator(), inner.clone(), inner).prop_map(|(op, left, right)| Node::binary(op, left, right))
            });

        (
            name(),
            prop::collection::vec((operator(), twig, any::<bool>()), 128..MAX_DEPTH - 8),
        )
            .prop_map(|(first, spine)| {
                spine.into_iter().fold(Node::leaf(first), |tree, (op, twig, grow_left)| {
                    if grow_left {
                        Node::binary(op, tree, twig)
                    } else {
                        Node::binary(op, twig, tree)
                    }
                })
            })
    }

    pub fn shape() -> impl Strategy<Value = Shape> {
        (0usize..40, 0usize..40).prop_map(|(rows, cols)| Shape::new(rows, cols))
    }

    /// A tree together with shapes for all of its operands.
    pub fn bound_tree() -> impl Strategy<Value = (Node, FxHashMap<String, Shape>)> {
        tree().prop_flat_map(|tree| {
            let names = mx_lang::leaf_names(&tree)
                .into_iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>();
            let shapes = prop::collection::vec(shape(), names.len());
            (Just(tree), Just(names), shapes)
                .prop_map(|(tree, names, shapes)| (tree, names.into_iter().zip(shapes).collect()))
        })
    }
}

fn annotated(tree: &Node, shapes: &FxHashMap<String, Shape>) -> Node {
    let mut tree = tree.clone();
    mx_lang::annotate(&mut tree, shapes, &AnnotateOptions::lenient()).unwrap();
    tree
}

proptest! {
    #[test]
    fn display_reparses_to_same_tree(tree in strategies::tree()) {
        let code = tree.to_string();
        prop_assert_eq!(mx_lang::parse(&code).unwrap(), tree);
    }

    #[test]
    fn codec_round_trips_unannotated(tree in strategies::tree()) {
        prop_assert_eq!(mx_lang::decode(&mx_lang::encode(&tree)).unwrap(), tree.clone());
        prop_assert_eq!(mx_lang::decode(&mx_lang::encode_untagged(&tree)).unwrap(), tree);
    }

    #[test]
    fn codec_round_trips_annotated((tree, shapes) in strategies::bound_tree()) {
        let tree = annotated(&tree, &shapes);
        let json = mx_lang::encode_to_string(&tree);
        prop_assert_eq!(mx_lang::decode_str(&json).unwrap(), tree);
    }

    #[test]
    fn annotation_is_idempotent((tree, shapes) in strategies::bound_tree()) {
        let once = annotated(&tree, &shapes);
        let twice = annotated(&once, &shapes);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn leaf_names_match_identifiers(tree in strategies::tree()) {
        let code = tree.to_string();
        let identifiers = mx_lang::tokenize(&code)
            .unwrap()
            .into_iter()
            .filter_map(|token| match token.kind {
                mx_lang::TokenKind::Ident(name) => Some(name),
                _ => None,
            })
            .collect::<FxHashSet<Name>>();

        prop_assert_eq!(mx_lang::leaf_names(&mx_lang::parse(&code).unwrap()), identifiers);
    }

    #[test]
    fn mul_cost_is_cubic(rows in 0usize..100, inner in 0usize..100, cols in 0usize..100) {
        let shapes = FxHashMap::from_iter([
            ("a".to_string(), Shape::new(rows, inner)),
            ("b".to_string(), Shape::new(inner, cols)),
        ]);
        let tree = mx_lang::compile("a*b", &shapes, &AnnotateOptions::default()).unwrap();

        prop_assert_eq!(tree.shape(), Shape::new(rows, cols));
        prop_assert_eq!(tree.op_count(), (rows * cols * inner) as u64);
    }

    #[test]
    fn op_count_sums_subtrees((tree, shapes) in strategies::bound_tree()) {
        let tree = annotated(&tree, &shapes);

        fn check(node: &Node) -> bool {
            match node {
                Node::Leaf(_) => node.op_count() == 0,
                Node::BinaryOp(op) => {
                    let weight = mx_lang::op_weight(op.op, op.left.shape(), op.right.shape()).unwrap();
                    op.op_count == weight + op.left.op_count() + op.right.op_count()
                        && check(&op.left)
                        && check(&op.right)
                }
            }
        }

        prop_assert!(check(&tree));
    }

    #[test]
    fn decode_never_panics(json in ".{0,64}") {
        let _ = mx_lang::decode_str(&json);
    }

    #[test]
    fn decode_rejects_dropped_fields(tree in strategies::tree(), index in any::<prop::sample::Index>()) {
        let mut value = mx_lang::encode(&tree);
        let object = value.as_object_mut().unwrap();
        let fields = object.keys().filter(|key| *key != "Kind").cloned().collect::<Vec<_>>();
        object.remove(&fields[index.index(fields.len())]);

        prop_assert!(mx_lang::decode(&value).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn deep_codec_round_trips(tree in strategies::deep_tree()) {
        prop_assert!(tree.depth() > 128);

        let json = mx_lang::encode_to_string(&tree);
        prop_assert_eq!(mx_lang::decode_str(&json).unwrap(), tree.clone());

        let untagged = serde_json::to_vec(&mx_lang::encode_untagged(&tree)).unwrap();
        prop_assert_eq!(mx_lang::decode_slice(&untagged).unwrap(), tree);
    }

    #[test]
    fn deep_display_reparses_to_same_tree(tree in strategies::deep_tree()) {
        let code = tree.to_string();
        prop_assert_eq!(mx_lang::parse(&code).unwrap(), tree);
    }
}
