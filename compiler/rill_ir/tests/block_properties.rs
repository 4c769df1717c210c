//! Property-based tests for block construction and rewriting.
//!
//! For any number of children the factories must pick the expected shape,
//! keep every child by identity, and report the last child's type; rewriting
//! a block with its own children must reproduce the same shape.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use rill_ir::{BlockShape, Expr, ParameterExpr, TypeId};

fn leaf_strategy() -> impl Strategy<Value = Expr> {
    prop_oneof![
        any::<i64>().prop_map(Expr::constant),
        any::<bool>().prop_map(Expr::constant),
        "[a-z]{0,6}".prop_map(Expr::constant),
        (-1.0e6..1.0e6f64).prop_map(Expr::constant),
    ]
}

fn expected_shape(count: usize, has_variables: bool) -> BlockShape {
    match (has_variables, count) {
        (true, 1) => BlockShape::Scope1,
        (true, _) => BlockShape::ScopeN,
        (false, 2) => BlockShape::Block2,
        (false, 3) => BlockShape::Block3,
        (false, 4) => BlockShape::Block4,
        (false, 5) => BlockShape::Block5,
        (false, _) => BlockShape::BlockN,
    }
}

proptest! {
    #[test]
    fn block_keeps_children_by_identity(args in prop::collection::vec(leaf_strategy(), 1..24)) {
        let expr = Expr::block(args.clone()).unwrap();
        let block = expr.as_block().unwrap();

        prop_assert_eq!(block.shape(), expected_shape(args.len(), false));
        prop_assert_eq!(block.expression_count(), args.len());
        for (index, arg) in args.iter().enumerate() {
            prop_assert!(Expr::ptr_eq(block.expression(index), arg));
        }
        prop_assert_eq!(expr.ty(), args[args.len() - 1].ty());
    }

    #[test]
    fn scope_shape_depends_on_body_count(
        args in prop::collection::vec(leaf_strategy(), 1..12),
        variable_count in 1usize..4,
    ) {
        let variables: Vec<_> = (0..variable_count)
            .map(|i| ParameterExpr::variable(&format!("v{i}"), TypeId::INT))
            .collect();
        let expr = Expr::scope(variables, args.clone()).unwrap();
        let block = expr.as_block().unwrap();

        prop_assert_eq!(block.shape(), expected_shape(args.len(), true));
        prop_assert_eq!(block.expression_count(), args.len());
        prop_assert_eq!(block.variable_count(), variable_count);
    }

    #[test]
    fn rewrite_with_own_children_keeps_shape(
        args in prop::collection::vec(leaf_strategy(), 1..12),
        with_variable in any::<bool>(),
    ) {
        let variables: Vec<_> = if with_variable {
            vec![ParameterExpr::variable("v", TypeId::INT)]
        } else {
            Vec::new()
        };
        let expr = Expr::scope(variables, args).unwrap();
        let block = expr.as_block().unwrap();

        let own: Vec<Expr> = block.iter_expressions().cloned().collect();
        let rebuilt = block.rewrite(None, own);
        let rebuilt_block = rebuilt.as_block().unwrap();

        prop_assert_eq!(rebuilt_block.shape(), block.shape());
        prop_assert_eq!(rebuilt_block.expression_count(), block.expression_count());
        prop_assert_eq!(rebuilt_block.variable_count(), block.variable_count());
    }

    #[test]
    fn view_matches_indexer(args in prop::collection::vec(leaf_strategy(), 1..16)) {
        let expr = Expr::block(args).unwrap();
        let block = expr.as_block().unwrap();
        let view = block.get_or_make_expressions();

        prop_assert!(std::ptr::eq(view, block.get_or_make_expressions()));
        prop_assert_eq!(view.len(), block.expression_count());
        for (index, child) in view.iter().enumerate() {
            prop_assert!(Expr::ptr_eq(&child, block.expression(index)));
            prop_assert_eq!(view.index_of(&child).map(|found| found <= index), Some(true));
        }
    }
}
