use super::*;
use crate::Value;
use pretty_assertions::assert_eq;

fn constants(n: usize) -> Vec<Expr> {
    (0..n).map(|i| Expr::constant(i64::try_from(i).unwrap())).collect()
}

fn block_of(expr: &Expr) -> &Arc<BlockExpr> {
    expr.as_block().expect("expected a block")
}

fn assert_children_identical(block: &BlockExpr, args: &[Expr]) {
    assert_eq!(block.expression_count(), args.len());
    for (index, arg) in args.iter().enumerate() {
        assert!(
            Expr::ptr_eq(block.expression(index), arg),
            "child {index} is not the node passed in"
        );
    }
}

// Factory shape selection

#[test]
fn test_fixed_arity_factories() {
    let args = constants(5);

    let b2 = Expr::block2(args[0].clone(), args[1].clone()).unwrap();
    assert_eq!(block_of(&b2).shape(), BlockShape::Block2);
    assert_children_identical(block_of(&b2), &args[..2]);

    let b3 = Expr::block3(args[0].clone(), args[1].clone(), args[2].clone()).unwrap();
    assert_eq!(block_of(&b3).shape(), BlockShape::Block3);
    assert_children_identical(block_of(&b3), &args[..3]);

    let b4 = Expr::block4(
        args[0].clone(),
        args[1].clone(),
        args[2].clone(),
        args[3].clone(),
    )
    .unwrap();
    assert_eq!(block_of(&b4).shape(), BlockShape::Block4);
    assert_children_identical(block_of(&b4), &args[..4]);

    let b5 = Expr::block5(
        args[0].clone(),
        args[1].clone(),
        args[2].clone(),
        args[3].clone(),
        args[4].clone(),
    )
    .unwrap();
    assert_eq!(block_of(&b5).shape(), BlockShape::Block5);
    assert_children_identical(block_of(&b5), &args);
}

#[test]
fn test_sequence_factory_picks_smallest_shape() {
    let expected = [
        (1, BlockShape::BlockN),
        (2, BlockShape::Block2),
        (3, BlockShape::Block3),
        (4, BlockShape::Block4),
        (5, BlockShape::Block5),
        (6, BlockShape::BlockN),
        (11, BlockShape::BlockN),
    ];
    for (count, shape) in expected {
        let args = constants(count);
        let expr = Expr::block(args.clone()).unwrap();
        let block = block_of(&expr);
        assert_eq!(block.shape(), shape, "shape for {count} expressions");
        assert_children_identical(block, &args);
        assert_eq!(block.variable_count(), 0);
        assert!(block.get_or_make_variables().is_empty());
    }
}

#[test]
fn test_scope_factory_shapes() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let y = ParameterExpr::variable("y", TypeId::STR);

    let single = Expr::scope([x.clone()], [Expr::from(&x)]).unwrap();
    let single = block_of(&single);
    assert_eq!(single.shape(), BlockShape::Scope1);
    assert_eq!(single.expression_count(), 1);
    assert_eq!(single.variable_count(), 1);
    assert!(Arc::ptr_eq(single.variable(0), &x));

    // Two body expressions would be a Block2 without variables; with them
    // the node must be a scope.
    let body = vec![Expr::from(&x), Expr::from(&y)];
    let multi = Expr::scope([x.clone(), y.clone()], body.clone()).unwrap();
    let multi = block_of(&multi);
    assert_eq!(multi.shape(), BlockShape::ScopeN);
    assert_children_identical(multi, &body);
    assert_eq!(multi.variable_count(), 2);
    assert!(Arc::ptr_eq(multi.variable(1), &y));
}

#[test]
fn test_scope_without_variables_is_a_block() {
    let expr = Expr::scope(Vec::new(), constants(3)).unwrap();
    assert_eq!(block_of(&expr).shape(), BlockShape::Block3);
}

// Validation

#[test]
fn test_empty_sequence_rejected() {
    let err = Expr::block(Vec::new()).unwrap_err();
    assert_eq!(
        err,
        ExprError::EmptySequence {
            param: "expressions"
        }
    );
    assert!(err.is_invalid_argument());

    let x = ParameterExpr::variable("x", TypeId::INT);
    let err = Expr::scope([x], Vec::new()).unwrap_err();
    assert_eq!(err, ExprError::EmptySequence { param: "body" });
}

#[test]
fn test_unreadable_child_rejected() {
    let err = Expr::block2(Expr::constant(1), Expr::placeholder(TypeId::INT)).unwrap_err();
    assert_eq!(
        err,
        ExprError::Unreadable {
            param: "args",
            index: 1,
            kind: crate::ExprKind::Placeholder,
        }
    );

    let mut args = constants(7);
    args[4] = Expr::placeholder(TypeId::INT);
    let err = Expr::block(args).unwrap_err();
    assert!(matches!(err, ExprError::Unreadable { index: 4, .. }));
}

#[test]
fn test_by_ref_variable_rejected() {
    let out = ParameterExpr::by_ref("out", TypeId::INT);
    let err = Expr::scope([out], constants(1)).unwrap_err();
    assert_eq!(
        err,
        ExprError::ByRefVariable {
            index: 0,
            name: "out".to_owned()
        }
    );
    assert!(err.to_string().contains("by-reference"));
}

#[test]
fn test_duplicate_variable_rejected() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let err = Expr::scope([x.clone(), x], constants(1)).unwrap_err();
    assert_eq!(
        err,
        ExprError::DuplicateVariable {
            index: 1,
            name: "x".to_owned()
        }
    );
}

#[test]
fn test_same_name_distinct_variables_allowed() {
    let a = ParameterExpr::variable("x", TypeId::INT);
    let b = ParameterExpr::variable("x", TypeId::INT);
    assert!(Expr::scope([a, b], constants(1)).is_ok());
}

// Indexing and result type

#[test]
#[should_panic(expected = "out of range")]
fn test_fixed_arity_index_out_of_range_panics() {
    let expr = Expr::block3(Expr::constant(1), Expr::constant(2), Expr::constant(3)).unwrap();
    let _ = block_of(&expr).expression(3);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_variable_arity_index_out_of_range_panics() {
    let expr = Expr::block(constants(7)).unwrap();
    let _ = block_of(&expr).expression(7);
}

#[test]
fn test_result_type_is_last_child_type() {
    let expr = Expr::block3(Expr::constant(1), Expr::constant(true), Expr::constant("s")).unwrap();
    let block = block_of(&expr);
    assert_eq!(expr.ty(), TypeId::STR);
    assert!(Expr::ptr_eq(block.result(), block.expression(2)));

    let x = ParameterExpr::variable("x", TypeId::FLOAT);
    let scope = Expr::scope([x.clone()], [Expr::from(x)]).unwrap();
    assert_eq!(scope.ty(), TypeId::FLOAT);
}

#[test]
fn test_nested_block_type() {
    let inner = Expr::block2(Expr::constant(1), Expr::constant(2.5)).unwrap();
    let outer = Expr::block2(Expr::constant("a"), inner).unwrap();
    assert_eq!(outer.ty(), TypeId::FLOAT);
}

// Views

#[test]
fn test_view_is_lazy_and_cached() {
    let expr = Expr::block(constants(4)).unwrap();
    let block = block_of(&expr);
    assert!(!block.has_materialized_expressions());

    let first = block.get_or_make_expressions();
    assert!(block.has_materialized_expressions());
    let second = block.get_or_make_expressions();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_view_for_every_shape() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let exprs = [
        Expr::block(constants(1)).unwrap(),
        Expr::block(constants(2)).unwrap(),
        Expr::block(constants(5)).unwrap(),
        Expr::block(constants(9)).unwrap(),
        Expr::scope([x.clone()], constants(1)).unwrap(),
        Expr::scope([x], constants(3)).unwrap(),
    ];
    for expr in &exprs {
        let block = block_of(expr);
        let view = block.get_or_make_expressions();
        assert_eq!(view.len(), block.expression_count());
        for (index, child) in view.iter().enumerate() {
            assert!(Expr::ptr_eq(&child, block.expression(index)));
        }
    }
}

// Rewrite

#[test]
fn test_rewrite_with_own_children_keeps_shape() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let exprs = [
        Expr::block(constants(1)).unwrap(),
        Expr::block(constants(2)).unwrap(),
        Expr::block(constants(3)).unwrap(),
        Expr::block(constants(4)).unwrap(),
        Expr::block(constants(5)).unwrap(),
        Expr::block(constants(8)).unwrap(),
        Expr::scope([x.clone()], constants(1)).unwrap(),
        Expr::scope([x.clone()], constants(6)).unwrap(),
    ];
    for expr in &exprs {
        let block = block_of(expr);
        let args: Vec<Expr> = block.iter_expressions().cloned().collect();
        let variables = block
            .is_scope()
            .then(|| block.get_or_make_variables().to_vec());

        let rebuilt = block.rewrite(variables, args.clone());
        let rebuilt_block = block_of(&rebuilt);
        assert_eq!(rebuilt_block.shape(), block.shape());
        assert_eq!(rebuilt_block.variable_count(), block.variable_count());
        assert_children_identical(rebuilt_block, &args);
        assert!(!Expr::ptr_eq(&rebuilt, expr));
    }
}

#[test]
fn test_rewrite_keeps_variables_when_none() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let expr = Expr::scope([x.clone()], [Expr::from(&x), Expr::constant(1)]).unwrap();
    let rebuilt = block_of(&expr).rewrite(None, constants(2));
    assert!(Arc::ptr_eq(block_of(&rebuilt).variable(0), &x));
}

#[test]
fn test_rewrite_replaces_variables() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let y = ParameterExpr::variable("y", TypeId::INT);
    let expr = Expr::scope([x], constants(1)).unwrap();
    let rebuilt = block_of(&expr).rewrite(Some(vec![y.clone()]), constants(1));
    assert!(Arc::ptr_eq(block_of(&rebuilt).variable(0), &y));
    assert_eq!(block_of(&rebuilt).shape(), BlockShape::Scope1);
}

#[test]
fn test_rewrite_last_child_changes_type() {
    let expr = Expr::block2(Expr::constant(1), Expr::constant(2)).unwrap();
    assert_eq!(expr.ty(), TypeId::INT);

    let block = block_of(&expr);
    let rebuilt = block.rewrite(None, vec![block.expression(0).clone(), Expr::constant("s")]);
    assert_eq!(rebuilt.ty(), TypeId::STR);
}

#[test]
#[should_panic(expected = "expression count")]
fn test_rewrite_count_mismatch_panics() {
    let expr = Expr::block(constants(3)).unwrap();
    let _ = block_of(&expr).rewrite(None, constants(4));
}

#[test]
#[should_panic(expected = "variable count")]
fn test_rewrite_variable_count_mismatch_panics() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let expr = Expr::scope([x], constants(2)).unwrap();
    let _ = block_of(&expr).rewrite(Some(Vec::new()), constants(2));
}

// Update

#[test]
fn test_update_returns_same_node_when_unchanged() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let body = vec![Expr::from(&x), Expr::constant(1)];
    let expr = Expr::scope([x.clone()], body.clone()).unwrap();

    let updated = block_of(&expr).update(vec![x], body).unwrap();
    assert!(Expr::ptr_eq(&updated, &expr));
}

#[test]
fn test_update_rebuilds_and_validates() {
    let expr = Expr::block(constants(2)).unwrap();
    let block = block_of(&expr);

    let updated = block.update(Vec::new(), constants(3)).unwrap();
    assert_eq!(block_of(&updated).shape(), BlockShape::Block3);

    let err = block.update(Vec::new(), Vec::new()).unwrap_err();
    assert!(err.is_invalid_argument());
}

// Formatting

#[test]
fn test_display() {
    let x = ParameterExpr::variable("x", TypeId::INT);
    let y = ParameterExpr::variable("y", TypeId::INT);
    let inner = Expr::block2(Expr::from(&x), Expr::constant(Value::Null)).unwrap();
    let scope = Expr::scope([x, y], [inner, Expr::constant(2)]).unwrap();

    assert_eq!(
        scope.to_string(),
        "(scope [x y] (block (param x) (const null)) (const 2))"
    );
}

#[test]
fn test_debug_lists_shape() {
    let expr = Expr::block(constants(2)).unwrap();
    let debug = format!("{expr:?}");
    assert!(debug.contains("BlockExpr"));
    assert!(debug.contains("Block2"));
}
