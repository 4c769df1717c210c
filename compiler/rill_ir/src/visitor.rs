//! Tree traversal.
//!
//! Two traits cover the two ways consumers walk a tree:
//!
//! - [`Visitor`] reads a tree. Override `visit_*` methods for the nodes you
//!   care about and call the matching `walk_*` function to keep descending.
//! - [`Rewriter`] rebuilds a tree. Each `rewrite_*` method returns the node
//!   to use in place of its input; returning the input handle unchanged
//!   keeps the original subtree. Blocks are only reconstructed (through
//!   [`BlockExpr::rewrite`]) when at least one child or variable changed.
//!
//! Both walks read children through [`BlockExpr::expression`] and never
//! force a block's list view into existence.
//!
//! # Example
//!
//! ```
//! use rill_ir::visitor::Visitor;
//! use rill_ir::{ConstantExpr, Expr};
//!
//! struct CountConstants(usize);
//!
//! impl<'ast> Visitor<'ast> for CountConstants {
//!     fn visit_constant(&mut self, _constant: &'ast ConstantExpr) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let tree = Expr::block2(Expr::constant(1), Expr::constant(2)).unwrap();
//! let mut counter = CountConstants(0);
//! tree.accept(&mut counter);
//! assert_eq!(counter.0, 2);
//! ```

use std::sync::Arc;

use crate::stack::ensure_sufficient_stack;
use crate::{BlockExpr, ConstantExpr, Expr, ParamRef, PlaceholderExpr};

/// Read-only tree visitor.
pub trait Visitor<'ast> {
    /// Visit any expression; dispatches on its kind.
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_constant(&mut self, constant: &'ast ConstantExpr) {
        let _ = constant;
    }

    /// Visit a parameter read in value position.
    fn visit_parameter(&mut self, parameter: &'ast ParamRef) {
        let _ = parameter;
    }

    fn visit_placeholder(&mut self, placeholder: &'ast PlaceholderExpr) {
        let _ = placeholder;
    }

    /// Visit a variable declaration of a scope.
    fn visit_variable(&mut self, variable: &'ast ParamRef) {
        let _ = variable;
    }

    fn visit_block(&mut self, block: &'ast Arc<BlockExpr>) {
        walk_block(self, block);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    expr.accept(visitor);
}

/// Visit a block's declarations, then its children in order.
pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &'ast Arc<BlockExpr>) {
    ensure_sufficient_stack(|| {
        for variable in block.get_or_make_variables() {
            visitor.visit_variable(variable);
        }
        for expr in block.iter_expressions() {
            visitor.visit_expr(expr);
        }
    });
}

/// Tree rewriter.
pub trait Rewriter {
    /// Rewrite any expression; dispatches on its kind.
    fn rewrite_expr(&mut self, expr: &Expr) -> Expr {
        walk_rewrite_expr(self, expr)
    }

    /// Rewrite a constant, parameter read, or placeholder.
    fn rewrite_leaf(&mut self, expr: &Expr) -> Expr {
        expr.clone()
    }

    /// Rewrite a scope's variable declaration.
    fn rewrite_variable(&mut self, variable: &ParamRef) -> ParamRef {
        Arc::clone(variable)
    }

    fn rewrite_block(&mut self, block: &Arc<BlockExpr>) -> Expr {
        walk_rewrite_block(self, block)
    }
}

pub fn walk_rewrite_expr<R: Rewriter + ?Sized>(rewriter: &mut R, expr: &Expr) -> Expr {
    match expr {
        Expr::Block(block) => rewriter.rewrite_block(block),
        Expr::Constant(_) | Expr::Parameter(_) | Expr::Placeholder(_) => rewriter.rewrite_leaf(expr),
    }
}

/// Rewrite a block's declarations and children.
///
/// Returns the original block handle when nothing changed.
pub fn walk_rewrite_block<R: Rewriter + ?Sized>(rewriter: &mut R, block: &Arc<BlockExpr>) -> Expr {
    ensure_sufficient_stack(|| {
        let variables: Vec<ParamRef> = block
            .get_or_make_variables()
            .iter()
            .map(|variable| rewriter.rewrite_variable(variable))
            .collect();
        let variables_changed = variables
            .iter()
            .zip(block.get_or_make_variables())
            .any(|(new, old)| !Arc::ptr_eq(new, old));

        let args: Vec<Expr> = block
            .iter_expressions()
            .map(|expr| rewriter.rewrite_expr(expr))
            .collect();
        let args_changed = args
            .iter()
            .zip(block.iter_expressions())
            .any(|(new, old)| !Expr::ptr_eq(new, old));

        if !variables_changed && !args_changed {
            return Expr::Block(Arc::clone(block));
        }

        tracing::trace!(
            shape = ?block.shape(),
            variables_changed,
            args_changed,
            "rebuilding block"
        );
        let variables = variables_changed.then_some(variables);
        block.rewrite(variables, args)
    })
}
