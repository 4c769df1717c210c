//! Block and scope nodes.
//!
//! A block evaluates its children in order and produces the value of the
//! last one. Most blocks in real programs are tiny, so the node comes in
//! size-specialized shapes chosen at construction time:
//!
//! | Shape    | Children | Variables | Storage                        |
//! |----------|----------|-----------|--------------------------------|
//! | `Block2` | 2        | 0         | one field per child            |
//! | `Block3` | 3        | 0         | one field per child            |
//! | `Block4` | 4        | 0         | one field per child            |
//! | `Block5` | 5        | 0         | one field per child            |
//! | `BlockN` | 1, 6+    | 0         | first child + boxed tail       |
//! | `Scope1` | 1        | 1+        | boxed variables + one child    |
//! | `ScopeN` | 2+       | 1+        | boxed variables, first + tail  |
//!
//! Fixed shapes never allocate a child array. In every shape the first
//! child lives in a [`ChildSlot`] so the block can hand out a cached
//! [`ExprListView`] on demand.
//!
//! # Rewriting
//!
//! [`BlockExpr::rewrite`] rebuilds a block with substituted children and
//! keeps the shape: the new argument count must equal the original's. It is
//! the primitive tree rewriters use; [`BlockExpr::update`] is the checked
//! variant for untrusted callers.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::list_view::ChildSlot;
use crate::{Expr, ExprError, ExprListView, ExprResult, ParamRef, ParameterExpr, TypeId};

/// Public name of a block's storage shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockShape {
    Block2,
    Block3,
    Block4,
    Block5,
    BlockN,
    Scope1,
    ScopeN,
}

impl BlockShape {
    /// Whether this shape declares variables.
    #[inline]
    pub fn is_scope(self) -> bool {
        matches!(self, BlockShape::Scope1 | BlockShape::ScopeN)
    }
}

enum Shape {
    Block2 {
        first: ChildSlot,
        arg1: Expr,
    },
    Block3 {
        first: ChildSlot,
        arg1: Expr,
        arg2: Expr,
    },
    Block4 {
        first: ChildSlot,
        arg1: Expr,
        arg2: Expr,
        arg3: Expr,
    },
    Block5 {
        first: ChildSlot,
        arg1: Expr,
        arg2: Expr,
        arg3: Expr,
        arg4: Expr,
    },
    BlockN {
        first: ChildSlot,
        rest: Box<[Expr]>,
    },
    Scope1 {
        variables: Box<[ParamRef]>,
        body: ChildSlot,
    },
    ScopeN {
        variables: Box<[ParamRef]>,
        first: ChildSlot,
        rest: Box<[Expr]>,
    },
}

/// Sequential evaluation node, optionally declaring local variables.
pub struct BlockExpr {
    shape: Shape,
}

impl BlockExpr {
    fn build(shape: Shape) -> Expr {
        Expr::Block(Arc::new(BlockExpr { shape }))
    }

    /// Storage shape selected at construction.
    pub fn shape(&self) -> BlockShape {
        match self.shape {
            Shape::Block2 { .. } => BlockShape::Block2,
            Shape::Block3 { .. } => BlockShape::Block3,
            Shape::Block4 { .. } => BlockShape::Block4,
            Shape::Block5 { .. } => BlockShape::Block5,
            Shape::BlockN { .. } => BlockShape::BlockN,
            Shape::Scope1 { .. } => BlockShape::Scope1,
            Shape::ScopeN { .. } => BlockShape::ScopeN,
        }
    }

    #[inline]
    pub fn is_scope(&self) -> bool {
        self.shape().is_scope()
    }

    fn slot(&self) -> &ChildSlot {
        match &self.shape {
            Shape::Block2 { first, .. }
            | Shape::Block3 { first, .. }
            | Shape::Block4 { first, .. }
            | Shape::Block5 { first, .. }
            | Shape::BlockN { first, .. }
            | Shape::ScopeN { first, .. } => first,
            Shape::Scope1 { body, .. } => body,
        }
    }

    /// Number of child expressions. At least one.
    pub fn expression_count(&self) -> usize {
        match &self.shape {
            Shape::Block2 { .. } => 2,
            Shape::Block3 { .. } => 3,
            Shape::Block4 { .. } => 4,
            Shape::Block5 { .. } => 5,
            Shape::Scope1 { .. } => 1,
            Shape::BlockN { rest, .. } | Shape::ScopeN { rest, .. } => rest.len() + 1,
        }
    }

    /// Child at `index`, read straight from storage.
    ///
    /// # Panics
    /// Panics if `index >= self.expression_count()`.
    pub fn expression(&self, index: usize) -> &Expr {
        match (&self.shape, index) {
            (_, 0) => self.slot().first(),
            (
                Shape::Block2 { arg1, .. }
                | Shape::Block3 { arg1, .. }
                | Shape::Block4 { arg1, .. }
                | Shape::Block5 { arg1, .. },
                1,
            ) => arg1,
            (
                Shape::Block3 { arg2, .. } | Shape::Block4 { arg2, .. } | Shape::Block5 { arg2, .. },
                2,
            ) => arg2,
            (Shape::Block4 { arg3, .. } | Shape::Block5 { arg3, .. }, 3) => arg3,
            (Shape::Block5 { arg4, .. }, 4) => arg4,
            (Shape::BlockN { rest, .. } | Shape::ScopeN { rest, .. }, index)
                if index <= rest.len() =>
            {
                &rest[index - 1]
            }
            _ => panic!(
                "expression index {index} out of range for a {:?} with {} expressions",
                self.shape(),
                self.expression_count()
            ),
        }
    }

    /// Children in order, without materializing the list view.
    pub fn iter_expressions(&self) -> impl ExactSizeIterator<Item = &Expr> + '_ {
        (0..self.expression_count()).map(move |index| self.expression(index))
    }

    /// The cached list view of the children, built on first request.
    ///
    /// Every call on the same block returns the same view instance, also
    /// when the first calls race on several threads.
    pub fn get_or_make_expressions(self: &Arc<Self>) -> &ExprListView {
        self.slot().get_or_promote(self, self.expression_count())
    }

    /// Whether the list view has been built.
    pub fn has_materialized_expressions(&self) -> bool {
        self.slot().is_promoted()
    }

    /// Number of declared variables. Zero for plain blocks.
    #[inline]
    pub fn variable_count(&self) -> usize {
        self.get_or_make_variables().len()
    }

    /// Declared variable at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.variable_count()`.
    pub fn variable(&self, index: usize) -> &ParamRef {
        &self.get_or_make_variables()[index]
    }

    /// The declared variables, empty for plain blocks.
    pub fn get_or_make_variables(&self) -> &[ParamRef] {
        match &self.shape {
            Shape::Scope1 { variables, .. } | Shape::ScopeN { variables, .. } => &variables[..],
            _ => &[],
        }
    }

    /// The last child, whose value is the value of the block.
    pub fn result(&self) -> &Expr {
        self.expression(self.expression_count() - 1)
    }

    /// Static type of the block: the type of its last child.
    pub fn ty(&self) -> TypeId {
        self.result().ty()
    }

    /// Rebuild this block with new children, keeping its shape.
    ///
    /// `variables` of `None` keeps the current declarations.
    ///
    /// # Panics
    /// Panics if `args.len()` differs from the expression count, or if
    /// `variables` is given with a different length than the current
    /// declarations. Both are caller bugs.
    pub fn rewrite(&self, variables: Option<Vec<ParamRef>>, args: Vec<Expr>) -> Expr {
        assert_eq!(
            args.len(),
            self.expression_count(),
            "rewrite must keep the expression count of the block"
        );
        if let Some(variables) = &variables {
            assert_eq!(
                variables.len(),
                self.variable_count(),
                "rewrite must keep the variable count of the block"
            );
        }

        let Some((first, rest)) = split_first(args) else {
            unreachable!("blocks hold at least one expression");
        };
        let shape = match &self.shape {
            Shape::Scope1 {
                variables: current,
                ..
            }
            | Shape::ScopeN {
                variables: current,
                ..
            } => {
                let variables = variables.map_or_else(|| current.clone(), Vec::into_boxed_slice);
                scope_shape(variables, first, rest)
            }
            _ => block_shape(first, rest),
        };
        BlockExpr::build(shape)
    }

    /// Return this block if nothing changed, otherwise a freshly validated one.
    pub fn update(
        self: &Arc<Self>,
        variables: Vec<ParamRef>,
        expressions: Vec<Expr>,
    ) -> ExprResult<Expr> {
        let current = self.get_or_make_variables();
        let same_variables = variables.len() == current.len()
            && variables
                .iter()
                .zip(current)
                .all(|(new, old)| Arc::ptr_eq(new, old));
        let same_expressions = expressions.len() == self.expression_count()
            && expressions
                .iter()
                .zip(self.iter_expressions())
                .all(|(new, old)| Expr::ptr_eq(new, old));

        if same_variables && same_expressions {
            return Ok(Expr::Block(Arc::clone(self)));
        }
        Expr::scope(variables, expressions)
    }
}

impl fmt::Debug for BlockExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expressions: Vec<&Expr> = self.iter_expressions().collect();
        f.debug_struct("BlockExpr")
            .field("shape", &self.shape())
            .field("variables", &self.get_or_make_variables())
            .field("expressions", &expressions)
            .finish()
    }
}

impl fmt::Display for BlockExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scope() {
            f.write_str("(scope [")?;
            for (i, variable) in self.get_or_make_variables().iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(variable.display_name())?;
            }
            f.write_str("]")?;
        } else {
            f.write_str("(block")?;
        }
        for expr in self.iter_expressions() {
            write!(f, " {expr}")?;
        }
        f.write_str(")")
    }
}

// Factories

impl Expr {
    /// Block of exactly two expressions.
    pub fn block2(arg0: Expr, arg1: Expr) -> ExprResult<Expr> {
        let args = [arg0, arg1];
        validate_readable("args", &args)?;
        let [arg0, arg1] = args;
        Ok(BlockExpr::build(Shape::Block2 {
            first: ChildSlot::new(arg0),
            arg1,
        }))
    }

    /// Block of exactly three expressions.
    pub fn block3(arg0: Expr, arg1: Expr, arg2: Expr) -> ExprResult<Expr> {
        let args = [arg0, arg1, arg2];
        validate_readable("args", &args)?;
        let [arg0, arg1, arg2] = args;
        Ok(BlockExpr::build(Shape::Block3 {
            first: ChildSlot::new(arg0),
            arg1,
            arg2,
        }))
    }

    /// Block of exactly four expressions.
    pub fn block4(arg0: Expr, arg1: Expr, arg2: Expr, arg3: Expr) -> ExprResult<Expr> {
        let args = [arg0, arg1, arg2, arg3];
        validate_readable("args", &args)?;
        let [arg0, arg1, arg2, arg3] = args;
        Ok(BlockExpr::build(Shape::Block4 {
            first: ChildSlot::new(arg0),
            arg1,
            arg2,
            arg3,
        }))
    }

    /// Block of exactly five expressions.
    pub fn block5(arg0: Expr, arg1: Expr, arg2: Expr, arg3: Expr, arg4: Expr) -> ExprResult<Expr> {
        let args = [arg0, arg1, arg2, arg3, arg4];
        validate_readable("args", &args)?;
        let [arg0, arg1, arg2, arg3, arg4] = args;
        Ok(BlockExpr::build(Shape::Block5 {
            first: ChildSlot::new(arg0),
            arg1,
            arg2,
            arg3,
            arg4,
        }))
    }

    /// Block of any non-empty sequence, picking the smallest shape.
    pub fn block<I>(expressions: I) -> ExprResult<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        let expressions: Vec<Expr> = expressions.into_iter().collect();
        validate_readable("expressions", &expressions)?;
        let (first, rest) =
            split_first(expressions).ok_or(ExprError::EmptySequence {
                param: "expressions",
            })?;
        Ok(BlockExpr::build(block_shape(first, rest)))
    }

    /// Block declaring `variables` around `body`.
    ///
    /// With no variables this is [`Expr::block`]. With any, the result is
    /// always a scope, even for a single body expression.
    pub fn scope<V, I>(variables: V, body: I) -> ExprResult<Expr>
    where
        V: IntoIterator<Item = ParamRef>,
        I: IntoIterator<Item = Expr>,
    {
        let variables: Vec<ParamRef> = variables.into_iter().collect();
        if variables.is_empty() {
            return Expr::block(body);
        }
        validate_variables(&variables)?;

        let body: Vec<Expr> = body.into_iter().collect();
        validate_readable("body", &body)?;
        let (first, rest) = split_first(body).ok_or(ExprError::EmptySequence { param: "body" })?;

        tracing::trace!(
            variables = variables.len(),
            expressions = rest.len() + 1,
            "building scope"
        );
        Ok(BlockExpr::build(scope_shape(
            variables.into_boxed_slice(),
            first,
            rest,
        )))
    }
}

fn split_first(exprs: Vec<Expr>) -> Option<(Expr, Vec<Expr>)> {
    let mut iter = exprs.into_iter();
    let first = iter.next()?;
    Some((first, iter.collect()))
}

fn block_shape(first: Expr, rest: Vec<Expr>) -> Shape {
    let first = ChildSlot::new(first);
    let rest = match <[Expr; 1]>::try_from(rest) {
        Ok([arg1]) => return Shape::Block2 { first, arg1 },
        Err(rest) => rest,
    };
    let rest = match <[Expr; 2]>::try_from(rest) {
        Ok([arg1, arg2]) => return Shape::Block3 { first, arg1, arg2 },
        Err(rest) => rest,
    };
    let rest = match <[Expr; 3]>::try_from(rest) {
        Ok([arg1, arg2, arg3]) => {
            return Shape::Block4 {
                first,
                arg1,
                arg2,
                arg3,
            }
        }
        Err(rest) => rest,
    };
    let rest = match <[Expr; 4]>::try_from(rest) {
        Ok([arg1, arg2, arg3, arg4]) => {
            return Shape::Block5 {
                first,
                arg1,
                arg2,
                arg3,
                arg4,
            }
        }
        Err(rest) => rest,
    };
    Shape::BlockN {
        first,
        rest: rest.into_boxed_slice(),
    }
}

fn scope_shape(variables: Box<[ParamRef]>, first: Expr, rest: Vec<Expr>) -> Shape {
    if rest.is_empty() {
        Shape::Scope1 {
            variables,
            body: ChildSlot::new(first),
        }
    } else {
        Shape::ScopeN {
            variables,
            first: ChildSlot::new(first),
            rest: rest.into_boxed_slice(),
        }
    }
}

fn validate_readable(param: &'static str, exprs: &[Expr]) -> ExprResult<()> {
    match exprs.iter().enumerate().find(|(_, expr)| !expr.can_read()) {
        Some((index, expr)) => Err(ExprError::Unreadable {
            param,
            index,
            kind: expr.kind(),
        }),
        None => Ok(()),
    }
}

fn validate_variables(variables: &[ParamRef]) -> ExprResult<()> {
    let mut seen: FxHashSet<*const ParameterExpr> = FxHashSet::default();
    for (index, variable) in variables.iter().enumerate() {
        if variable.is_by_ref() {
            return Err(ExprError::ByRefVariable {
                index,
                name: variable.display_name().to_owned(),
            });
        }
        if !seen.insert(Arc::as_ptr(variable)) {
            return Err(ExprError::DuplicateVariable {
                index,
                name: variable.display_name().to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
