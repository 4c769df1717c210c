//! Lazily materialized, read-only views over a block's children.
//!
//! A block keeps its first child in a [`ChildSlot`]. The slot starts out
//! holding only the child; the first caller that asks for the collection
//! view builds an [`ExprListView`] and publishes it into the slot. Racing
//! callers each build a candidate, but only one is ever published: losers
//! drop theirs and read the winner's. Blocks nobody asks for a view never
//! allocate one.
//!
//! The view does not copy children into a backing array. Index 0 is the
//! first child captured at promotion time; every other index is read back
//! through the owning block.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::{Arc, OnceLock, Weak};

use crate::{BlockExpr, Expr};

/// First-child storage that can be promoted to a shared view.
pub(crate) struct ChildSlot {
    first: Expr,
    view: OnceLock<ExprListView>,
}

impl ChildSlot {
    pub(crate) fn new(first: Expr) -> Self {
        ChildSlot {
            first,
            view: OnceLock::new(),
        }
    }

    #[inline]
    pub(crate) fn first(&self) -> &Expr {
        &self.first
    }

    /// Return the published view, promoting the slot if needed.
    ///
    /// `len` is the owner's expression count.
    pub(crate) fn get_or_promote(&self, owner: &Arc<BlockExpr>, len: usize) -> &ExprListView {
        if let Some(view) = self.view.get() {
            return view;
        }

        let candidate = ExprListView {
            owner: Arc::downgrade(owner),
            first: self.first.clone(),
            len,
        };
        let mut published = false;
        let view = self.view.get_or_init(|| {
            published = true;
            candidate
        });
        if published {
            tracing::trace!(len, "promoted block children to a list view");
        } else {
            tracing::trace!(len, "lost view promotion race; discarded candidate");
        }
        view
    }

    #[inline]
    pub(crate) fn is_promoted(&self) -> bool {
        self.view.get().is_some()
    }
}

/// Ordered, immutable view over the children of a block.
///
/// Obtained from [`BlockExpr::get_or_make_expressions`]; every call on the
/// same block returns this same instance. The view has no mutating methods.
pub struct ExprListView {
    owner: Weak<BlockExpr>,
    first: Expr,
    len: usize,
}

impl ExprListView {
    /// Number of children. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The first child, held directly by the view.
    #[inline]
    pub fn first(&self) -> &Expr {
        &self.first
    }

    /// Child at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<Expr> {
        if index == 0 {
            return Some(self.first.clone());
        }
        if index >= self.len {
            return None;
        }
        self.owner
            .upgrade()
            .map(|block| block.expression(index).clone())
    }

    /// Position of the node identical to `expr`, if it is a child.
    ///
    /// Matches by identity: a structurally equal but distinct node is not
    /// found.
    pub fn index_of(&self, expr: &Expr) -> Option<usize> {
        if Expr::ptr_eq(&self.first, expr) {
            return Some(0);
        }
        let block = self.owner.upgrade()?;
        (1..self.len).find(|&index| Expr::ptr_eq(block.expression(index), expr))
    }

    #[inline]
    pub fn contains(&self, expr: &Expr) -> bool {
        self.index_of(expr).is_some()
    }

    pub fn iter(&self) -> ExprListIter<'_> {
        ExprListIter {
            first: &self.first,
            owner: self.owner.upgrade(),
            index: 0,
            len: self.len,
        }
    }

    /// Copy the child handles into a fresh vector.
    pub fn to_vec(&self) -> Vec<Expr> {
        self.iter().collect()
    }
}

impl fmt::Debug for ExprListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ExprListView {
    type Item = Expr;
    type IntoIter = ExprListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over an [`ExprListView`].
pub struct ExprListIter<'a> {
    first: &'a Expr,
    owner: Option<Arc<BlockExpr>>,
    index: usize,
    len: usize,
}

impl Iterator for ExprListIter<'_> {
    type Item = Expr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let item = if self.index == 0 {
            self.first.clone()
        } else {
            self.owner.as_ref()?.expression(self.index).clone()
        };
        self.index += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ExprListIter<'_> {}

impl FusedIterator for ExprListIter<'_> {}
