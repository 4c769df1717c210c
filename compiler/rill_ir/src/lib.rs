//! Rill IR - Expression Trees
//!
//! This crate contains the expression-tree node model of the Rill runtime:
//! - `Expr` handles and the leaf nodes (constants, parameters, placeholders)
//! - Size-specialized block and scope nodes (`BlockExpr`)
//! - Lazily materialized child views (`ExprListView`)
//! - `Visitor` and `Rewriter` traversal traits
//!
//! # Design Philosophy
//!
//! - **Immutable nodes**: a node never changes after construction; rewriting
//!   builds new nodes and shares every untouched subtree.
//! - **Pay for what you use**: small blocks store children as fields, and the
//!   collection view is only allocated when someone asks for it.
//! - **Identity matters**: children are compared by node identity, never by
//!   structure.
//!
//! # Debugging
//!
//! View promotion and block rebuilds emit `tracing` events at `trace` level:
//! `RUST_LOG=rill_ir=trace`.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod block;
mod error;
mod expr;
mod list_view;
mod stack;
mod type_id;
mod value;
pub mod visitor;

pub use block::{BlockExpr, BlockShape};
pub use error::{ExprError, ExprResult};
pub use expr::{ConstantExpr, Expr, ExprKind, ParamRef, ParameterExpr, PlaceholderExpr};
pub use list_view::{ExprListIter, ExprListView};
pub use type_id::TypeId;
pub use value::Value;

// Handles are a tag plus one pointer.
#[cfg(target_pointer_width = "64")]
static_assert_size!(Expr, 16);
