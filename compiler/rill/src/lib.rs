//! Rill - Expression Trees and Hosted Scopes
//!
//! Facade over the Rill runtime crates:
//! - [`rill_ir`]: expression nodes, blocks and scopes, traversal
//! - [`rill_scope`]: concurrent, case-aware variable storage
//!
//! plus [`HostedScope`], which binds a scope's variables to member
//! get/set/delete for a host object model.

mod hosted;

pub use hosted::HostedScope;
pub use rill_ir::visitor;
pub use rill_ir::{
    BlockExpr, BlockShape, ConstantExpr, Expr, ExprError, ExprKind, ExprListIter, ExprListView,
    ExprResult, ParamRef, ParameterExpr, PlaceholderExpr, TypeId, Value,
};
pub use rill_scope::{
    ScopeError, ScopeResult, ScopeStorage, ScopeVariable, ScopeVariableIgnoreCase, VariableHandle,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debugging.
///
/// Call this at the start of a host program or test to enable tracing
/// output. Set `RUST_LOG` to control the filter:
///
/// ```bash
/// RUST_LOG=rill_ir=trace,rill_scope=debug cargo test
/// ```
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
