//! Rill Scope - Variable Storage
//!
//! Name-keyed storage for the variables of a hosted scope. A single store
//! serves both case-sensitive and case-insensitive lookups; the mode is
//! chosen per call, not per store.
//!
//! - [`ScopeStorage`] maps lowercased names to case-insensitive records
//! - [`ScopeVariableIgnoreCase`] groups every casing seen for one name
//! - [`ScopeVariable`] is the value box for one exact casing
//!
//! # Locking
//!
//! The storage guards its top-level map with one mutex. Each record guards
//! its own overflow map, and each box guards its own value, so unrelated
//! names never contend past the top-level lookup.
//!
//! # Debugging
//!
//! Record creation and overflow allocation emit `tracing` events:
//! `RUST_LOG=rill_scope=trace`.

mod error;
mod storage;
mod variable;

pub use error::{ScopeError, ScopeResult};
pub use storage::{ScopeStorage, VariableHandle};
pub use variable::{ScopeVariable, ScopeVariableIgnoreCase};
