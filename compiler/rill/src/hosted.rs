//! Member-style access to scope storage.

use std::sync::Arc;

use rill_ir::{BlockExpr, Value};
use rill_scope::{ScopeResult, ScopeStorage, VariableHandle};

/// A scope exposed to a host as a bag of named members.
///
/// Cloning shares the underlying storage.
#[derive(Clone, Debug, Default)]
pub struct HostedScope {
    storage: Arc<ScopeStorage<Value>>,
}

impl HostedScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap storage that is also used elsewhere.
    pub fn from_storage(storage: Arc<ScopeStorage<Value>>) -> Self {
        HostedScope { storage }
    }

    #[inline]
    pub fn storage(&self) -> &Arc<ScopeStorage<Value>> {
        &self.storage
    }

    /// Read a member, deferring to `fallback` when it has no value.
    ///
    /// Names never seen before go straight to the fallback without creating
    /// a record.
    pub fn get_member(&self, name: &str, ignore_case: bool, fallback: impl FnOnce() -> Value) -> Value {
        if !self.storage.has_variable(name) {
            tracing::debug!(name, "member not defined; using fallback");
            return fallback();
        }
        self.storage
            .try_get_value(name, ignore_case)
            .unwrap_or_else(fallback)
    }

    /// Read a member, failing when it has no value.
    pub fn get_member_strict(&self, name: &str, ignore_case: bool) -> ScopeResult<Value> {
        self.storage.get_value(name, ignore_case)
    }

    pub fn set_member(&self, name: &str, value: impl Into<Value>, ignore_case: bool) {
        self.storage.set_value(name, value.into(), ignore_case);
    }

    /// Clear a member. Returns whether it held a value.
    pub fn delete_member(&self, name: &str, ignore_case: bool) -> bool {
        self.storage.has_variable(name) && self.storage.delete_value(name, ignore_case)
    }

    pub fn is_defined(&self, name: &str, ignore_case: bool) -> bool {
        self.storage.has_variable(name) && self.storage.has_value(name, ignore_case)
    }

    /// Names of every member holding a value, sorted.
    pub fn member_names(&self) -> Vec<String> {
        let mut names = self.storage.get_member_names();
        names.sort_unstable();
        names
    }

    /// Every member holding a value with its value, sorted by name.
    pub fn items(&self) -> Vec<(String, Value)> {
        let mut items = self.storage.get_items();
        items.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        items
    }

    /// Create storage for the named variables a scope declares.
    ///
    /// Returns one exact-casing handle per named variable, in declaration
    /// order. Anonymous variables have no member and are skipped. Plain
    /// blocks declare nothing.
    pub fn declare_variables(&self, block: &BlockExpr) -> Vec<VariableHandle<Value>> {
        let handles: Vec<_> = block
            .get_or_make_variables()
            .iter()
            .filter_map(|variable| variable.name())
            .map(|name| self.storage.get_variable(name, false))
            .collect();
        tracing::debug!(
            declared = handles.len(),
            variables = block.variable_count(),
            "declared scope variables"
        );
        handles
    }
}
