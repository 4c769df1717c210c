//! Top-level scope storage.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{ScopeResult, ScopeVariable, ScopeVariableIgnoreCase};

/// Concurrent name-keyed variable store.
///
/// Records are keyed by the lowercased name and created on first lookup;
/// they are never removed. Deleting a value clears it but keeps the box,
/// so handles obtained earlier stay valid.
pub struct ScopeStorage<V> {
    records: Mutex<FxHashMap<Box<str>, Arc<ScopeVariableIgnoreCase<V>>>>,
}

impl<V> ScopeStorage<V> {
    pub fn new() -> Self {
        ScopeStorage {
            records: Mutex::new(FxHashMap::default()),
        }
    }

    /// Create storage pre-sized for `capacity` case-insensitive names.
    pub fn with_capacity(capacity: usize) -> Self {
        ScopeStorage {
            records: Mutex::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Resolve the variable for `name`, creating it if absent.
    ///
    /// With `ignore_case` the handle covers every casing of `name`;
    /// otherwise it is the box for exactly this casing.
    pub fn get_variable(&self, name: &str, ignore_case: bool) -> VariableHandle<V> {
        let record = self.record(name);
        if ignore_case {
            VariableHandle::IgnoreCase(record)
        } else {
            VariableHandle::Exact(record.case_sensitive_variable(name))
        }
    }

    /// Whether a record was ever created for any casing of `name`.
    pub fn has_variable(&self, name: &str) -> bool {
        self.records.lock().contains_key(name.to_lowercase().as_str())
    }

    pub fn has_value(&self, name: &str, ignore_case: bool) -> bool {
        self.get_variable(name, ignore_case).has_value()
    }

    pub fn set_value(&self, name: &str, value: V, ignore_case: bool) {
        self.get_variable(name, ignore_case).set_value(value);
    }

    pub fn delete_value(&self, name: &str, ignore_case: bool) -> bool {
        self.get_variable(name, ignore_case).delete_value()
    }

    /// Number of case-insensitive records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn record(&self, name: &str) -> Arc<ScopeVariableIgnoreCase<V>> {
        let key = name.to_lowercase();
        let mut records = self.records.lock();
        if let Some(record) = records.get(key.as_str()) {
            return Arc::clone(record);
        }

        tracing::trace!(name, "creating scope record");
        let record = Arc::new(ScopeVariableIgnoreCase::new(name));
        records.insert(key.into_boxed_str(), Arc::clone(&record));
        record
    }

    fn snapshot(&self) -> Vec<Arc<ScopeVariableIgnoreCase<V>>> {
        self.records.lock().values().map(Arc::clone).collect()
    }

    /// Every casing, across every name, that currently holds a value.
    ///
    /// Order is unspecified.
    pub fn get_member_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .flat_map(|record| record.casings())
            .filter(|variable| variable.has_value())
            .map(|variable| variable.name().to_owned())
            .collect()
    }
}

impl<V: Clone> ScopeStorage<V> {
    /// Read the value for `name`; see [`VariableHandle::get_value`].
    pub fn get_value(&self, name: &str, ignore_case: bool) -> ScopeResult<V> {
        self.get_variable(name, ignore_case).get_value()
    }

    pub fn try_get_value(&self, name: &str, ignore_case: bool) -> Option<V> {
        self.get_variable(name, ignore_case).try_get_value()
    }

    /// `(casing, value)` for every casing currently holding a value.
    ///
    /// Order is unspecified.
    pub fn get_items(&self) -> Vec<(String, V)> {
        self.snapshot()
            .iter()
            .flat_map(|record| record.items())
            .collect()
    }
}

impl<V> Default for ScopeStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for ScopeStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStorage")
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

/// A resolved variable: one exact casing, or every casing of a name.
pub enum VariableHandle<V> {
    Exact(Arc<ScopeVariable<V>>),
    IgnoreCase(Arc<ScopeVariableIgnoreCase<V>>),
}

impl<V> VariableHandle<V> {
    /// The exact casing, or the record's first casing.
    pub fn name(&self) -> &str {
        match self {
            VariableHandle::Exact(variable) => variable.name(),
            VariableHandle::IgnoreCase(record) => record.first_casing(),
        }
    }

    #[inline]
    pub fn is_ignore_case(&self) -> bool {
        matches!(self, VariableHandle::IgnoreCase(_))
    }

    pub fn has_value(&self) -> bool {
        match self {
            VariableHandle::Exact(variable) => variable.has_value(),
            VariableHandle::IgnoreCase(record) => record.has_value(),
        }
    }

    pub fn set_value(&self, value: V) {
        match self {
            VariableHandle::Exact(variable) => variable.set_value(value),
            VariableHandle::IgnoreCase(record) => record.set_value(value),
        }
    }

    /// Clear the value (every casing, for an ignore-case handle).
    pub fn delete_value(&self) -> bool {
        match self {
            VariableHandle::Exact(variable) => variable.delete_value(),
            VariableHandle::IgnoreCase(record) => record.delete_value(),
        }
    }

    /// Whether two handles resolve to the same box or record.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (VariableHandle::Exact(a), VariableHandle::Exact(b)) => Arc::ptr_eq(a, b),
            (VariableHandle::IgnoreCase(a), VariableHandle::IgnoreCase(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<V: Clone> VariableHandle<V> {
    pub fn try_get_value(&self) -> Option<V> {
        match self {
            VariableHandle::Exact(variable) => variable.try_get_value(),
            VariableHandle::IgnoreCase(record) => record.try_get_value(),
        }
    }

    /// Read the value, failing with [`ScopeError::NotFound`] when unset.
    ///
    /// [`ScopeError::NotFound`]: crate::ScopeError::NotFound
    pub fn get_value(&self) -> ScopeResult<V> {
        match self {
            VariableHandle::Exact(variable) => variable.get_value(),
            VariableHandle::IgnoreCase(record) => record.get_value(),
        }
    }
}

impl<V> Clone for VariableHandle<V> {
    fn clone(&self) -> Self {
        match self {
            VariableHandle::Exact(variable) => VariableHandle::Exact(Arc::clone(variable)),
            VariableHandle::IgnoreCase(record) => VariableHandle::IgnoreCase(Arc::clone(record)),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for VariableHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableHandle::Exact(variable) => f.debug_tuple("Exact").field(variable).finish(),
            VariableHandle::IgnoreCase(record) => f.debug_tuple("IgnoreCase").field(record).finish(),
        }
    }
}
