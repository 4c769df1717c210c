//! Value boxes and case-insensitive records.
//!
//! A [`ScopeVariable`] holds the value for one exact spelling of a name.
//! A [`ScopeVariableIgnoreCase`] groups every spelling that lowercases to
//! the same key. The first spelling lives inline; the overflow map for
//! further spellings is allocated the first time a second spelling shows
//! up, which most names never do.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{ScopeError, ScopeResult};

/// Value box for one exact casing of a name.
///
/// An unset box is distinct from a box holding a null-like `V`.
pub struct ScopeVariable<V> {
    name: Box<str>,
    value: Mutex<Option<V>>,
}

impl<V> ScopeVariable<V> {
    /// Create an unset box.
    pub fn new(name: &str) -> Self {
        ScopeVariable {
            name: Box::from(name),
            value: Mutex::new(None),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.lock().is_some()
    }

    #[inline]
    pub fn set_value(&self, value: V) {
        *self.value.lock() = Some(value);
    }

    /// Clear the value. Returns whether one was present.
    #[inline]
    pub fn delete_value(&self) -> bool {
        self.value.lock().take().is_some()
    }
}

impl<V: Clone> ScopeVariable<V> {
    #[inline]
    pub fn try_get_value(&self) -> Option<V> {
        self.value.lock().clone()
    }

    pub fn get_value(&self) -> ScopeResult<V> {
        self.try_get_value()
            .ok_or_else(|| ScopeError::not_found(&self.name))
    }
}

impl<V: fmt::Debug> fmt::Debug for ScopeVariable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeVariable")
            .field("name", &self.name)
            .field("value", &*self.value.lock())
            .finish()
    }
}

type CasingMap<V> = FxHashMap<Box<str>, Arc<ScopeVariable<V>>>;

/// Every casing seen for one case-insensitive name.
///
/// Each casing is an independent [`ScopeVariable`]. Aggregate operations
/// read or clear across all of them.
pub struct ScopeVariableIgnoreCase<V> {
    first: Arc<ScopeVariable<V>>,
    overflow: OnceLock<Mutex<CasingMap<V>>>,
}

impl<V> ScopeVariableIgnoreCase<V> {
    /// Create a record whose inline casing is `first_casing`.
    pub fn new(first_casing: &str) -> Self {
        ScopeVariableIgnoreCase {
            first: Arc::new(ScopeVariable::new(first_casing)),
            overflow: OnceLock::new(),
        }
    }

    /// The casing this record was created with.
    #[inline]
    pub fn first_casing(&self) -> &str {
        self.first.name()
    }

    /// Number of distinct casings created so far.
    pub fn casing_count(&self) -> usize {
        1 + self.overflow.get().map_or(0, |overflow| overflow.lock().len())
    }

    /// Return the box for the exact casing `name`, creating it if needed.
    ///
    /// Repeated calls with the same casing return the same box.
    pub fn case_sensitive_variable(&self, name: &str) -> Arc<ScopeVariable<V>> {
        if self.first.name() == name {
            return Arc::clone(&self.first);
        }

        let overflow = self.overflow.get_or_init(|| {
            tracing::trace!(
                first = self.first.name(),
                second = name,
                "allocating casing overflow map"
            );
            Mutex::new(FxHashMap::default())
        });
        let mut casings = overflow.lock();
        let variable = casings
            .entry(Box::from(name))
            .or_insert_with(|| Arc::new(ScopeVariable::new(name)));
        Arc::clone(variable)
    }

    /// Whether any casing holds a value.
    pub fn has_value(&self) -> bool {
        self.holding_value().is_some()
    }

    /// Set the value on the casing that already holds one, or on the first
    /// casing if none does.
    pub fn set_value(&self, value: V) {
        let target = self.holding_value().unwrap_or_else(|| Arc::clone(&self.first));
        target.set_value(value);
    }

    /// Clear every casing. Returns whether any casing held a value.
    ///
    /// The casings themselves stay in the record and can be set again.
    pub fn delete_value(&self) -> bool {
        let mut cleared = self.first.delete_value();
        if let Some(overflow) = self.overflow.get() {
            for variable in overflow.lock().values() {
                cleared |= variable.delete_value();
            }
        }
        cleared
    }

    /// First casing found holding a value. Overflow casings are scanned in
    /// map order.
    fn holding_value(&self) -> Option<Arc<ScopeVariable<V>>> {
        if self.first.has_value() {
            return Some(Arc::clone(&self.first));
        }
        let overflow = self.overflow.get()?;
        overflow
            .lock()
            .values()
            .find(|variable| variable.has_value())
            .map(Arc::clone)
    }

    /// Snapshot of every casing, inline casing first.
    pub(crate) fn casings(&self) -> Vec<Arc<ScopeVariable<V>>> {
        let mut casings = vec![Arc::clone(&self.first)];
        if let Some(overflow) = self.overflow.get() {
            casings.extend(overflow.lock().values().map(Arc::clone));
        }
        casings
    }
}

impl<V: Clone> ScopeVariableIgnoreCase<V> {
    /// Value of the first casing found holding one.
    pub fn try_get_value(&self) -> Option<V> {
        if let Some(value) = self.first.try_get_value() {
            return Some(value);
        }
        let overflow = self.overflow.get()?;
        overflow
            .lock()
            .values()
            .find_map(|variable| variable.try_get_value())
    }

    pub fn get_value(&self) -> ScopeResult<V> {
        self.try_get_value()
            .ok_or_else(|| ScopeError::not_found(self.first_casing()))
    }

    /// `(casing, value)` for every casing currently holding a value.
    pub fn items(&self) -> Vec<(String, V)> {
        self.casings()
            .iter()
            .filter_map(|variable| {
                variable
                    .try_get_value()
                    .map(|value| (variable.name().to_owned(), value))
            })
            .collect()
    }
}

impl<V: fmt::Debug> fmt::Debug for ScopeVariableIgnoreCase<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.casings()).finish()
    }
}
