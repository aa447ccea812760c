// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides `MockStore`, an in-memory store that records every operation
//! and supports failure injection for exercising error paths. It never expires entries
//! on its own; the policy passed to `set` is only recorded.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{Error, ExpirationPolicy, ExpiringStore, Result};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<V> {
    /// A lookup was performed for the given key.
    Get(String),
    /// A write was performed.
    Set {
        /// The key that was written.
        key: String,
        /// The value that was written.
        value: V,
        /// The policy requested for the entry.
        policy: ExpirationPolicy,
    },
    /// An invalidation was performed for the given key.
    Invalidate(String),
    /// A clear was performed.
    Clear,
}

type FailPredicate<V> = Box<dyn Fn(&StoreOp<V>) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// Clones share the same data, operation log, and failure predicate.
///
/// # Examples
///
/// ```
/// use memento_store::{
///     ExpirationPolicy, ExpiringStore,
///     testing::{MockStore, StoreOp},
/// };
///
/// let store = MockStore::<i32>::new();
/// store.set("key", 42, ExpirationPolicy::default()).unwrap();
/// assert_eq!(store.get("key").unwrap(), Some(42));
///
/// store.fail_when(|op| matches!(op, StoreOp::Get(k) if k == "forbidden"));
/// assert!(store.get("forbidden").is_err());
/// assert!(store.get("allowed").is_ok());
/// ```
pub struct MockStore<V> {
    data: Arc<Mutex<HashMap<String, V>>>,
    operations: Arc<Mutex<Vec<StoreOp<V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<V>>>>,
}

impl<V> std::fmt::Debug for MockStore<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<V> Clone for MockStore<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<V> Default for MockStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MockStore<V> {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// Failed operations are still recorded but leave the data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp<V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn should_fail(&self, op: &StoreOp<V>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }

    fn record(&self, op: StoreOp<V>) {
        self.operations.lock().push(op);
    }
}

impl<V: Clone> MockStore<V> {
    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<V>> {
        self.operations.lock().clone()
    }

    fn check(&self, op: StoreOp<V>, what: &'static str) -> Result<()> {
        let fail = self.should_fail(&op);
        self.record(op);
        if fail { Err(Error::store(what)) } else { Ok(()) }
    }
}

impl<V> ExpiringStore<V> for MockStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        self.check(StoreOp::Get(key.to_string()), "mock: get failed")?;
        Ok(self.data.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> Result<()> {
        self.check(
            StoreOp::Set {
                key: key.to_string(),
                value: value.clone(),
                policy,
            },
            "mock: set failed",
        )?;
        self.data.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        self.check(StoreOp::Invalidate(key.to_string()), "mock: invalidate failed")?;
        self.data.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check(StoreOp::Clear, "mock: clear failed")?;
        self.data.lock().clear();
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
