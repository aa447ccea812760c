// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.
//!
//! Entries are kept as [`StoreEntry`] values so that each one carries its own
//! [`ExpirationPolicy`]. Expired entries are removed as soon as a lookup observes them.

use memento_store::{ExpirationPolicy, ExpiringStore, Result, StoreEntry};
use moka::{
    ops::compute::{CompResult, Op},
    sync::Cache,
};
use thread_aware::{Arc, PerProcess};
use tick::Clock;

use crate::builder::InMemoryStoreBuilder;

/// An in-memory expiring store backed by moka.
///
/// Clones share the same underlying entries.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use memento_memory::InMemoryStore;
/// use memento_store::{ExpirationPolicy, ExpiringStore};
/// use tick::ClockControl;
///
/// let control = ClockControl::new();
/// let store = InMemoryStore::<&str>::builder().clock(control.to_clock()).build();
///
/// store.set("greeting", "hello", ExpirationPolicy::Sliding(Duration::from_secs(60))).unwrap();
///
/// control.advance(Duration::from_secs(45));
/// assert_eq!(store.get("greeting").unwrap(), Some("hello"));
///
/// control.advance(Duration::from_secs(45));
/// assert_eq!(store.get("greeting").unwrap(), Some("hello"));
///
/// control.advance(Duration::from_secs(61));
/// assert_eq!(store.get("greeting").unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<String, StoreEntry<V>>, PerProcess>,
    clock: Clock,
}

impl<V> Default for InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new unbounded store that reads time from the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new builder for configuring an in-memory store.
    #[must_use]
    pub fn builder() -> InMemoryStoreBuilder<V> {
        InMemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: InMemoryStoreBuilder<V>) -> Self {
        let clock = builder.clock.unwrap_or_else(system_clock);
        let mut moka_builder = Cache::builder().expire_after(crate::expiry::PolicyExpiry::new(clock.clone()));

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: Arc::from_unaware(moka_builder.build()),
            clock,
        }
    }

    /// Returns the clock used to evaluate expiration.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

fn system_clock() -> Clock {
    tick::runtime::InactiveClock::default().activate().0
}

impl<V> ExpiringStore<V> for InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        let now = self.clock.system_time();
        let result = self.inner.entry_by_ref(key).and_compute_with(|current| match current {
            None => Op::Nop,
            Some(current) if current.value().is_expired(now) => Op::Remove,
            Some(current) if current.value().policy().is_sliding() => {
                let mut touched = current.into_value();
                touched.touch(now);
                Op::Put(touched)
            }
            Some(_) => Op::Nop,
        });

        Ok(match result {
            CompResult::Unchanged(entry) | CompResult::ReplacedWith(entry) | CompResult::Inserted(entry) => {
                Some(entry.into_value().into_value())
            }
            CompResult::Removed(_) | CompResult::StillNone(_) => None,
        })
    }

    fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> Result<()> {
        let entry = StoreEntry::new(value, policy, self.clock.system_time());
        self.inner.insert(key.to_string(), entry);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner.invalidate_all();
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        self.inner.run_pending_tasks();
        Some(self.inner.entry_count())
    }
}
