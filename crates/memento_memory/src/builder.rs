// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.
//!
//! This module provides a builder API for `InMemoryStore` that abstracts
//! the underlying moka configuration, providing a stable API surface
//! without exposing moka's types.

use std::marker::PhantomData;

use tick::Clock;

use crate::store::InMemoryStore;

/// Builder for configuring an `InMemoryStore`.
///
/// # Examples
///
/// ```
/// use memento_memory::InMemoryStore;
///
/// let store = InMemoryStore::<i32>::builder()
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .name("my-store")
///     .build();
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder<V> {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
    pub(crate) clock: Option<Clock>,
    _phantom: PhantomData<V>,
}

impl<V> Default for InMemoryStoreBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryStoreBuilder<V> {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded store that reads time from the
    /// system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_capacity: None,
            initial_capacity: None,
            name: None,
            clock: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// Once the capacity is reached, entries will be evicted to make room
    /// for new entries using the `TinyLFU` eviction policy. Evicted entries
    /// are simply recomputed on the next miss.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the store.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store.
    ///
    /// This name may appear in debugging output from the underlying cache implementation.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the clock that expiration is evaluated against.
    ///
    /// # Examples
    ///
    /// ```
    /// use memento_memory::InMemoryStore;
    /// use tick::Clock;
    ///
    /// let store = InMemoryStore::<i32>::builder().clock(Clock::new_frozen()).build();
    /// ```
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the configured `InMemoryStore`.
    #[must_use]
    pub fn build(self) -> InMemoryStore<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        InMemoryStore::from_builder(self)
    }
}
