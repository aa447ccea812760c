// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`MemoCache`].

use memento_store::{ExpirationPolicy, ExpiringStore};
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::MeterProvider;
use tick::Clock;

#[cfg(feature = "memory")]
use memento_memory::{InMemoryStore, InMemoryStoreBuilder};

use crate::{
    MemoCache,
    cache::{CacheName, StoredValue},
    telemetry::config::TelemetryConfig,
};

const DEFAULT_NAME: CacheName = "memento";

/// Builder for constructing a [`MemoCache`].
///
/// Created by calling [`MemoCache::builder`]. A store must be chosen with
/// [`memory`](Self::memory) or [`store`](Self::store) before the cache can be built.
///
/// # Examples
///
/// ```
/// use memento::MemoCache;
/// use tick::Clock;
///
/// let cache = MemoCache::builder(Clock::new_frozen())
///     .memory_with(|store| store.max_capacity(10_000))
///     .name("catalog")
///     .hit_count(true)
///     .build();
/// assert!(cache.hit_count_enabled());
/// ```
#[derive(Debug)]
pub struct MemoCacheBuilder<S = ()> {
    name: Option<CacheName>,
    store: S,
    clock: Clock,
    default_policy: ExpirationPolicy,
    hit_count: bool,
    telemetry: TelemetryConfig,
}

impl MemoCacheBuilder<()> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: None,
            store: (),
            clock,
            default_policy: ExpirationPolicy::default(),
            hit_count: false,
            telemetry: TelemetryConfig::new(),
        }
    }

    /// Sets a custom store for the cache.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # fn main() {
    /// use memento::{MemoCache, MockStore};
    /// use tick::Clock;
    ///
    /// let cache = MemoCache::builder(Clock::new_frozen()).store(MockStore::new()).build();
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    pub fn store<S>(self, store: S) -> MemoCacheBuilder<S>
    where
        S: ExpiringStore<StoredValue>,
    {
        MemoCacheBuilder {
            name: self.name,
            store,
            clock: self.clock,
            default_policy: self.default_policy,
            hit_count: self.hit_count,
            telemetry: self.telemetry,
        }
    }

    /// Uses an unbounded in-memory store driven by this builder's clock.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn memory(self) -> MemoCacheBuilder<InMemoryStore<StoredValue>> {
        self.memory_with(|store| store)
    }

    /// Uses an in-memory store, letting `configure` adjust its settings.
    ///
    /// The store's clock and name are preset from this builder.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn memory_with(
        self,
        configure: impl FnOnce(InMemoryStoreBuilder<StoredValue>) -> InMemoryStoreBuilder<StoredValue>,
    ) -> MemoCacheBuilder<InMemoryStore<StoredValue>> {
        let mut store = InMemoryStore::builder().clock(self.clock.clone());
        if let Some(name) = self.name {
            store = store.name(name);
        }
        let store = configure(store).build();
        self.store(store)
    }
}

impl<S> MemoCacheBuilder<S> {
    /// Sets the name used to identify this cache in telemetry.
    #[must_use]
    pub fn name(mut self, name: CacheName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the policy applied when a call does not specify one.
    ///
    /// Defaults to a one-hour sliding window.
    #[must_use]
    pub fn default_policy(mut self, policy: ExpirationPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Enables or disables request and execution counting. Disabled by default.
    #[must_use]
    pub fn hit_count(mut self, enabled: bool) -> Self {
        self.hit_count = enabled;
        self
    }

    /// Emits a `tracing` event for every cache decision.
    #[cfg(any(feature = "logs", test))]
    #[must_use]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry = self.telemetry.with_logs();
        self
    }

    /// Records event counts and producer durations with OpenTelemetry.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn enable_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_metrics(provider);
        self
    }
}

impl<S> MemoCacheBuilder<S>
where
    S: ExpiringStore<StoredValue>,
{
    /// Builds the configured cache.
    #[must_use]
    pub fn build(self) -> MemoCache<S> {
        MemoCache::new(
            self.name.unwrap_or(DEFAULT_NAME),
            self.store,
            self.clock,
            self.default_policy,
            self.hit_count,
            self.telemetry.build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use memento_store::testing::MockStore;

    use super::*;

    #[test]
    fn defaults() {
        let cache = MemoCache::builder(Clock::new_frozen()).store(MockStore::new()).build();
        assert_eq!(cache.name(), DEFAULT_NAME);
        assert_eq!(cache.default_policy(), ExpirationPolicy::default());
        assert!(!cache.hit_count_enabled());
    }

    #[test]
    fn settings_are_applied_regardless_of_order() {
        let policy = ExpirationPolicy::Sliding(Duration::from_secs(5));
        let cache = MemoCache::builder(Clock::new_frozen())
            .store(MockStore::new())
            .default_policy(policy)
            .hit_count(true)
            .name("ordered")
            .build();

        assert_eq!(cache.name(), "ordered");
        assert_eq!(cache.default_policy(), policy);
        assert!(cache.hit_count_enabled());
    }

    #[cfg(feature = "memory")]
    #[test]
    fn memory_store_uses_builder_clock() {
        let clock = Clock::new_frozen();
        let cache = MemoCache::builder(clock.clone()).memory().build();
        assert_eq!(cache.store().clock().system_time(), clock.system_time());
    }
}
