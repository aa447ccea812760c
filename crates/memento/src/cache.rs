// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The get-or-populate cache with hit accounting.

use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use memento_store::{ExpirationPolicy, ExpiringStore};
use tick::Clock;

use crate::{
    CacheKey, Error, HitCounter, Result,
    builder::MemoCacheBuilder,
    telemetry::{MemoActivity, MemoOperation, MemoTelemetry},
};

/// Type alias for cache names used in telemetry.
pub type CacheName = &'static str;

/// The form in which values of any type share a single store.
pub type StoredValue = Arc<dyn Any + Send + Sync>;

/// A memoization cache over an [`ExpiringStore`].
///
/// [`get_or_compute`](Self::get_or_compute) returns the stored value for a key, or runs the
/// producer, stores its result, and returns it. Values of different types can live in the
/// same cache; each lookup names the type it expects.
///
/// When hit counting is enabled every call records a request against its key and every
/// producer run records an execution; see [`hit_counter`](Self::hit_counter).
///
/// Concurrent misses on the same key are not coalesced: each caller runs its producer and
/// the last write wins.
///
/// # Examples
///
/// ```
/// use memento::{CacheKey, MemoCache};
/// use tick::Clock;
///
/// let cache = MemoCache::builder(Clock::new_frozen()).memory().hit_count(true).build();
/// let key = CacheKey::build("answer", &[])?;
///
/// let first = cache.get_or_compute(&key, || 42, None)?;
/// let second = cache.get_or_compute(&key, || 7, None)?;
/// assert_eq!((first, second), (42, 42));
///
/// let count = cache.hit_counter().count_for(&key).unwrap();
/// assert_eq!((count.execution_count(), count.request_count()), (1, 2));
/// # Ok::<(), memento::Error>(())
/// ```
#[derive(Debug)]
pub struct MemoCache<S> {
    name: CacheName,
    store: S,
    clock: Clock,
    default_policy: ExpirationPolicy,
    hit_count_enabled: AtomicBool,
    counter: HitCounter,
    telemetry: MemoTelemetry,
}

impl MemoCache<()> {
    /// Creates a new cache builder.
    ///
    /// The clock is used for entry timestamps and producer timing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use memento::{ExpirationPolicy, MemoCache};
    /// use tick::Clock;
    ///
    /// let cache = MemoCache::builder(Clock::new_frozen())
    ///     .memory()
    ///     .name("reports")
    ///     .default_policy(ExpirationPolicy::TimeToLive(Duration::from_secs(300)))
    ///     .build();
    /// assert_eq!(cache.name(), "reports");
    /// ```
    #[must_use]
    pub fn builder(clock: Clock) -> MemoCacheBuilder<()> {
        MemoCacheBuilder::new(clock)
    }
}

impl<S> MemoCache<S> {
    pub(crate) fn new(
        name: CacheName,
        store: S,
        clock: Clock,
        default_policy: ExpirationPolicy,
        hit_count_enabled: bool,
        telemetry: MemoTelemetry,
    ) -> Self {
        Self {
            name,
            store,
            clock,
            default_policy,
            hit_count_enabled: AtomicBool::new(hit_count_enabled),
            counter: HitCounter::new(),
            telemetry,
        }
    }

    /// Returns the name of this cache for telemetry identification.
    #[must_use]
    pub fn name(&self) -> CacheName {
        self.name
    }

    /// Returns a reference to the cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns the policy applied when a call does not specify one.
    #[must_use]
    pub fn default_policy(&self) -> ExpirationPolicy {
        self.default_policy
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the per-key request and execution counts.
    #[must_use]
    pub fn hit_counter(&self) -> &HitCounter {
        &self.counter
    }

    /// Returns whether calls are currently being counted.
    #[must_use]
    pub fn hit_count_enabled(&self) -> bool {
        self.hit_count_enabled.load(Ordering::Relaxed)
    }

    /// Turns hit counting on or off. Returned values are unaffected.
    pub fn set_hit_count_enabled(&self, enabled: bool) {
        self.hit_count_enabled.store(enabled, Ordering::Relaxed);
    }

    fn record(&self, operation: MemoOperation, activity: MemoActivity, duration: Option<Duration>) {
        self.telemetry.record(self.name, operation, activity, duration);
    }
}

impl<S> MemoCache<S>
where
    S: ExpiringStore<StoredValue>,
{
    /// Returns the value cached under `key`, computing and storing it on a miss.
    ///
    /// `policy` overrides the cache's [default policy](Self::default_policy) for a newly
    /// stored value; it has no effect on a hit.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn get_or_compute<V>(&self, key: &CacheKey, produce: impl FnOnce() -> V, policy: Option<ExpirationPolicy>) -> Result<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.try_get_or_compute(key, || Ok::<_, std::convert::Infallible>(produce()), policy)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but the producer can fail.
    ///
    /// A failed producer stores nothing and counts as a request without an execution, so
    /// the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ProducerFailure`](crate::ErrorKind::ProducerFailure) wrapping the
    /// producer's error, or the store's error if it fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use memento::{CacheKey, ErrorKind, MemoCache};
    /// use tick::Clock;
    ///
    /// let cache = MemoCache::builder(Clock::new_frozen()).memory().build();
    /// let key = CacheKey::build("config", &[])?;
    ///
    /// let err = cache
    ///     .try_get_or_compute::<String, _>(&key, || Err("unreachable backend"), None)
    ///     .unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::ProducerFailure);
    ///
    /// let value = cache.try_get_or_compute(&key, || Ok::<_, std::io::Error>("ok".to_string()), None)?;
    /// assert_eq!(value, "ok");
    /// # Ok::<(), memento::Error>(())
    /// ```
    pub fn try_get_or_compute<V, E>(
        &self,
        key: &CacheKey,
        produce: impl FnOnce() -> std::result::Result<V, E>,
        policy: Option<ExpirationPolicy>,
    ) -> Result<V>
    where
        V: Clone + Send + Sync + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let tracking = self.hit_count_enabled();
        if tracking {
            self.counter.record_request(key);
        }

        if let Some(value) = self.lookup::<V>(key)? {
            self.record(MemoOperation::GetOrCompute, MemoActivity::Hit, None);
            return Ok(value);
        }
        self.record(MemoOperation::GetOrCompute, MemoActivity::Miss, None);

        let started = self.clock.instant();
        let produced = produce();
        let elapsed = self.clock.instant().saturating_duration_since(started);

        let value = match produced {
            Ok(value) => value,
            Err(cause) => {
                self.record(MemoOperation::GetOrCompute, MemoActivity::ProducerFailed, Some(elapsed));
                return Err(Error::producer(cause));
            }
        };

        if tracking {
            self.counter.record_execution(key);
        }

        let stored: StoredValue = Arc::new(value.clone());
        self.store
            .set(key.as_str(), stored, policy.unwrap_or(self.default_policy))?;
        self.record(MemoOperation::GetOrCompute, MemoActivity::Inserted, Some(elapsed));

        Ok(value)
    }

    fn lookup<V>(&self, key: &CacheKey) -> Result<Option<V>>
    where
        V: Clone + 'static,
    {
        let Some(stored) = self.store.get(key.as_str())? else {
            return Ok(None);
        };

        if let Some(value) = stored.downcast_ref::<V>() {
            return Ok(Some(value.clone()));
        }

        self.record(MemoOperation::GetOrCompute, MemoActivity::TypeMismatch, None);
        Ok(None)
    }

    /// Removes the value cached under `key`.
    ///
    /// Hit counts for the key are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.store.invalidate(key.as_str())?;
        self.record(MemoOperation::Invalidate, MemoActivity::Invalidated, None);
        Ok(())
    }

    /// Removes every cached value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        self.record(MemoOperation::Clear, MemoActivity::Invalidated, None);
        Ok(())
    }

    /// Returns the number of cached values, if the store tracks it.
    #[must_use]
    pub fn len(&self) -> Option<u64> {
        self.store.len()
    }

    /// Returns `true` if nothing is cached.
    ///
    /// Returns `None` if the store doesn't track its size.
    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        self.store.is_empty()
    }
}
