// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Request and execution accounting per cache key.

use std::{iter::Sum, ops::Add};

use dashmap::DashMap;

use crate::CacheKey;

/// How often a computation was requested and how often it actually ran.
///
/// `CallCount` is an immutable value; the `incremented_*` methods return a new count.
///
/// # Examples
///
/// ```
/// use memento::CallCount;
///
/// let count = CallCount::default().incremented_request().incremented_execution();
/// assert_eq!(count.request_count(), 1);
/// assert_eq!(count.execution_count(), 1);
///
/// let total: CallCount = [count, count].into_iter().sum();
/// assert_eq!(total.request_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CallCount {
    execution_count: u64,
    request_count: u64,
}

impl CallCount {
    /// Creates a count with the given values.
    #[must_use]
    pub fn new(execution_count: u64, request_count: u64) -> Self {
        Self {
            execution_count,
            request_count,
        }
    }

    /// Returns how many times the computation actually ran.
    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Returns how many times the computation was asked for.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Returns a copy with one more request.
    #[must_use]
    pub fn incremented_request(self) -> Self {
        Self {
            request_count: self.request_count.saturating_add(1),
            ..self
        }
    }

    /// Returns a copy with one more execution.
    #[must_use]
    pub fn incremented_execution(self) -> Self {
        Self {
            execution_count: self.execution_count.saturating_add(1),
            ..self
        }
    }
}

impl Add for CallCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            execution_count: self.execution_count.saturating_add(rhs.execution_count),
            request_count: self.request_count.saturating_add(rhs.request_count),
        }
    }
}

impl Sum for CallCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Per-key [`CallCount`]s for one cache.
///
/// Updates to the same key never get lost under concurrency: each one is a
/// read-modify-write under the key's shard lock.
#[derive(Debug, Default)]
pub struct HitCounter {
    counts: DashMap<CacheKey, CallCount>,
}

impl HitCounter {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count for `key`, or `None` if it was never touched.
    #[must_use]
    pub fn count_for(&self, key: &CacheKey) -> Option<CallCount> {
        self.counts.get(key).map(|count| *count)
    }

    /// Returns the sum over all keys, or `None` if no key was ever touched.
    #[must_use]
    pub fn totals(&self) -> Option<CallCount> {
        if self.counts.is_empty() {
            return None;
        }
        Some(self.counts.iter().map(|entry| *entry.value()).sum())
    }

    /// Returns the number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no key was ever touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub(crate) fn record_request(&self, key: &CacheKey) {
        self.update(key, CallCount::incremented_request);
    }

    pub(crate) fn record_execution(&self, key: &CacheKey) {
        self.update(key, CallCount::incremented_execution);
    }

    fn update(&self, key: &CacheKey, step: fn(CallCount) -> CallCount) {
        if let Some(mut count) = self.counts.get_mut(key) {
            *count = step(*count);
            return;
        }
        self.counts
            .entry(key.clone())
            .and_modify(|count| *count = step(*count))
            .or_insert_with(|| step(CallCount::default()));
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn key(name: &str) -> CacheKey {
        CacheKey::build(name, &[]).expect("key should build")
    }

    #[test]
    fn untouched_key_has_no_count() {
        let counter = HitCounter::new();
        assert_eq!(counter.count_for(&key("a")), None);
    }

    #[test]
    fn totals_on_empty_counter_is_none() {
        let counter = HitCounter::new();
        assert_eq!(counter.totals(), None);
        assert!(counter.is_empty());
    }

    #[test]
    fn records_requests_and_executions_per_key() {
        let counter = HitCounter::new();
        counter.record_request(&key("a"));
        counter.record_execution(&key("a"));
        counter.record_request(&key("a"));
        counter.record_request(&key("b"));

        assert_eq!(counter.count_for(&key("a")), Some(CallCount::new(1, 2)));
        assert_eq!(counter.count_for(&key("b")), Some(CallCount::new(0, 1)));
        assert_eq!(counter.totals(), Some(CallCount::new(1, 3)));
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let counter = HitCounter::new();
        let keys: Vec<_> = (0..4).map(|i| key(&format!("k{i}"))).collect();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        for k in &keys {
                            counter.record_request(k);
                            counter.record_execution(k);
                        }
                    }
                });
            }
        });

        for k in &keys {
            assert_eq!(counter.count_for(k), Some(CallCount::new(2000, 2000)));
        }
        assert_eq!(counter.totals(), Some(CallCount::new(8000, 8000)));
    }

    #[test]
    fn call_count_addition_is_pairwise() {
        let sum = CallCount::new(1, 2) + CallCount::new(3, 4);
        assert_eq!(sum, CallCount::new(4, 6));
    }
}
