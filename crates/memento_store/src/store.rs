// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for expiring store backends.
//!
//! [`ExpiringStore`] defines the interface a memoization cache consumes. The store owns
//! expiration: it is handed an [`ExpirationPolicy`] on every write and must stop
//! returning the entry once the policy says it is no longer valid.

use crate::{ExpirationPolicy, Result};

/// Trait for expiring key/value stores.
///
/// Implementations must be safe for concurrent point reads and writes from multiple
/// threads. No ordering or atomicity across keys is expected.
///
/// The four core methods are required: `get`, `set`, `invalidate`, and `clear`.
/// Only `len` and `is_empty` have default implementations:
/// - `len`: Returns `None` (not all stores track size)
/// - `is_empty`: Delegates to `len`
pub trait ExpiringStore<V>: Send + Sync {
    /// Looks up `key`, returning `None` if it is absent or expired.
    ///
    /// A successful read refreshes entries stored under a sliding policy.
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` under `key` with the given policy, replacing any previous entry.
    fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> Result<()>;

    /// Removes the entry for `key`, if any.
    fn invalidate(&self, key: &str) -> Result<()>;

    /// Removes all entries.
    fn clear(&self) -> Result<()>;

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<V, S> ExpiringStore<V> for std::sync::Arc<S>
where
    S: ExpiringStore<V> + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V, policy: ExpirationPolicy) -> Result<()> {
        (**self).set(key, value, policy)
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        (**self).invalidate(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}
