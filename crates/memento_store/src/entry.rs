// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{ops::Deref, time::SystemTime};

use crate::ExpirationPolicy;

/// A stored value together with its expiration bookkeeping.
///
/// Stores keep one `StoreEntry` per key. The entry remembers when it was inserted and
/// when it was last read so that any [`ExpirationPolicy`] can be evaluated against the
/// current time.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use memento_store::{ExpirationPolicy, StoreEntry};
///
/// let inserted = SystemTime::UNIX_EPOCH;
/// let entry = StoreEntry::new(42, ExpirationPolicy::TimeToLive(Duration::from_secs(10)), inserted);
///
/// assert_eq!(*entry.value(), 42);
/// assert!(!entry.is_expired(inserted + Duration::from_secs(10)));
/// assert!(entry.is_expired(inserted + Duration::from_secs(11)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEntry<V> {
    value: V,
    policy: ExpirationPolicy,
    inserted_at: SystemTime,
    last_access: SystemTime,
}

impl<V> StoreEntry<V> {
    /// Creates an entry inserted at `now`.
    pub fn new(value: V, policy: ExpirationPolicy, now: SystemTime) -> Self {
        Self {
            value,
            policy,
            inserted_at: now,
            last_access: now,
        }
    }

    /// Returns a reference to the stored value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the stored value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the policy this entry was stored with.
    #[must_use]
    pub fn policy(&self) -> ExpirationPolicy {
        self.policy
    }

    /// Returns when the entry was inserted.
    #[must_use]
    pub fn inserted_at(&self) -> SystemTime {
        self.inserted_at
    }

    /// Returns when the entry was last read, or its insertion time if never read.
    #[must_use]
    pub fn last_access(&self) -> SystemTime {
        self.last_access
    }

    /// Records a successful read at `now`.
    ///
    /// Only sliding policies are affected by this timestamp.
    pub fn touch(&mut self, now: SystemTime) {
        self.last_access = now;
    }

    /// Returns the instant after which the entry is expired, as of its last access.
    #[must_use]
    pub fn expires_at(&self) -> Option<SystemTime> {
        match self.policy {
            ExpirationPolicy::Sliding(window) => self.last_access.checked_add(window),
            ExpirationPolicy::TimeToLive(ttl) => self.inserted_at.checked_add(ttl),
            ExpirationPolicy::Absolute(at) => Some(at),
        }
    }

    /// Returns `true` if the entry is no longer valid at `now`.
    ///
    /// An entry is still valid at exactly its expiry instant. If the clock went backwards
    /// past the reference timestamp the entry is considered expired.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.policy {
            ExpirationPolicy::Sliding(window) => elapsed_exceeds(self.last_access, now, window),
            ExpirationPolicy::TimeToLive(ttl) => elapsed_exceeds(self.inserted_at, now, ttl),
            ExpirationPolicy::Absolute(at) => now > at,
        }
    }
}

fn elapsed_exceeds(since: SystemTime, now: SystemTime, limit: std::time::Duration) -> bool {
    match now.duration_since(since) {
        Ok(elapsed) => elapsed > limit,
        Err(_) => true,
    }
}

impl<V> Deref for StoreEntry<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn sliding_entry_survives_while_touched() {
        let start = SystemTime::UNIX_EPOCH;
        let mut entry = StoreEntry::new("v", ExpirationPolicy::Sliding(WINDOW), start);

        entry.touch(start + Duration::from_secs(50));
        assert!(!entry.is_expired(start + Duration::from_secs(100)));
        assert!(entry.is_expired(start + Duration::from_secs(111)));
    }

    #[test]
    fn time_to_live_ignores_touch() {
        let start = SystemTime::UNIX_EPOCH;
        let mut entry = StoreEntry::new("v", ExpirationPolicy::TimeToLive(WINDOW), start);

        entry.touch(start + Duration::from_secs(59));
        assert!(entry.is_expired(start + Duration::from_secs(61)));
    }

    #[test]
    fn absolute_expires_after_deadline() {
        let start = SystemTime::UNIX_EPOCH;
        let deadline = start + Duration::from_secs(5);
        let entry = StoreEntry::new("v", ExpirationPolicy::Absolute(deadline), start);

        assert!(!entry.is_expired(deadline));
        assert!(entry.is_expired(deadline + Duration::from_nanos(1)));
        assert_eq!(entry.expires_at(), Some(deadline));
    }

    #[test]
    fn clock_going_backwards_expires_entry() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let entry = StoreEntry::new("v", ExpirationPolicy::Sliding(WINDOW), start);

        assert!(entry.is_expired(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn expires_at_follows_last_access_for_sliding() {
        let start = SystemTime::UNIX_EPOCH;
        let mut entry = StoreEntry::new(1, ExpirationPolicy::Sliding(WINDOW), start);
        assert_eq!(entry.expires_at(), Some(start + WINDOW));

        entry.touch(start + Duration::from_secs(30));
        assert_eq!(entry.expires_at(), Some(start + Duration::from_secs(90)));
    }
}
