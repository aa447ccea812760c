// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use memento_store::StoreEntry;
use moka::Expiry;
use tick::Clock;

/// Lets moka reclaim entries that are never read again.
///
/// Lookups still evaluate the policy against the clock; this only bounds how long dead
/// entries occupy memory.
pub(crate) struct PolicyExpiry {
    clock: Clock,
}

impl PolicyExpiry {
    pub(crate) fn new(clock: Clock) -> Self {
        Self { clock }
    }

    fn remaining<V>(&self, entry: &StoreEntry<V>) -> Option<Duration> {
        let expires_at = entry.expires_at()?;
        Some(expires_at.duration_since(self.clock.system_time()).unwrap_or(Duration::ZERO))
    }
}

impl<V> Expiry<String, StoreEntry<V>> for PolicyExpiry {
    fn expire_after_create(&self, _key: &String, value: &StoreEntry<V>, _created_at: Instant) -> Option<Duration> {
        self.remaining(value)
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &StoreEntry<V>,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        if value.policy().is_sliding() {
            self.remaining(value)
        } else {
            duration_until_expiry
        }
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoreEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        self.remaining(value)
    }
}
