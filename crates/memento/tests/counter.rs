// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for hit accounting.

use memento::{CacheKey, CallCount, HitCounter, MemoCache, Value};
use memento_store::testing::{MockStore, StoreOp};
use tick::Clock;

#[test]
fn fresh_counter_has_no_totals() {
    let counter = HitCounter::new();
    assert!(counter.is_empty());
    assert_eq!(counter.totals(), None);
}

#[test]
fn counting_can_be_toggled_at_runtime() {
    let cache = MemoCache::builder(Clock::new_frozen()).store(MockStore::new()).build();
    let key = CacheKey::build("toggle", &[Value::from(true)]).expect("key should build");

    let _ = cache.get_or_compute(&key, || 1_i32, None).expect("get failed");
    assert_eq!(cache.hit_counter().totals(), None);

    cache.set_hit_count_enabled(true);
    let _ = cache.get_or_compute(&key, || 1_i32, None).expect("get failed");
    let _ = cache.get_or_compute(&key, || 1_i32, None).expect("get failed");
    assert_eq!(cache.hit_counter().count_for(&key), Some(CallCount::new(0, 2)));

    cache.set_hit_count_enabled(false);
    let _ = cache.get_or_compute(&key, || 1_i32, None).expect("get failed");
    assert_eq!(cache.hit_counter().count_for(&key), Some(CallCount::new(0, 2)));
}

#[test]
fn store_failure_after_producer_still_counts_execution() {
    let store = MockStore::new();
    store.fail_when(|op| matches!(op, StoreOp::Set { .. }));
    let cache = MemoCache::builder(Clock::new_frozen())
        .store(store)
        .hit_count(true)
        .build();
    let key = CacheKey::build("flaky", &[]).expect("key should build");

    let _ = cache
        .get_or_compute(&key, || 1_i32, None)
        .expect_err("set failure should surface");

    assert_eq!(cache.hit_counter().count_for(&key), Some(CallCount::new(1, 1)));
}

#[test]
fn totals_sum_every_key() {
    let cache = MemoCache::builder(Clock::new_frozen())
        .store(MockStore::new())
        .hit_count(true)
        .build();

    for i in 0..4_i64 {
        let key = CacheKey::build("sum", &[Value::from(i % 2)]).expect("key should build");
        let _ = cache.get_or_compute(&key, move || i, None).expect("get failed");
    }

    assert_eq!(cache.hit_counter().len(), 2);
    assert_eq!(cache.hit_counter().totals(), Some(CallCount::new(2, 4)));
}
