// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `MockStore`.

use std::time::Duration;

use memento_store::{
    ErrorKind, ExpirationPolicy, ExpiringStore,
    testing::{MockStore, StoreOp},
};

#[test]
fn records_operations_in_order() {
    let store = MockStore::<i32>::new();
    let policy = ExpirationPolicy::TimeToLive(Duration::from_secs(5));

    store.set("k", 1, policy).expect("set failed");
    let _ = store.get("k").expect("get failed");
    store.invalidate("k").expect("invalidate failed");
    store.clear().expect("clear failed");

    assert_eq!(
        store.operations(),
        vec![
            StoreOp::Set {
                key: "k".to_string(),
                value: 1,
                policy,
            },
            StoreOp::Get("k".to_string()),
            StoreOp::Invalidate("k".to_string()),
            StoreOp::Clear,
        ]
    );
}

#[test]
fn fail_when_rejects_matching_operations() {
    let store = MockStore::<i32>::new();
    store.fail_when(|op| matches!(op, StoreOp::Set { key, .. } if key == "bad"));

    let err = store
        .set("bad", 1, ExpirationPolicy::default())
        .expect_err("set should fail");
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(!store.contains_key("bad"));

    store.set("good", 2, ExpirationPolicy::default()).expect("set failed");
    assert_eq!(store.entry_count(), 1);
    assert_eq!(store.operations().len(), 2, "failed operations are still recorded");
}

#[test]
fn clear_failures_restores_success() {
    let store = MockStore::<i32>::new();
    store.fail_when(|_| true);
    assert!(store.get("k").is_err());

    store.clear_failures();
    assert!(store.get("k").is_ok());
}

#[test]
fn clones_share_state() {
    let store = MockStore::<i32>::new();
    let clone = store.clone();

    clone.set("k", 3, ExpirationPolicy::default()).expect("set failed");

    assert_eq!(store.get("k").expect("get failed"), Some(3));
    assert_eq!(store.len(), Some(1));
    assert_eq!(store.is_empty(), Some(false));
    store.clear_operations();
    assert!(clone.operations().is_empty());
}
