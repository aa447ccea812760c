// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Concurrent in-memory expiring store backed by moka.
//!
//! This crate provides [`InMemoryStore`], an implementation of
//! [`ExpiringStore`](memento_store::ExpiringStore) that honors per-entry
//! [`ExpirationPolicy`](memento_store::ExpirationPolicy) values. Expiration is evaluated
//! against a [`tick::Clock`], so tests can move time forward deterministically.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use memento_memory::InMemoryStore;
//! use memento_store::{ExpirationPolicy, ExpiringStore};
//!
//! let store = InMemoryStore::<i32>::builder()
//!     .max_capacity(1000)
//!     .name("quick-start")
//!     .build();
//!
//! store.set("key", 42, ExpirationPolicy::TimeToLive(Duration::from_secs(300))).unwrap();
//! assert_eq!(store.get("key").unwrap(), Some(42));
//! ```
//!
//! # Features
//!
//! - **Per-entry policies**: sliding, time-to-live, and absolute expiration
//! - **Capacity limits**: Set maximum entry count with automatic eviction
//! - **Thread-safe**: Safe for concurrent access from multiple threads
//! - **Zero external types**: Builder API avoids exposing moka in your public API

pub mod builder;
mod expiry;
pub mod store;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use store::InMemoryStore;
