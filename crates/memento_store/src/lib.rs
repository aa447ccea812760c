// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Expiring key/value store abstractions for building memoization backends.
//!
//! This crate defines the [`ExpiringStore`] trait that every store behind a memoization
//! cache must satisfy, along with [`StoreEntry`] for holding values with their expiration
//! metadata, [`ExpirationPolicy`] for describing when an entry becomes invalid, and the
//! [`Error`] type shared by the whole `memento` family.
//!
//! # Overview
//!
//! A store is deliberately small: point lookup and point write keyed by string, plus
//! invalidation. Expiration is the store's responsibility; callers only describe the
//! policy they want when writing. Use `memento_memory` for a ready-made in-memory store
//! and `memento` for the get-or-populate cache and function memoizer built on top.
//!
//! # Implementing a Store
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! use memento_store::{ExpirationPolicy, ExpiringStore, Result};
//!
//! struct ForeverStore<V>(RwLock<HashMap<String, V>>);
//!
//! impl<V> ExpiringStore<V> for ForeverStore<V>
//! where
//!     V: Clone + Send + Sync,
//! {
//!     fn get(&self, key: &str) -> Result<Option<V>> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     fn set(&self, key: &str, value: V, _policy: ExpirationPolicy) -> Result<()> {
//!         self.0.write().unwrap().insert(key.to_string(), value);
//!         Ok(())
//!     }
//!
//!     fn invalidate(&self, key: &str) -> Result<()> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//!
//!     fn clear(&self) -> Result<()> {
//!         self.0.write().unwrap().clear();
//!         Ok(())
//!     }
//! }
//! ```

mod entry;
pub mod error;
mod policy;
pub(crate) mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use entry::StoreEntry;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use policy::ExpirationPolicy;
#[doc(inline)]
pub use store::ExpiringStore;
