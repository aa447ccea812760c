// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Process-local memoization with keys derived from expressions.
//!
//! This crate caches the results of expensive computations inside a single process. The
//! main pieces are:
//!
//! - [`MemoCache`]: a get-or-populate cache over any [`ExpiringStore`], with per-entry
//!   [`ExpirationPolicy`] and optional per-key [`HitCounter`] accounting.
//! - [`FunctionCache`]: memoizes function results, deriving the key from a described
//!   [`Expression`] or from explicit components.
//! - [`ProcedureCache`]: memoizes stored-procedure results from any [`SqlSource`].
//! - [`fingerprint`]: turns an expression body into ordered key components without
//!   evaluating it.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use memento::{Captures, Expression, FunctionCache, MemoCache, Node};
//! use tick::Clock;
//!
//! fn lookup_price(sku: i64) -> f64 {
//!     sku as f64 * 1.5
//! }
//!
//! let functions = FunctionCache::new(MemoCache::builder(Clock::new_frozen()).memory().hit_count(true).build());
//!
//! for sku in [1, 2, 1, 1] {
//!     let env = Arc::new(Captures::new().with("sku", sku));
//!     let expr = Expression::new(Node::call("lookup_price", [Node::captured(&env, "sku")]), move || lookup_price(sku));
//!     functions.get(&expr)?;
//! }
//!
//! let totals = functions.hit_counter().totals().unwrap();
//! assert_eq!(totals.execution_count(), 2);
//! assert_eq!(totals.request_count(), 4);
//! # Ok::<(), memento::Error>(())
//! ```
//!
//! # Describing Expressions
//!
//! Rust closures can't be inspected, so an [`Expression`] pairs the closure with a [`Node`]
//! tree describing its body. Captured variables are exposed through a [`Captures`]
//! environment (or any type implementing [`Fields`]), and member chains rooted at it are
//! read when the key is derived.
//!
//! # Features
//!
//! - `memory` (default): [`InMemoryStore`] and the [`MemoCacheBuilder::memory`] shortcut.
//! - `logs`: emits a `tracing` event for every cache decision.
//! - `metrics`: records event counts and producer durations through OpenTelemetry.
//! - `test-util`: re-exports [`MockStore`] for exercising error paths.

pub mod builder;
pub mod cache;
pub mod counter;
pub mod expr;
mod fingerprint;
pub mod function;
pub mod key;
pub mod procedure;
mod telemetry;

#[doc(inline)]
pub use builder::MemoCacheBuilder;
#[doc(inline)]
pub use cache::{CacheName, MemoCache, StoredValue};
#[doc(inline)]
pub use counter::{CallCount, HitCounter};
#[doc(inline)]
pub use expr::{Captures, Expression, Fields, Node};
pub use fingerprint::fingerprint;
#[doc(inline)]
pub use function::FunctionCache;
#[doc(inline)]
pub use key::{CacheKey, Value};
#[cfg(feature = "memory")]
#[doc(inline)]
pub use memento_memory::InMemoryStore;
#[doc(inline)]
pub use memento_store::{Error, ErrorKind, ExpirationPolicy, ExpiringStore, Result, StoreEntry};
#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use memento_store::testing::{MockStore, StoreOp};
#[doc(inline)]
pub use procedure::{ProcedureCache, SqlSource, Table};
