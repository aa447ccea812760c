// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoization of function results keyed by their inputs.

use std::any::type_name;

use memento_store::{ExpirationPolicy, ExpiringStore};

use crate::{
    CacheKey, Expression, HitCounter, MemoCache, Result, Value,
    cache::StoredValue,
    fingerprint::fingerprint_retaining,
};

/// Caches function results under keys derived from their inputs.
///
/// Keys start with the name of the result type `T`, followed by the key components:
///
/// - with [`get`](Self::get), the components are the [fingerprint](crate::fingerprint) of
///   the expression;
/// - with [`get_with`](Self::get_with), the caller passes them explicitly.
///
/// Method-call fingerprints contain only the arguments, not the callee. Two different
/// functions returning the same type and called with the same arguments therefore share a
/// key. Use [`get_scoped`](Self::get_scoped) to keep them apart.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use memento::{Captures, Expression, FunctionCache, MemoCache, Node};
/// use tick::Clock;
///
/// fn slow_square(x: i64) -> i64 {
///     x * x
/// }
///
/// let functions = FunctionCache::new(MemoCache::builder(Clock::new_frozen()).memory().hit_count(true).build());
///
/// for _ in 0..3 {
///     let x = 12;
///     let env = Arc::new(Captures::new().with("x", x));
///     let expr = Expression::new(Node::call("slow_square", [Node::captured(&env, "x")]), move || slow_square(x));
///     assert_eq!(functions.get(&expr)?, 144);
/// }
///
/// let totals = functions.hit_counter().totals().unwrap();
/// assert_eq!((totals.execution_count(), totals.request_count()), (1, 3));
/// # Ok::<(), memento::Error>(())
/// ```
#[derive(Debug)]
pub struct FunctionCache<S> {
    cache: MemoCache<S>,
}

impl<S> FunctionCache<S> {
    /// Creates a function cache on top of `cache`.
    #[must_use]
    pub fn new(cache: MemoCache<S>) -> Self {
        Self { cache }
    }

    /// Returns the underlying cache.
    #[must_use]
    pub fn cache(&self) -> &MemoCache<S> {
        &self.cache
    }

    /// Consumes the function cache and returns the underlying cache.
    #[must_use]
    pub fn into_inner(self) -> MemoCache<S> {
        self.cache
    }

    /// Returns the per-key request and execution counts.
    #[must_use]
    pub fn hit_counter(&self) -> &HitCounter {
        self.cache.hit_counter()
    }

    /// Returns whether calls are currently being counted.
    #[must_use]
    pub fn hit_count_enabled(&self) -> bool {
        self.cache.hit_count_enabled()
    }

    /// Turns hit counting on or off.
    pub fn set_hit_count_enabled(&self, enabled: bool) {
        self.cache.set_hit_count_enabled(enabled);
    }
}

impl<S> FunctionCache<S>
where
    S: ExpiringStore<StoredValue>,
{
    /// Returns the cached result of `expression`, evaluating it on a miss.
    ///
    /// The key is derived from the expression body without running it, so any result type
    /// can be cached. The exception is an [`Expression::invocation`], which must be
    /// evaluated to learn its key; that evaluation is reused as the result on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnsupportedShape`](crate::ErrorKind::UnsupportedShape) if no key
    /// can be derived, [`ErrorKind::KeyRender`](crate::ErrorKind::KeyRender) if a component
    /// has no string form, or the store's error.
    pub fn get<F, T>(&self, expression: &Expression<F>) -> Result<T>
    where
        F: Fn() -> T,
        T: Clone + Send + Sync + 'static,
    {
        self.get_expression(None, expression, None)
    }

    /// Like [`get`](Self::get), storing a new result with the given policy.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_with_expiration<F, T>(&self, expression: &Expression<F>, policy: ExpirationPolicy) -> Result<T>
    where
        F: Fn() -> T,
        T: Clone + Send + Sync + 'static,
    {
        self.get_expression(None, expression, Some(policy))
    }

    /// Like [`get`](Self::get), with `scope` placed before the fingerprint in the key.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    ///
    /// # Examples
    ///
    /// ```
    /// use memento::{Expression, FunctionCache, MemoCache, Node};
    /// use tick::Clock;
    ///
    /// let functions = FunctionCache::new(MemoCache::builder(Clock::new_frozen()).memory().build());
    ///
    /// let low = functions.get_scoped("low", &Expression::new(Node::call("low", [Node::constant(1)]), || 10))?;
    /// let high = functions.get_scoped("high", &Expression::new(Node::call("high", [Node::constant(1)]), || 99))?;
    /// assert_eq!((low, high), (10, 99));
    /// # Ok::<(), memento::Error>(())
    /// ```
    pub fn get_scoped<F, T>(&self, scope: &str, expression: &Expression<F>) -> Result<T>
    where
        F: Fn() -> T,
        T: Clone + Send + Sync + 'static,
    {
        self.get_expression(Some(scope), expression, None)
    }

    /// Returns the cached result of `produce` under the explicit key components.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::KeyRender`](crate::ErrorKind::KeyRender) if a component has no
    /// string form, or the store's error.
    ///
    /// # Examples
    ///
    /// ```
    /// use memento::{FunctionCache, MemoCache, Value};
    /// use tick::Clock;
    ///
    /// let functions = FunctionCache::new(MemoCache::builder(Clock::new_frozen()).memory().build());
    /// let rate = functions.get_with(|| 1.08_f64, &[Value::from("EUR"), Value::from("USD")])?;
    /// assert_eq!(rate, 1.08);
    /// # Ok::<(), memento::Error>(())
    /// ```
    pub fn get_with<T>(&self, produce: impl FnOnce() -> T, keys: &[Value]) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.cache.get_or_compute(&Self::explicit_key::<T>(keys)?, produce, None)
    }

    /// Like [`get_with`](Self::get_with), storing a new result with the given policy.
    ///
    /// # Errors
    ///
    /// See [`get_with`](Self::get_with).
    pub fn get_with_policy<T>(&self, produce: impl FnOnce() -> T, policy: ExpirationPolicy, keys: &[Value]) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.cache.get_or_compute(&Self::explicit_key::<T>(keys)?, produce, Some(policy))
    }

    /// Like [`get_with`](Self::get_with), for producers that can fail.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ProducerFailure`](crate::ErrorKind::ProducerFailure) if `produce`
    /// fails, in addition to the errors of [`get_with`](Self::get_with).
    pub fn try_get_with<T, E>(&self, produce: impl FnOnce() -> std::result::Result<T, E>, keys: &[Value]) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.cache.try_get_or_compute(&Self::explicit_key::<T>(keys)?, produce, None)
    }

    /// Returns the key [`get_with`](Self::get_with) would use for a result of type `T`.
    ///
    /// # Errors
    ///
    /// See [`CacheKey::build`].
    pub fn explicit_key<T>(keys: &[Value]) -> Result<CacheKey> {
        CacheKey::build(type_name::<T>(), keys)
    }

    fn get_expression<F, T>(&self, scope: Option<&str>, expression: &Expression<F>, policy: Option<ExpirationPolicy>) -> Result<T>
    where
        F: Fn() -> T,
        T: Clone + Send + Sync + 'static,
    {
        let (mut components, evaluated) = fingerprint_retaining(expression)?;
        if let Some(scope) = scope {
            components.insert(0, Value::from(scope));
        }
        let key = CacheKey::build(type_name::<T>(), &components)?;

        self.cache
            .get_or_compute(&key, || evaluated.unwrap_or_else(|| expression.evaluate()), policy)
    }
}
