// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

/// Describes when a stored entry stops being valid.
///
/// The default policy is a one-hour sliding window: the entry stays alive as long as it
/// is read at least once an hour.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use memento_store::ExpirationPolicy;
///
/// let policy = ExpirationPolicy::default();
/// assert_eq!(policy, ExpirationPolicy::Sliding(Duration::from_secs(60 * 60)));
///
/// let ttl = ExpirationPolicy::TimeToLive(Duration::from_secs(30));
/// assert!(!ttl.is_sliding());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpirationPolicy {
    /// Expires once this much time passes without a successful read.
    ///
    /// Every hit resets the window.
    Sliding(Duration),
    /// Expires this long after insertion, regardless of reads.
    TimeToLive(Duration),
    /// Expires at a fixed wall-clock instant.
    Absolute(SystemTime),
}

impl ExpirationPolicy {
    /// The window used by [`ExpirationPolicy::default`].
    pub const DEFAULT_SLIDING_WINDOW: Duration = Duration::from_secs(60 * 60);

    /// Returns `true` if reads extend the lifetime of entries under this policy.
    #[must_use]
    pub fn is_sliding(&self) -> bool {
        matches!(self, Self::Sliding(_))
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::Sliding(Self::DEFAULT_SLIDING_WINDOW)
    }
}
