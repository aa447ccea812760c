// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", test))]
pub(crate) const MEMO_NAME: &str = "memo.name";

#[cfg(test)]
pub(crate) const MEMO_EVENT_NAME: &str = "memo.event";

#[cfg(any(feature = "metrics", test))]
pub(crate) const MEMO_OPERATION_NAME: &str = "memo.operation";

#[cfg(any(feature = "metrics", test))]
pub(crate) const MEMO_ACTIVITY_NAME: &str = "memo.activity";

#[cfg(test)]
pub(crate) const MEMO_DURATION_NAME: &str = "memo.duration_ns";
