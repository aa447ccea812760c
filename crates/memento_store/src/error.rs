// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for memoization and store operations.

use std::fmt;

/// The category of a memoization failure.
///
/// Every [`Error`] carries exactly one kind. Callers match on the kind to decide
/// whether a failure is a usage bug (the first three), a failure of their own
/// computation, or a failure of the underlying store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required input such as a namespace token or procedure name was missing.
    NullInput,
    /// An expression tree had a shape the fingerprinter cannot resolve without executing it.
    UnsupportedShape,
    /// A key component has no stable string form.
    KeyRender,
    /// The user-supplied producer failed while computing a value for a cache miss.
    ProducerFailure,
    /// The expiring store failed to serve a lookup or write.
    Store,
}

impl ErrorKind {
    /// Returns a short, stable label for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NullInput => "null input",
            Self::UnsupportedShape => "unsupported expression shape",
            Self::KeyRender => "key component cannot be rendered",
            Self::ProducerFailure => "producer failed",
            Self::Store => "store operation failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a memoization or store operation.
///
/// The [`kind`](Self::kind) tells what went wrong; the underlying cause, when there is
/// one, is reachable through [`std::error::Error::source()`].
///
/// # Example
///
/// ```
/// use memento_store::{Error, ErrorKind};
///
/// let error = Error::unsupported_shape("member access rooted at a method call");
/// assert_eq!(error.kind(), ErrorKind::UnsupportedShape);
/// ```
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Creates a [`ErrorKind::NullInput`] error describing the missing input.
    pub fn null_input(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::NullInput, cause)
    }

    /// Creates a [`ErrorKind::UnsupportedShape`] error describing the offending node.
    pub fn unsupported_shape(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::UnsupportedShape, cause)
    }

    /// Creates a [`ErrorKind::KeyRender`] error describing the component that failed to render.
    pub fn key_render(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::KeyRender, cause)
    }

    /// Wraps a producer's error as [`ErrorKind::ProducerFailure`].
    ///
    /// The original error stays available through `source()` and
    /// [`ErrorExt::find_source`](ohno::ErrorExt::find_source).
    pub fn producer(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::ProducerFailure, cause)
    }

    /// Creates a [`ErrorKind::Store`] error from any store-level failure.
    pub fn store(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Store, cause)
    }
}

/// A specialized [`Result`] type for memoization and store operations.
pub type Result<T> = std::result::Result<T, Error>;
