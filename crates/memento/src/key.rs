// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache keys and the values they are built from.

use std::{fmt, sync::Arc};

use crate::{Error, Result, expr::Fields};

/// A single input to a cache key.
///
/// Scalars render to a stable string form and can appear in keys. [`Value::Record`] holds
/// an object with named fields, such as a [`Captures`](crate::Captures) environment; records
/// are only navigated by the fingerprinter and never rendered themselves.
///
/// # Examples
///
/// ```
/// use memento::Value;
///
/// assert_eq!(Value::from(42), Value::Int(42));
/// assert_eq!(Value::from("abc"), Value::Str("abc".to_string()));
/// assert_eq!(Value::from(None::<u8>), Value::Null);
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// The absence of a value. Cannot be rendered into a key.
    Null,
    /// A boolean, rendered as `true` or `false`.
    Bool(bool),
    /// A signed integer, rendered in decimal.
    Int(i64),
    /// An unsigned integer, rendered in decimal.
    UInt(u64),
    /// A floating point number, rendered with its shortest round-tripping form.
    Float(f64),
    /// A single character.
    Char(char),
    /// Literal text.
    Str(String),
    /// An object exposing named fields. Cannot be rendered into a key.
    Record(Arc<dyn Fields>),
}

impl Value {
    /// Returns a short name for the kind of value, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Record(_) => "record",
        }
    }

    /// Returns the stable string form of this value, or `None` if it has none.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::UInt(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Char(v) => Some(v.to_string()),
            Self::Str(v) => Some(v.clone()),
            Self::Null | Self::Record(_) => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($variant:ident($target:ty): $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

value_from!(Bool(bool): bool);
value_from!(Int(i64): i8, i16, i32, i64);
value_from!(UInt(u64): u8, u16, u32, u64);
value_from!(Float(f64): f32, f64);
value_from!(Char(char): char);
value_from!(Str(String): String, &str);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::UInt)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<F: Fields + 'static> From<Arc<F>> for Value {
    fn from(value: Arc<F>) -> Self {
        Self::Record(value)
    }
}

/// A composite cache key.
///
/// Keys are built from a namespace token followed by rendered [`Value`] components, all
/// joined with [`CacheKey::DELIMITER`]. The same inputs always produce the same key.
///
/// Components are joined without escaping, so distinct inputs can collide when a string
/// component contains the delimiter: `["a,b"]` and `["a", "b"]` render identically.
///
/// # Examples
///
/// ```
/// use memento::{CacheKey, Value};
///
/// let key = CacheKey::build("prices", &[Value::from("EUR"), Value::from(2024)])?;
/// assert_eq!(key.as_str(), "prices,EUR,2024");
/// # Ok::<(), memento::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// The separator placed between the namespace and each component.
    pub const DELIMITER: &'static str = ",";

    /// Builds a key from a namespace token and ordered components.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NullInput`](crate::ErrorKind::NullInput) if `namespace` is empty,
    /// and [`ErrorKind::KeyRender`](crate::ErrorKind::KeyRender) if a component is
    /// [`Value::Null`] or [`Value::Record`].
    pub fn build(namespace: &str, components: &[Value]) -> Result<Self> {
        if namespace.is_empty() {
            return Err(Error::null_input("cache key namespace is empty"));
        }

        let mut key = String::from(namespace);
        for (index, component) in components.iter().enumerate() {
            let rendered = component.render().ok_or_else(|| {
                Error::key_render(format!(
                    "component {index} is a {} value with no stable string form",
                    component.kind_name()
                ))
            })?;
            key.push_str(Self::DELIMITER);
            key.push_str(&rendered);
        }

        Ok(Self(key))
    }

    /// Returns the rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the rendered string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
