// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Expression trees describing memoized computations.
//!
//! An [`Expression`] pairs a closure with a [`Node`] tree that describes what the closure
//! reads. The fingerprinter walks the tree to derive a cache key without running the
//! closure. Free variables are modeled as fields of a [`Value::Record`], typically a
//! [`Captures`] environment.

use std::{any::Any, fmt, sync::Arc};

use crate::Value;

/// Read access to named fields of a value.
///
/// This is how the fingerprinter follows member-access chains. Implement it for any type
/// whose fields should be usable as key inputs.
///
/// # Examples
///
/// ```
/// use memento::{Fields, Value};
///
/// #[derive(Debug)]
/// struct Order {
///     id: u64,
///     region: String,
/// }
///
/// impl Fields for Order {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "id" => Some(self.id.into()),
///             "region" => Some(self.region.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Fields: fmt::Debug + Send + Sync {
    /// Returns the value of the field called `name`, or `None` if there is no such field.
    fn field(&self, name: &str) -> Option<Value>;
}

/// A set of named values captured from the caller's scope.
///
/// # Examples
///
/// ```
/// use memento::{Captures, Fields, Value};
///
/// let env = Captures::new().with("i", 3).with("name", "west");
/// assert_eq!(env.field("i"), Some(Value::Int(3)));
/// assert_eq!(env.field("missing"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Captures {
    fields: Vec<(String, Value)>,
}

impl Captures {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named value, replacing any earlier value with the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Returns the number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wraps the environment in a shared record value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Record(Arc::new(self))
    }
}

impl Fields for Captures {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.iter().find(|(existing, _)| existing == name).map(|(_, value)| value.clone())
    }
}

/// The shape of an expression body.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A literal value, or a reference to a captured environment.
    Constant(Value),
    /// A call to a named function with the given arguments.
    MethodCall {
        /// The callee. Not part of any derived key.
        name: String,
        /// The arguments in call order.
        args: Vec<Node>,
    },
    /// An invocation of an opaque delegate whose inputs cannot be inspected.
    Invocation {
        /// The delegate, for diagnostics.
        name: String,
    },
    /// A read of `member` from the value produced by `target`.
    MemberAccess {
        /// The object the member is read from.
        target: Box<Node>,
        /// The field name.
        member: String,
    },
    /// A type conversion wrapping another node.
    Conversion(Box<Node>),
}

impl Node {
    /// Creates a [`Node::Constant`].
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Creates a [`Node::MethodCall`].
    #[must_use]
    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::MethodCall {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Creates a [`Node::Invocation`].
    #[must_use]
    pub fn invoke(name: impl Into<String>) -> Self {
        Self::Invocation { name: name.into() }
    }

    /// Creates a [`Node::MemberAccess`] reading `member` from `target`.
    #[must_use]
    pub fn member(target: Self, member: impl Into<String>) -> Self {
        Self::MemberAccess {
            target: Box::new(target),
            member: member.into(),
        }
    }

    /// Creates a [`Node::Conversion`].
    #[must_use]
    pub fn convert(inner: Self) -> Self {
        Self::Conversion(Box::new(inner))
    }

    /// Reads the captured variable `name` from a shared environment.
    ///
    /// Equivalent to `Node::member(Node::Constant(env.into()), name)`.
    #[must_use]
    pub fn captured(env: &Arc<Captures>, name: impl Into<String>) -> Self {
        let env: Arc<dyn Fields> = Arc::<Captures>::clone(env);
        Self::member(Self::Constant(Value::Record(env)), name)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Constant(value) => format!("constant {}", value.kind_name()),
            Self::MethodCall { name, .. } => format!("call to `{name}`"),
            Self::Invocation { name } => format!("invocation of `{name}`"),
            Self::MemberAccess { member, .. } => format!("member access `.{member}`"),
            Self::Conversion(_) => "conversion".to_string(),
        }
    }
}

/// Turns an evaluated result back into a key component.
type ResultKey = fn(&dyn Any) -> Option<Value>;

/// A zero-argument computation together with a description of its body.
///
/// The description must mirror what the closure actually does: the fingerprinter trusts
/// it to decide which inputs make two evaluations equivalent. The result type is free
/// unless the key has to come from the result itself; see [`Expression::invocation`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use memento::{Captures, Expression, Node};
///
/// let i = 4;
/// let env = Arc::new(Captures::new().with("i", i));
/// let square = |x: i64| x * x;
///
/// let expr = Expression::new(Node::call("square", [Node::captured(&env, "i")]), move || square(i));
/// assert_eq!(expr.evaluate(), 16);
/// ```
pub struct Expression<F> {
    body: Node,
    eval: F,
    result_key: Option<ResultKey>,
}

impl<F> Expression<F> {
    /// Creates an expression from its body description and the closure it describes.
    pub fn new(body: Node, eval: F) -> Self {
        Self {
            body,
            eval,
            result_key: None,
        }
    }

    /// Creates an expression whose body is a single literal.
    pub fn constant<T>(value: T, eval: F) -> Self
    where
        T: Into<Value>,
    {
        Self::new(Node::constant(value), eval)
    }

    /// Creates an expression for an opaque delegate whose inputs cannot be described.
    ///
    /// The body is a [`Node::Invocation`], so the key is the evaluated result itself. That
    /// is why the result must convert into a [`Value`].
    ///
    /// # Examples
    ///
    /// ```
    /// use memento::{Expression, Value, fingerprint};
    ///
    /// let lookup = || 12_i64;
    /// let expr = Expression::invocation("lookup", lookup);
    /// assert_eq!(fingerprint(&expr)?, vec![Value::Int(12)]);
    /// # Ok::<(), memento::Error>(())
    /// ```
    pub fn invocation<T>(name: impl Into<String>, eval: F) -> Self
    where
        F: Fn() -> T,
        T: Clone + Into<Value> + 'static,
    {
        Self {
            body: Node::invoke(name),
            eval,
            result_key: Some(result_as_key::<T> as ResultKey),
        }
    }

    /// Returns the body description.
    #[must_use]
    pub fn body(&self) -> &Node {
        &self.body
    }

    /// Runs the underlying closure.
    pub fn evaluate<T>(&self) -> T
    where
        F: Fn() -> T,
    {
        (self.eval)()
    }

    pub(crate) fn keyed_by_result(&self) -> bool {
        self.result_key.is_some()
    }

    pub(crate) fn result_key(&self, result: &dyn Any) -> Option<Value> {
        self.result_key.and_then(|render| render(result))
    }
}

fn result_as_key<T>(result: &dyn Any) -> Option<Value>
where
    T: Clone + Into<Value> + 'static,
{
    result.downcast_ref::<T>().map(|value| value.clone().into())
}

impl<F> fmt::Debug for Expression<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("body", &self.body)
            .field("keyed_by_result", &self.result_key.is_some())
            .finish_non_exhaustive()
    }
}
