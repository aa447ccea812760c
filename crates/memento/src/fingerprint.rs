// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Derives cache key components from expression trees.
//!
//! The rules depend on the root of the body:
//!
//! | Root | Components |
//! | --- | --- |
//! | [`Node::Constant`] | the literal |
//! | [`Node::MethodCall`] | one per argument, in order |
//! | [`Node::MemberAccess`] | the value at the end of the chain |
//! | [`Node::Conversion`] | whatever the wrapped node yields |
//! | [`Node::Invocation`] | the result of evaluating the expression, see [`Expression::invocation`] |
//!
//! Only the invocation rule runs user code, and only for expressions built with
//! [`Expression::invocation`], which know how to turn their result into a key component. Method-call arguments must be constants or
//! member chains; nothing else is evaluated to produce a key.

use crate::{Error, Expression, Node, Result, Value};

/// Extracts the ordered key components of an expression.
///
/// # Errors
///
/// Returns [`ErrorKind::UnsupportedShape`](crate::ErrorKind::UnsupportedShape) when a member
/// chain is not rooted at a constant, when a method-call argument is neither a constant
/// nor a member chain, when a field cannot be read, or when an invocation body was not
/// built with [`Expression::invocation`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use memento::{Captures, Expression, Node, Value, fingerprint};
///
/// let (a, b) = (2, 3);
/// let env = Arc::new(Captures::new().with("a", a).with("b", b));
/// let body = Node::call("add", [Node::captured(&env, "a"), Node::captured(&env, "b")]);
/// let expr = Expression::new(body, move || a + b);
///
/// assert_eq!(fingerprint(&expr)?, vec![Value::Int(2), Value::Int(3)]);
/// # Ok::<(), memento::Error>(())
/// ```
pub fn fingerprint<F, T>(expression: &Expression<F>) -> Result<Vec<Value>>
where
    F: Fn() -> T,
    T: 'static,
{
    let (components, _) = fingerprint_retaining(expression)?;
    Ok(components)
}

/// Like [`fingerprint`], but hands back the evaluated result when the invocation fallback
/// had to run the expression, so callers can avoid evaluating it twice.
pub(crate) fn fingerprint_retaining<F, T>(expression: &Expression<F>) -> Result<(Vec<Value>, Option<T>)>
where
    F: Fn() -> T,
    T: 'static,
{
    let mut retained = None;
    let values = components(expression.body(), || {
        if !expression.keyed_by_result() {
            return Err(Error::unsupported_shape(
                "invocation result has no key form, build the expression with `Expression::invocation`",
            ));
        }
        let result = expression.evaluate();
        let component = expression
            .result_key(&result)
            .ok_or_else(|| Error::unsupported_shape("invocation result does not match the expression's result type"));
        retained = Some(result);
        component
    })?;
    Ok((values, retained))
}

fn components(node: &Node, fallback: impl FnOnce() -> Result<Value>) -> Result<Vec<Value>> {
    match node {
        Node::Constant(value) => Ok(vec![value.clone()]),
        Node::MethodCall { args, .. } => args.iter().map(argument).collect(),
        Node::MemberAccess { .. } => Ok(vec![resolve_chain(node)?]),
        Node::Conversion(inner) => components(inner, fallback),
        Node::Invocation { .. } => Ok(vec![fallback()?]),
    }
}

fn argument(node: &Node) -> Result<Value> {
    match node {
        Node::Constant(value) => Ok(value.clone()),
        Node::Conversion(inner) => argument(inner),
        Node::MemberAccess { .. } => resolve_chain(node),
        other => Err(Error::unsupported_shape(format!(
            "method call argument is a {}, expected a constant or member access",
            other.describe()
        ))),
    }
}

fn resolve_chain(node: &Node) -> Result<Value> {
    match node {
        Node::Constant(value) => Ok(value.clone()),
        Node::MemberAccess { target, member } => read_field(&resolve_chain(target)?, member),
        other => Err(Error::unsupported_shape(format!(
            "member access is rooted at a {}, expected a constant",
            other.describe()
        ))),
    }
}

fn read_field(owner: &Value, member: &str) -> Result<Value> {
    match owner {
        Value::Record(fields) => fields
            .field(member)
            .ok_or_else(|| Error::unsupported_shape(format!("field `{member}` does not exist"))),
        other => Err(Error::unsupported_shape(format!(
            "field `{member}` read from a {} value",
            other.kind_name()
        ))),
    }
}
