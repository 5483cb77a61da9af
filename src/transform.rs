//! The transform contract every rule implements.
//!
//! A transform converts one raw field value into one output value. It receives a
//! [`Context`] giving read access to the output built so far and to the
//! registry's [`Index`], the tag being converted, and the raw value.
//!
//! Plain functions and closures with the right signature are transforms:
//!
//! ```
//! use marcdo::transform::{Context, TransformResult};
//! use serde_json::Value;
//!
//! fn control_number(_ctx: &Context<'_>, _tag: &str, value: &Value) -> TransformResult {
//!     Ok(value.clone())
//! }
//! ```
//!
//! Returning `Value::Null` means "nothing to store": the registry leaves the
//! semantic name out of the output.

use crate::error::RuleError;
use crate::index::Index;
use serde_json::{Map, Value};

/// Result type returned by transforms.
pub type TransformResult = std::result::Result<Value, RuleError>;

/// How a rule's result combines with a value already stored under its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Merge {
    /// The new value replaces the existing one.
    #[default]
    Replace,
    /// The new value is appended, turning the stored value into an array.
    Extend,
}

/// Read-only view handed to every transform call.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    index: &'a Index,
    output: &'a Map<String, Value>,
}

impl<'a> Context<'a> {
    /// Create a context over an index and an in-progress output.
    #[must_use]
    pub fn new(index: &'a Index, output: &'a Map<String, Value>) -> Self {
        Context { index, output }
    }

    /// Output produced by the rules that ran before this one.
    #[must_use]
    pub fn output(&self) -> &'a Map<String, Value> {
        self.output
    }

    /// Value already stored under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.output.get(name)
    }

    /// The index of the registry running this transform.
    #[must_use]
    pub fn index(&self) -> &'a Index {
        self.index
    }
}

/// A conversion from one raw field value to one output value.
///
/// Implemented for every `Fn(&Context, &str, &Value) -> TransformResult`
/// and by the wrappers in [`combinators`](crate::combinators).
pub trait Transform: Send + Sync {
    /// Convert `value`, found under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] when the value cannot be converted.
    fn apply(&self, ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult;

    /// How results are stored when the name already holds a value.
    fn merge(&self) -> Merge {
        Merge::Replace
    }
}

impl<F> Transform for F
where
    F: Fn(&Context<'_>, &str, &Value) -> TransformResult + Send + Sync,
{
    fn apply(&self, ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        self(ctx, key, value)
    }
}

/// Pin a closure to the transform signature.
///
/// Closures passed straight to a generic `T: Transform` parameter cannot infer
/// their argument types; routing them through `rule` fixes that.
///
/// ```
/// use marcdo::combinators::for_each_value;
/// use marcdo::transform::rule;
///
/// let upper = for_each_value(rule(|_, _, value| {
///     Ok(value.as_str().map(str::to_uppercase).into())
/// }));
/// # let _ = upper;
/// ```
pub fn rule<F>(f: F) -> F
where
    F: Fn(&Context<'_>, &str, &Value) -> TransformResult + Send + Sync,
{
    f
}

/// Store `value` under `name` following `merge`.
pub(crate) fn merge_into(output: &mut Map<String, Value>, name: &str, value: Value, merge: Merge) {
    match (merge, output.get_mut(name)) {
        (Merge::Extend, Some(existing)) => {
            let mut items = match existing.take() {
                Value::Array(items) => items,
                other => vec![other],
            };
            match value {
                Value::Array(more) => items.extend(more),
                other => items.push(other),
            }
            *existing = Value::Array(items);
        }
        _ => {
            output.insert(name.to_string(), value);
        }
    }
}
