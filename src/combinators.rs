//! Wrappers that give a transform its repetition, filtering and error policy.
//!
//! - [`for_each_value`]: apply per occurrence of a repeated field
//! - [`filter_values`]: drop empty entries from the result
//! - [`ignore_value`]: treat a failure as "nothing to store"
//!
//! Wrappers nest freely, and [`TransformExt`] offers the same wrappers as
//! chained methods:
//!
//! ```
//! use marcdo::combinators::TransformExt;
//! use marcdo::transform::rule;
//! use serde_json::json;
//!
//! let isbn = rule(|_, _, value| Ok(json!({"isbn": value.get("a"), "qualifier": value.get("q")})))
//!     .for_each_value()
//!     .filter_values();
//! # let _ = isbn;
//! ```

use crate::transform::{Context, Merge, Transform, TransformResult};
use serde_json::{Map, Value};

/// Whether a value counts as empty: `null`, `[]` or `{}`.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Remove empty entries from an object, or from each object inside an array.
///
/// Other values are returned unchanged.
#[must_use]
pub fn strip_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_map(map)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(strip_map(map)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn strip_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_, value)| !is_empty_value(value))
        .collect()
}

/// Apply a transform to every occurrence of a repeated field.
///
/// See [`for_each_value`].
#[derive(Debug, Clone, Copy)]
pub struct ForEachValue<T>(T);

/// Apply `transform` to each element when the raw value is an array.
///
/// An array of N occurrences yields an array of N results in the same order; a
/// single occurrence yields the bare result, not a one-element array. Rules
/// built this way extend, rather than replace, a value another tag already
/// stored under the same name.
pub fn for_each_value<T: Transform>(transform: T) -> ForEachValue<T> {
    ForEachValue(transform)
}

impl<T: Transform> Transform for ForEachValue<T> {
    fn apply(&self, ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.0.apply(ctx, key, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            single => self.0.apply(ctx, key, single),
        }
    }

    fn merge(&self) -> Merge {
        Merge::Extend
    }
}

/// Drop empty entries from a transform's result.
///
/// See [`filter_values`].
#[derive(Debug, Clone, Copy)]
pub struct FilterValues<T>(T);

/// Remove `null`, `[]` and `{}` entries from the result of `transform`.
///
/// Applies to an object result, or to each object in an array result. The
/// filter is idempotent. Stack it outside [`for_each_value`] so one filter
/// covers every occurrence.
pub fn filter_values<T: Transform>(transform: T) -> FilterValues<T> {
    FilterValues(transform)
}

impl<T: Transform> Transform for FilterValues<T> {
    fn apply(&self, ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        self.0.apply(ctx, key, value).map(strip_empty)
    }

    fn merge(&self) -> Merge {
        self.0.merge()
    }
}

/// Swallow a transform's failure.
///
/// See [`ignore_value`].
#[derive(Debug, Clone, Copy)]
pub struct IgnoreValue<T>(T);

/// Turn any error from `transform` into `Value::Null`.
///
/// The registry stores nothing for a null result and lists the field under
/// [`Outcome::absent`](crate::overdo::Outcome::absent). Successful results pass
/// through unchanged.
pub fn ignore_value<T: Transform>(transform: T) -> IgnoreValue<T> {
    IgnoreValue(transform)
}

impl<T: Transform> Transform for IgnoreValue<T> {
    fn apply(&self, ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        match self.0.apply(ctx, key, value) {
            Ok(result) => Ok(result),
            Err(error) => {
                tracing::debug!(%key, %error, "ignoring failed value");
                Ok(Value::Null)
            }
        }
    }

    fn merge(&self) -> Merge {
        self.0.merge()
    }
}

/// Chained-method access to the combinators.
pub trait TransformExt: Transform + Sized {
    /// Wrap with [`for_each_value`].
    fn for_each_value(self) -> ForEachValue<Self> {
        for_each_value(self)
    }

    /// Wrap with [`filter_values`].
    fn filter_values(self) -> FilterValues<Self> {
        filter_values(self)
    }

    /// Wrap with [`ignore_value`].
    fn ignore_value(self) -> IgnoreValue<Self> {
        ignore_value(self)
    }
}

impl<T: Transform> TransformExt for T {}
