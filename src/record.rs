//! Raw and transformed record shapes.
//!
//! Records travel through the engine as insertion-ordered JSON objects:
//! - [`RawRecord`]: field tag (`"001"`, `"24510"`, `"650_0"`) to one raw field
//!   value, or an array of them when the tag repeats
//! - [`OutputRecord`]: semantic name to transformed value
//!
//! Both may carry the reserved [`ORDER_KEY`] entry recording source order.
//! [`FieldResult`] and [`SubfieldRef`] give rule bodies a typed way to build the
//! per-field `__order__` list instead of assembling magic keys by hand.
//!
//! # Examples
//!
//! ```
//! use marcdo::record::{occurrence_order, RawRecord};
//! use serde_json::json;
//!
//! let record: RawRecord = serde_json::from_value(json!({
//!     "245__": {"a": "Title"},
//!     "650_0": [{"a": "Novels"}, {"a": "Fiction"}],
//! })).unwrap();
//!
//! assert_eq!(occurrence_order(&record), ["245__", "650_0", "650_0"]);
//! ```

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Reserved key holding source order, at record level and inside fields.
pub const ORDER_KEY: &str = "__order__";

/// Pseudo-subfield key carrying the first indicator.
pub const IND1_KEY: &str = "$ind1";

/// Pseudo-subfield key carrying the second indicator.
pub const IND2_KEY: &str = "$ind2";

/// Placeholder used in tags and pseudo-subfields for a blank indicator.
pub const BLANK_INDICATOR: char = '_';

/// A raw, tag-keyed record as produced by a loader.
pub type RawRecord = Map<String, Value>;

/// A transformed, name-keyed record as produced by a registry.
pub type OutputRecord = Map<String, Value>;

/// Field occurrences held by a raw value.
///
/// An array is a repeated field (one element per occurrence); anything else is
/// a single occurrence.
#[must_use]
pub fn occurrences(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// The source order of field occurrences in a record, one tag per occurrence.
///
/// An explicit record-level `__order__` array wins; otherwise the order is
/// derived from key order, each tag repeated once per occurrence.
#[must_use]
pub fn occurrence_order(record: &RawRecord) -> Vec<String> {
    if let Some(Value::Array(order)) = record.get(ORDER_KEY) {
        return order
            .iter()
            .filter_map(|tag| tag.as_str().map(str::to_string))
            .collect();
    }

    let mut order = Vec::new();
    for (tag, value) in record {
        if tag == ORDER_KEY {
            continue;
        }
        for _ in occurrences(value) {
            order.push(tag.clone());
        }
    }
    order
}

/// Every occurrence in `map`, in source order.
///
/// Walks [`occurrence_order`] with one cursor per key, so interleaved keys
/// (`650_0`, `650_7`, `650_0`) come back interleaved. Keys the order names but
/// the map lacks are skipped; occurrences the order never reaches follow in
/// key order.
#[must_use]
pub fn ordered_occurrences(map: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut cursors: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::new();

    for key in occurrence_order(map) {
        let Some((key, value)) = map.get_key_value(key.as_str()) else {
            tracing::debug!(%key, "order names a key the record does not have");
            continue;
        };
        if key == ORDER_KEY {
            continue;
        }
        let cursor = cursors.entry(key.as_str()).or_insert(0);
        if let Some(occurrence) = occurrences(value).get(*cursor) {
            out.push((key.as_str(), occurrence));
            *cursor += 1;
        }
    }

    for (key, value) in map {
        if key == ORDER_KEY {
            continue;
        }
        let consumed = cursors.get(key.as_str()).copied().unwrap_or(0);
        for occurrence in occurrences(value).iter().skip(consumed) {
            out.push((key.as_str(), occurrence));
        }
    }
    out
}

/// Indicator characters carried in positions 4 and 5 of a data-field tag.
#[must_use]
pub fn indicators(tag: &str) -> (Option<char>, Option<char>) {
    let mut chars = tag.chars().skip(3);
    (chars.next(), chars.next())
}

/// Short name of a JSON value's kind, for error messages.
#[must_use]
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A position within a field: a subfield code or one of the two indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubfieldRef {
    /// A subfield, identified by its one-character code.
    Code(char),
    /// The first indicator, rendered as `$ind1`.
    Indicator1,
    /// The second indicator, rendered as `$ind2`.
    Indicator2,
}

impl SubfieldRef {
    /// Parse the rendered form (`"a"`, `"$ind1"`, `"$ind2"`).
    ///
    /// Returns `None` for anything else, including multi-character codes.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            IND1_KEY => Some(SubfieldRef::Indicator1),
            IND2_KEY => Some(SubfieldRef::Indicator2),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => Some(SubfieldRef::Code(code)),
                    _ => None,
                }
            }
        }
    }

    /// Whether this position is an indicator rather than a subfield.
    #[must_use]
    pub const fn is_indicator(&self) -> bool {
        matches!(self, SubfieldRef::Indicator1 | SubfieldRef::Indicator2)
    }
}

impl fmt::Display for SubfieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubfieldRef::Code(code) => write!(f, "{code}"),
            SubfieldRef::Indicator1 => f.write_str(IND1_KEY),
            SubfieldRef::Indicator2 => f.write_str(IND2_KEY),
        }
    }
}

/// The result of converting one field occurrence.
///
/// Carries the converted key-value payload together with the source order of
/// the positions it came from. Rendering to the output shape stores that order
/// under `__order__`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldResult {
    /// Converted payload.
    pub value: Map<String, Value>,
    /// Source positions in the order they appeared.
    pub subfield_order: Vec<SubfieldRef>,
}

impl FieldResult {
    /// Create an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payload entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.value.insert(key.into(), value);
    }

    /// Record that `position` appeared next in the source.
    pub fn push_order(&mut self, position: SubfieldRef) {
        self.subfield_order.push(position);
    }

    /// Render with `__order__` listing positions in their rendered form.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.into_value_named(|position| Some(position.to_string()))
    }

    /// Render with `__order__` listing the name `name_of` gives each position.
    ///
    /// Positions mapped to `None` are left out of the order. The `__order__`
    /// key is omitted entirely when no position survives.
    pub fn into_value_named<F>(self, name_of: F) -> Value
    where
        F: Fn(&SubfieldRef) -> Option<String>,
    {
        let FieldResult {
            value,
            subfield_order,
        } = self;

        let order: Vec<Value> = subfield_order
            .iter()
            .filter_map(&name_of)
            .map(Value::String)
            .collect();

        let mut out = Map::with_capacity(value.len() + 1);
        if !order.is_empty() {
            out.insert(ORDER_KEY.to_string(), Value::Array(order));
        }
        out.extend(value);
        Value::Object(out)
    }
}
