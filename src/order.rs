//! Record-level field order.
//!
//! Grouping a record's output by semantic name loses the interleaving of its
//! source fields. [`FieldOrder`] keeps it: one [`OrderEntry`] per field
//! occurrence, resolved against an [`Index`].
//!
//! A registry that registers [`field_order`] under [`ORDER_KEY`] also writes the
//! order into the output, as an array of names with the raw tag standing in for
//! any tag no rule matched:
//!
//! ```
//! use marcdo::order::field_order;
//! use marcdo::record::ORDER_KEY;
//! use marcdo::transform::rule;
//! use marcdo::Overdo;
//! use serde_json::json;
//!
//! let mut marc = Overdo::new("marc");
//! marc.over("lc_control_number", "^010..")?.rule(rule(|_, _, v| Ok(v.clone())))?;
//! marc.over("title_statement", "^245..")?.rule(rule(|_, _, v| Ok(v.clone())))?;
//! marc.over(ORDER_KEY, ORDER_KEY)?.rule(field_order)?;
//!
//! let record = serde_json::from_value(json!({
//!     "010__": {"a": "2001012345"},
//!     "245__": {"a": "Title"},
//! })).unwrap();
//! let output = marc.transform(&record)?;
//! assert_eq!(output[ORDER_KEY], json!(["lc_control_number", "title_statement"]));
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```
//!
//! [`ORDER_KEY`]: crate::record::ORDER_KEY

use crate::error::RuleError;
use crate::index::Index;
use crate::transform::{Context, TransformResult};
use serde_json::Value;

/// One field occurrence in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEntry {
    /// The tag matched a rule.
    Resolved {
        /// Source tag.
        tag: String,
        /// Name of the most specific matching rule.
        name: String,
    },
    /// No rule matched the tag.
    Unresolved {
        /// Source tag.
        tag: String,
    },
}

impl OrderEntry {
    /// Source tag of this occurrence.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            OrderEntry::Resolved { tag, .. } | OrderEntry::Unresolved { tag } => tag,
        }
    }

    /// Resolved name, or the raw tag when unresolved.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            OrderEntry::Resolved { name, .. } => name,
            OrderEntry::Unresolved { tag } => tag,
        }
    }

    /// Whether a rule matched this occurrence.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, OrderEntry::Resolved { .. })
    }
}

/// Source order of a record's field occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOrder {
    entries: Vec<OrderEntry>,
}

impl FieldOrder {
    /// Resolve each occurrence tag to the first name `index` returns for it.
    pub fn resolve<I, S>(tags: I, index: &Index) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = tags
            .into_iter()
            .map(|tag| {
                let tag = tag.as_ref();
                match index.query(tag).first() {
                    Some(name) => OrderEntry::Resolved {
                        tag: tag.to_string(),
                        name: (*name).to_string(),
                    },
                    None => OrderEntry::Unresolved {
                        tag: tag.to_string(),
                    },
                }
            })
            .collect();
        FieldOrder { entries }
    }

    /// Entries in source order.
    #[must_use]
    pub fn entries(&self) -> &[OrderEntry] {
        &self.entries
    }

    /// Labels in source order: names, or raw tags where unresolved.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(OrderEntry::label)
    }

    /// Number of occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record had no field occurrences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as the `__order__` output shape: an array of labels.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.labels().map(|label| Value::String(label.to_string())).collect())
    }
}

/// The standard `__order__` hook.
///
/// Receives the array of occurrence tags and returns the array of resolved
/// names, keeping the raw tag where nothing matched.
///
/// # Errors
///
/// Returns [`RuleError::UnexpectedValue`] if `value` is not an array of strings.
pub fn field_order(ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
    let tags = value
        .as_array()
        .ok_or_else(|| RuleError::unexpected(key, "array of tags", value))?;

    let tags = tags
        .iter()
        .map(|tag| {
            tag.as_str()
                .ok_or_else(|| RuleError::unexpected(key, "tag string", tag))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!(occurrences = tags.len(), "resolving field order");
    Ok(FieldOrder::resolve(tags, ctx.index()).to_value())
}
