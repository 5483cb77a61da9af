//! Error types for rule registration and record transformation.
//!
//! This module provides the [`MarcdoError`] type for all engine operations,
//! the [`RuleError`] type returned by individual transforms, and the
//! [`Result`] convenience type.

use thiserror::Error;

/// Error type for all engine operations.
///
/// Covers rule-authoring mistakes caught at registration time, failures raised
/// while transforming a record, and errors from the loaders and dumpers.
#[derive(Error, Debug)]
pub enum MarcdoError {
    /// A rule pattern failed to compile.
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern as written by the rule author.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A semantic name was registered twice under a rejecting policy.
    #[error("Duplicate rule: {0}")]
    DuplicateRule(String),

    /// A tag had no matching rule under a failing missing-field policy.
    #[error("No rule matches tag {0:?}")]
    MissingRule(String),

    /// A transform returned an error.
    #[error("Rule {name:?} failed on tag {tag:?}: {source}")]
    Rule {
        /// The tag being transformed.
        tag: String,
        /// Semantic name of the failing rule.
        name: String,
        /// The transform's own error.
        #[source]
        source: RuleError,
    },

    /// No rule set is registered under the given name.
    #[error("Unknown rule set: {0}")]
    UnknownRuleSet(String),

    /// No loader is registered under the given name.
    #[error("Unknown loader: {0}")]
    UnknownLoader(String),

    /// No dumper is registered under the given name.
    #[error("Unknown dumper: {0}")]
    UnknownDumper(String),

    /// Input that does not have the shape of a record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Error during parsing or serialization of a record format.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON error from the underlying serializer.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Error raised by a single transform while converting one field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The raw value did not have the expected shape.
    #[error("expected {expected} for {key}, found {found}")]
    UnexpectedValue {
        /// Tag or name of the value being converted.
        key: String,
        /// Shape the transform expected.
        expected: &'static str,
        /// Short description of what was found instead.
        found: String,
    },

    /// A subfield the transform requires is not present.
    #[error("missing subfield ${code} in {key}")]
    MissingSubfield {
        /// Tag of the field being converted.
        key: String,
        /// Required subfield code.
        code: char,
    },

    /// Any other transform failure.
    #[error("{0}")]
    Custom(String),
}

impl RuleError {
    /// Create a [`RuleError::Custom`] from any displayable message.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        RuleError::Custom(message.to_string())
    }

    /// Create a [`RuleError::UnexpectedValue`] describing `found` by its JSON kind.
    #[must_use]
    pub fn unexpected(key: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        RuleError::UnexpectedValue {
            key: key.to_string(),
            expected,
            found: crate::record::kind_of(found).to_string(),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcdoError`].
pub type Result<T> = std::result::Result<T, MarcdoError>;
