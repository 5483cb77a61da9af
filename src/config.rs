//! Configuration options for a rule registry.
//!
//! This module provides the [`OverdoConfig`] struct which controls how an
//! [`Overdo`](crate::Overdo) reacts to duplicate registrations and to tags no
//! rule matches.

use std::fmt;

/// What happens when a semantic name is registered a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later rule replaces the earlier one and a warning is logged.
    #[default]
    Replace,
    /// Registration fails with [`MarcdoError::DuplicateRule`](crate::MarcdoError::DuplicateRule).
    Reject,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// What happens when a record contains a tag no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// The field is dropped and reported as missing.
    #[default]
    Record,
    /// The transformation fails with [`MarcdoError::MissingRule`](crate::MarcdoError::MissingRule).
    Fail,
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Configuration for a rule registry.
///
/// # Examples
///
/// ```
/// use marcdo::config::{DuplicatePolicy, MissingPolicy, OverdoConfig};
///
/// // Default configuration (last registration wins, unmatched tags reported)
/// let config = OverdoConfig::default();
/// assert_eq!(config.duplicates, DuplicatePolicy::Replace);
///
/// // Strict configuration for rule-set development
/// let config = OverdoConfig::new()
///     .with_duplicates(DuplicatePolicy::Reject)
///     .with_missing(MissingPolicy::Fail);
/// assert_eq!(config.missing, MissingPolicy::Fail);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverdoConfig {
    /// Reaction to a semantic name registered twice.
    pub duplicates: DuplicatePolicy,

    /// Reaction to a tag without a matching rule.
    pub missing: MissingPolicy,
}

impl OverdoConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate-registration policy.
    #[must_use]
    pub const fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Sets the missing-rule policy.
    #[must_use]
    pub const fn with_missing(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Shorthand for rejecting duplicates and failing on missing rules.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            duplicates: DuplicatePolicy::Reject,
            missing: MissingPolicy::Fail,
        }
    }
}
