//! Pattern-keyed lookup from field tags to rule names.
//!
//! Each entry pairs a compiled [`Pattern`] with the semantic name of the rule it
//! selects. [`Index::query`] returns every name whose pattern matches a tag,
//! most specific first.
//!
//! # Matching
//!
//! Patterns are regular expressions anchored at the start of the tag, in the
//! style used throughout MARC rule tables:
//!
//! - `^020..`: tag 020, any indicators
//! - `^245[10_][0_1-9]`: tag 245 with constrained indicator positions
//! - `^title_statement$`: an exact semantic name (reverse direction)
//!
//! # Ordering
//!
//! When several patterns match, names are ordered by:
//! 1. number of literal characters in the pattern (more first)
//! 2. pattern length (longer first)
//! 3. registration order
//!
//! # Examples
//!
//! ```
//! use marcdo::index::Index;
//!
//! let mut index = Index::new();
//! index.register("^650..", "subject_added_entry_topical_term")?;
//! index.register("^6....", "subject_access_field")?;
//!
//! assert_eq!(
//!     index.query("650_0"),
//!     ["subject_added_entry_topical_term", "subject_access_field"]
//! );
//! assert!(index.query("245__").is_empty());
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```

use crate::error::{MarcdoError, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Reverse;
use std::sync::OnceLock;

/// Length of the literal tag prefix used to bucket patterns.
const PREFIX_LEN: usize = 3;

/// A compiled rule pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    specificity: usize,
    prefix: Option<String>,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MarcdoError::InvalidPattern`] if the regular expression is malformed.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(&format!("^(?:{pattern})")).map_err(|source| MarcdoError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Pattern {
            source: pattern.to_string(),
            regex,
            specificity: literal_count(pattern),
            prefix: literal_prefix(pattern),
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern matches `tag`.
    #[must_use]
    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Number of literal characters; higher means more specific.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    /// Fixed three-character prefix every matching tag starts with, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    pattern: Pattern,
    name: String,
    seq: u64,
}

impl Entry {
    fn rank(&self) -> (Reverse<usize>, Reverse<usize>, u64) {
        (
            Reverse(self.pattern.specificity),
            Reverse(self.pattern.source.len()),
            self.seq,
        )
    }
}

/// Candidate entry positions grouped by literal prefix, each list in rank order.
#[derive(Debug, Default)]
struct Table {
    buckets: IndexMap<String, Vec<usize>>,
    generic: Vec<usize>,
}

/// Lookup from field tags to the names of matching rules.
///
/// Registration compiles patterns immediately; the prefix table used by
/// [`query`](Self::query) is built on first use and rebuilt after any change.
#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<Entry>,
    next_seq: u64,
    table: OnceLock<Table>,
}

impl Index {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and register it under `name`.
    ///
    /// Duplicate patterns and names are retained; every matching entry is
    /// returned by [`query`](Self::query).
    ///
    /// # Errors
    ///
    /// Returns [`MarcdoError::InvalidPattern`] if the pattern is malformed.
    pub fn register(&mut self, pattern: &str, name: &str) -> Result<()> {
        let pattern = Pattern::new(pattern)?;
        self.insert(pattern, name);
        Ok(())
    }

    /// Register an already compiled pattern under `name`.
    pub fn insert(&mut self, pattern: Pattern, name: &str) {
        self.entries.push(Entry {
            pattern,
            name: name.to_string(),
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.table = OnceLock::new();
    }

    /// Drop every entry registered under `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.table = OnceLock::new();
        }
        removed
    }

    /// Names of all rules whose pattern matches `tag`, most specific first.
    ///
    /// Returns an empty vector when nothing matches.
    #[must_use]
    pub fn query(&self, tag: &str) -> Vec<&str> {
        let table = self.table();
        let bucket = tag
            .get(..PREFIX_LEN)
            .and_then(|prefix| table.buckets.get(prefix))
            .map_or(&[][..], Vec::as_slice);

        let mut matched: Vec<&Entry> = bucket
            .iter()
            .chain(&table.generic)
            .map(|&position| &self.entries[position])
            .filter(|entry| entry.pattern.is_match(tag))
            .collect();
        matched.sort_by_key(|entry| entry.rank());

        matched.into_iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Registered `(pattern, name)` pairs in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.pattern.as_str(), entry.name.as_str()))
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn table(&self) -> &Table {
        self.table.get_or_init(|| {
            let mut table = Table::default();
            for (position, entry) in self.entries.iter().enumerate() {
                match entry.pattern.prefix() {
                    Some(prefix) => table
                        .buckets
                        .entry(prefix.to_string())
                        .or_default()
                        .push(position),
                    None => table.generic.push(position),
                }
            }
            tracing::trace!(
                entries = self.entries.len(),
                buckets = table.buckets.len(),
                generic = table.generic.len(),
                "built index table"
            );
            table
        })
    }
}

/// Count literal characters, skipping classes, escapes, and operators.
fn literal_count(pattern: &str) -> usize {
    let mut count = 0;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // Escaped punctuation is literal; `\d`, `\w` and friends are classes.
                if chars.next().is_some_and(|escaped| !escaped.is_alphanumeric()) {
                    count += 1;
                }
            }
            '[' => {
                let mut escaped = false;
                for inner in chars.by_ref() {
                    match inner {
                        '\\' if !escaped => escaped = true,
                        ']' if !escaped => break,
                        _ => escaped = false,
                    }
                }
            }
            '(' => {
                // Group syntax: `(?:`, `(?i)`, `(?i:`, `(?P<name>`, `(?<name>`.
                if chars.next_if_eq(&'?').is_some() {
                    let named = chars.next_if(|&c| c == 'P' || c == '<').is_some();
                    for inner in chars.by_ref() {
                        if (named && inner == '>') || (!named && matches!(inner, ':' | ')')) {
                            break;
                        }
                    }
                }
            }
            '^' | '$' | '.' | ')' | '|' | '?' | '*' | '+' => {}
            '{' => {
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                }
            }
            _ => count += 1,
        }
    }
    count
}

/// The fixed three-character prefix of a start-anchored pattern, if it has one.
fn literal_prefix(pattern: &str) -> Option<String> {
    if pattern.contains('|') {
        return None;
    }
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    let mut chars = body.chars();
    let prefix: String = chars.by_ref().take(PREFIX_LEN).collect();
    if prefix.chars().count() < PREFIX_LEN
        || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    // A quantifier would make the last prefix character optional or repeated.
    match chars.next() {
        Some('?' | '*' | '+' | '{') => None,
        _ => Some(prefix),
    }
}
