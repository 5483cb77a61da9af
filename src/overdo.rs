//! The rule registry.
//!
//! An [`Overdo`] owns a set of rules, each a semantic name, a tag pattern and a
//! [`Transform`]. [`Overdo::transform`] runs every matching rule over a raw
//! record; [`Overdo::missing`] reports the tags no rule covers.
//!
//! # Examples
//!
//! ```
//! use marcdo::transform::{Context, TransformResult};
//! use marcdo::Overdo;
//! use serde_json::{json, Value};
//!
//! fn isbn(_ctx: &Context<'_>, _tag: &str, value: &Value) -> TransformResult {
//!     Ok(value["a"].clone())
//! }
//!
//! let mut marc = Overdo::new("marc21");
//! marc.over("international_standard_book_number", "^020..")?.rule(isbn)?;
//!
//! let record = serde_json::from_value(json!({
//!     "020__": {"a": "0123456789"},
//!     "999__": {"a": "x"},
//! })).unwrap();
//!
//! let output = marc.transform(&record)?;
//! assert_eq!(output["international_standard_book_number"], json!("0123456789"));
//! assert_eq!(marc.missing(&record), ["999__"]);
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```

use crate::config::{DuplicatePolicy, MissingPolicy, OverdoConfig};
use crate::error::{MarcdoError, Result};
use crate::index::{Index, Pattern};
use crate::order::FieldOrder;
use crate::record::{occurrence_order, ordered_occurrences, OutputRecord, RawRecord, ORDER_KEY};
use crate::transform::{merge_into, Context, Merge, Transform};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A registered rule.
#[derive(Clone)]
pub struct Rule {
    name: String,
    pattern: String,
    transform: Arc<dyn Transform>,
}

impl Rule {
    /// Semantic name results are stored under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern the rule was registered with.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Merge policy of the rule's transform.
    #[must_use]
    pub fn merge(&self) -> Merge {
        self.transform.merge()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("merge", &self.transform.merge())
            .finish_non_exhaustive()
    }
}

/// A matched rule that stored nothing for a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Absent {
    /// Source tag.
    pub tag: String,
    /// Name of the rule that matched.
    pub name: String,
}

/// Everything one pass over a record produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Transformed record, including `__order__` when an order hook ran.
    pub output: OutputRecord,
    /// Source order of field occurrences, resolved against the index.
    pub order: FieldOrder,
    /// Tags no rule matched, in order of first occurrence.
    pub missing: Vec<String>,
    /// Matched rules whose transform returned null, such as failures
    /// swallowed by [`ignore_value`](crate::combinators::ignore_value).
    pub absent: Vec<Absent>,
}

impl Outcome {
    /// The transformed record.
    #[must_use]
    pub fn into_output(self) -> OutputRecord {
        self.output
    }

    /// Whether every tag in the record matched a rule.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A registry of rules keyed by semantic name.
///
/// Rules are added through [`over`](Self::over). Once built, a registry is only
/// read, so it can be shared across threads.
pub struct Overdo {
    name: String,
    config: OverdoConfig,
    index: Index,
    rules: IndexMap<String, Rule>,
    order_hook: Option<Rule>,
}

impl fmt::Debug for Overdo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overdo")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("rules", &self.rules.len())
            .field("order_hook", &self.order_hook.is_some())
            .finish()
    }
}

impl Overdo {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, OverdoConfig::default())
    }

    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: OverdoConfig) -> Self {
        Overdo {
            name: name.into(),
            config,
            index: Index::new(),
            rules: IndexMap::new(),
            order_hook: None,
        }
    }

    /// Start registering a rule named `name` for tags matching `pattern`.
    ///
    /// The pattern is compiled here; finish with [`Over::rule`]. Registering
    /// under [`ORDER_KEY`] installs the order hook, which runs once after all
    /// fields and is never returned by index queries.
    ///
    /// # Errors
    ///
    /// Returns [`MarcdoError::InvalidPattern`] if the pattern is malformed.
    pub fn over(&mut self, name: &str, pattern: &str) -> Result<Over<'_>> {
        let pattern = Pattern::new(pattern)?;
        Ok(Over {
            registry: self,
            name: name.to_string(),
            pattern,
        })
    }

    fn insert(&mut self, name: String, pattern: Pattern, transform: Arc<dyn Transform>) -> Result<()> {
        let rule = Rule {
            name,
            pattern: pattern.as_str().to_string(),
            transform,
        };

        let exists = if rule.name == ORDER_KEY {
            self.order_hook.is_some()
        } else {
            self.rules.contains_key(&rule.name)
        };
        if exists {
            match self.config.duplicates {
                DuplicatePolicy::Reject => return Err(MarcdoError::DuplicateRule(rule.name)),
                DuplicatePolicy::Replace => {
                    tracing::warn!(
                        registry = %self.name,
                        rule = %rule.name,
                        pattern = %rule.pattern,
                        "rule registered twice, replacing earlier definition"
                    );
                }
            }
        }

        if rule.name == ORDER_KEY {
            self.order_hook = Some(rule);
            return Ok(());
        }

        self.index.remove(&rule.name);
        self.rules.shift_remove(&rule.name);
        self.index.insert(pattern, &rule.name);
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Transform a raw record into a semantic record.
    ///
    /// Field occurrences are processed in source order (the record's
    /// `__order__` when present). Every rule matching a tag runs and stores its
    /// result under its name; tags without a rule are dropped. Rules that
    /// extend receive one occurrence at a time, so values collected from
    /// interleaved tags keep their source order. When
    /// an order hook is registered its result is stored under `__order__`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcdoError::Rule`] when a transform fails, and
    /// [`MarcdoError::MissingRule`] for an unmatched tag under
    /// [`MissingPolicy::Fail`].
    #[doc(alias = "do")]
    pub fn transform(&self, record: &RawRecord) -> Result<OutputRecord> {
        self.run(record).map(Outcome::into_output)
    }

    /// Transform a raw record and report missing and absent fields alongside.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`transform`](Self::transform).
    pub fn run(&self, record: &RawRecord) -> Result<Outcome> {
        let _span = tracing::debug_span!("transform", registry = %self.name).entered();
        let mut outcome = Outcome::default();

        let mut seen: HashSet<&str> = HashSet::new();
        for (tag, occurrence) in ordered_occurrences(record) {
            let first = seen.insert(tag);
            let names = self.index.query(tag);
            if names.is_empty() {
                if !first {
                    continue;
                }
                if self.config.missing == MissingPolicy::Fail {
                    return Err(MarcdoError::MissingRule(tag.to_string()));
                }
                tracing::debug!(%tag, "no rule matches");
                outcome.missing.push(tag.to_string());
                continue;
            }

            let whole = &record[tag];
            for name in names {
                let rule = &self.rules[name];
                // Extending rules see one occurrence at a time, in source order;
                // replacing rules see the whole value once.
                let (input, wrap) = match rule.transform.merge() {
                    Merge::Extend => (occurrence, whole.is_array()),
                    Merge::Replace if first => (whole, false),
                    Merge::Replace => continue,
                };

                let result = rule
                    .transform
                    .apply(&Context::new(&self.index, &outcome.output), tag, input)
                    .map_err(|source| MarcdoError::Rule {
                        tag: tag.to_string(),
                        name: name.to_string(),
                        source,
                    })?;

                if result.is_null() {
                    tracing::debug!(%tag, rule = name, "rule produced no value");
                    outcome.absent.push(Absent {
                        tag: tag.to_string(),
                        name: name.to_string(),
                    });
                    continue;
                }
                let result = if wrap {
                    Value::Array(vec![result])
                } else {
                    result
                };
                merge_into(&mut outcome.output, name, result, rule.transform.merge());
            }
        }

        let tags = occurrence_order(record);
        outcome.order = FieldOrder::resolve(&tags, &self.index);

        if let Some(hook) = &self.order_hook {
            let value = Value::Array(tags.into_iter().map(Value::String).collect());
            let result = hook
                .transform
                .apply(&Context::new(&self.index, &outcome.output), ORDER_KEY, &value)
                .map_err(|source| MarcdoError::Rule {
                    tag: ORDER_KEY.to_string(),
                    name: ORDER_KEY.to_string(),
                    source,
                })?;
            if !result.is_null() {
                outcome.output.insert(ORDER_KEY.to_string(), result);
            }
        }

        Ok(outcome)
    }

    /// Tags in `record` that no rule matches, in record order.
    #[must_use]
    pub fn missing(&self, record: &RawRecord) -> Vec<String> {
        record
            .keys()
            .filter(|tag| *tag != ORDER_KEY && self.index.query(tag).is_empty())
            .cloned()
            .collect()
    }

    /// Transform many records in parallel, keeping their order.
    ///
    /// Uses Rayon's global thread pool, which respects `RAYON_NUM_THREADS`.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing record; remaining results are discarded.
    pub fn transform_batch(&self, records: &[RawRecord]) -> Result<Vec<OutputRecord>> {
        use rayon::prelude::*;

        records
            .par_iter()
            .map(|record| self.transform(record))
            .collect()
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &OverdoConfig {
        &self.config
    }

    /// Index over the registered patterns.
    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// The rule registered under `name`, if any.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        if name == ORDER_KEY {
            return self.order_hook.as_ref();
        }
        self.rules.get(name)
    }

    /// Names of registered rules in registration order, excluding the order hook.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules, excluding the order hook.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether an `__order__` hook is registered.
    #[must_use]
    pub fn has_order_hook(&self) -> bool {
        self.order_hook.is_some()
    }
}

/// A pending registration returned by [`Overdo::over`].
pub struct Over<'a> {
    registry: &'a mut Overdo,
    name: String,
    pattern: Pattern,
}

impl fmt::Debug for Over<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Over")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl Over<'_> {
    /// Register `transform` and hand it back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MarcdoError::DuplicateRule`] when the name is taken and the
    /// registry rejects duplicates.
    pub fn rule<T>(self, transform: T) -> Result<T>
    where
        T: Transform + Clone + 'static,
    {
        self.registry
            .insert(self.name, self.pattern, Arc::new(transform.clone()))?;
        Ok(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{for_each_value, ignore_value};
    use crate::error::RuleError;
    use crate::order::field_order;
    use crate::transform::{rule, TransformResult};
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn subfield_a(_: &Context<'_>, _: &str, value: &Value) -> TransformResult {
        Ok(value.get("a").cloned().unwrap_or(Value::Null))
    }

    #[test]
    fn test_isbn_end_to_end() {
        let mut marc = Overdo::new("marc21");
        marc.over("international_standard_book_number", "^020..")
            .unwrap()
            .rule(subfield_a)
            .unwrap();

        let output = marc
            .transform(&record(json!({"020__": {"a": "0123456789"}})))
            .unwrap();
        assert_eq!(
            Value::Object(output),
            json!({"international_standard_book_number": "0123456789"})
        );
    }

    #[test]
    fn test_missing_field_dropped_and_reported() {
        let marc = Overdo::new("marc21");
        let raw = record(json!({"999__": {"a": "x"}}));

        assert!(marc.transform(&raw).unwrap().is_empty());
        assert_eq!(marc.missing(&raw), ["999__"]);
    }

    #[test]
    fn test_missing_policy_fail() {
        let marc = Overdo::with_config(
            "strict",
            OverdoConfig::new().with_missing(MissingPolicy::Fail),
        );
        let err = marc
            .transform(&record(json!({"999__": {"a": "x"}})))
            .unwrap_err();
        assert!(matches!(err, MarcdoError::MissingRule(tag) if tag == "999__"));
    }

    #[test]
    fn test_over_returns_transform_unchanged() {
        let mut marc = Overdo::new("marc21");
        let returned = marc.over("isbn", "^020..").unwrap().rule(subfield_a).unwrap();

        let index = Index::new();
        let output = OutputRecord::new();
        let ctx = Context::new(&index, &output);
        assert_eq!(returned.apply(&ctx, "020__", &json!({"a": "1"})).unwrap(), json!("1"));
    }

    #[test]
    fn test_malformed_pattern_is_immediate() {
        let mut marc = Overdo::new("marc21");
        let err = marc.over("broken", "^245[").unwrap_err();
        assert!(matches!(err, MarcdoError::InvalidPattern { .. }));
        assert!(marc.is_empty());
    }

    #[test]
    fn test_duplicate_replaces_by_default() {
        let mut marc = Overdo::new("marc21");
        marc.over("complex_see_also_reference_subject", "^260..")
            .unwrap()
            .rule(rule(|_, _, _| Ok(json!("stub"))))
            .unwrap();
        marc.over("complex_see_also_reference_subject", "^260..")
            .unwrap()
            .rule(rule(|_, _, _| Ok(json!("complete"))))
            .unwrap();

        assert_eq!(marc.len(), 1);
        assert_eq!(marc.index().len(), 1);
        let output = marc.transform(&record(json!({"260__": {}}))).unwrap();
        assert_eq!(output["complex_see_also_reference_subject"], json!("complete"));
    }

    #[test]
    fn test_duplicate_rejected_when_configured() {
        let mut marc = Overdo::with_config(
            "marc21",
            OverdoConfig::new().with_duplicates(DuplicatePolicy::Reject),
        );
        marc.over("title", "^245..").unwrap().rule(subfield_a).unwrap();
        let err = marc.over("title", "^246..").unwrap().rule(subfield_a).err().unwrap();

        assert!(matches!(err, MarcdoError::DuplicateRule(name) if name == "title"));
        assert_eq!(marc.rule("title").unwrap().pattern(), "^245..");
    }

    #[test]
    fn test_every_matching_rule_runs() {
        let mut marc = Overdo::new("marc21");
        marc.over("main_entry_personal_name", "^100..")
            .unwrap()
            .rule(subfield_a)
            .unwrap();
        marc.over("authors", "^[17]00..")
            .unwrap()
            .rule(rule(|_, _, value| Ok(json!([value["a"]]))))
            .unwrap();

        let output = marc
            .transform(&record(json!({"1001_": {"a": "Herbert, Frank"}})))
            .unwrap();
        assert_eq!(output["main_entry_personal_name"], json!("Herbert, Frank"));
        assert_eq!(output["authors"], json!(["Herbert, Frank"]));
    }

    #[test]
    fn test_matching_rules_run_most_specific_first() {
        let mut marc = Overdo::new("marc21");
        marc.over("generic", "^24...")
            .unwrap()
            .rule(rule(|_, _, _| Ok(json!("generic"))))
            .unwrap();
        marc.over("specific", "^245..")
            .unwrap()
            .rule(rule(|_, _, _| Ok(json!("specific"))))
            .unwrap();

        let outcome = marc.run(&record(json!({"245__": {}}))).unwrap();
        let keys: Vec<_> = outcome.output.keys().cloned().collect();
        assert_eq!(keys, ["specific", "generic"]);
    }

    #[test]
    fn test_context_sees_earlier_fields() {
        let mut marc = Overdo::new("marc21");
        marc.over("title", "^245..").unwrap().rule(subfield_a).unwrap();
        marc.over("has_title_before_subject", "^650..")
            .unwrap()
            .rule(rule(|ctx, _, _| Ok(json!(ctx.get("title").is_some()))))
            .unwrap();

        let output = marc
            .transform(&record(json!({"245__": {"a": "T"}, "650_0": {"a": "S"}})))
            .unwrap();
        assert_eq!(output["has_title_before_subject"], json!(true));
    }

    #[test]
    fn test_for_each_value_extends_across_tags() {
        let mut marc = Overdo::new("marc21");
        marc.over("subject_added_entry_topical_term", "^650..")
            .unwrap()
            .rule(for_each_value(subfield_a))
            .unwrap();

        let output = marc
            .transform(&record(json!({
                "650_0": [{"a": "Novels"}, {"a": "Fiction"}],
                "650_7": {"a": "Sand"},
            })))
            .unwrap();
        assert_eq!(
            output["subject_added_entry_topical_term"],
            json!(["Novels", "Fiction", "Sand"])
        );
    }

    #[test]
    fn test_extend_follows_record_order_across_keys() {
        let mut marc = Overdo::new("marc21");
        marc.over("subject_added_entry_topical_term", "^650..")
            .unwrap()
            .rule(for_each_value(subfield_a))
            .unwrap();
        marc.over("title", "^245..").unwrap().rule(subfield_a).unwrap();

        let outcome = marc
            .run(&record(json!({
                "650_0": [{"a": "A"}, {"a": "C"}],
                "650_7": {"a": "B"},
                "245__": {"a": "T"},
                "__order__": ["650_0", "245__", "650_7", "650_0"],
            })))
            .unwrap();
        assert_eq!(
            outcome.output["subject_added_entry_topical_term"],
            json!(["A", "B", "C"])
        );
        assert_eq!(outcome.output["title"], json!("T"));
        assert!(outcome.absent.is_empty());
    }

    #[test]
    fn test_replace_rule_sees_repeated_key_once() {
        let mut marc = Overdo::new("marc21");
        marc.over("isbn_count", "^020..")
            .unwrap()
            .rule(rule(|_, _, value| Ok(json!(value.as_array().map_or(1, Vec::len)))))
            .unwrap();

        let outcome = marc
            .run(&record(json!({
                "020__": [{"a": "1"}, {"a": "2"}],
                "__order__": ["020__", "020__"],
            })))
            .unwrap();
        assert_eq!(outcome.output["isbn_count"], json!(2));
    }

    #[test]
    fn test_rule_error_propagates() {
        let mut marc = Overdo::new("marc21");
        marc.over("title", "^245..")
            .unwrap()
            .rule(rule(|_, _, _| Err(RuleError::custom("bad title"))))
            .unwrap();

        let err = marc.transform(&record(json!({"245__": {}}))).unwrap_err();
        match err {
            MarcdoError::Rule { tag, name, source } => {
                assert_eq!(tag, "245__");
                assert_eq!(name, "title");
                assert_eq!(source, RuleError::custom("bad title"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ignored_failure_is_absent_not_missing() {
        let mut marc = Overdo::new("marc21");
        marc.over("title", "^245..")
            .unwrap()
            .rule(ignore_value(rule(|_, _, _| Err(RuleError::custom("bad")))))
            .unwrap();

        let outcome = marc.run(&record(json!({"245__": {}, "999__": {}}))).unwrap();
        assert!(outcome.output.is_empty());
        assert_eq!(outcome.missing, ["999__"]);
        assert_eq!(
            outcome.absent,
            [Absent {
                tag: "245__".to_string(),
                name: "title".to_string()
            }]
        );
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_order_hook_runs_last_with_all_occurrences() {
        let mut marc = Overdo::new("marc21");
        marc.over("lc_control_number", "^010..").unwrap().rule(subfield_a).unwrap();
        marc.over("title_statement", "^245..").unwrap().rule(subfield_a).unwrap();
        marc.over("subject", "^650..")
            .unwrap()
            .rule(for_each_value(subfield_a))
            .unwrap();
        marc.over(ORDER_KEY, ORDER_KEY).unwrap().rule(field_order).unwrap();

        assert!(marc.has_order_hook());
        assert_eq!(marc.len(), 3);

        let outcome = marc
            .run(&record(json!({
                "010__": {"a": "2001012345"},
                "245__": {"a": "Title"},
                "650_0": [{"a": "A"}, {"a": "B"}],
                "999__": {"a": "x"},
            })))
            .unwrap();

        assert_eq!(
            outcome.output[ORDER_KEY],
            json!(["lc_control_number", "title_statement", "subject", "subject", "999__"])
        );
        assert_eq!(outcome.order.len(), 5);
        assert!(!outcome.order.entries()[4].is_resolved());
    }

    #[test]
    fn test_order_key_in_input_is_not_dispatched() {
        let mut marc = Overdo::new("marc21");
        marc.over("title_statement", "^245..").unwrap().rule(subfield_a).unwrap();
        marc.over(ORDER_KEY, ORDER_KEY).unwrap().rule(field_order).unwrap();

        let raw = record(json!({
            "245__": [{"a": "One"}, {"a": "Two"}],
            "__order__": ["245__", "245__"],
        }));
        assert!(marc.missing(&raw).is_empty());
        let output = marc.transform(&raw).unwrap();
        assert_eq!(output[ORDER_KEY], json!(["title_statement", "title_statement"]));
    }

    #[test]
    fn test_no_order_key_without_hook() {
        let mut marc = Overdo::new("marc21");
        marc.over("title_statement", "^245..").unwrap().rule(subfield_a).unwrap();

        let outcome = marc.run(&record(json!({"245__": {"a": "T"}}))).unwrap();
        assert!(!outcome.output.contains_key(ORDER_KEY));
        assert_eq!(outcome.order.labels().collect::<Vec<_>>(), ["title_statement"]);
    }

    #[test]
    fn test_transform_batch_keeps_order() {
        let mut marc = Overdo::new("marc21");
        marc.over("control_number", "^001").unwrap().rule(rule(|_, _, v| Ok(v.clone()))).unwrap();

        let records: Vec<RawRecord> = (0..64)
            .map(|n| record(json!({"001": n.to_string()})))
            .collect();
        let outputs = marc.transform_batch(&records).unwrap();

        assert_eq!(outputs.len(), 64);
        for (n, output) in outputs.iter().enumerate() {
            assert_eq!(output["control_number"], json!(n.to_string()));
        }
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Overdo>();
    }
}
