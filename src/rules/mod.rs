//! Table-driven MARC21 rule sets.
//!
//! Each catalog is a static table of [`FieldSpec`] entries: one per tag, naming
//! the field, its indicators and its subfields. From one table the module builds
//! both directions:
//!
//! - **forward** (`marc21`, …): tag-keyed raw fields to semantic objects, via
//!   [`FieldMap`]
//! - **reverse** (`to_marc21`, …): semantic objects back to tag-keyed fields
//!   with `$ind1`/`$ind2` pseudo-subfields, via [`ReverseFieldMap`]
//!
//! Both directions carry per-field `__order__` and register the standard
//! [`field_order`] hook, so a record survives a full round trip with its field
//! and subfield order intact.
//!
//! # Examples
//!
//! ```
//! use marcdo::rules;
//! use serde_json::json;
//!
//! let marc21 = rules::build("marc21")?;
//! let record = serde_json::from_value(json!({
//!     "020__": {"a": "0123456789", "q": "paperback"},
//! })).unwrap();
//!
//! let output = marc21.transform(&record)?;
//! assert_eq!(
//!     output["international_standard_book_number"]["qualifying_information"],
//!     json!("paperback")
//! );
//! # Ok::<(), marcdo::MarcdoError>(())
//! ```

pub mod authority;
pub mod bibliographic;
pub mod holdings;

use crate::catalog::Catalog;
use crate::combinators::TransformExt;
use crate::config::OverdoConfig;
use crate::error::{MarcdoError, Result, RuleError};
use crate::order::field_order;
use crate::overdo::Overdo;
use crate::record::{
    indicators, occurrences, FieldResult, SubfieldRef, BLANK_INDICATOR, IND1_KEY, IND2_KEY,
    ORDER_KEY,
};
use crate::transform::{Context, Transform, TransformResult};
use serde_json::{Map, Value};

/// Registers a named rule set on a registry.
pub type RuleSetFn = fn(&mut Overdo) -> Result<()>;

/// The meanings of one indicator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    /// Semantic name the meaning is stored under.
    pub name: &'static str,
    /// Indicator character to meaning.
    pub values: &'static [(char, &'static str)],
}

impl Indicator {
    /// Meaning of indicator character `code`.
    #[must_use]
    pub fn meaning(&self, code: char) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, meaning)| *meaning)
    }

    /// Indicator character carrying `meaning`.
    #[must_use]
    pub fn code(&self, meaning: &str) -> Option<char> {
        self.values
            .iter()
            .find(|(_, m)| *m == meaning)
            .map(|(code, _)| *code)
    }
}

/// Control field (string value) or data field (indicators and subfields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Tags 001-009 and the leader.
    Control,
    /// Tags 010 and up.
    Data,
}

/// How one MARC tag maps to a semantic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Three-character tag, or `leader`.
    pub tag: &'static str,
    /// Pattern selecting raw tags for the forward rule.
    pub pattern: &'static str,
    /// Semantic name of the field.
    pub name: &'static str,
    /// Control or data field.
    pub kind: FieldKind,
    /// Whether the field may occur more than once.
    pub repeatable: bool,
    /// First indicator meanings.
    pub indicator1: Option<Indicator>,
    /// Second indicator meanings.
    pub indicator2: Option<Indicator>,
    /// Subfield code to semantic name.
    pub subfields: &'static [(char, &'static str)],
}

impl FieldSpec {
    /// A non-repeatable control field matched by its exact tag.
    #[must_use]
    pub const fn control(tag: &'static str, pattern: &'static str, name: &'static str) -> Self {
        FieldSpec {
            tag,
            pattern,
            name,
            kind: FieldKind::Control,
            repeatable: false,
            indicator1: None,
            indicator2: None,
            subfields: &[],
        }
    }

    /// A non-repeatable data field.
    #[must_use]
    pub const fn data(
        tag: &'static str,
        pattern: &'static str,
        name: &'static str,
        subfields: &'static [(char, &'static str)],
    ) -> Self {
        FieldSpec {
            tag,
            pattern,
            name,
            kind: FieldKind::Data,
            repeatable: false,
            indicator1: None,
            indicator2: None,
            subfields,
        }
    }

    /// Mark the field repeatable.
    #[must_use]
    pub const fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Set the first indicator meanings.
    #[must_use]
    pub const fn with_indicator1(mut self, indicator: Indicator) -> Self {
        self.indicator1 = Some(indicator);
        self
    }

    /// Set the second indicator meanings.
    #[must_use]
    pub const fn with_indicator2(mut self, indicator: Indicator) -> Self {
        self.indicator2 = Some(indicator);
        self
    }

    /// Semantic name of subfield `code`.
    #[must_use]
    pub fn subfield_name(&self, code: char) -> Option<&'static str> {
        self.subfields
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    /// Semantic name of a field position.
    #[must_use]
    pub fn label(&self, position: &SubfieldRef) -> Option<&'static str> {
        match position {
            SubfieldRef::Code(code) => self.subfield_name(*code),
            SubfieldRef::Indicator1 => self.indicator1.map(|ind| ind.name),
            SubfieldRef::Indicator2 => self.indicator2.map(|ind| ind.name),
        }
    }

    /// Field position carrying semantic name `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<SubfieldRef> {
        if let Some((code, _)) = self.subfields.iter().find(|(_, n)| *n == name) {
            return Some(SubfieldRef::Code(*code));
        }
        if self.indicator1.is_some_and(|ind| ind.name == name) {
            return Some(SubfieldRef::Indicator1);
        }
        if self.indicator2.is_some_and(|ind| ind.name == name) {
            return Some(SubfieldRef::Indicator2);
        }
        None
    }

    /// Pattern selecting this field's semantic name in the reverse direction.
    #[must_use]
    pub fn reverse_pattern(&self) -> String {
        format!("^{}$", self.name)
    }

    /// Convert one raw occurrence found under `tag` to its semantic object.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnexpectedValue`] when a data field is not an object.
    pub fn convert(&self, tag: &str, value: &Value) -> TransformResult {
        if self.kind == FieldKind::Control {
            return Ok(value.clone());
        }
        let fields = value
            .as_object()
            .ok_or_else(|| RuleError::unexpected(tag, "object of subfields", value))?;

        let mut result = FieldResult::new();
        for code in source_codes(fields) {
            if self.subfield_name(code).is_some() {
                result.push_order(SubfieldRef::Code(code));
            }
        }
        for (code, name) in self.subfields {
            if let Some(subfield) = fields.get(code.to_string().as_str()) {
                result.insert(*name, subfield.clone());
            }
        }

        let (ind1, ind2) = indicators(tag);
        for (indicator, code, position) in [
            (self.indicator1, ind1, SubfieldRef::Indicator1),
            (self.indicator2, ind2, SubfieldRef::Indicator2),
        ] {
            let meaning = indicator
                .zip(code)
                .and_then(|(indicator, code)| indicator.meaning(code).map(|m| (indicator.name, m)));
            if let Some((name, meaning)) = meaning {
                result.insert(name, Value::String(meaning.to_string()));
                result.push_order(position);
            }
        }

        Ok(result.into_value_named(|position| self.label(position).map(str::to_string)))
    }

    /// Convert one semantic occurrence back to a tag-keyed field.
    ///
    /// Data fields always carry `$ind1` and `$ind2`; an indicator whose meaning
    /// is absent or unknown becomes `_`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnexpectedValue`] when a data field is not an object.
    pub fn revert(&self, name: &str, value: &Value) -> TransformResult {
        if self.kind == FieldKind::Control {
            return Ok(value.clone());
        }
        let fields = value
            .as_object()
            .ok_or_else(|| RuleError::unexpected(name, "object", value))?;

        let mut result = FieldResult::new();
        for (code, subfield_name) in self.subfields {
            if let Some(subfield) = fields.get(*subfield_name) {
                result.insert(code.to_string(), subfield.clone());
            }
        }
        for (indicator, key) in [(self.indicator1, IND1_KEY), (self.indicator2, IND2_KEY)] {
            let code = indicator
                .and_then(|ind| {
                    fields
                        .get(ind.name)
                        .and_then(Value::as_str)
                        .and_then(|meaning| ind.code(meaning))
                })
                .unwrap_or(BLANK_INDICATOR);
            result.insert(key, Value::String(code.to_string()));
        }

        for label in source_names(fields) {
            if let Some(position) = self.position(&label) {
                result.push_order(position);
            }
        }

        Ok(result.into_value())
    }
}

/// Forward transform for one [`FieldSpec`].
#[derive(Debug, Clone, Copy)]
pub struct FieldMap(pub &'static FieldSpec);

impl Transform for FieldMap {
    fn apply(&self, _ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        self.0.convert(key, value)
    }
}

/// Reverse transform for one [`FieldSpec`].
#[derive(Debug, Clone, Copy)]
pub struct ReverseFieldMap(pub &'static FieldSpec);

impl Transform for ReverseFieldMap {
    fn apply(&self, _ctx: &Context<'_>, key: &str, value: &Value) -> TransformResult {
        self.0.revert(key, value)
    }
}

/// Subfield codes of a raw field in source order.
fn source_codes(fields: &Map<String, Value>) -> Vec<char> {
    if let Some(Value::Array(order)) = fields.get(ORDER_KEY) {
        return order
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|code| match SubfieldRef::parse(code) {
                Some(SubfieldRef::Code(code)) => Some(code),
                _ => None,
            })
            .collect();
    }

    let mut codes = Vec::new();
    for (key, value) in fields {
        if let Some(SubfieldRef::Code(code)) = SubfieldRef::parse(key) {
            codes.extend(std::iter::repeat(code).take(occurrences(value).len()));
        }
    }
    codes
}

/// Semantic names of a converted field in source order.
fn source_names(fields: &Map<String, Value>) -> Vec<String> {
    if let Some(Value::Array(order)) = fields.get(ORDER_KEY) {
        return order
            .iter()
            .filter_map(|name| name.as_str().map(str::to_string))
            .collect();
    }

    let mut names = Vec::new();
    for (key, value) in fields {
        if key != ORDER_KEY {
            names.extend(std::iter::repeat(key.clone()).take(occurrences(value).len()));
        }
    }
    names
}

/// Register forward rules for every spec, plus the `__order__` hook.
///
/// Data fields drop empty entries; repeatable fields convert per occurrence.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a name is rejected as duplicate.
pub fn register_fields(registry: &mut Overdo, specs: &'static [FieldSpec]) -> Result<()> {
    for spec in specs {
        let over = registry.over(spec.name, spec.pattern)?;
        match (spec.kind, spec.repeatable) {
            (FieldKind::Control, false) => {
                over.rule(FieldMap(spec))?;
            }
            (FieldKind::Control, true) => {
                over.rule(FieldMap(spec).for_each_value())?;
            }
            (FieldKind::Data, false) => {
                over.rule(FieldMap(spec).filter_values())?;
            }
            (FieldKind::Data, true) => {
                over.rule(FieldMap(spec).for_each_value().filter_values())?;
            }
        }
    }
    registry.over(ORDER_KEY, ORDER_KEY)?.rule(field_order)?;
    Ok(())
}

/// Register reverse rules for every spec, plus the `__order__` hook.
///
/// Reverse rules are named by tag and match the forward semantic name exactly.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or a name is rejected as duplicate.
pub fn register_reverse_fields(registry: &mut Overdo, specs: &'static [FieldSpec]) -> Result<()> {
    for spec in specs {
        registry
            .over(spec.tag, &spec.reverse_pattern())?
            .rule(ReverseFieldMap(spec).for_each_value())?;
    }
    registry.over(ORDER_KEY, ORDER_KEY)?.rule(field_order)?;
    Ok(())
}

/// All built-in rule sets by name.
#[must_use]
pub fn rule_sets() -> Catalog<RuleSetFn> {
    let mut catalog: Catalog<RuleSetFn> = Catalog::new("rule set");
    catalog.register("marc21", bibliographic::register);
    catalog.register("to_marc21", bibliographic::register_reverse);
    catalog.register("marc21_authority", authority::register);
    catalog.register("to_marc21_authority", authority::register_reverse);
    catalog.register("marc21_holdings", holdings::register);
    catalog.register("to_marc21_holdings", holdings::register_reverse);
    catalog
}

/// Build the built-in rule set called `name` with the default configuration.
///
/// # Errors
///
/// Returns [`MarcdoError::UnknownRuleSet`] for an unknown name.
pub fn build(name: &str) -> Result<Overdo> {
    build_with_config(name, OverdoConfig::default())
}

/// Build the built-in rule set called `name` with `config`.
///
/// # Errors
///
/// Returns [`MarcdoError::UnknownRuleSet`] for an unknown name.
pub fn build_with_config(name: &str, config: OverdoConfig) -> Result<Overdo> {
    let register = rule_sets()
        .get(name)
        .copied()
        .ok_or_else(|| MarcdoError::UnknownRuleSet(name.to_string()))?;
    let mut registry = Overdo::with_config(name, config);
    register(&mut registry)?;
    tracing::debug!(rule_set = name, rules = registry.len(), "rule set built");
    Ok(registry)
}
