//! MARCXML records.
//!
//! Reads and writes the Library of Congress MARCXML schema
//! (<https://www.loc.gov/standards/marcxml/>): `tag`, `ind1`, `ind2` and `code`
//! are XML attributes, records may be wrapped in a `<collection>`.
//!
//! Loading produces raw records keyed by tag plus indicators, with blank
//! indicators written as `_`: `<datafield tag="650" ind1=" " ind2="0">` becomes
//! key `"650_0"`. Repeated tags and repeated subfield codes become arrays, and
//! source order is kept under `__order__` at both record and field level.
//!
//! Dumping accepts tag-keyed records such as those produced by `to_marc21`.
//! Indicators come from `$ind1`/`$ind2` when present and from the key
//! otherwise. Both levels of `__order__` are honoured; control fields are
//! written before data fields as the schema requires.
//!
//! Default-namespace (`<record xmlns="...">`), prefixed (`<marc:record>`) and
//! namespace-free input are all accepted.

use super::{Dumper, Loader};
use crate::error::{MarcdoError, Result};
use crate::record::{
    indicators, kind_of, ordered_occurrences, OutputRecord, RawRecord, SubfieldRef,
    BLANK_INDICATOR, IND1_KEY, IND2_KEY, ORDER_KEY,
};
use quick_xml::de::from_str as xml_from_str;
use quick_xml::se::to_string as xml_to_string;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;
use std::sync::OnceLock;

/// The MARCXML namespace URI.
const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Key the leader is stored under.
pub const LEADER_KEY: &str = "leader";

// Start and end tags, with an optional element prefix; quoted attribute
// values may contain `>`.
static ELEMENT_TAG: OnceLock<Regex> = OnceLock::new();
static XMLNS_ATTRIBUTE: OnceLock<Regex> = OnceLock::new();

fn element_tag() -> &'static Regex {
    ELEMENT_TAG.get_or_init(|| {
        Regex::new(r#"<(/?)(?:[A-Za-z_][\w.-]*:)?([A-Za-z_][\w.-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .unwrap_or_else(|e| panic!("BUG: invalid element tag regex: {e}"))
    })
}

fn xmlns_attribute() -> &'static Regex {
    XMLNS_ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"\s+xmlns(?::[\w.-]+)?\s*=\s*(?:"[^"]*"|'[^']*')"#)
            .unwrap_or_else(|e| panic!("BUG: invalid xmlns regex: {e}"))
    })
}

/// MARCXML record representation.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "record")]
pub struct MarcxmlRecord {
    /// Leader string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    /// Control fields (tags 001-009)
    #[serde(default)]
    pub controlfield: Vec<MarcxmlControlField>,
    /// Data fields (tags 010+)
    #[serde(default)]
    pub datafield: Vec<MarcxmlDataField>,
}

/// MARCXML control field representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlControlField {
    /// Field tag
    #[serde(rename = "@tag")]
    pub tag: String,
    /// Field value
    #[serde(default, rename = "$value")]
    pub value: String,
}

/// MARCXML data field representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlDataField {
    /// Field tag
    #[serde(rename = "@tag")]
    pub tag: String,
    /// First indicator, a space when blank
    #[serde(default, rename = "@ind1")]
    pub ind1: String,
    /// Second indicator, a space when blank
    #[serde(default, rename = "@ind2")]
    pub ind2: String,
    /// Subfields in source order
    #[serde(default)]
    pub subfield: Vec<MarcxmlSubfield>,
}

/// MARCXML subfield representation.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarcxmlSubfield {
    /// Subfield code
    #[serde(rename = "@code")]
    pub code: String,
    /// Subfield value
    #[serde(default, rename = "$value")]
    pub value: String,
}

/// MARCXML collection wrapper for multiple records.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "collection")]
pub struct MarcxmlCollection {
    /// Records in the collection
    #[serde(default, rename = "record")]
    pub records: Vec<MarcxmlRecord>,
}

/// MARCXML loader and dumper.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarcxmlFormat;

impl Loader for MarcxmlFormat {
    fn load(&self, input: &mut dyn Read) -> Result<Vec<RawRecord>> {
        let mut xml = String::new();
        input.read_to_string(&mut xml)?;
        let cleaned = strip_namespaces(&xml);

        let records = match root_element(&cleaned) {
            Some("collection") => {
                let collection: MarcxmlCollection = xml_from_str(&cleaned).map_err(|e| {
                    MarcdoError::ParseError(format!("Failed to parse MARCXML collection: {e}"))
                })?;
                collection.records
            }
            Some("record") => {
                let record: MarcxmlRecord = xml_from_str(&cleaned).map_err(|e| {
                    MarcdoError::ParseError(format!("Failed to parse MARCXML: {e}"))
                })?;
                vec![record]
            }
            Some(other) => {
                return Err(MarcdoError::ParseError(format!(
                    "Unexpected MARCXML root element <{other}>"
                )))
            }
            None => return Err(MarcdoError::ParseError("No MARCXML root element".to_string())),
        };

        tracing::debug!(records = records.len(), "loaded MARCXML");
        records.into_iter().map(raw_record).collect()
    }
}

impl Dumper for MarcxmlFormat {
    fn dump(&self, records: &[OutputRecord]) -> Result<String> {
        let collection = MarcxmlCollection {
            records: records.iter().map(xml_record).collect::<Result<_>>()?,
        };
        if collection.records.is_empty() {
            return Ok(format!(
                "{XML_DECLARATION}<collection xmlns=\"{MARCXML_NS}\"/>"
            ));
        }

        let body = xml_to_string(&collection).map_err(|e| {
            MarcdoError::ParseError(format!("Failed to serialize to MARCXML: {e}"))
        })?;
        let body = body.replacen(
            "<collection>",
            &format!("<collection xmlns=\"{MARCXML_NS}\">"),
            1,
        );
        Ok(format!("{XML_DECLARATION}{body}"))
    }
}

/// Strip namespace declarations and element prefixes from every tag.
///
/// Text content is left alone.
fn strip_namespaces(xml: &str) -> String {
    element_tag()
        .replace_all(xml, |caps: &regex::Captures<'_>| {
            let attributes = xmlns_attribute().replace_all(&caps[3], "");
            format!("<{}{}{}>", &caps[1], &caps[2], attributes)
        })
        .into_owned()
}

/// Name of the first element, skipping declarations and comments.
fn root_element(xml: &str) -> Option<&str> {
    let mut rest = xml;
    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        if rest.starts_with('?') || rest.starts_with('!') {
            continue;
        }
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        return Some(&rest[..end]);
    }
    None
}

/// Store `value` under `key`, turning the entry into an array on repetition.
fn push_occurrence(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn indicator_key(indicator: &str) -> char {
    match indicator.chars().next() {
        None | Some(' ') => BLANK_INDICATOR,
        Some(code) => code,
    }
}

/// Prepend `__order__` when there is any order to record.
fn with_order(order: Vec<Value>, fields: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(fields.len() + 1);
    if !order.is_empty() {
        out.insert(ORDER_KEY.to_string(), Value::Array(order));
    }
    out.extend(fields);
    out
}

fn raw_record(record: MarcxmlRecord) -> Result<RawRecord> {
    let mut fields = Map::new();
    let mut order = Vec::new();

    if let Some(leader) = record.leader {
        push_occurrence(&mut fields, LEADER_KEY, Value::String(leader));
        order.push(Value::String(LEADER_KEY.to_string()));
    }

    for control in record.controlfield {
        push_occurrence(&mut fields, &control.tag, Value::String(control.value));
        order.push(Value::String(control.tag));
    }

    for data in record.datafield {
        let key = format!(
            "{}{}{}",
            data.tag,
            indicator_key(&data.ind1),
            indicator_key(&data.ind2)
        );

        let mut subfields = Map::new();
        let mut codes = Vec::with_capacity(data.subfield.len());
        for subfield in data.subfield {
            let code = match SubfieldRef::parse(&subfield.code) {
                Some(SubfieldRef::Code(code)) => code.to_string(),
                _ => {
                    return Err(MarcdoError::ParseError(format!(
                        "Invalid subfield code {:?} in field {}",
                        subfield.code, data.tag
                    )))
                }
            };
            push_occurrence(&mut subfields, &code, Value::String(subfield.value));
            codes.push(Value::String(code));
        }

        push_occurrence(&mut fields, &key, Value::Object(with_order(codes, subfields)));
        order.push(Value::String(key));
    }

    Ok(with_order(order, fields))
}

/// Every occurrence in `map`, following its `__order__` where present.
///
/// Occurrences the order does not mention follow in key order.
fn text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(MarcdoError::InvalidRecord(format!(
            "{key}: cannot write {} as MARCXML text",
            kind_of(other)
        ))),
    }
}

fn indicator_attr(explicit: Option<&Value>, from_key: Option<char>) -> String {
    let code = explicit
        .and_then(Value::as_str)
        .and_then(|s| s.chars().next())
        .or(from_key)
        .unwrap_or(BLANK_INDICATOR);
    if code == BLANK_INDICATOR {
        " ".to_string()
    } else {
        code.to_string()
    }
}

fn data_field(key: &str, tag: String, field: &Map<String, Value>) -> Result<MarcxmlDataField> {
    let (ind1, ind2) = indicators(key);
    let mut subfields = Vec::new();
    for (code, value) in ordered_occurrences(field) {
        if let Some(SubfieldRef::Code(_)) = SubfieldRef::parse(code) {
            subfields.push(MarcxmlSubfield {
                code: code.to_string(),
                value: text(key, value)?,
            });
        }
    }
    Ok(MarcxmlDataField {
        tag,
        ind1: indicator_attr(field.get(IND1_KEY), ind1),
        ind2: indicator_attr(field.get(IND2_KEY), ind2),
        subfield: subfields,
    })
}

fn xml_record(record: &OutputRecord) -> Result<MarcxmlRecord> {
    let mut xml = MarcxmlRecord::default();
    for (key, value) in ordered_occurrences(record) {
        if key == LEADER_KEY {
            xml.leader = Some(text(key, value)?);
            continue;
        }
        let tag: String = key.chars().take(3).collect();
        match value {
            Value::Object(field) => xml.datafield.push(data_field(key, tag, field)?),
            other => xml.controlfield.push(MarcxmlControlField {
                tag,
                value: text(key, other)?,
            }),
        }
    }
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim">
  <marc:leader>00000nam a2200000 a 4500</marc:leader>
  <marc:controlfield tag="001">ocm0001</marc:controlfield>
  <marc:datafield tag="650" ind1=" " ind2="0">
    <marc:subfield code="a">Deserts</marc:subfield>
    <marc:subfield code="x">Fiction.</marc:subfield>
  </marc:datafield>
  <marc:datafield tag="245" ind1="1" ind2="4">
    <marc:subfield code="a">The dune /</marc:subfield>
    <marc:subfield code="c">Frank Herbert.</marc:subfield>
  </marc:datafield>
  <marc:datafield tag="650" ind1=" " ind2="0">
    <marc:subfield code="a">Ecology</marc:subfield>
    <marc:subfield code="x">Fiction.</marc:subfield>
    <marc:subfield code="x">Juvenile.</marc:subfield>
  </marc:datafield>
</marc:record>"#;

    #[test]
    fn test_load_prefixed_record() {
        let records = MarcxmlFormat.load_str(RECORD).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(
            record[ORDER_KEY],
            json!(["leader", "001", "650_0", "24514", "650_0"])
        );
        assert_eq!(record["001"], json!("ocm0001"));
        assert_eq!(record["24514"]["__order__"], json!(["a", "c"]));
        assert_eq!(record["650_0"].as_array().map(Vec::len), Some(2));
        assert_eq!(record["650_0"][1]["x"], json!(["Fiction.", "Juvenile."]));
        assert_eq!(record["650_0"][1]["__order__"], json!(["a", "x", "x"]));
    }

    #[test]
    fn test_namespace_text_in_subfield_is_kept() {
        let xml = r#"<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim">
  <marc:datafield tag="500" ind1=" " ind2=" ">
    <marc:subfield code="a">Uses xmlns="urn:x" and a:b prefixes.</marc:subfield>
  </marc:datafield>
</marc:record>"#;
        let records = MarcxmlFormat.load_str(xml).unwrap();
        assert_eq!(
            records[0]["500__"]["a"],
            json!(r#"Uses xmlns="urn:x" and a:b prefixes."#)
        );
    }

    #[test]
    fn test_strip_namespaces_only_touches_tags() {
        assert_eq!(
            strip_namespaces(r#"<?xml version="1.0"?><m:collection xmlns:m="urn:m" id='a>b'/>"#),
            r#"<?xml version="1.0"?><collection id='a>b'/>"#
        );
    }

    #[test]
    fn test_load_collection_with_default_namespace() {
        let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
            <record><controlfield tag="001">1</controlfield></record>
            <record><controlfield tag="001">2</controlfield></record>
        </collection>"#;
        let records = MarcxmlFormat.load_str(xml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["001"], json!("2"));
        assert!(records[0].get(LEADER_KEY).is_none());
    }

    #[test]
    fn test_load_rejects_unknown_root() {
        assert!(matches!(
            MarcxmlFormat.load_str("<mods/>"),
            Err(MarcdoError::ParseError(_))
        ));
        assert!(MarcxmlFormat.load_str("").is_err());
    }

    #[test]
    fn test_load_rejects_multi_character_code() {
        let xml = r#"<record><datafield tag="245" ind1="0" ind2="0">
            <subfield code="ab">x</subfield></datafield></record>"#;
        assert!(MarcxmlFormat.load_str(xml).is_err());
    }

    #[test]
    fn test_dump_honours_order_and_indicators() {
        let record = match json!({
            "__order__": ["001", "650", "245", "650"],
            "001": "ocm0001",
            "245": {"__order__": ["c", "a"], "a": "T", "c": "R", "$ind1": "1", "$ind2": "_"},
            "650": [{"a": "One", "$ind1": "_", "$ind2": "0"}, {"a": "Two"}],
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let xml = MarcxmlFormat.dump(&[record]).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<collection xmlns="http://www.loc.gov/MARC21/slim">"#));

        let one = xml.find(">One<").unwrap();
        let title = xml.find(r#"tag="245""#).unwrap();
        let two = xml.find(">Two<").unwrap();
        assert!(one < title && title < two);
        assert!(xml.find(">R<").unwrap() < xml.find(">T<").unwrap());
        assert!(xml.contains(r#"ind1="1" ind2=" ""#));
    }

    #[test]
    fn test_dump_rejects_nested_subfields() {
        let record = match json!({"245": {"a": {"nested": true}}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(matches!(
            MarcxmlFormat.dump(&[record]),
            Err(MarcdoError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_dump_empty_collection() {
        let xml = MarcxmlFormat.dump(&[]).unwrap();
        assert!(xml.ends_with(r#"<collection xmlns="http://www.loc.gov/MARC21/slim"/>"#));
        assert!(MarcxmlFormat.load_str(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_load_dump_load_is_stable() {
        let first = MarcxmlFormat.load_str(RECORD).unwrap();
        let xml = MarcxmlFormat.dump(&first).unwrap();
        let second = MarcxmlFormat.load_str(&xml).unwrap();
        assert_eq!(first, second);
    }
}
