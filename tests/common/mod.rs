//! Common test helpers and fixtures shared across the test suite.

use marcdo::transform::{rule, Context, TransformResult};
use marcdo::{field_order, Overdo, RawRecord, ORDER_KEY};
use serde_json::Value;

/// A bibliographic record in MARCXML with interleaved repeated fields.
pub const DUNE_MARCXML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">
  <record>
    <leader>00000cam a2200000 a 4500</leader>
    <controlfield tag="001">ocm00012345</controlfield>
    <controlfield tag="005">20240101120000.0</controlfield>
    <datafield tag="020" ind1=" " ind2=" ">
      <subfield code="q">paperback</subfield>
      <subfield code="a">0441172717</subfield>
    </datafield>
    <datafield tag="100" ind1="1" ind2=" ">
      <subfield code="a">Herbert, Frank,</subfield>
      <subfield code="d">1920-1986.</subfield>
    </datafield>
    <datafield tag="650" ind1=" " ind2="0">
      <subfield code="a">Deserts</subfield>
      <subfield code="v">Fiction.</subfield>
    </datafield>
    <datafield tag="245" ind1="1" ind2="4">
      <subfield code="a">The dune /</subfield>
      <subfield code="c">Frank Herbert.</subfield>
    </datafield>
    <datafield tag="650" ind1=" " ind2="7">
      <subfield code="a">Ecology</subfield>
      <subfield code="x">Fiction.</subfield>
      <subfield code="x">Juvenile.</subfield>
      <subfield code="2">fast</subfield>
    </datafield>
    <datafield tag="856" ind1="4" ind2="1">
      <subfield code="u">https://example.org/dune</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">ocm00067890</controlfield>
    <datafield tag="245" ind1="0" ind2="0">
      <subfield code="a">Children of Dune.</subfield>
    </datafield>
  </record>
</collection>"#;

/// Convert a `json!` object literal into a raw record.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

/// Return subfield `a` of a data field.
pub fn subfield_a(_ctx: &Context<'_>, _key: &str, value: &Value) -> TransformResult {
    Ok(value.get("a").cloned().unwrap_or(Value::Null))
}

/// A small registry with ISBN, LCCN and title rules plus the order hook.
#[allow(dead_code)]
pub fn small_registry() -> Overdo {
    let mut marc = Overdo::new("small");
    marc.over("international_standard_book_number", "^020..")
        .unwrap()
        .rule(subfield_a)
        .unwrap();
    marc.over("lc_control_number", "^010..")
        .unwrap()
        .rule(subfield_a)
        .unwrap();
    marc.over("title_statement", "^245..")
        .unwrap()
        .rule(rule(|_, _, value| Ok(value.clone())))
        .unwrap();
    marc.over(ORDER_KEY, ORDER_KEY)
        .unwrap()
        .rule(field_order)
        .unwrap();
    marc
}
