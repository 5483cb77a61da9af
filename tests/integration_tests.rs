//! Integration tests for the marcdo library

mod common;

use common::{record, small_registry, subfield_a, DUNE_MARCXML};
use marcdo::formats::{json::JsonFormat, marcxml::MarcxmlFormat, Dumper, Loader};
use marcdo::record::occurrence_order;
use marcdo::{rules, MarcdoError, Overdo, ORDER_KEY};
use serde_json::json;

#[test]
fn test_isbn_rule_end_to_end() {
    let mut marc = Overdo::new("marc21");
    marc.over("international_standard_book_number", "^020..")
        .unwrap()
        .rule(subfield_a)
        .unwrap();

    let output = marc
        .transform(&record(json!({"020__": {"a": "0123456789"}})))
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(output),
        json!({"international_standard_book_number": "0123456789"})
    );
}

#[test]
fn test_unmatched_field_is_missing_not_output() {
    let marc = small_registry();
    let input = record(json!({"999__": {"a": "x"}}));

    let output = marc.transform(&input).unwrap();
    assert_eq!(output.get(ORDER_KEY), Some(&json!(["999__"])));
    assert_eq!(output.len(), 1);
    assert_eq!(marc.missing(&input), ["999__"]);
}

#[test]
fn test_order_hook_resolves_names() {
    let marc = small_registry();
    let output = marc
        .transform(&record(json!({
            "010__": {"a": "2001012345"},
            "245__": {"a": "Title"},
        })))
        .unwrap();
    assert_eq!(
        output[ORDER_KEY],
        json!(["lc_control_number", "title_statement"])
    );
}

#[test]
fn test_outcome_reports_missing_and_order() {
    let marc = small_registry();
    let outcome = marc
        .run(&record(json!({
            "020__": {"a": "1"},
            "999__": {"a": "x"},
            "245__": {"a": "T"},
        })))
        .unwrap();

    assert_eq!(outcome.missing, ["999__"]);
    assert!(!outcome.is_complete());
    assert_eq!(
        outcome.order.labels().collect::<Vec<_>>(),
        ["international_standard_book_number", "999__", "title_statement"]
    );
}

#[test]
fn test_marcxml_to_marc21() {
    let records = MarcxmlFormat.load_str(DUNE_MARCXML).unwrap();
    assert_eq!(records.len(), 2);

    let marc21 = rules::build("marc21").unwrap();
    let outputs = marc21.transform_batch(&records).unwrap();
    let dune = &outputs[0];

    assert_eq!(dune["control_number"], json!("ocm00012345"));
    assert_eq!(
        dune["international_standard_book_number"],
        json!({
            "__order__": ["qualifying_information", "international_standard_book_number"],
            "international_standard_book_number": "0441172717",
            "qualifying_information": "paperback",
        })
    );
    assert_eq!(
        dune["main_entry_personal_name"]["type_of_personal_name_entry_element"],
        json!("Surname")
    );
    assert_eq!(dune["title_statement"]["nonfiling_characters"], json!("4"));

    let subjects = dune["subject_added_entry_topical_term"].as_array().unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[1]["general_subdivision"], json!(["Fiction.", "Juvenile."]));
    assert_eq!(subjects[1]["thesaurus"], json!("Source specified in subfield $2"));

    assert_eq!(
        dune[ORDER_KEY],
        json!([
            "leader",
            "control_number",
            "date_and_time_of_latest_transaction",
            "international_standard_book_number",
            "main_entry_personal_name",
            "subject_added_entry_topical_term",
            "title_statement",
            "subject_added_entry_topical_term",
            "electronic_location_and_access",
        ])
    );
    assert!(marc21.missing(&records[0]).is_empty());

    assert_eq!(outputs[1]["title_statement"]["title"], json!("Children of Dune."));
}

#[test]
fn test_marcxml_round_trip_preserves_order() {
    let original = MarcxmlFormat.load_str(DUNE_MARCXML).unwrap();

    let forward = rules::build("marc21")
        .unwrap()
        .transform_batch(&original)
        .unwrap();
    let reverse = rules::build("to_marc21")
        .unwrap()
        .transform_batch(&forward)
        .unwrap();
    let xml = MarcxmlFormat.dump(&reverse).unwrap();
    let reloaded = MarcxmlFormat.load_str(&xml).unwrap();

    assert_eq!(reloaded.len(), original.len());
    for (before, after) in original.iter().zip(&reloaded) {
        assert_eq!(occurrence_order(before), occurrence_order(after));
        for (tag, value) in before {
            assert_eq!(after.get(tag), Some(value), "field {tag} changed");
        }
    }
}

#[test]
fn test_round_trip_keeps_interleaved_indicator_keys() {
    let xml = r#"<record xmlns="http://www.loc.gov/MARC21/slim">
  <controlfield tag="001">1</controlfield>
  <datafield tag="650" ind1=" " ind2="0"><subfield code="a">A</subfield></datafield>
  <datafield tag="650" ind1=" " ind2="7"><subfield code="a">B</subfield></datafield>
  <datafield tag="650" ind1=" " ind2="0"><subfield code="a">C</subfield></datafield>
</record>"#;
    let original = MarcxmlFormat.load_str(xml).unwrap();
    assert_eq!(
        occurrence_order(&original[0]),
        ["001", "650_0", "650_7", "650_0"]
    );

    let forward = rules::build("marc21")
        .unwrap()
        .transform_batch(&original)
        .unwrap();
    let terms: Vec<_> = forward[0]["subject_added_entry_topical_term"]
        .as_array()
        .unwrap()
        .iter()
        .map(|subject| subject["topical_term_or_geographic_name_entry_element"].clone())
        .collect();
    assert_eq!(terms, [json!("A"), json!("B"), json!("C")]);

    let reverse = rules::build("to_marc21")
        .unwrap()
        .transform_batch(&forward)
        .unwrap();
    let reloaded = MarcxmlFormat
        .load_str(&MarcxmlFormat.dump(&reverse).unwrap())
        .unwrap();
    assert_eq!(occurrence_order(&reloaded[0]), occurrence_order(&original[0]));
    assert_eq!(reloaded[0], original[0]);
}

#[test]
fn test_json_pipeline() {
    let input = r#"[
        {"020__": {"a": "0123456789"}, "24500": {"a": "Title"}},
        {"999__": {"a": "local"}}
    ]"#;
    let records = JsonFormat.load_str(input).unwrap();
    let outputs = rules::build("marc21")
        .unwrap()
        .transform_batch(&records)
        .unwrap();

    let text = JsonFormat.dump(&outputs).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed[0]["international_standard_book_number"]["international_standard_book_number"],
        json!("0123456789")
    );
    assert_eq!(parsed[1], json!({"__order__": ["999__"]}));
}

#[test]
fn test_rule_failure_names_tag_and_rule() {
    let marc21 = rules::build("marc21").unwrap();
    let err = marc21
        .transform(&record(json!({"24510": "not a field"})))
        .unwrap_err();
    match err {
        MarcdoError::Rule { tag, name, .. } => {
            assert_eq!(tag, "24510");
            assert_eq!(name, "title_statement");
        }
        other => panic!("unexpected error {other}"),
    }
}
