//! Command-line tests driving `cli::run` against temporary input files.

mod common;

use clap::Parser;
use common::DUNE_MARCXML;
use marcdo::cli::{run, Cli};
use marcdo::MarcdoError;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

fn input_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn execute(args: &[&str]) -> (marcdo::Result<i32>, String) {
    let cli = Cli::try_parse_from(args).expect("valid arguments");
    let mut out = Vec::new();
    let result = run(&cli.command, &mut out);
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_do_marcxml_to_json() {
    let input = input_file(DUNE_MARCXML);
    let path = input.path().to_str().unwrap();

    let (result, output) = execute(&["marcdo", "do", "marc21", "-i", path, "-l", "marcxml"]);
    assert_eq!(result.unwrap(), 0);

    let records: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[0]["control_number"], json!("ocm00012345"));
    assert_eq!(records[1]["control_number"], json!("ocm00067890"));
}

#[test]
fn test_do_reverse_to_marcxml() {
    let input = input_file(
        r#"{"control_number": "1", "title_statement": {"title": "T", "title_added_entry": "No added entry"}}"#,
    );
    let path = input.path().to_str().unwrap();

    let (result, output) = execute(&["marcdo", "do", "to_marc21", "-i", path, "-d", "marcxml"]);
    assert_eq!(result.unwrap(), 0);
    assert!(output.contains(r#"<controlfield tag="001">1</controlfield>"#));
    assert!(output.contains(r#"tag="245" ind1="0" ind2=" ""#));
}

#[test]
fn test_do_strict_fails_on_unmatched_tag() {
    let input = input_file(r#"{"999__": {"a": "local"}}"#);
    let path = input.path().to_str().unwrap();

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path, "--strict"]);
    assert!(matches!(result, Err(MarcdoError::MissingRule(tag)) if tag == "999__"));

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path]);
    assert_eq!(result.unwrap(), 0);
}

#[test]
fn test_missing_reports_union_in_first_seen_order() {
    let input = input_file(
        r#"[
            {"999__": {"a": "x"}, "24500": {"a": "T"}, "9101_": {"a": "y"}},
            {"9101_": {"a": "z"}, "090__": {"a": "QA76"}}
        ]"#,
    );
    let path = input.path().to_str().unwrap();

    let (result, output) = execute(&["marcdo", "missing", "marc21", "-i", path]);
    assert_eq!(result.unwrap(), 1);
    assert_eq!(output, "999__,9101_,090__\n");
}

#[test]
fn test_missing_silent_when_covered() {
    let input = input_file(r#"{"001": "1", "24500": {"a": "T"}}"#);
    let path = input.path().to_str().unwrap();

    let (result, output) = execute(&["marcdo", "missing", "marc21", "-i", path]);
    assert_eq!(result.unwrap(), 0);
    assert!(output.is_empty());
}

#[test]
fn test_unknown_names() {
    let input = input_file("{}");
    let path = input.path().to_str().unwrap();

    let (result, _) = execute(&["marcdo", "do", "unimarc", "-i", path]);
    assert!(matches!(result, Err(MarcdoError::UnknownRuleSet(_))));

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path, "-l", "iso2709"]);
    assert!(matches!(result, Err(MarcdoError::UnknownLoader(_))));

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path, "-d", "csv"]);
    assert!(matches!(result, Err(MarcdoError::UnknownDumper(_))));
}

#[test]
fn test_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path.to_str().unwrap()]);
    assert!(matches!(result, Err(MarcdoError::IoError(_))));
}

#[test]
fn test_malformed_input() {
    let input = input_file("<record><datafield");
    let path = input.path().to_str().unwrap();

    let (result, _) = execute(&["marcdo", "do", "marc21", "-i", path, "-l", "marcxml"]);
    assert!(matches!(result, Err(MarcdoError::ParseError(_))));
}
