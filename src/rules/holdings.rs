//! MARC21 holdings fields.

use super::bibliographic::{ELECTRONIC_LOCATION_AND_ACCESS, LEADER};
use super::{register_fields, register_reverse_fields, FieldSpec, Indicator};
use crate::error::Result;
use crate::overdo::Overdo;

/// Holdings field table.
pub static FIELDS: &[FieldSpec] = &[
    LEADER,
    FieldSpec::control("001", "^001", "control_number"),
    FieldSpec::control("003", "^003", "control_number_identifier"),
    FieldSpec::control(
        "004",
        "^004",
        "control_number_for_related_bibliographic_record",
    ),
    FieldSpec::control("005", "^005", "date_and_time_of_latest_transaction"),
    FieldSpec::control("008", "^008", "fixed_length_data_elements"),
    FieldSpec::data(
        "852",
        "^852[_0-8][_0-2]",
        "location",
        &[
            ('a', "location"),
            ('b', "sublocation_or_collection"),
            ('h', "classification_part"),
            ('i', "item_part"),
            ('j', "shelving_control_number"),
            ('x', "nonpublic_note"),
            ('z', "public_note"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "shelving_scheme",
        values: &[
            ('_', "No information provided"),
            ('0', "Library of Congress classification"),
            ('1', "Dewey Decimal classification"),
            ('2', "National Library of Medicine classification"),
            ('3', "Superintendent of Documents classification"),
            ('4', "Shelving control number"),
            ('5', "Title"),
            ('6', "Shelved separately"),
            ('7', "Source specified in subfield $2"),
            ('8', "Other scheme"),
        ],
    })
    .with_indicator2(Indicator {
        name: "shelving_order",
        values: &[
            ('_', "No information provided"),
            ('0', "Not enumeration"),
            ('1', "Primary enumeration"),
            ('2', "Alternative enumeration"),
        ],
    }),
    ELECTRONIC_LOCATION_AND_ACCESS,
    FieldSpec::data(
        "863",
        "^863..",
        "enumeration_and_chronology_basic_bibliographic_unit",
        &[
            ('8', "field_link_and_sequence_number"),
            ('a', "first_level_of_enumeration"),
            ('b', "second_level_of_enumeration"),
            ('i', "first_level_of_chronology"),
            ('j', "second_level_of_chronology"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "866",
        "^866[_345][_0127]",
        "textual_holdings_basic_bibliographic_unit",
        &[
            ('a', "textual_string"),
            ('x', "nonpublic_note"),
            ('z', "public_note"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "field_encoding_level",
        values: &[
            ('_', "No information provided"),
            ('3', "Holdings level 3"),
            ('4', "Holdings level 4"),
            ('5', "Holdings level 4 with piece designation"),
        ],
    })
    .with_indicator2(Indicator {
        name: "type_of_notation",
        values: &[
            ('0', "Non-standard"),
            ('1', "ANSI/NISO Z39.71 or ISO 10324"),
            ('2', "ANSI Z39.42"),
            ('7', "Source specified in subfield $2"),
        ],
    }),
];

/// Register the holdings forward rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register(registry: &mut Overdo) -> Result<()> {
    register_fields(registry, FIELDS)
}

/// Register the holdings reverse rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register_reverse(registry: &mut Overdo) -> Result<()> {
    register_reverse_fields(registry, FIELDS)
}

/// Forward holdings rule set (`marc21_holdings`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn marc21_holdings() -> Result<Overdo> {
    let mut registry = Overdo::new("marc21_holdings");
    register(&mut registry)?;
    Ok(registry)
}

/// Reverse holdings rule set (`to_marc21_holdings`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn to_marc21_holdings() -> Result<Overdo> {
    let mut registry = Overdo::new("to_marc21_holdings");
    register_reverse(&mut registry)?;
    Ok(registry)
}
