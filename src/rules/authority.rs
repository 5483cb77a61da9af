//! MARC21 authority fields.

use super::bibliographic::{LEADER, TYPE_OF_CORPORATE_NAME, TYPE_OF_PERSONAL_NAME};
use super::{register_fields, register_reverse_fields, FieldSpec};
use crate::error::Result;
use crate::overdo::Overdo;

const PERSONAL_NAME: &[(char, &str)] = &[
    ('a', "personal_name"),
    ('b', "numeration"),
    ('c', "titles_and_other_words_associated_with_a_name"),
    ('d', "dates_associated_with_a_name"),
    ('q', "fuller_form_of_name"),
    ('t', "title_of_a_work"),
    ('w', "control_subfield"),
];

const CORPORATE_NAME: &[(char, &str)] = &[
    ('a', "corporate_name_or_jurisdiction_name_as_entry_element"),
    ('b', "subordinate_unit"),
    ('w', "control_subfield"),
];

const TOPICAL_TERM: &[(char, &str)] = &[
    ('a', "topical_term_or_geographic_name_entry_element"),
    ('v', "form_subdivision"),
    ('w', "control_subfield"),
    ('x', "general_subdivision"),
    ('y', "chronological_subdivision"),
    ('z', "geographic_subdivision"),
];

/// Authority field table.
pub static FIELDS: &[FieldSpec] = &[
    LEADER,
    FieldSpec::control("001", "^001", "control_number"),
    FieldSpec::control("003", "^003", "control_number_identifier"),
    FieldSpec::control("005", "^005", "date_and_time_of_latest_transaction"),
    FieldSpec::control("008", "^008", "fixed_length_data_elements"),
    FieldSpec::data(
        "010",
        "^010..",
        "library_of_congress_control_number",
        &[
            ('a', "lc_control_number"),
            ('z', "canceled_invalid_lc_control_number"),
        ],
    ),
    FieldSpec::data(
        "040",
        "^040..",
        "cataloging_source",
        &[
            ('a', "original_cataloging_agency"),
            ('b', "language_of_cataloging"),
            ('c', "transcribing_agency"),
            ('d', "modifying_agency"),
            ('f', "subject_heading_or_thesaurus_conventions"),
        ],
    ),
    FieldSpec::data("100", "^100[103_].", "heading_personal_name", PERSONAL_NAME)
        .with_indicator1(TYPE_OF_PERSONAL_NAME),
    FieldSpec::data("110", "^110[_0-2].", "heading_corporate_name", CORPORATE_NAME)
        .with_indicator1(TYPE_OF_CORPORATE_NAME),
    FieldSpec::data("150", "^150..", "heading_topical_term", TOPICAL_TERM),
    FieldSpec::data(
        "151",
        "^151..",
        "heading_geographic_name",
        &[
            ('a', "geographic_name"),
            ('x', "general_subdivision"),
            ('z', "geographic_subdivision"),
        ],
    ),
    FieldSpec::data("400", "^400[103_].", "see_from_tracing_personal_name", PERSONAL_NAME)
        .repeatable()
        .with_indicator1(TYPE_OF_PERSONAL_NAME),
    FieldSpec::data("410", "^410[_0-2].", "see_from_tracing_corporate_name", CORPORATE_NAME)
        .repeatable()
        .with_indicator1(TYPE_OF_CORPORATE_NAME),
    FieldSpec::data("450", "^450..", "see_from_tracing_topical_term", TOPICAL_TERM).repeatable(),
    FieldSpec::data(
        "500",
        "^500[103_].",
        "see_also_from_tracing_personal_name",
        PERSONAL_NAME,
    )
    .repeatable()
    .with_indicator1(TYPE_OF_PERSONAL_NAME),
    FieldSpec::data(
        "510",
        "^510[_0-2].",
        "see_also_from_tracing_corporate_name",
        CORPORATE_NAME,
    )
    .repeatable()
    .with_indicator1(TYPE_OF_CORPORATE_NAME),
    FieldSpec::data("550", "^550..", "see_also_from_tracing_topical_term", TOPICAL_TERM)
        .repeatable(),
    FieldSpec::data(
        "670",
        "^670..",
        "source_data_found",
        &[
            ('a', "source_citation"),
            ('b', "information_found"),
            ('u', "uniform_resource_identifier"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "675",
        "^675..",
        "source_data_not_found",
        &[('a', "source_citation")],
    ),
    FieldSpec::data(
        "680",
        "^680..",
        "public_general_note",
        &[
            ('a', "heading_or_subdivision_term"),
            ('i', "explanatory_text"),
        ],
    )
    .repeatable(),
];

/// Register the authority forward rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register(registry: &mut Overdo) -> Result<()> {
    register_fields(registry, FIELDS)
}

/// Register the authority reverse rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register_reverse(registry: &mut Overdo) -> Result<()> {
    register_reverse_fields(registry, FIELDS)
}

/// Forward authority rule set (`marc21_authority`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn marc21_authority() -> Result<Overdo> {
    let mut registry = Overdo::new("marc21_authority");
    register(&mut registry)?;
    Ok(registry)
}

/// Reverse authority rule set (`to_marc21_authority`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn to_marc21_authority() -> Result<Overdo> {
    let mut registry = Overdo::new("to_marc21_authority");
    register_reverse(&mut registry)?;
    Ok(registry)
}
