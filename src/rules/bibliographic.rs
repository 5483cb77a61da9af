//! MARC21 bibliographic fields.

use super::{register_fields, register_reverse_fields, FieldSpec, Indicator};
use crate::error::Result;
use crate::overdo::Overdo;

/// Leader passthrough, shared by every format.
pub const LEADER: FieldSpec = FieldSpec::control("leader", "^leader$", "leader");

/// First indicator of personal-name fields.
pub const TYPE_OF_PERSONAL_NAME: Indicator = Indicator {
    name: "type_of_personal_name_entry_element",
    values: &[('0', "Forename"), ('1', "Surname"), ('3', "Family name")],
};

/// First indicator of corporate-name fields.
pub const TYPE_OF_CORPORATE_NAME: Indicator = Indicator {
    name: "type_of_corporate_name_entry_element",
    values: &[
        ('0', "Inverted name"),
        ('1', "Jurisdiction name"),
        ('2', "Name in direct order"),
    ],
};

/// Second indicator of subject added entries.
pub const THESAURUS: Indicator = Indicator {
    name: "thesaurus",
    values: &[
        ('0', "Library of Congress Subject Headings"),
        ('1', "LC subject headings for children's literature"),
        ('2', "Medical Subject Headings"),
        ('3', "National Agricultural Library subject authority file"),
        ('4', "Source not specified"),
        ('5', "Canadian Subject Headings"),
        ('6', "Répertoire de vedettes-matière"),
        ('7', "Source specified in subfield $2"),
    ],
};

const TYPE_OF_ADDED_ENTRY: Indicator = Indicator {
    name: "type_of_added_entry",
    values: &[('_', "No information provided"), ('2', "Analytical entry")],
};

const NONFILING_CHARACTERS: Indicator = Indicator {
    name: "nonfiling_characters",
    values: &[
        ('0', "0"),
        ('1', "1"),
        ('2', "2"),
        ('3', "3"),
        ('4', "4"),
        ('5', "5"),
        ('6', "6"),
        ('7', "7"),
        ('8', "8"),
        ('9', "9"),
    ],
};

/// Electronic location and access (856), shared with holdings.
pub const ELECTRONIC_LOCATION_AND_ACCESS: FieldSpec = FieldSpec::data(
    "856",
    "^856[_0-47][_0-28]",
    "electronic_location_and_access",
    &[
        ('3', "materials_specified"),
        ('q', "electronic_format_type"),
        ('u', "uniform_resource_identifier"),
        ('y', "link_text"),
        ('z', "public_note"),
    ],
)
.repeatable()
.with_indicator1(Indicator {
    name: "access_method",
    values: &[
        ('_', "No information provided"),
        ('0', "Email"),
        ('1', "FTP"),
        ('2', "Remote login (Telnet)"),
        ('3', "Dial-up"),
        ('4', "HTTP"),
        ('7', "Method specified in subfield $2"),
    ],
})
.with_indicator2(Indicator {
    name: "relationship",
    values: &[
        ('_', "No information provided"),
        ('0', "Resource"),
        ('1', "Version of resource"),
        ('2', "Related resource"),
        ('8', "No display constant generated"),
    ],
});

/// Bibliographic field table.
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
            ('b', "nucmc_control_number"),
            ('z', "canceled_invalid_lc_control_number"),
        ],
    ),
    FieldSpec::data(
        "020",
        "^020..",
        "international_standard_book_number",
        &[
            ('a', "international_standard_book_number"),
            ('c', "terms_of_availability"),
            ('q', "qualifying_information"),
            ('z', "canceled_invalid_international_standard_book_number"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "022",
        "^022[_01].",
        "international_standard_serial_number",
        &[
            ('a', "international_standard_serial_number"),
            ('l', "issn_l"),
            ('y', "incorrect_issn"),
            ('z', "canceled_issn"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "level_of_international_interest",
        values: &[
            ('_', "No level specified"),
            ('0', "Continuing resource of international interest"),
            ('1', "Continuing resource not of international interest"),
        ],
    }),
    FieldSpec::data(
        "035",
        "^035..",
        "system_control_number",
        &[
            ('a', "system_control_number"),
            ('z', "canceled_invalid_control_number"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "040",
        "^040..",
        "cataloging_source",
        &[
            ('a', "original_cataloging_agency"),
            ('b', "language_of_cataloging"),
            ('c', "transcribing_agency"),
            ('d', "modifying_agency"),
            ('e', "description_conventions"),
        ],
    ),
    FieldSpec::data(
        "041",
        "^041[_01].",
        "language_code",
        &[
            ('a', "language_code_of_text_sound_track_or_separate_title"),
            ('h', "language_code_of_original"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "translation_indication",
        values: &[
            ('_', "No information provided"),
            ('0', "Item not a translation/does not include a translation"),
            ('1', "Item is or includes a translation"),
        ],
    }),
    FieldSpec::data(
        "100",
        "^100[103_].",
        "main_entry_personal_name",
        &[
            ('a', "personal_name"),
            ('b', "numeration"),
            ('c', "titles_and_other_words_associated_with_a_name"),
            ('d', "dates_associated_with_a_name"),
            ('e', "relator_term"),
            ('q', "fuller_form_of_name"),
            ('0', "authority_record_control_number"),
        ],
    )
    .with_indicator1(TYPE_OF_PERSONAL_NAME),
    FieldSpec::data(
        "245",
        "^245[10_][0_1-9]",
        "title_statement",
        &[
            ('a', "title"),
            ('b', "remainder_of_title"),
            ('c', "statement_of_responsibility"),
            ('f', "inclusive_dates"),
            ('h', "medium"),
            ('n', "number_of_part_section_of_a_work"),
            ('p', "name_of_part_section_of_a_work"),
        ],
    )
    .with_indicator1(Indicator {
        name: "title_added_entry",
        values: &[('0', "No added entry"), ('1', "Added entry")],
    })
    .with_indicator2(NONFILING_CHARACTERS),
    FieldSpec::data(
        "246",
        "^246[10_23][_0-8]",
        "varying_form_of_title",
        &[
            ('a', "title_proper_short_title"),
            ('b', "remainder_of_title"),
            ('i', "display_text"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "note_added_entry_controller",
        values: &[
            ('0', "Note, no added entry"),
            ('1', "Note, added entry"),
            ('2', "No note, no added entry"),
            ('3', "No note, added entry"),
        ],
    })
    .with_indicator2(Indicator {
        name: "type_of_title",
        values: &[
            ('_', "No type specified"),
            ('0', "Portion of title"),
            ('1', "Parallel title"),
            ('2', "Distinctive title"),
            ('3', "Other title"),
            ('4', "Cover title"),
            ('5', "Added title page title"),
            ('6', "Caption title"),
            ('7', "Running title"),
            ('8', "Spine title"),
        ],
    }),
    FieldSpec::data(
        "250",
        "^250..",
        "edition_statement",
        &[
            ('a', "edition_statement"),
            ('b', "remainder_of_edition_statement"),
        ],
    ),
    FieldSpec::data(
        "260",
        "^260[_23].",
        "publication_distribution_imprint",
        &[
            ('a', "place_of_publication_distribution"),
            ('b', "name_of_publisher_distributor"),
            ('c', "date_of_publication_distribution"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "sequence_of_publishing_statements",
        values: &[
            ('_', "Not applicable/No information provided/Earliest available publisher"),
            ('2', "Intervening publisher"),
            ('3', "Current/latest publisher"),
        ],
    }),
    FieldSpec::data(
        "264",
        "^264[_23][0-4]",
        "production_publication_distribution_manufacture_and_copyright_notice",
        &[
            ('a', "place_of_production_publication_distribution_manufacture"),
            ('b', "name_of_producer_publisher_distributor_manufacturer"),
            ('c', "date_of_production_publication_distribution_manufacture_or_copyright_notice"),
        ],
    )
    .repeatable()
    .with_indicator2(Indicator {
        name: "function_of_entity",
        values: &[
            ('0', "Production"),
            ('1', "Publication"),
            ('2', "Distribution"),
            ('3', "Manufacture"),
            ('4', "Copyright notice date"),
        ],
    }),
    FieldSpec::data(
        "300",
        "^300..",
        "physical_description",
        &[
            ('a', "extent"),
            ('b', "other_physical_details"),
            ('c', "dimensions"),
            ('e', "accompanying_material"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "490",
        "^490[01].",
        "series_statement",
        &[
            ('a', "series_statement"),
            ('v', "volume_sequential_designation"),
            ('x', "international_standard_serial_number"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "series_tracing_policy",
        values: &[('0', "Series not traced"), ('1', "Series traced")],
    }),
    FieldSpec::data("500", "^500..", "general_note", &[('a', "general_note")]).repeatable(),
    FieldSpec::data(
        "504",
        "^504..",
        "bibliography_etc_note",
        &[
            ('a', "bibliography_etc_note"),
            ('b', "number_of_references"),
        ],
    )
    .repeatable(),
    FieldSpec::data(
        "520",
        "^520[_0-48].",
        "summary_etc",
        &[
            ('a', "summary_etc"),
            ('b', "expansion_of_summary_note"),
            ('u', "uniform_resource_identifier"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "display_constant_controller",
        values: &[
            ('_', "Summary"),
            ('0', "Subject"),
            ('1', "Review"),
            ('2', "Scope and content"),
            ('3', "Abstract"),
            ('4', "Content advice"),
            ('8', "No display constant generated"),
        ],
    }),
    FieldSpec::data(
        "600",
        "^600[103_][0-7]",
        "subject_added_entry_personal_name",
        &[
            ('a', "personal_name"),
            ('d', "dates_associated_with_a_name"),
            ('v', "form_subdivision"),
            ('x', "general_subdivision"),
            ('y', "chronological_subdivision"),
            ('z', "geographic_subdivision"),
            ('2', "source_of_heading_or_term"),
        ],
    )
    .repeatable()
    .with_indicator1(TYPE_OF_PERSONAL_NAME)
    .with_indicator2(THESAURUS),
    FieldSpec::data(
        "650",
        "^650[_0-2][0-7]",
        "subject_added_entry_topical_term",
        &[
            ('a', "topical_term_or_geographic_name_entry_element"),
            ('b', "topical_term_following_geographic_name_entry_element"),
            ('v', "form_subdivision"),
            ('x', "general_subdivision"),
            ('y', "chronological_subdivision"),
            ('z', "geographic_subdivision"),
            ('0', "authority_record_control_number"),
            ('2', "source_of_heading_or_term"),
        ],
    )
    .repeatable()
    .with_indicator1(Indicator {
        name: "level_of_subject",
        values: &[
            ('_', "No information provided"),
            ('0', "No level specified"),
            ('1', "Primary"),
            ('2', "Secondary"),
        ],
    })
    .with_indicator2(THESAURUS),
    FieldSpec::data(
        "651",
        "^651.[0-7]",
        "subject_added_entry_geographic_name",
        &[
            ('a', "geographic_name"),
            ('v', "form_subdivision"),
            ('x', "general_subdivision"),
            ('y', "chronological_subdivision"),
            ('z', "geographic_subdivision"),
            ('2', "source_of_heading_or_term"),
        ],
    )
    .repeatable()
    .with_indicator2(THESAURUS),
    FieldSpec::data(
        "700",
        "^700[103_][_2]",
        "added_entry_personal_name",
        &[
            ('a', "personal_name"),
            ('b', "numeration"),
            ('c', "titles_and_other_words_associated_with_a_name"),
            ('d', "dates_associated_with_a_name"),
            ('e', "relator_term"),
            ('t', "title_of_a_work"),
            ('4', "relator_code"),
        ],
    )
    .repeatable()
    .with_indicator1(TYPE_OF_PERSONAL_NAME)
    .with_indicator2(TYPE_OF_ADDED_ENTRY),
    FieldSpec::data(
        "710",
        "^710[_0-2][_2]",
        "added_entry_corporate_name",
        &[
            ('a', "corporate_name_or_jurisdiction_name_as_entry_element"),
            ('b', "subordinate_unit"),
            ('e', "relator_term"),
            ('4', "relator_code"),
        ],
    )
    .repeatable()
    .with_indicator1(TYPE_OF_CORPORATE_NAME)
    .with_indicator2(TYPE_OF_ADDED_ENTRY),
    ELECTRONIC_LOCATION_AND_ACCESS,
];

/// Register the bibliographic forward rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register(registry: &mut Overdo) -> Result<()> {
    register_fields(registry, FIELDS)
}

/// Register the bibliographic reverse rules and the order hook on `registry`.
///
/// # Errors
///
/// Fails if `registry` rejects a duplicate name.
pub fn register_reverse(registry: &mut Overdo) -> Result<()> {
    register_reverse_fields(registry, FIELDS)
}

/// Forward bibliographic rule set (`marc21`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn marc21() -> Result<Overdo> {
    let mut registry = Overdo::new("marc21");
    register(&mut registry)?;
    Ok(registry)
}

/// Reverse bibliographic rule set (`to_marc21`).
///
/// # Errors
///
/// Fails only if the field table itself is malformed.
pub fn to_marc21() -> Result<Overdo> {
    let mut registry = Overdo::new("to_marc21");
    register_reverse(&mut registry)?;
    Ok(registry)
}
