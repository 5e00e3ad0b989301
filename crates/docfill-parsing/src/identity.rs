//! PAN and Aadhaar cards.
//!
//! Both arrive as photographs, so OCR noise is expected and fields are found
//! with the fuzzy line locator rather than anchored patterns.

use docfill_core::{
    AadhaarFields, Checked, PanFields, locate_any, validate_aadhaar, validate_pan,
    value_after_colon,
};

use crate::config::{LabelField, ParsingConfig};
use crate::text_processing::for_search;

/// Locate `field` by its label synonyms and return the value after the colon.
pub(crate) fn labelled_value(
    text: &str,
    field: LabelField,
    config: &ParsingConfig,
) -> Option<String> {
    let labels = config.labels(field);
    locate_any(text, &labels, config.fuzzy_threshold())
        .map(value_after_colon)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn extract_pan(text: &str, config: &ParsingConfig) -> PanFields {
    let text = for_search(text);

    let pan = labelled_value(&text, LabelField::PanNumber, config).map(|value| {
        if validate_pan(&value) {
            Checked::Valid(value)
        } else {
            tracing::warn!(value = %value, "invalid PAN detected");
            Checked::Invalid { raw: value }
        }
    });

    PanFields {
        name: labelled_value(&text, LabelField::PanName, config),
        dob: labelled_value(&text, LabelField::PanDob, config),
        pan,
    }
}

/// Spaces between the digit groups are removed before validation.
pub fn extract_aadhaar(text: &str, config: &ParsingConfig) -> AadhaarFields {
    let text = for_search(text);

    let aadhaar = labelled_value(&text, LabelField::AadhaarNumber, config).map(|value| {
        let digits = value.replace(' ', "");
        if validate_aadhaar(&digits) {
            Checked::Valid(digits)
        } else {
            tracing::warn!(value = %value, "invalid Aadhaar number detected");
            Checked::Invalid { raw: value }
        }
    });

    AadhaarFields {
        aadhaar,
        name: labelled_value(&text, LabelField::AadhaarName, config),
        address: labelled_value(&text, LabelField::AadhaarAddress, config),
        dob: labelled_value(&text, LabelField::AadhaarDob, config),
    }
}
