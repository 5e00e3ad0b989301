//! GST registration certificates (Form GST REG-06), including the Annexure B
//! list of proprietors, partners and directors.

use once_cell::sync::Lazy;
use regex::Regex;

use docfill_core::{DirectorRecord, GstFields, state_for_gst_number, validate_gst};

use crate::ParsingError;
use crate::extractor::check_date;
use crate::text_processing::capture;

/// Characters 3–12 of a GST number are the holder's PAN.
pub(crate) fn embedded_pan(gst_number: &str) -> Result<String, ParsingError> {
    gst_number
        .get(2..12)
        .map(str::to_string)
        .ok_or_else(|| ParsingError::MalformedField {
            field: "gst_number",
            value: gst_number.to_string(),
        })
}

/// Extract GST certificate fields from layout-normalized text.
pub fn extract(text: &str) -> Result<GstFields, ParsingError> {
    static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"Registration Number\s*:\s*(\d{2}[A-Z]{5}\d{4}[A-Z]\dZ[A-Z\d])").unwrap()
    });
    static LEGAL_NAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Legal Name of Business\s*:?\s*(.*)").unwrap());
    static TRADE_NAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Trade Name, if any\s*:?\s*(.*)").unwrap());
    static CONSTITUTION_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Constitution of Business\s*:?\s*(.*)").unwrap());
    // Runs to the first blank line.
    static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)Address of Principal Place of Business\s*:?\s*(.*?)(?:\n\n|\z)").unwrap()
    });
    static LIABILITY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Date of Liability\s*:?\s*(\d{2}/\d{2}/\d{4})").unwrap());
    static VALIDITY_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"Period of Validity\s*:?.*?From\s*(\d{2}/\d{2}/\d{4})\s*To\s*(\d{2}/\d{2}/\d{4}|NA)",
        )
        .unwrap()
    });
    static REGISTRATION_TYPE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Type of Registration\s*:?\s*(.*)").unwrap());
    static ISSUE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"Date of issue of Certificate\s*:?\s*(\d{2}/\d{2}/\d{4})").unwrap()
    });

    let mut fields = GstFields {
        gst_number: capture(&NUMBER_RE, text),
        legal_name: capture(&LEGAL_NAME_RE, text),
        trade_name: capture(&TRADE_NAME_RE, text),
        constitution: capture(&CONSTITUTION_RE, text),
        date_of_liability: capture(&LIABILITY_RE, text),
        type_of_registration: capture(&REGISTRATION_TYPE_RE, text),
        date_of_issue: capture(&ISSUE_RE, text),
        ..Default::default()
    };

    if let Some(gst_number) = &fields.gst_number {
        if !validate_gst(gst_number) {
            tracing::warn!(gst_number = %gst_number, "GST number fails format check");
        }
        fields.pan = Some(embedded_pan(gst_number)?);
        fields.state = Some(state_for_gst_number(gst_number).to_string());
    }

    if let Some(caps) = ADDRESS_RE.captures(text) {
        let address = caps[1]
            .lines()
            .map(|line| line.trim().trim_end_matches(','))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !address.is_empty() {
            fields.address = Some(address);
        }
    }

    if let Some(caps) = VALIDITY_RE.captures(text) {
        fields.period_of_validity_from = Some(caps[1].to_string());
        fields.period_of_validity_to = Some(caps[2].to_string());
    }

    check_date("date_of_liability", &fields.date_of_liability);
    check_date("period_of_validity_from", &fields.period_of_validity_from);
    if fields.period_of_validity_to.as_deref() != Some("NA") {
        check_date("period_of_validity_to", &fields.period_of_validity_to);
    }
    check_date("date_of_issue", &fields.date_of_issue);

    fields.directors = extract_directors(text);

    Ok(fields)
}

/// Director blocks: `<n> Name <X> Designation/Status <Y> Resident of State <Z>`.
///
/// The state value runs up to the next `<n> Name` marker or the end of the
/// text.
pub fn extract_directors(text: &str) -> Vec<DirectorRecord> {
    static HEAD_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)\d+\s*Name\s*(.*?)\s*Designation/Status\s*(.*?)\s*Resident of State\s*")
            .unwrap()
    });
    static NEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*Name").unwrap());

    let mut directors = Vec::new();
    let mut pos = 0;

    while let Some(caps) = HEAD_RE.captures_at(text, pos) {
        let Some(head) = caps.get(0) else { break };
        let state_end = NEXT_RE
            .find_at(text, head.end())
            .map_or(text.len(), |m| m.start());

        directors.push(DirectorRecord {
            name: caps[1].trim().to_string(),
            designation: caps[2].trim().to_string(),
            state_of_residence: text[head.end()..state_end].trim().to_string(),
        });

        if state_end >= text.len() {
            break;
        }
        pos = state_end;
    }

    directors
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERTIFICATE: &str = "\
Government of India
Form GST REG-06
Registration Certificate
Registration Number : 27ABCDE1234F1Z5
1. Legal Name of Business : SHREE GANESH TRADERS PRIVATE LIMITED
2. Trade Name, if any : GANESH TRADERS
3. Constitution of Business : Private Limited Company
4. Address of Principal Place of Business : Plot 12, Shivaji Nagar
Pune, Maharashtra, 411005

5. Date of Liability : 01/07/2017
6. Period of Validity From 01/07/2017 To NA
7. Type of Registration : Regular
Date of issue of Certificate : 15/07/2017
Annexure B
1 Name RAMESH KUMAR SHARMA
Designation/Status Director
Resident of State Maharashtra
2 Name SUNITA SHARMA
Designation/Status Director
Resident of State Maharashtra
3 Name ANIL DESHPANDE
Designation/Status Managing Director
Resident of State Karnataka";

    #[test]
    fn test_number_pan_and_state() {
        let f = extract(CERTIFICATE).unwrap();
        assert_eq!(f.gst_number.as_deref(), Some("27ABCDE1234F1Z5"));
        assert_eq!(f.pan.as_deref(), Some("ABCDE1234F"));
        assert_eq!(f.state.as_deref(), Some("Maharashtra"));
    }

    #[test]
    fn test_business_details() {
        let f = extract(CERTIFICATE).unwrap();
        assert_eq!(
            f.legal_name.as_deref(),
            Some("SHREE GANESH TRADERS PRIVATE LIMITED")
        );
        assert_eq!(f.trade_name.as_deref(), Some("GANESH TRADERS"));
        assert_eq!(f.constitution.as_deref(), Some("Private Limited Company"));
        assert_eq!(f.type_of_registration.as_deref(), Some("Regular"));
    }

    #[test]
    fn test_address_stops_at_blank_line() {
        let f = extract(CERTIFICATE).unwrap();
        assert_eq!(
            f.address.as_deref(),
            Some("Plot 12, Shivaji Nagar, Pune, Maharashtra, 411005")
        );
    }

    #[test]
    fn test_dates_and_open_validity() {
        let f = extract(CERTIFICATE).unwrap();
        assert_eq!(f.date_of_liability.as_deref(), Some("01/07/2017"));
        assert_eq!(f.period_of_validity_from.as_deref(), Some("01/07/2017"));
        assert_eq!(f.period_of_validity_to.as_deref(), Some("NA"));
        assert_eq!(f.date_of_issue.as_deref(), Some("15/07/2017"));
    }

    #[test]
    fn test_validity_with_end_date() {
        let text = CERTIFICATE.replace(
            "Period of Validity From 01/07/2017 To NA",
            "Period of Validity From 01/07/2017 To 30/06/2027",
        );
        let f = extract(&text).unwrap();
        assert_eq!(f.period_of_validity_from.as_deref(), Some("01/07/2017"));
        assert_eq!(f.period_of_validity_to.as_deref(), Some("30/06/2027"));
    }

    #[test]
    fn test_address_runs_to_end_of_text() {
        let text = "Registration Number : 27ABCDE1234F1Z5\n\
                    Address of Principal Place of Business : Plot 12, Shivaji Nagar,\n\
                    Pune, Maharashtra, 411005\n";
        let f = extract(text).unwrap();
        assert_eq!(
            f.address.as_deref(),
            Some("Plot 12, Shivaji Nagar, Pune, Maharashtra, 411005")
        );
    }

    #[test]
    fn test_three_directors_in_order() {
        let f = extract(CERTIFICATE).unwrap();
        let names: Vec<&str> = f.directors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["RAMESH KUMAR SHARMA", "SUNITA SHARMA", "ANIL DESHPANDE"]
        );
        assert_eq!(f.directors[2].designation, "Managing Director");
        assert_eq!(f.directors[0].state_of_residence, "Maharashtra");
        assert_eq!(f.directors[2].state_of_residence, "Karnataka");
    }

    #[test]
    fn test_unlisted_state_code() {
        let text = "Registration Number : 99ABCDE1234F1Z5";
        let f = extract(text).unwrap();
        assert_eq!(f.state.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_missing_number_leaves_derived_fields_absent() {
        let f = extract("Legal Name of Business : ACME").unwrap();
        assert!(f.gst_number.is_none());
        assert!(f.pan.is_none());
        assert!(f.state.is_none());
        assert!(f.directors.is_empty());
    }

    #[test]
    fn test_short_number_is_malformed() {
        let err = embedded_pan("27ABC").unwrap_err();
        assert_eq!(
            err,
            ParsingError::MalformedField {
                field: "gst_number",
                value: "27ABC".to_string()
            }
        );
    }
}
