//! Udyam (MSME) registration certificates.
//!
//! The certificate is machine-generated, so every field sits behind a fixed
//! uppercase label and anchored patterns are reliable.

use once_cell::sync::Lazy;
use regex::Regex;

use docfill_core::UdyamFields;

use crate::extractor::check_date;
use crate::text_processing::capture;

/// Extract Udyam certificate fields from layout-normalized text.
pub fn extract(text: &str) -> UdyamFields {
    static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"UDYAM REGISTRATION NUMBER\s*(UDYAM-[A-Z]{2}-\d{2}-\d{7})").unwrap()
    });
    static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"NAME OF ENTERPRISE\s*(.*)").unwrap());
    // The classification table has a header row; the word/date pair is on a
    // later line.
    static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)TYPE OF ENTERPRISE.*?\n.*?(\w+)\s+(\d{2}/\d{2}/\d{4})").unwrap()
    });
    static ACTIVITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"MAJOR ACTIVITY\s*(.*)").unwrap());
    static SOCIAL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"SOCIAL CATEGORY OF\s*ENTREPRENEUR\s*(.*)").unwrap());
    // "OFFICAL" is how the certificate actually spells it.
    static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?is)OFFICI?AL ADDRESS OF ENTERPRISE(.*?)(?:Mobile|DATE OF)").unwrap()
    });
    static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Mobile\s*:?\s*(\d+)").unwrap());
    static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Email:\s*(\S+@\S+)").unwrap());
    static INCORPORATION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"DATE OF INCORPORATION /\s*REGISTRATION OF ENTERPRISE\s*(\d{2}/\d{2}/\d{4})",
        )
        .unwrap()
    });
    static COMMENCEMENT_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"DATE OF COMMENCEMENT OF\s*PRODUCTION/BUSINESS\s*(\d{2}/\d{2}/\d{4})").unwrap()
    });
    static NIC_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?s)NATIONAL INDUSTRY\s*CLASSIFICATION CODE.*?(\d+)\s*-\s*(.*?)\s*(\d+)\s*-\s*(.*?)\s*(\d+)\s*-\s*(.*?)\s*(?:Trading|Activity)",
        )
        .unwrap()
    });

    let mut fields = UdyamFields {
        udyam_number: capture(&NUMBER_RE, text),
        enterprise_name: capture(&NAME_RE, text),
        major_activity: capture(&ACTIVITY_RE, text),
        social_category: capture(&SOCIAL_RE, text),
        mobile: capture(&MOBILE_RE, text),
        email: capture(&EMAIL_RE, text),
        date_of_incorporation: capture(&INCORPORATION_RE, text),
        date_of_commencement: capture(&COMMENCEMENT_RE, text),
        ..Default::default()
    };

    if let Some(caps) = TYPE_RE.captures(text) {
        fields.classification = Some(caps[1].to_string());
        fields.date_of_classification = Some(caps[2].to_string());
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

    if let Some(caps) = NIC_RE.captures(text) {
        let code = |n: usize, d: usize| format!("{} - {}", &caps[n], caps[d].trim());
        fields.nic_2_digit = Some(code(1, 2));
        fields.nic_4_digit = Some(code(3, 4));
        fields.nic_5_digit = Some(code(5, 6));
    }

    check_date("date_of_classification", &fields.date_of_classification);
    check_date("date_of_incorporation", &fields.date_of_incorporation);
    check_date("date_of_commencement", &fields.date_of_commencement);

    fields
}
