use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// PAN: five uppercase letters, four digits, one uppercase letter.
pub fn validate_pan(pan: &str) -> bool {
    static PAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap());
    PAN_RE.is_match(pan)
}

/// Aadhaar: exactly twelve digits, no separators.
pub fn validate_aadhaar(aadhaar: &str) -> bool {
    static AADHAAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").unwrap());
    AADHAAR_RE.is_match(aadhaar)
}

/// GSTIN: state code, embedded PAN, entity number, `Z`, checksum character.
pub fn validate_gst(gst: &str) -> bool {
    static GST_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][0-9]Z[A-Z0-9]$").unwrap()
    });
    GST_RE.is_match(gst)
}

/// `DD/MM/YYYY` with zero-padded day and month, naming a real calendar date.
pub fn validate_date(date: &str) -> bool {
    static DATE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap());
    DATE_RE.is_match(date) && NaiveDate::parse_from_str(date, "%d/%m/%Y").is_ok()
}
