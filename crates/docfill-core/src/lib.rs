use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod fields;
pub mod matching;
pub mod states;
pub mod validate;

// Re-export for convenience
pub use backend::{BackendError, OcrBackend, PdfBackend, UnavailableBackend};
pub use fields::{
    AadhaarFields, BankFields, Checked, CreditFacility, DirectorRecord, ExtractedFields,
    GstFields, PanFields, UdyamFields,
};
pub use matching::{
    DEFAULT_THRESHOLD, label_score, locate, locate_any, partial_ratio, value_after_colon,
};
pub use states::{UNKNOWN_STATE, state_for_gst_number, state_name};
pub use validate::{validate_aadhaar, validate_date, validate_gst, validate_pan};

/// Written in place of a PAN that was found but failed validation.
pub const INVALID_PAN: &str = "Invalid PAN";

/// Written in place of an Aadhaar number that was found but failed validation.
pub const INVALID_AADHAAR: &str = "Invalid Aadhaar number";

/// The closed set of document types the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DocumentType {
    UdyamCertificate,
    GstCertificate,
    PanCard,
    AadhaarCard,
    BankStatement,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::UdyamCertificate,
        DocumentType::GstCertificate,
        DocumentType::PanCard,
        DocumentType::AadhaarCard,
        DocumentType::BankStatement,
    ];

    /// Human-readable label, as shown on the upload form.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::UdyamCertificate => "Udyam Certificate",
            DocumentType::GstCertificate => "GST Certificate",
            DocumentType::PanCard => "PAN Card",
            DocumentType::AadhaarCard => "Aadhaar Card",
            DocumentType::BankStatement => "Bank Statement",
        }
    }

    /// Short identifier used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentType::UdyamCertificate => "udyam",
            DocumentType::GstCertificate => "gst",
            DocumentType::PanCard => "pan",
            DocumentType::AadhaarCard => "aadhaar",
            DocumentType::BankStatement => "bank",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A document type label outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    /// Accepts either the display label ("GST Certificate") or the slug ("gst"),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.slug() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownDocumentType(s.trim().to_string()))
    }
}

/// Declared media type of an uploaded document, reduced to what acquisition
/// needs to dispatch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// `image/<subtype>`; the subtype is kept for backends that need a file extension.
    Image(String),
    Pdf,
    Other(String),
}

impl MediaType {
    pub fn parse(declared: &str) -> Self {
        let declared = declared.trim();
        let lower = declared.to_ascii_lowercase();
        if let Some(subtype) = lower.strip_prefix("image/") {
            MediaType::Image(subtype.to_string())
        } else if lower == "application/pdf" {
            MediaType::Pdf
        } else {
            MediaType::Other(declared.to_string())
        }
    }

    /// Guess a media type string from a file extension.
    ///
    /// Unknown extensions map to `application/octet-stream`, which acquisition
    /// rejects as an unsupported format.
    pub fn guess_from_path(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "tif" | "tiff" => "image/tiff",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        }
    }
}

/// An uploaded document: raw bytes plus the media type the uploader declared.
#[derive(Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Facilities(Vec<CreditFacility>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Facilities(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Facilities(list) => {
                let rendered: Vec<String> = list
                    .iter()
                    .map(|c| format!("{}: Rs. {}", c.facility, c.amount))
                    .collect();
                f.write_str(&rendered.join("; "))
            }
        }
    }
}

/// Extractor-local field names and values, before canonical mapping.
pub type ExtractedFieldSet = BTreeMap<String, FieldValue>;

/// Mapping from canonical field name to value, ready for a form-filling or
/// persistence consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalFieldSet(BTreeMap<String, FieldValue>);

impl CanonicalFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), FieldValue::Text(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value for `key`, or `None` when absent or not a text field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(FieldValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_parses_labels_and_slugs() {
        assert_eq!(
            "GST Certificate".parse::<DocumentType>().unwrap(),
            DocumentType::GstCertificate
        );
        assert_eq!("pan".parse::<DocumentType>().unwrap(), DocumentType::PanCard);
        assert_eq!(
            "  aadhaar card ".parse::<DocumentType>().unwrap(),
            DocumentType::AadhaarCard
        );
    }

    #[test]
    fn document_type_rejects_unknown_label() {
        let err = "Sanction Letter".parse::<DocumentType>().unwrap_err();
        assert_eq!(err, UnknownDocumentType("Sanction Letter".into()));
    }

    #[test]
    fn label_round_trips_for_every_type() {
        for t in DocumentType::ALL {
            assert_eq!(t.label().parse::<DocumentType>().unwrap(), t);
            assert_eq!(t.slug().parse::<DocumentType>().unwrap(), t);
        }
    }

    #[test]
    fn media_type_dispatch() {
        assert_eq!(MediaType::parse("image/png"), MediaType::Image("png".into()));
        assert_eq!(MediaType::parse("Application/PDF"), MediaType::Pdf);
        assert_eq!(
            MediaType::parse("text/plain"),
            MediaType::Other("text/plain".into())
        );
    }

    #[test]
    fn media_type_guessed_from_extension() {
        assert_eq!(MediaType::guess_from_path(Path::new("a.PDF")), "application/pdf");
        assert_eq!(MediaType::guess_from_path(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(
            MediaType::guess_from_path(Path::new("notes.txt")),
            "application/octet-stream"
        );
    }

    #[test]
    fn raw_document_debug_hides_bytes() {
        let doc = RawDocument::new(vec![0u8; 42], "image/png");
        let dbg = format!("{:?}", doc);
        assert!(dbg.contains("<42 bytes>"));
        assert!(dbg.contains("image/png"));
    }

    #[test]
    fn canonical_set_serializes_as_flat_object() {
        let mut set = CanonicalFieldSet::new();
        set.insert_text("gst_number", "27ABCDE1234F1Z5");
        set.insert(
            "credit_facilities",
            FieldValue::Facilities(vec![CreditFacility {
                facility: "Cash Credit".into(),
                amount: "5,00,000".into(),
            }]),
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["gst_number"], "27ABCDE1234F1Z5");
        assert_eq!(json["credit_facilities"][0]["type"], "Cash Credit");
        assert_eq!(json["credit_facilities"][0]["amount"], "5,00,000");
    }
}
