use thiserror::Error;

pub mod bank;
pub mod config;
pub mod extractor;
pub mod gst;
pub mod identity;
pub mod mapping;
pub mod text_processing;
pub mod udyam;

pub use config::{ConfigError, LabelField, ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::DocumentExtractor;
pub use mapping::{COMMON_FIELDS, FieldMapper, is_canonical_key};
// Re-export domain types from core (canonical definitions live there)
pub use docfill_core::{CanonicalFieldSet, DocumentType, ExtractedFieldSet, ExtractedFields};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("malformed {field}: {value:?}")]
    MalformedField { field: &'static str, value: String },
}

/// Extract and map the fields of `text`, already acquired from a document of
/// type `document_type`, using the default configuration.
///
/// Pipeline:
/// 1. Normalize the text into the layout profile
/// 2. Run the pattern extractor for the document type
/// 3. Map extractor-local names onto the canonical vocabulary (director slot 0)
pub fn extract_fields(
    text: &str,
    document_type: DocumentType,
) -> Result<CanonicalFieldSet, ParsingError> {
    let fields = DocumentExtractor::new().extract(text, document_type)?;
    Ok(FieldMapper::new().map(&fields))
}
