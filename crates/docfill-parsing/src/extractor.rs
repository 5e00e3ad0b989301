use docfill_core::{DocumentType, ExtractedFields, validate_date};

use crate::config::ParsingConfig;
use crate::{ParsingError, bank, gst, identity, text_processing, udyam};

/// Log dates that are shaped like `DD/MM/YYYY` but are not real calendar
/// dates. The value is kept as captured.
pub(crate) fn check_date(field: &str, value: &Option<String>) {
    if let Some(date) = value {
        if !validate_date(date) {
            tracing::warn!(field, date = %date, "captured date fails calendar check");
        }
    }
}

/// Runs the pattern extractor for a document type.
///
/// Holds a [`ParsingConfig`]; the default constructor uses built-in label
/// synonyms, facility names and an 80 threshold. Use
/// [`DocumentExtractor::with_config`] to override them.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    config: ParsingConfig,
}

impl DocumentExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Normalize `text` into the layout profile and run the matching extractor.
    pub fn extract(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<ExtractedFields, ParsingError> {
        let text = text_processing::for_layout(text);
        tracing::debug!(
            document_type = %document_type,
            chars = text.len(),
            "running pattern extractor"
        );

        let fields = match document_type {
            DocumentType::UdyamCertificate => ExtractedFields::Udyam(udyam::extract(&text)),
            DocumentType::GstCertificate => ExtractedFields::Gst(gst::extract(&text)?),
            DocumentType::PanCard => {
                ExtractedFields::Pan(identity::extract_pan(&text, &self.config))
            }
            DocumentType::AadhaarCard => {
                ExtractedFields::Aadhaar(identity::extract_aadhaar(&text, &self.config))
            }
            DocumentType::BankStatement => {
                ExtractedFields::Bank(bank::extract(&text, &self.config))
            }
        };

        Ok(fields)
    }
}
