use thiserror::Error;

use docfill_core::{BackendError, ExtractedFields, MediaType, UnknownDocumentType};
use docfill_parsing::{DocumentExtractor, FieldMapper, ParsingError};

// Re-export domain types for convenience
pub use docfill_core::{
    CanonicalFieldSet, DocumentType, FieldValue, OcrBackend, PdfBackend, RawDocument,
};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file format")]
    UnsupportedFormat { media_type: String },
    #[error("Unable to read file")]
    Acquisition(#[source] BackendError),
    #[error("Unsupported document type")]
    UnsupportedDocumentType(String),
    #[error("Error processing {document_type}")]
    Extractor {
        document_type: DocumentType,
        #[source]
        source: ParsingError,
    },
}

impl From<UnknownDocumentType> for ExtractionError {
    fn from(e: UnknownDocumentType) -> Self {
        ExtractionError::UnsupportedDocumentType(e.0)
    }
}

/// Convert a document into plain text, dispatching on its declared media type.
///
/// - `image/*` → OCR backend, output accepted as-is
/// - `application/pdf` → PDF backend, pages concatenated in order
/// - anything else → [`ExtractionError::UnsupportedFormat`], no backend invoked
///
/// The document is consumed; its bytes are dropped when this returns.
pub fn acquire(
    document: RawDocument,
    pdf: &dyn PdfBackend,
    ocr: &dyn OcrBackend,
) -> Result<String, ExtractionError> {
    let RawDocument { bytes, media_type } = document;
    tracing::debug!(media_type = %media_type, bytes = bytes.len(), "acquiring document text");

    let result = match MediaType::parse(&media_type) {
        MediaType::Image(_) => ocr.image_to_text(&bytes, &media_type),
        MediaType::Pdf => pdf.extract_text(&bytes),
        MediaType::Other(raw) => {
            tracing::warn!(media_type = %raw, "unsupported file format");
            return Err(ExtractionError::UnsupportedFormat { media_type: raw });
        }
    };

    match result {
        Ok(text) => {
            tracing::debug!(media_type = %media_type, chars = text.len(), "acquired document text");
            Ok(text)
        }
        Err(e) => {
            tracing::error!(media_type = %media_type, error = %e, "error reading file");
            Err(ExtractionError::Acquisition(e))
        }
    }
}

/// Backend tuning taken from configuration. `None` keeps each backend's default.
#[derive(Debug, Clone, Default)]
pub struct BackendSettings {
    pub tesseract_path: Option<String>,
    pub ocr_language: Option<String>,
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

#[cfg(feature = "pdf")]
fn default_pdf_backend(settings: &BackendSettings) -> Box<dyn PdfBackend> {
    let mut backend = docfill_pdf_mupdf::MupdfBackend::new();
    if let Some(ratio) = settings.header_exclusion {
        backend = backend.with_header_exclusion(ratio);
    }
    if let Some(ratio) = settings.footer_exclusion {
        backend = backend.with_footer_exclusion(ratio);
    }
    Box::new(backend)
}

#[cfg(not(feature = "pdf"))]
fn default_pdf_backend(_settings: &BackendSettings) -> Box<dyn PdfBackend> {
    Box::new(docfill_core::UnavailableBackend::new(
        "PDF support not compiled in (enable the `pdf` feature of docfill-ingest)",
    ))
}

#[cfg(feature = "ocr")]
fn tesseract_backend(settings: &BackendSettings) -> docfill_ocr_tesseract::TesseractBackend {
    let mut backend = docfill_ocr_tesseract::TesseractBackend::new();
    if let Some(path) = &settings.tesseract_path {
        backend = backend.with_tesseract_path(path.as_str());
    }
    if let Some(language) = &settings.ocr_language {
        backend = backend.with_language(language.as_str());
    }
    backend
}

#[cfg(feature = "ocr")]
fn default_ocr_backend(settings: &BackendSettings) -> Box<dyn OcrBackend> {
    Box::new(tesseract_backend(settings))
}

#[cfg(not(feature = "ocr"))]
fn default_ocr_backend(_settings: &BackendSettings) -> Box<dyn OcrBackend> {
    Box::new(docfill_core::UnavailableBackend::new(
        "OCR support not compiled in (enable the `ocr` feature of docfill-ingest)",
    ))
}

/// Whether the compiled-in OCR backend can actually run with `settings`.
#[cfg(feature = "ocr")]
pub fn ocr_available(settings: &BackendSettings) -> bool {
    tesseract_backend(settings).is_available()
}

#[cfg(not(feature = "ocr"))]
pub fn ocr_available(_settings: &BackendSettings) -> bool {
    false
}

/// Acquisition → extraction → mapping for a single document.
///
/// Stateless between calls; share it behind an `Arc` to run documents
/// concurrently.
pub struct DocumentPipeline {
    pdf: Box<dyn PdfBackend>,
    ocr: Box<dyn OcrBackend>,
    extractor: DocumentExtractor,
    mapper: FieldMapper,
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPipeline {
    /// Pipeline with the compiled-in backends and default extraction settings.
    pub fn new() -> Self {
        Self::with_settings(&BackendSettings::default())
    }

    pub fn with_settings(settings: &BackendSettings) -> Self {
        Self::with_backends(default_pdf_backend(settings), default_ocr_backend(settings))
    }

    pub fn with_backends(pdf: Box<dyn PdfBackend>, ocr: Box<dyn OcrBackend>) -> Self {
        Self {
            pdf,
            ocr,
            extractor: DocumentExtractor::new(),
            mapper: FieldMapper::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: DocumentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_mapper(mut self, mapper: FieldMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Acquire text with this pipeline's backends.
    pub fn acquire(&self, document: RawDocument) -> Result<String, ExtractionError> {
        acquire(document, self.pdf.as_ref(), self.ocr.as_ref())
    }

    /// Run the full pipeline and return the canonical field set.
    pub fn extract(
        &self,
        document: RawDocument,
        document_type: DocumentType,
    ) -> Result<CanonicalFieldSet, ExtractionError> {
        let text = self.acquire(document)?;
        self.extract_text(&text, document_type)
    }

    /// Like [`extract`](Self::extract), with the document type given as a
    /// label or slug. Unknown labels fail before any backend runs.
    pub fn extract_labeled(
        &self,
        document: RawDocument,
        document_type: &str,
    ) -> Result<CanonicalFieldSet, ExtractionError> {
        let document_type = document_type.parse::<DocumentType>().map_err(|e| {
            tracing::warn!(document_type = %e.0, "unsupported document type");
            ExtractionError::from(e)
        })?;
        self.extract(document, document_type)
    }

    /// Extraction and mapping over text that has already been acquired.
    pub fn extract_text(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<CanonicalFieldSet, ExtractionError> {
        let fields = self.run_extractor(text, document_type)?;
        tracing::info!(document_type = %document_type, "successfully extracted data");

        let mapped = self.mapper.map(&fields);
        tracing::info!(
            document_type = %document_type,
            fields = mapped.len(),
            director_slot = self.mapper.director_slot(),
            "mapped extracted data"
        );
        Ok(mapped)
    }

    /// Acquire and extract, stopping before canonical mapping.
    pub fn extract_raw(
        &self,
        document: RawDocument,
        document_type: DocumentType,
    ) -> Result<ExtractedFields, ExtractionError> {
        let text = self.acquire(document)?;
        self.run_extractor(&text, document_type)
    }

    fn run_extractor(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<ExtractedFields, ExtractionError> {
        self.extractor.extract(text, document_type).map_err(|source| {
            tracing::error!(document_type = %document_type, error = %source, "extraction failed");
            ExtractionError::Extractor {
                document_type,
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn pipeline_is_shareable() {
        assert_send_sync::<DocumentPipeline>();
    }

    #[test]
    fn missing_tesseract_is_not_available() {
        let settings = BackendSettings {
            tesseract_path: Some("/nonexistent/bin/tesseract".into()),
            ..Default::default()
        };
        assert!(!ocr_available(&settings));
    }

    #[test]
    fn error_messages() {
        let err = ExtractionError::UnsupportedFormat {
            media_type: "text/plain".into(),
        };
        assert_eq!(err.to_string(), "Unsupported file format");

        let err = ExtractionError::Acquisition(BackendError::OpenError("bad xref".into()));
        assert_eq!(err.to_string(), "Unable to read file");

        let err = ExtractionError::Extractor {
            document_type: DocumentType::GstCertificate,
            source: ParsingError::MalformedField {
                field: "gst_number",
                value: "27".into(),
            },
        };
        assert_eq!(err.to_string(), "Error processing GST Certificate");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unknown_label_maps_to_unsupported_type() {
        let err: ExtractionError = UnknownDocumentType("Sanction Letter".into()).into();
        assert_eq!(err.to_string(), "Unsupported document type");
        assert!(matches!(err, ExtractionError::UnsupportedDocumentType(s) if s == "Sanction Letter"));
    }
}
