use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors return the text of every page, concatenated in page order,
/// with no page-boundary markers. Field extraction lives in
/// `docfill_parsing::DocumentExtractor`.
pub trait PdfBackend: Send + Sync {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, BackendError>;
}

/// Trait for OCR backends: image bytes in, best-effort text out.
///
/// `media_type` is the declared `image/*` type, for engines that sniff by
/// file extension.
pub trait OcrBackend: Send + Sync {
    fn image_to_text(&self, image_bytes: &[u8], media_type: &str) -> Result<String, BackendError>;
}

/// Stand-in backend for capabilities that were not compiled in.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: &'static str,
}

impl UnavailableBackend {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl PdfBackend for UnavailableBackend {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, BackendError> {
        Err(BackendError::Unavailable(self.reason.to_string()))
    }
}

impl OcrBackend for UnavailableBackend {
    fn image_to_text(&self, _image_bytes: &[u8], _media_type: &str) -> Result<String, BackendError> {
        Err(BackendError::Unavailable(self.reason.to_string()))
    }
}
