use std::io;
use std::process::Command;

use docfill_core::{BackendError, OcrBackend};

/// [`OcrBackend`] that shells out to the `tesseract` command-line tool.
///
/// The image is written to a temporary file (tesseract sniffs the format from
/// the extension) and recognised text is read back from stdout.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    /// Binary to run. Defaults to `tesseract`, resolved through `PATH`.
    tesseract_path: String,
    /// Tesseract language code(s), e.g. `eng` or `eng+hin`.
    language: String,
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tesseract_path(mut self, path: impl Into<String>) -> Self {
        self.tesseract_path = path.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Whether the configured binary can be run at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.tesseract_path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// File extension for an `image/<subtype>` media type, case-insensitively.
fn extension_for(media_type: &str) -> &'static str {
    let subtype = media_type
        .split_once('/')
        .map_or(media_type, |(_, sub)| sub)
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match subtype.as_str() {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "tiff" | "tif" => "tif",
        "png" => "png",
        "bmp" | "x-ms-bmp" => "bmp",
        "webp" => "webp",
        "gif" => "gif",
        _ => "img",
    }
}

impl OcrBackend for TesseractBackend {
    fn image_to_text(&self, image_bytes: &[u8], media_type: &str) -> Result<String, BackendError> {
        let temp_dir = tempfile::tempdir()?;
        let input = temp_dir
            .path()
            .join(format!("ocr_input.{}", extension_for(media_type)));
        std::fs::write(&input, image_bytes)?;

        // tesseract <input> stdout -l <lang>
        let output = Command::new(&self.tesseract_path)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BackendError::Unavailable(format!(
                    "tesseract not found at '{}'",
                    self.tesseract_path
                )),
                _ => BackendError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::ExtractionError(format!(
                "tesseract exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(
            language = %self.language,
            bytes = image_bytes.len(),
            chars = text.len(),
            "tesseract finished"
        );
        Ok(text)
    }
}
