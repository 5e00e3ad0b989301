use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub ocr: Option<OcrConfig>,
    pub pdf: Option<PdfConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum fuzzy score (0–100) a line must exceed to match a label.
    pub fuzzy_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_path: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Fraction of page height to drop from the top of each page.
    pub header_exclusion: Option<f32>,
    /// Fraction of page height to drop from the bottom of each page.
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub num_workers: Option<usize>,
    pub acquisition_timeout_secs: Option<u64>,
}

/// Platform config directory path: `<config_dir>/docfill/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docfill").join("config.toml"))
}

/// Load config by cascading CWD `.docfill.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docfill.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        extraction: Some(ExtractionConfig {
            fuzzy_threshold: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.fuzzy_threshold)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.fuzzy_threshold)),
        }),
        ocr: Some(OcrConfig {
            tesseract_path: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.tesseract_path.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.tesseract_path.clone())),
            language: overlay
                .ocr
                .as_ref()
                .and_then(|o| o.language.clone())
                .or_else(|| base.ocr.as_ref().and_then(|o| o.language.clone())),
        }),
        pdf: Some(PdfConfig {
            header_exclusion: overlay
                .pdf
                .as_ref()
                .and_then(|p| p.header_exclusion)
                .or_else(|| base.pdf.as_ref().and_then(|p| p.header_exclusion)),
            footer_exclusion: overlay
                .pdf
                .as_ref()
                .and_then(|p| p.footer_exclusion)
                .or_else(|| base.pdf.as_ref().and_then(|p| p.footer_exclusion)),
        }),
        concurrency: Some(ConcurrencyConfig {
            num_workers: overlay
                .concurrency
                .as_ref()
                .and_then(|c| c.num_workers)
                .or_else(|| base.concurrency.as_ref().and_then(|c| c.num_workers)),
            acquisition_timeout_secs: overlay
                .concurrency
                .as_ref()
                .and_then(|c| c.acquisition_timeout_secs)
                .or_else(|| {
                    base.concurrency
                        .as_ref()
                        .and_then(|c| c.acquisition_timeout_secs)
                }),
        }),
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_round_trip_toml() {
        let config = ConfigFile {
            extraction: Some(ExtractionConfig {
                fuzzy_threshold: Some(75.0),
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.extraction.unwrap().fuzzy_threshold, Some(75.0));
    }

    #[test]
    fn absent_section_deserializes_as_none() {
        let toml_str = "[ocr]\nlanguage = \"eng+hin\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.ocr.unwrap().language.as_deref(), Some("eng+hin"));
        assert!(parsed.extraction.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            ocr: Some(OcrConfig {
                tesseract_path: Some("/usr/bin/tesseract".to_string()),
                language: Some("eng".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            ocr: Some(OcrConfig {
                language: Some("hin".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).ocr.unwrap();
        assert_eq!(merged.language.as_deref(), Some("hin"));
        assert_eq!(merged.tesseract_path.as_deref(), Some("/usr/bin/tesseract"));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            concurrency: Some(ConcurrencyConfig {
                num_workers: Some(8),
                acquisition_timeout_secs: Some(30),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        let concurrency = merged.concurrency.unwrap();
        assert_eq!(concurrency.num_workers, Some(8));
        assert_eq!(concurrency.acquisition_timeout_secs, Some(30));
    }

    #[test]
    fn load_from_path_reads_file_and_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[pdf]\nfooter_exclusion = 0.05\n").unwrap();
        let loaded = load_from_path(&good).unwrap();
        assert_eq!(loaded.pdf.unwrap().footer_exclusion, Some(0.05));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "this is = = not toml").unwrap();
        assert!(load_from_path(&bad).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}
