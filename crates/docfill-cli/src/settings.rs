//! Resolve runtime settings: CLI flags > environment > config file > defaults.

use std::time::Duration;

use docfill_core::DEFAULT_THRESHOLD;
use docfill_core::config_file::ConfigFile;
use docfill_ingest::BackendSettings;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_TESSERACT_PATH: &str = "DOCFILL_TESSERACT_PATH";
pub const ENV_OCR_LANGUAGE: &str = "DOCFILL_OCR_LANGUAGE";
pub const ENV_FUZZY_THRESHOLD: &str = "DOCFILL_FUZZY_THRESHOLD";

/// Values given on the command line; `None` defers to the lower layers.
#[derive(Debug, Default)]
pub struct Overrides {
    pub fuzzy_threshold: Option<f64>,
    pub tesseract_path: Option<String>,
    pub ocr_language: Option<String>,
    pub num_workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub fuzzy_threshold: f64,
    pub backend: BackendSettings,
    pub num_workers: usize,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve from the process environment.
    pub fn from_env(file: &ConfigFile, flags: Overrides) -> Self {
        Self::resolve(file, |key| std::env::var(key).ok(), flags)
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// An unparseable `DOCFILL_FUZZY_THRESHOLD` is ignored with a warning.
    pub fn resolve(
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        flags: Overrides,
    ) -> Self {
        let extraction = file.extraction.clone().unwrap_or_default();
        let ocr = file.ocr.clone().unwrap_or_default();
        let pdf = file.pdf.clone().unwrap_or_default();
        let concurrency = file.concurrency.clone().unwrap_or_default();

        let env_threshold = env(ENV_FUZZY_THRESHOLD).and_then(|v| match v.trim().parse::<f64>() {
            Ok(t) => Some(t),
            Err(_) => {
                tracing::warn!(value = %v, "ignoring unparseable {ENV_FUZZY_THRESHOLD}");
                None
            }
        });

        let fuzzy_threshold = flags
            .fuzzy_threshold
            .or(env_threshold)
            .or(extraction.fuzzy_threshold)
            .unwrap_or(DEFAULT_THRESHOLD);

        let backend = BackendSettings {
            tesseract_path: flags
                .tesseract_path
                .or_else(|| env(ENV_TESSERACT_PATH))
                .or(ocr.tesseract_path),
            ocr_language: flags
                .ocr_language
                .or_else(|| env(ENV_OCR_LANGUAGE))
                .or(ocr.language),
            header_exclusion: pdf.header_exclusion,
            footer_exclusion: pdf.footer_exclusion,
        };

        let num_workers = flags
            .num_workers
            .or(concurrency.num_workers)
            .unwrap_or(DEFAULT_WORKERS)
            .max(1);
        let timeout_secs = flags
            .timeout_secs
            .or(concurrency.acquisition_timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            fuzzy_threshold,
            backend,
            num_workers,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_core::config_file::{ConcurrencyConfig, ExtractionConfig, OcrConfig};
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::resolve(&ConfigFile::default(), env_of(&[]), Overrides::default());
        assert_eq!(s.fuzzy_threshold, DEFAULT_THRESHOLD);
        assert_eq!(s.num_workers, DEFAULT_WORKERS);
        assert_eq!(s.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(s.backend.tesseract_path.is_none());
    }

    #[test]
    fn test_precedence() {
        let file = ConfigFile {
            extraction: Some(ExtractionConfig {
                fuzzy_threshold: Some(70.0),
            }),
            ocr: Some(OcrConfig {
                tesseract_path: Some("/opt/tess".into()),
                language: Some("hin".into()),
            }),
            concurrency: Some(ConcurrencyConfig {
                num_workers: Some(8),
                acquisition_timeout_secs: Some(30),
            }),
            ..Default::default()
        };
        let env = env_of(&[(ENV_FUZZY_THRESHOLD, "75"), (ENV_OCR_LANGUAGE, "eng+hin")]);
        let flags = Overrides {
            fuzzy_threshold: Some(90.0),
            ..Default::default()
        };

        let s = Settings::resolve(&file, env, flags);
        assert_eq!(s.fuzzy_threshold, 90.0);
        assert_eq!(s.backend.ocr_language.as_deref(), Some("eng+hin"));
        assert_eq!(s.backend.tesseract_path.as_deref(), Some("/opt/tess"));
        assert_eq!(s.num_workers, 8);
        assert_eq!(s.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_bad_env_threshold_falls_through() {
        let file = ConfigFile {
            extraction: Some(ExtractionConfig {
                fuzzy_threshold: Some(65.0),
            }),
            ..Default::default()
        };
        let s = Settings::resolve(
            &file,
            env_of(&[(ENV_FUZZY_THRESHOLD, "high")]),
            Overrides::default(),
        );
        assert_eq!(s.fuzzy_threshold, 65.0);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let flags = Overrides {
            num_workers: Some(0),
            ..Default::default()
        };
        let s = Settings::resolve(&ConfigFile::default(), env_of(&[]), flags);
        assert_eq!(s.num_workers, 1);
    }
}
