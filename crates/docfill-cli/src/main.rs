use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use docfill_core::config_file::{self, ConfigFile};
use docfill_core::{DocumentType, MediaType, RawDocument};
use docfill_ingest::{DocumentPipeline, ExtractionError, ocr_available};
use docfill_parsing::{DocumentExtractor, FieldMapper, ParsingConfigBuilder};

mod output;
mod settings;

use output::{BatchEntry, ColorMode};
use settings::{Overrides, Settings};

/// docfill - Extract loan-application form fields from Indian business documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract canonical form fields from one document
    Extract {
        /// Path to the PDF or image file
        file_path: PathBuf,

        /// Document type, by label ("GST Certificate") or slug ("gst")
        #[arg(short = 't', long = "type")]
        document_type: String,

        /// Declared media type; guessed from the file extension when omitted
        #[arg(long)]
        media_type: Option<String>,

        /// Print JSON instead of a field listing
        #[arg(long)]
        json: bool,

        /// Stop before canonical mapping and show extractor-local fields
        #[arg(long)]
        dry_run: bool,

        /// Director row for PAN and Aadhaar fields
        #[arg(long, default_value_t = 0)]
        director_slot: usize,

        /// Fuzzy label-match threshold (0-100)
        #[arg(long)]
        threshold: Option<f64>,

        /// Path to the tesseract binary
        #[arg(long)]
        tesseract_path: Option<String>,

        /// Tesseract language code(s), e.g. "eng" or "eng+hin"
        #[arg(long)]
        ocr_language: Option<String>,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Extract several documents concurrently, given as TYPE=FILE pairs
    Batch {
        /// Documents to process, e.g. gst=cert.pdf pan=card.jpg
        #[arg(required = true)]
        items: Vec<String>,

        /// Print a JSON array instead of a report
        #[arg(long)]
        json: bool,

        /// Maximum documents processed at once
        #[arg(long)]
        workers: Option<usize>,

        /// Per-document timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Fuzzy label-match threshold (0-100)
        #[arg(long)]
        threshold: Option<f64>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Check an identifier or date against its format rules
    Validate {
        #[arg(value_enum)]
        kind: ValueKind,
        value: String,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        no_color: bool,
    },

    /// List supported document types
    Types {
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings to the platform config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueKind {
    Pan,
    Aadhaar,
    Gst,
    Date,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Pan => "PAN",
            ValueKind::Aadhaar => "Aadhaar",
            ValueKind::Gst => "GST",
            ValueKind::Date => "date",
        }
    }

    fn check(self, value: &str) -> bool {
        match self {
            ValueKind::Pan => docfill_core::validate_pan(value),
            ValueKind::Aadhaar => docfill_core::validate_aadhaar(value),
            ValueKind::Gst => docfill_core::validate_gst(value),
            ValueKind::Date => docfill_core::validate_date(value),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            file_path,
            document_type,
            media_type,
            json,
            dry_run,
            director_slot,
            threshold,
            tesseract_path,
            ocr_language,
            output,
            no_color,
        } => {
            let settings = Settings::from_env(
                &config_file::load_config(),
                Overrides {
                    fuzzy_threshold: threshold,
                    tesseract_path,
                    ocr_language,
                    ..Default::default()
                },
            );
            let request = ExtractRequest {
                file_path,
                document_type,
                media_type,
                dry_run,
                director_slot,
            };
            extract(request, &settings, json, output, no_color)
        }
        Command::Batch {
            items,
            json,
            workers,
            timeout,
            threshold,
            no_color,
        } => {
            let settings = Settings::from_env(
                &config_file::load_config(),
                Overrides {
                    fuzzy_threshold: threshold,
                    num_workers: workers,
                    timeout_secs: timeout,
                    ..Default::default()
                },
            );
            batch(items, &settings, json, no_color).await
        }
        Command::Validate {
            kind,
            value,
            json,
            no_color,
        } => validate(kind, &value, json, no_color),
        Command::Types { json, no_color } => {
            let mut stdout = std::io::stdout();
            if json {
                let types: Vec<_> = DocumentType::ALL
                    .iter()
                    .map(|t| json!({ "slug": t.slug(), "label": t.label() }))
                    .collect();
                output::print_json(&mut stdout, &json!(types))?;
            } else {
                output::print_types(&mut stdout, ColorMode(!no_color))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { init } => show_config(init),
    }
}

/// Build the pipeline for the resolved settings.
fn build_pipeline(settings: &Settings, director_slot: usize) -> anyhow::Result<DocumentPipeline> {
    let config = ParsingConfigBuilder::new()
        .fuzzy_threshold(settings.fuzzy_threshold)
        .build()
        .context("Invalid extraction settings")?;

    Ok(DocumentPipeline::with_settings(&settings.backend)
        .with_extractor(DocumentExtractor::with_config(config))
        .with_mapper(FieldMapper::with_director_slot(director_slot)))
}

/// Read a file into a [`RawDocument`], declaring `media_type` or guessing it
/// from the extension.
fn read_document(path: &Path, media_type: Option<&str>) -> std::io::Result<RawDocument> {
    let bytes = std::fs::read(path)?;
    let media_type = media_type.unwrap_or_else(|| MediaType::guess_from_path(path));
    Ok(RawDocument::new(bytes, media_type))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

struct ExtractRequest {
    file_path: PathBuf,
    document_type: String,
    media_type: Option<String>,
    dry_run: bool,
    director_slot: usize,
}

fn extract(
    request: ExtractRequest,
    settings: &Settings,
    json: bool,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<ExitCode> {
    let color = ColorMode(!no_color && !json && output.is_none());

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    match run_extract(&request, settings, &mut *writer, json, color) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if json => {
            output::print_json(&mut *writer, &output::json_error(&e.to_string()))?;
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

fn run_extract(
    request: &ExtractRequest,
    settings: &Settings,
    writer: &mut dyn Write,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let document_type: DocumentType = request
        .document_type
        .parse()
        .map_err(ExtractionError::from)?;

    let name = file_name(&request.file_path);
    let document = read_document(&request.file_path, request.media_type.as_deref())
        .map_err(|e| {
            tracing::error!(path = %request.file_path.display(), error = %e, "error reading file");
            anyhow::anyhow!("Unable to read file")
        })?;

    let pipeline = build_pipeline(settings, request.director_slot)?;

    if request.dry_run {
        let local = pipeline.extract_raw(document, document_type)?.to_field_set();
        if json {
            output::print_json(
                writer,
                &json!({
                    "file": name,
                    "document_type": document_type.label(),
                    "dry_run": true,
                    "fields": local,
                }),
            )?;
        } else {
            output::print_dry_run(writer, &name, document_type, &local, color)?;
        }
        return Ok(());
    }

    let fields = pipeline.extract(document, document_type)?;
    if json {
        output::print_json(writer, &output::fields_json(&name, document_type, &fields))?;
    } else {
        output::print_fields(writer, &name, document_type, &fields, color)?;
    }
    Ok(())
}

/// Split a `TYPE=FILE` batch argument.
fn split_item(item: &str) -> Option<(&str, &str)> {
    let (label, path) = item.split_once('=')?;
    let (label, path) = (label.trim(), path.trim());
    if label.is_empty() || path.is_empty() {
        return None;
    }
    Some((label, path))
}

async fn batch(
    items: Vec<String>,
    settings: &Settings,
    json: bool,
    no_color: bool,
) -> anyhow::Result<ExitCode> {
    use indicatif::{ProgressBar, ProgressStyle};

    let color = ColorMode(!no_color && !json);
    let pipeline = Arc::new(build_pipeline(settings, 0)?);
    let semaphore = Arc::new(Semaphore::new(settings.num_workers));
    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let bar = ProgressBar::new(items.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    tracing::info!(
        documents = items.len(),
        workers = settings.num_workers,
        timeout_secs = settings.timeout.as_secs(),
        "starting batch"
    );

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let job = BatchJob {
                pipeline: Arc::clone(&pipeline),
                semaphore: Arc::clone(&semaphore),
                cancel: cancel.clone(),
                timeout: settings.timeout,
            };
            let bar = bar.clone();
            tokio::spawn(async move {
                let entry = job.run(&item).await;
                bar.set_message(entry.file.clone());
                bar.inc(1);
                entry
            })
        })
        .collect();

    let mut entries = Vec::with_capacity(handles.len());
    for handle in handles {
        entries.push(handle.await?);
    }
    bar.finish_and_clear();

    let mut stdout = std::io::stdout();
    if json {
        output::print_json(&mut stdout, &output::batch_json(&entries))?;
    } else {
        output::print_batch_report(&mut stdout, &entries, color)?;
    }

    if entries.iter().any(|e| e.outcome.is_err()) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

struct BatchJob {
    pipeline: Arc<DocumentPipeline>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    timeout: Duration,
}

impl BatchJob {
    async fn run(self, item: &str) -> BatchEntry {
        let Some((label, path)) = split_item(item) else {
            return BatchEntry {
                file: item.to_string(),
                label: String::new(),
                outcome: Err("Expected TYPE=FILE".to_string()),
            };
        };
        let path = PathBuf::from(path);
        let outcome = self.process(label, &path).await;
        if let Err(message) = &outcome {
            tracing::warn!(file = %path.display(), error = %message, "document failed");
        }
        BatchEntry {
            file: file_name(&path),
            label: label.to_string(),
            outcome,
        }
    }

    async fn process(
        &self,
        label: &str,
        path: &Path,
    ) -> Result<(DocumentType, docfill_core::CanonicalFieldSet), String> {
        let document_type: DocumentType = label
            .parse()
            .map_err(|e| ExtractionError::from(e).to_string())?;

        let _permit = tokio::select! {
            _ = self.cancel.cancelled() => return Err("Cancelled".to_string()),
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                permit.map_err(|e| e.to_string())?
            }
        };

        let document = read_document(path, None).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "error reading file");
            "Unable to read file".to_string()
        })?;

        let pipeline = Arc::clone(&self.pipeline);
        let task = tokio::task::spawn_blocking(move || pipeline.extract(document, document_type));

        // A timed-out or cancelled extraction keeps running on its blocking
        // thread; its result is discarded.
        tokio::select! {
            _ = self.cancel.cancelled() => Err("Cancelled".to_string()),
            result = tokio::time::timeout(self.timeout, task) => match result {
                Err(_) => Err(format!("Timed out after {}s", self.timeout.as_secs())),
                Ok(Err(join_error)) => Err(format!("Worker failed: {}", join_error)),
                Ok(Ok(Err(e))) => Err(e.to_string()),
                Ok(Ok(Ok(fields))) => Ok((document_type, fields)),
            },
        }
    }
}

fn validate(kind: ValueKind, value: &str, json: bool, no_color: bool) -> anyhow::Result<ExitCode> {
    let valid = kind.check(value);
    let mut stdout = std::io::stdout();
    if json {
        output::print_json(
            &mut stdout,
            &json!({ "kind": kind.name(), "value": value, "valid": valid }),
        )?;
    } else {
        output::print_validation(&mut stdout, kind.name(), value, valid, ColorMode(!no_color))?;
    }
    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn show_config(init: bool) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_env(&config_file::load_config(), Overrides::default());

    if init {
        let file = ConfigFile {
            extraction: Some(config_file::ExtractionConfig {
                fuzzy_threshold: Some(settings.fuzzy_threshold),
            }),
            ocr: Some(config_file::OcrConfig {
                tesseract_path: settings.backend.tesseract_path.clone(),
                language: settings.backend.ocr_language.clone(),
            }),
            pdf: Some(config_file::PdfConfig {
                header_exclusion: settings.backend.header_exclusion,
                footer_exclusion: settings.backend.footer_exclusion,
            }),
            concurrency: Some(config_file::ConcurrencyConfig {
                num_workers: Some(settings.num_workers),
                acquisition_timeout_secs: Some(settings.timeout.as_secs()),
            }),
        };
        let path = config_file::save_config(&file).map_err(anyhow::Error::msg)?;
        println!("Config written to: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    match config_file::config_path() {
        Some(path) => println!("Config file:     {}", path.display()),
        None => println!("Config file:     (no platform config directory)"),
    }
    println!("Fuzzy threshold: {}", settings.fuzzy_threshold);
    println!(
        "Tesseract:       {}",
        settings.backend.tesseract_path.as_deref().unwrap_or("tesseract")
    );
    println!(
        "OCR language:    {}",
        settings.backend.ocr_language.as_deref().unwrap_or("eng")
    );
    println!(
        "OCR available:   {}",
        if ocr_available(&settings.backend) {
            "yes"
        } else {
            "no"
        }
    );
    println!("Workers:         {}", settings.num_workers);
    println!("Timeout:         {}s", settings.timeout.as_secs());
    Ok(ExitCode::SUCCESS)
}
