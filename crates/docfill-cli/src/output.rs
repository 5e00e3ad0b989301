use std::io::Write;

use docfill_core::{
    CanonicalFieldSet, DocumentType, ExtractedFieldSet, FieldValue, INVALID_AADHAAR, INVALID_PAN,
    UNKNOWN_STATE,
};
use owo_colors::OwoColorize;
use serde_json::{Value, json};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One finished document in a batch run.
pub struct BatchEntry {
    pub file: String,
    /// The type label as given on the command line.
    pub label: String,
    pub outcome: Result<(DocumentType, CanonicalFieldSet), String>,
}

/// `{"error": "<message>"}`
pub fn json_error(message: &str) -> Value {
    json!({ "error": message })
}

pub fn print_json(w: &mut dyn Write, value: &Value) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(w, "{}", text)
}

fn is_sentinel(value: &str) -> bool {
    value == INVALID_PAN || value == INVALID_AADHAAR
}

fn write_value(
    w: &mut dyn Write,
    key: &str,
    value: &FieldValue,
    width: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    match value {
        FieldValue::Text(text) => {
            let padded = format!("{:<width$}", key);
            if !color.enabled() {
                writeln!(w, "  {}  {}", padded, text)
            } else if is_sentinel(text) {
                writeln!(w, "  {}  {}", padded.bold(), text.red())
            } else if text == UNKNOWN_STATE {
                writeln!(w, "  {}  {}", padded.bold(), text.yellow())
            } else {
                writeln!(w, "  {}  {}", padded.bold(), text)
            }
        }
        FieldValue::Facilities(list) => {
            if color.enabled() {
                writeln!(w, "  {}", key.bold())?;
            } else {
                writeln!(w, "  {}", key)?;
            }
            if list.is_empty() {
                writeln!(w, "    (none)")?;
            }
            for facility in list {
                writeln!(w, "    - {}: Rs. {}", facility.facility, facility.amount)?;
            }
            Ok(())
        }
    }
}

fn write_fields(
    w: &mut dyn Write,
    fields: &[(&str, &FieldValue)],
    color: ColorMode,
) -> std::io::Result<()> {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        write_value(w, key, value, width, color)?;
    }
    Ok(())
}

/// Print the canonical fields for one document.
pub fn print_fields(
    w: &mut dyn Write,
    file_name: &str,
    document_type: DocumentType,
    fields: &CanonicalFieldSet,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} ({})", file_name.bold(), document_type.label().cyan())?;
    } else {
        writeln!(w, "{} ({})", file_name, document_type.label())?;
    }

    if fields.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "No fields found".yellow())?;
        } else {
            writeln!(w, "  No fields found")?;
        }
        return Ok(());
    }

    write_fields(w, &fields.iter().collect::<Vec<_>>(), color)?;
    writeln!(w)?;
    writeln!(w, "{} fields extracted", fields.len())?;
    Ok(())
}

/// Print extractor-local fields before canonical mapping.
pub fn print_dry_run(
    w: &mut dyn Write,
    file_name: &str,
    document_type: DocumentType,
    fields: &ExtractedFieldSet,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({}, {} local fields)\n",
            "DRY RUN:".bold().cyan(),
            file_name.bold(),
            document_type.label(),
            fields.len()
        )?;
    } else {
        writeln!(
            w,
            "DRY RUN: {} ({}, {} local fields)\n",
            file_name,
            document_type.label(),
            fields.len()
        )?;
    }
    let local: Vec<(&str, &FieldValue)> = fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
    write_fields(w, &local, color)
}

pub fn fields_json(
    file_name: &str,
    document_type: DocumentType,
    fields: &CanonicalFieldSet,
) -> Value {
    json!({
        "file": file_name,
        "document_type": document_type.label(),
        "fields": fields,
    })
}

/// Print a batch report in input order, failures inline.
pub fn print_batch_report(
    w: &mut dyn Write,
    entries: &[BatchEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    for entry in entries {
        match &entry.outcome {
            Ok((document_type, fields)) => {
                print_fields(w, &entry.file, *document_type, fields, color)?;
            }
            Err(message) => {
                if color.enabled() {
                    writeln!(w, "{} {}", entry.file.bold(), "FAILED".red())?;
                } else {
                    writeln!(w, "{} FAILED", entry.file)?;
                }
                writeln!(w, "  {}", message)?;
            }
        }
        writeln!(w)?;
    }
    print_batch_summary(w, entries, color)
}

pub fn print_batch_summary(
    w: &mut dyn Write,
    entries: &[BatchEntry],
    color: ColorMode,
) -> std::io::Result<()> {
    let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
    let ok = entries.len() - failed;

    if color.enabled() {
        writeln!(w, "{}", "=".repeat(60).dimmed())?;
        writeln!(
            w,
            "{} {} extracted, {} failed",
            "SUMMARY".bold(),
            ok.to_string().green(),
            if failed > 0 {
                failed.to_string().red().to_string()
            } else {
                failed.to_string()
            }
        )?;
    } else {
        writeln!(w, "{}", "=".repeat(60))?;
        writeln!(w, "SUMMARY {} extracted, {} failed", ok, failed)?;
    }
    Ok(())
}

pub fn batch_json(entries: &[BatchEntry]) -> Value {
    let items: Vec<Value> = entries
        .iter()
        .map(|entry| match &entry.outcome {
            Ok((document_type, fields)) => fields_json(&entry.file, *document_type, fields),
            Err(message) => json!({
                "file": entry.file,
                "document_type": entry.label,
                "error": message,
            }),
        })
        .collect();
    Value::Array(items)
}

pub fn print_validation(
    w: &mut dyn Write,
    kind: &str,
    value: &str,
    valid: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let verdict = if valid { "VALID" } else { "INVALID" };
    if color.enabled() {
        let verdict = if valid {
            verdict.green().to_string()
        } else {
            verdict.red().to_string()
        };
        writeln!(w, "{} {} -> {}", kind.bold(), value, verdict)
    } else {
        writeln!(w, "{} {} -> {}", kind, value, verdict)
    }
}

pub fn print_types(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    for t in DocumentType::ALL {
        if color.enabled() {
            writeln!(w, "{} {}", format!("{:<10}", t.slug()).cyan(), t.label())?;
        } else {
            writeln!(w, "{:<10} {}", t.slug(), t.label())?;
        }
    }
    Ok(())
}
