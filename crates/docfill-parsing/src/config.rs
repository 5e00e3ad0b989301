use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use docfill_core::DEFAULT_THRESHOLD;

/// Controls how a list of labels/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// A field located by fuzzy label search rather than an anchored pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelField {
    PanName,
    PanDob,
    PanNumber,
    AadhaarNumber,
    AadhaarName,
    AadhaarAddress,
    AadhaarDob,
    BankName,
    AccountNumber,
    IfscCode,
    BranchName,
    AccountType,
    Security,
}

impl LabelField {
    /// Built-in label synonyms, tried in order.
    pub fn default_labels(&self) -> &'static [&'static str] {
        match self {
            LabelField::PanName | LabelField::AadhaarName => &["Name", "Applicant Name"],
            LabelField::PanDob => &["Date of Birth", "DOB"],
            LabelField::AadhaarDob => &["DOB", "Date of Birth"],
            LabelField::PanNumber => &["Permanent Account Number", "PAN"],
            LabelField::AadhaarNumber => &["Aadhaar Number", "UID"],
            LabelField::AadhaarAddress => &["Address", "Residential Address"],
            LabelField::BankName => &["Bank Name", "Name of Bank"],
            LabelField::AccountNumber => &["Account Number", "A/C No"],
            LabelField::IfscCode => &["IFSC Code", "IFSC"],
            LabelField::BranchName => &["Branch Name", "Branch"],
            LabelField::AccountType => &["Account Type", "Type of Account"],
            LabelField::Security => &["Security"],
        }
    }
}

/// Credit facility names recognised on bank statements.
pub(crate) const DEFAULT_FACILITY_NAMES: &[&str] = &["Cash Credit", "Term Loan", "LC/BG"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("fuzzy threshold must be within 0–100, got {0}")]
    InvalidThreshold(f64),
    #[error("credit facility name list is empty")]
    EmptyFacilityList,
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Configuration for the pattern extractors.
///
/// Use [`ParsingConfigBuilder`] to construct with overrides.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Score a line must exceed to match a label (default: 80).
    pub(crate) fuzzy_threshold: f64,
    pub(crate) labels: HashMap<LabelField, ListOverride<String>>,
    /// `None` means the built-in facility pattern.
    pub(crate) facility_re: Option<Regex>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_THRESHOLD,
            labels: HashMap::new(),
            facility_re: None,
        }
    }
}

impl ParsingConfig {
    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Label synonyms for `field`, after applying any override.
    pub fn labels(&self, field: LabelField) -> Vec<String> {
        let defaults: Vec<String> = field
            .default_labels()
            .iter()
            .map(|s| s.to_string())
            .collect();
        match self.labels.get(&field) {
            Some(over) => over.resolve(&defaults),
            None => defaults,
        }
    }

    /// Pattern capturing `(facility name, amount)` pairs.
    pub(crate) fn facility_regex(&self) -> &Regex {
        static DEFAULT_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(&facility_pattern(DEFAULT_FACILITY_NAMES)).unwrap());
        self.facility_re.as_ref().unwrap_or(&*DEFAULT_RE)
    }
}

fn facility_pattern<S: AsRef<str>>(names: &[S]) -> String {
    let alternation: Vec<String> = names
        .iter()
        .map(|n| regex::escape(n.as_ref()))
        .collect();
    format!(r"(?i)({})\s*:\s*Rs\.\s*([\d,.]+)", alternation.join("|"))
}

/// Builder for [`ParsingConfig`].
///
/// Validation happens in [`build()`](Self::build): the threshold must lie in
/// 0–100 and facility names are escaped before being compiled into a pattern.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    fuzzy_threshold: Option<f64>,
    labels: HashMap<LabelField, ListOverride<String>>,
    facility_names: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    // ── Label synonyms ──

    pub fn set_labels(mut self, field: LabelField, labels: Vec<String>) -> Self {
        self.labels.insert(field, ListOverride::Replace(labels));
        self
    }

    pub fn add_label(mut self, field: LabelField, label: String) -> Self {
        match self.labels.get_mut(&field) {
            Some(ListOverride::Extend(v)) => v.push(label),
            _ => {
                self.labels.insert(field, ListOverride::Extend(vec![label]));
            }
        }
        self
    }

    // ── Credit facilities ──

    pub fn set_facility_names(mut self, names: Vec<String>) -> Self {
        self.facility_names = ListOverride::Replace(names);
        self
    }

    pub fn add_facility_name(mut self, name: String) -> Self {
        match &mut self.facility_names {
            ListOverride::Extend(v) => v.push(name),
            _ => self.facility_names = ListOverride::Extend(vec![name]),
        }
        self
    }

    /// Validate the overrides and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ConfigError> {
        let threshold = self.fuzzy_threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        let facility_re = match &self.facility_names {
            ListOverride::Default => None,
            over => {
                let defaults: Vec<String> = DEFAULT_FACILITY_NAMES
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                let names = over.resolve(&defaults);
                if names.is_empty() {
                    return Err(ConfigError::EmptyFacilityList);
                }
                Some(Regex::new(&facility_pattern(&names))?)
            }
        };

        Ok(ParsingConfig {
            fuzzy_threshold: threshold,
            labels: self.labels,
            facility_re,
        })
    }
}
