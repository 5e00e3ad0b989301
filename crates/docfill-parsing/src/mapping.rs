//! Reconcile extractor-local field names into the canonical form vocabulary.

use docfill_core::{CanonicalFieldSet, DocumentType, ExtractedFieldSet, ExtractedFields};

/// Fields copied under their own name whenever an extractor produces them.
pub const COMMON_FIELDS: [&str; 7] = [
    "name", "dob", "address", "pan", "aadhaar", "mobile", "email",
];

/// Where an extractor-local key lands.
#[derive(Debug, Clone, Copy)]
enum Target {
    Key(&'static str),
    /// `director_<field>_<slot>`
    Director(&'static str),
}

fn rename_table(document_type: DocumentType) -> &'static [(&'static str, Target)] {
    use Target::{Director, Key};
    match document_type {
        DocumentType::UdyamCertificate => &[
            ("enterprise_name", Key("enterprise_name")),
            ("udyam_number", Key("udyam_number")),
            ("classification", Key("classification")),
            ("date_of_classification", Key("date_of_classification")),
            ("major_activity", Key("major_activity")),
            ("social_category", Key("social_category")),
            ("nic_2_digit", Key("nic_2_digit")),
            ("nic_4_digit", Key("nic_4_digit")),
            ("nic_5_digit", Key("nic_5_digit")),
            ("date_of_incorporation", Key("date_of_incorporation")),
            ("date_of_commencement", Key("date_of_commencement")),
        ],
        DocumentType::GstCertificate => &[
            ("legal_name", Key("enterprise_name")),
            ("trade_name", Key("trade_name")),
            ("constitution", Key("constitution")),
            ("gst_number", Key("gst_number")),
            ("date_of_liability", Key("date_of_liability")),
            ("period_of_validity_from", Key("period_of_validity_from")),
            ("period_of_validity_to", Key("period_of_validity_to")),
            ("type_of_registration", Key("type_of_registration")),
            ("date_of_issue", Key("date_of_issue")),
            ("state", Key("state")),
        ],
        DocumentType::PanCard => &[
            ("name", Director("name")),
            ("pan", Director("pan")),
            ("dob", Director("dob")),
        ],
        DocumentType::AadhaarCard => &[
            ("name", Director("name")),
            ("aadhaar", Director("aadhaar")),
            ("address", Director("address")),
            ("dob", Director("dob")),
        ],
        DocumentType::BankStatement => &[
            ("bank_name", Key("existing_bank")),
            ("account_number", Key("account_number")),
            ("ifsc_code", Key("ifsc_code")),
            ("credit_facilities", Key("credit_facilities")),
            ("security", Key("existing_security")),
        ],
    }
}

/// Per-director fields a document type can emit under `director_<field>_<n>`.
fn director_fields(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::GstCertificate => &["name", "designation", "state"],
        DocumentType::PanCard => &["name", "pan", "dob"],
        DocumentType::AadhaarCard => &["name", "aadhaar", "address", "dob"],
        DocumentType::UdyamCertificate | DocumentType::BankStatement => &[],
    }
}

fn director_key(field: &str, index: usize) -> String {
    format!("director_{field}_{index}")
}

/// Maps typed extractor output onto canonical form keys.
///
/// PAN and Aadhaar values go to director slot 0 unless another slot is
/// chosen. Two uploads into the same slot overwrite each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper {
    slot: usize,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key PAN and Aadhaar fields to director row `slot`.
    pub fn with_director_slot(slot: usize) -> Self {
        Self { slot }
    }

    pub fn director_slot(&self) -> usize {
        self.slot
    }

    pub fn map(&self, fields: &ExtractedFields) -> CanonicalFieldSet {
        let document_type = fields.document_type();
        let local = fields.to_field_set();
        let mut out = self.map_common(&local);

        for (source, target) in rename_table(document_type) {
            if let Some(value) = local.get(*source) {
                out.insert(self.render(*target), value.clone());
            }
        }

        for (i, director) in fields.directors().iter().enumerate() {
            out.insert_text(director_key("name", i), director.name.as_str());
            out.insert_text(director_key("designation", i), director.designation.as_str());
            out.insert_text(director_key("state", i), director.state_of_residence.as_str());
        }

        tracing::debug!(
            document_type = %document_type,
            local = local.len(),
            canonical = out.len(),
            "mapped extracted fields"
        );
        out
    }

    /// Copy only the common fields, for sources without a rename profile.
    pub fn map_common(&self, local: &ExtractedFieldSet) -> CanonicalFieldSet {
        let mut out = CanonicalFieldSet::new();
        for key in COMMON_FIELDS {
            if let Some(value) = local.get(key) {
                out.insert(key, value.clone());
            }
        }
        out
    }

    /// Fixed canonical keys `document_type` can produce under this mapper.
    ///
    /// GST director keys are indexed by discovery order and are not listed;
    /// use [`is_canonical_key`] to test them.
    pub fn canonical_keys(&self, document_type: DocumentType) -> Vec<String> {
        let mut keys: Vec<String> = COMMON_FIELDS.iter().map(|k| k.to_string()).collect();
        for (_, target) in rename_table(document_type) {
            let key = self.render(*target);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn render(&self, target: Target) -> String {
        match target {
            Target::Key(key) => key.to_string(),
            Target::Director(field) => director_key(field, self.slot),
        }
    }
}

/// Whether `key` belongs to the canonical vocabulary for `document_type`,
/// for any director index.
pub fn is_canonical_key(key: &str, document_type: DocumentType) -> bool {
    if COMMON_FIELDS.contains(&key) {
        return true;
    }
    let fixed = rename_table(document_type)
        .iter()
        .any(|(_, target)| matches!(target, Target::Key(k) if *k == key));
    if fixed {
        return true;
    }

    let Some(rest) = key.strip_prefix("director_") else {
        return false;
    };
    let Some((field, index)) = rest.rsplit_once('_') else {
        return false;
    };
    !index.is_empty()
        && index.bytes().all(|b| b.is_ascii_digit())
        && director_fields(document_type).contains(&field)
}
