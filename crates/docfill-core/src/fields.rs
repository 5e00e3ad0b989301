//! Typed per-document field records produced by the pattern extractors.
//!
//! Every member is optional: a field the extractor could not locate is simply
//! `None`. [`ExtractedFields::to_field_set`] renders a record under its
//! extractor-local key names, which is what the field mapper consumes.

use serde::Serialize;

use crate::{DocumentType, ExtractedFieldSet, FieldValue, INVALID_AADHAAR, INVALID_PAN};

/// Outcome of validating a structured identifier that was found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checked {
    Valid(String),
    /// The text had something in the identifier's place, but it failed the format check.
    Invalid { raw: String },
}

impl Checked {
    pub fn is_valid(&self) -> bool {
        matches!(self, Checked::Valid(_))
    }

    /// The value to hand to consumers: the identifier itself, or `sentinel`.
    pub fn render(&self, sentinel: &str) -> String {
        match self {
            Checked::Valid(v) => v.clone(),
            Checked::Invalid { .. } => sentinel.to_string(),
        }
    }
}

/// A proprietor / partner / director listed on a GST certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorRecord {
    pub name: String,
    pub designation: String,
    pub state_of_residence: String,
}

/// One credit facility line from a bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditFacility {
    /// Facility name as written in the statement ("Cash Credit", "Term Loan", "LC/BG").
    #[serde(rename = "type")]
    pub facility: String,
    /// Amount as written, e.g. `5,00,000.00`.
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UdyamFields {
    pub udyam_number: Option<String>,
    pub enterprise_name: Option<String>,
    pub classification: Option<String>,
    pub date_of_classification: Option<String>,
    pub major_activity: Option<String>,
    pub social_category: Option<String>,
    pub address: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub date_of_incorporation: Option<String>,
    pub date_of_commencement: Option<String>,
    pub nic_2_digit: Option<String>,
    pub nic_4_digit: Option<String>,
    pub nic_5_digit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GstFields {
    pub gst_number: Option<String>,
    /// Derived from characters 3–12 of the GST number.
    pub pan: Option<String>,
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub constitution: Option<String>,
    pub address: Option<String>,
    pub date_of_liability: Option<String>,
    pub period_of_validity_from: Option<String>,
    /// `NA` when the registration is open-ended.
    pub period_of_validity_to: Option<String>,
    pub type_of_registration: Option<String>,
    pub date_of_issue: Option<String>,
    pub state: Option<String>,
    /// In discovery order.
    pub directors: Vec<DirectorRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanFields {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub pan: Option<Checked>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AadhaarFields {
    pub aadhaar: Option<Checked>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankFields {
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub branch_name: Option<String>,
    pub account_type: Option<String>,
    pub credit_facilities: Vec<CreditFacility>,
    pub security: Option<String>,
}

/// Output of one pattern extractor, tagged by document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedFields {
    Udyam(UdyamFields),
    Gst(GstFields),
    Pan(PanFields),
    Aadhaar(AadhaarFields),
    Bank(BankFields),
}

fn put(set: &mut ExtractedFieldSet, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        set.insert(key.to_string(), FieldValue::Text(v.clone()));
    }
}

fn put_checked(set: &mut ExtractedFieldSet, key: &str, value: &Option<Checked>, sentinel: &str) {
    if let Some(v) = value {
        set.insert(key.to_string(), FieldValue::Text(v.render(sentinel)));
    }
}

impl ExtractedFields {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ExtractedFields::Udyam(_) => DocumentType::UdyamCertificate,
            ExtractedFields::Gst(_) => DocumentType::GstCertificate,
            ExtractedFields::Pan(_) => DocumentType::PanCard,
            ExtractedFields::Aadhaar(_) => DocumentType::AadhaarCard,
            ExtractedFields::Bank(_) => DocumentType::BankStatement,
        }
    }

    /// GST director records; empty for every other document type.
    pub fn directors(&self) -> &[DirectorRecord] {
        match self {
            ExtractedFields::Gst(g) => &g.directors,
            _ => &[],
        }
    }

    /// Render under extractor-local key names. Validation failures appear as
    /// their sentinel strings. GST directors are not included; see
    /// [`ExtractedFields::directors`].
    pub fn to_field_set(&self) -> ExtractedFieldSet {
        let mut set = ExtractedFieldSet::new();
        match self {
            ExtractedFields::Udyam(u) => {
                put(&mut set, "udyam_number", &u.udyam_number);
                put(&mut set, "enterprise_name", &u.enterprise_name);
                put(&mut set, "classification", &u.classification);
                put(&mut set, "date_of_classification", &u.date_of_classification);
                put(&mut set, "major_activity", &u.major_activity);
                put(&mut set, "social_category", &u.social_category);
                put(&mut set, "address", &u.address);
                put(&mut set, "mobile", &u.mobile);
                put(&mut set, "email", &u.email);
                put(&mut set, "date_of_incorporation", &u.date_of_incorporation);
                put(&mut set, "date_of_commencement", &u.date_of_commencement);
                put(&mut set, "nic_2_digit", &u.nic_2_digit);
                put(&mut set, "nic_4_digit", &u.nic_4_digit);
                put(&mut set, "nic_5_digit", &u.nic_5_digit);
            }
            ExtractedFields::Gst(g) => {
                put(&mut set, "gst_number", &g.gst_number);
                put(&mut set, "pan", &g.pan);
                put(&mut set, "legal_name", &g.legal_name);
                put(&mut set, "trade_name", &g.trade_name);
                put(&mut set, "constitution", &g.constitution);
                put(&mut set, "address", &g.address);
                put(&mut set, "date_of_liability", &g.date_of_liability);
                put(&mut set, "period_of_validity_from", &g.period_of_validity_from);
                put(&mut set, "period_of_validity_to", &g.period_of_validity_to);
                put(&mut set, "type_of_registration", &g.type_of_registration);
                put(&mut set, "date_of_issue", &g.date_of_issue);
                put(&mut set, "state", &g.state);
            }
            ExtractedFields::Pan(p) => {
                put(&mut set, "name", &p.name);
                put(&mut set, "dob", &p.dob);
                put_checked(&mut set, "pan", &p.pan, INVALID_PAN);
            }
            ExtractedFields::Aadhaar(a) => {
                put_checked(&mut set, "aadhaar", &a.aadhaar, INVALID_AADHAAR);
                put(&mut set, "name", &a.name);
                put(&mut set, "address", &a.address);
                put(&mut set, "dob", &a.dob);
            }
            ExtractedFields::Bank(b) => {
                put(&mut set, "bank_name", &b.bank_name);
                put(&mut set, "account_number", &b.account_number);
                put(&mut set, "ifsc_code", &b.ifsc_code);
                put(&mut set, "branch_name", &b.branch_name);
                put(&mut set, "account_type", &b.account_type);
                if !b.credit_facilities.is_empty() {
                    set.insert(
                        "credit_facilities".to_string(),
                        FieldValue::Facilities(b.credit_facilities.clone()),
                    );
                }
                put(&mut set, "security", &b.security);
            }
        }
        set
    }
}
