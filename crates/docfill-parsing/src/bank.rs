//! Bank statements and sanction summaries.

use docfill_core::{BankFields, CreditFacility};

use crate::config::{LabelField, ParsingConfig};
use crate::identity::labelled_value;
use crate::text_processing::{flatten, for_search};

/// Every `<facility> : Rs. <amount>` pair in the text, in order.
///
/// The text is flattened first so a pair split across lines still matches.
pub fn credit_facilities(text: &str, config: &ParsingConfig) -> Vec<CreditFacility> {
    let flat = flatten(text);
    config
        .facility_regex()
        .captures_iter(&flat)
        .map(|caps| CreditFacility {
            facility: caps[1].to_string(),
            amount: caps[2].to_string(),
        })
        .collect()
}

pub fn extract(text: &str, config: &ParsingConfig) -> BankFields {
    let search = for_search(text);

    let field = |name: &'static str, label: LabelField| {
        let value = labelled_value(&search, label, config);
        if value.is_none() {
            tracing::warn!(field = name, "could not extract field from bank statement");
        }
        value
    };

    let mut fields = BankFields {
        bank_name: field("bank_name", LabelField::BankName),
        account_number: field("account_number", LabelField::AccountNumber),
        ifsc_code: field("ifsc_code", LabelField::IfscCode),
        branch_name: field("branch_name", LabelField::BranchName),
        account_type: field("account_type", LabelField::AccountType),
        ..Default::default()
    };

    fields.credit_facilities = credit_facilities(text, config);
    if fields.credit_facilities.is_empty() {
        tracing::warn!(field = "credit_facilities", "could not extract field from bank statement");
    }

    fields.security = field("security", LabelField::Security);

    fields
}
