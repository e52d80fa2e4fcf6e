//! Invoice document model.

use chrono::NaiveDate;
use classbill_shared::types::{InvoiceId, Money};
use serde::Serialize;

use crate::period::BillingPeriod;

/// Organization details printed on every invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationInfo {
    /// Organization name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// ISO currency code.
    pub currency: String,
    /// Locale tag.
    pub locale: String,
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    /// Description.
    pub description: String,
    /// Quantity.
    pub qty: i32,
    /// Unit price.
    pub unit_price: Money,
    /// Line amount.
    pub amount: Money,
}

/// Everything a renderer needs to produce an invoice document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDocument {
    /// Invoice id.
    pub invoice_id: InvoiceId,
    /// Invoice number; rendering requires one.
    pub number: Option<String>,
    /// Billing period.
    pub period: BillingPeriod,
    /// Billed student's name.
    pub student_name: String,
    /// Invoice total.
    pub total: Money,
    /// Lines.
    pub lines: Vec<DocumentLine>,
    /// Issuing organization.
    pub organization: OrganizationInfo,
    /// Date printed on the document.
    pub issued_on: NaiveDate,
}

/// Storage key of an invoice document: `YYYY/MM/<number>.txt`.
///
/// The number is sanitised to ASCII alphanumerics, dots, hyphens, and
/// underscores so it cannot escape the period directory.
#[must_use]
pub fn document_key(period: BillingPeriod, number: &str) -> String {
    format!("{:04}/{:02}/{}.txt", period.year(), period.month(), sanitize_number(number))
}

fn sanitize_number(number: &str) -> String {
    number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
