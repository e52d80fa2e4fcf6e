//! Invoice lifecycle for Classbill.
//!
//! This module builds draft invoice lines from enrollment facts and
//! implements the draft -> issued numbering state machine.
//!
//! # Modules
//!
//! - `types` - Invoice status, billing mode and list filters
//! - `error` - Invoice-specific error types
//! - `drafts` - Line building and the create/rebuild/skip decision
//! - `numbering` - Invoice number formatting and issuance decisions

pub mod drafts;
pub mod error;
pub mod numbering;
pub mod types;

#[cfg(test)]
mod props;

pub use drafts::{DraftAction, DraftBuilder, DraftInvoice, DraftLine, EnrollmentCharge, GenerateResult};
pub use error::InvoiceError;
pub use numbering::{
    DEFAULT_INVOICE_PREFIX, IssueDecision, NumberAssignment, NumberingService,
    format_invoice_number,
};
pub use types::{BillingMode, InvoiceStatus, StatusFilter};
