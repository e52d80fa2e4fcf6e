//! Payment reconciliation for Classbill.
//!
//! # Modules
//!
//! - `types` - Payment method, validated payment input, balances and summaries
//! - `error` - Reconciliation error types
//! - `reconciliation` - Invoice status recomputation and debtor ranking

pub mod error;
pub mod reconciliation;
pub mod types;

#[cfg(test)]
mod props;

pub use error::ReconciliationError;
pub use reconciliation::Reconciler;
pub use types::{
    DebtorSummary, InvoiceSummary, NewPayment, PaymentMethod, PaymentRequest, StudentBalance,
    parse_paid_at,
};
