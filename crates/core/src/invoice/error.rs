//! Invoice error types.

use thiserror::Error;

use crate::invoice::types::InvoiceStatus;

/// Errors that can occur while drafting or issuing invoices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    /// Operation requires a draft invoice.
    #[error("invoice is not draft (status {0})")]
    NotDraft(InvoiceStatus),

    /// Invoice has left draft without ever receiving a number.
    #[error("invoice is {0} but has no number")]
    MissingNumber(InvoiceStatus),

    /// The settings counter cannot be advanced any further.
    #[error("invoice sequence exhausted at {0}")]
    SequenceExhausted(i32),

    /// The settings counter holds a value below 1.
    #[error("invalid invoice sequence value {0}")]
    InvalidSequence(i32),

    /// Unrecognised status string.
    #[error("unknown invoice status: {0}")]
    UnknownStatus(String),

    /// Unrecognised billing mode string.
    #[error("unknown billing mode: {0}")]
    UnknownBillingMode(String),
}
