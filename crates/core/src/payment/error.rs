//! Reconciliation error types.

use classbill_shared::types::{InvoiceId, StudentId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors raised while validating or attaching payments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// Amount is zero or negative (after rounding to cents).
    #[error("amount must be > 0, got {0}")]
    NonPositiveAmount(Decimal),

    /// Unknown payment method.
    #[error("method must be 'cash' or 'bank', got '{0}'")]
    InvalidMethod(String),

    /// `paid_at` is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid paid_at '{0}', expected YYYY-MM-DD or RFC 3339")]
    InvalidPaidAt(String),

    /// Student id is not positive.
    #[error("student id must be > 0, got {0}")]
    InvalidStudent(StudentId),

    /// Linked invoice is billed to another student.
    #[error("invoice {invoice_id} does not belong to student {student_id}")]
    ForeignInvoice {
        /// The invoice.
        invoice_id: InvoiceId,
        /// The paying student.
        student_id: StudentId,
    },

    /// Linked invoice is draft or canceled.
    #[error("cannot attach payment to a {0} invoice")]
    InvoiceNotPayable(InvoiceStatus),
}

impl ReconciliationError {
    /// Returns true for errors caused by the state of a stored invoice.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ForeignInvoice { .. } | Self::InvoiceNotPayable(_))
    }
}
