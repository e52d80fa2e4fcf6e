//! Sequential invoice numbering.
//!
//! Numbers look like `LS-202401-001`: prefix, period, then the settings
//! counter zero-padded to three digits. Counters past 999 widen instead of
//! truncating.

use crate::invoice::error::InvoiceError;
use crate::invoice::types::InvoiceStatus;
use crate::period::BillingPeriod;

/// Prefix used when the settings row carries an empty one.
pub const DEFAULT_INVOICE_PREFIX: &str = "LS";

/// Formats `"{prefix}-{year:04}{month:02}-{seq:03}"`.
#[must_use]
pub fn format_invoice_number(prefix: &str, period: BillingPeriod, seq: i32) -> String {
    format!("{prefix}-{:04}{:02}-{seq:03}", period.year(), period.month())
}

/// Outcome of inspecting an invoice before issuing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueDecision {
    /// Already numbered; return the number without touching the counter.
    AlreadyIssued(String),
    /// Draft; a number must be assigned.
    Assign,
}

/// A freshly assigned number and the counter value to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberAssignment {
    /// The invoice number.
    pub number: String,
    /// New value of the settings counter.
    pub next_seq: i32,
}

/// Stateless numbering rules.
pub struct NumberingService;

impl NumberingService {
    /// Decides whether an invoice needs a number.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::MissingNumber` for a non-draft invoice that was
    /// never numbered.
    pub fn decide(
        status: InvoiceStatus,
        number: Option<&str>,
    ) -> Result<IssueDecision, InvoiceError> {
        if status == InvoiceStatus::Draft {
            return Ok(IssueDecision::Assign);
        }
        match number.filter(|n| !n.is_empty()) {
            Some(existing) => Ok(IssueDecision::AlreadyIssued(existing.to_string())),
            None => Err(InvoiceError::MissingNumber(status)),
        }
    }

    /// Assigns the number for `current_seq` and computes the next counter value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSequence` for a counter below 1 and `SequenceExhausted`
    /// if it cannot be incremented.
    pub fn assign(
        prefix: &str,
        current_seq: i32,
        period: BillingPeriod,
    ) -> Result<NumberAssignment, InvoiceError> {
        if current_seq < 1 {
            return Err(InvoiceError::InvalidSequence(current_seq));
        }
        let next_seq = current_seq
            .checked_add(1)
            .ok_or(InvoiceError::SequenceExhausted(current_seq))?;
        let prefix = if prefix.trim().is_empty() { DEFAULT_INVOICE_PREFIX } else { prefix };
        Ok(NumberAssignment { number: format_invoice_number(prefix, period, current_seq), next_seq })
    }
}
