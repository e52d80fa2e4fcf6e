//! Invoice domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::invoice::error::InvoiceError;

/// Invoice status.
///
/// The valid transitions are:
/// - Draft → Issued (numbering, exactly once)
/// - Issued → Paid (payments cover the total)
/// - Paid → Issued (payments removed)
///
/// Canceled is terminal and set outside billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Freely regenerable, not numbered.
    Draft,
    /// Numbered and awaiting payment.
    Issued,
    /// Fully covered by linked payments.
    Paid,
    /// Withdrawn; never touched by billing.
    Canceled,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
        }
    }

    /// Returns true if payments may be linked to an invoice in this status.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        matches!(self, Self::Issued | Self::Paid)
    }

    /// Returns true if the invoice total counts towards a student's invoiced amount.
    #[must_use]
    pub const fn counts_as_invoiced(self) -> bool {
        matches!(self, Self::Issued | Self::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "issued" => Ok(Self::Issued),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            other => Err(InvoiceError::UnknownStatus(other.to_string())),
        }
    }
}

/// How an enrollment is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// Charged per attended lesson.
    PerLesson,
    /// Flat monthly fee.
    Subscription,
}

impl BillingMode {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerLesson => "per_lesson",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for BillingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingMode {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_lesson" => Ok(Self::PerLesson),
            "subscription" => Ok(Self::Subscription),
            other => Err(InvoiceError::UnknownBillingMode(other.to_string())),
        }
    }
}

/// Status filter for invoice listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Only invoices in the given status.
    Only(InvoiceStatus),
    /// Every status.
    All,
    /// Drafts only, the default listing.
    #[default]
    Drafts,
}

impl StatusFilter {
    /// The status to filter on, or `None` for all.
    #[must_use]
    pub const fn status(self) -> Option<InvoiceStatus> {
        match self {
            Self::Only(status) => Some(status),
            Self::Drafts => Some(InvoiceStatus::Draft),
            Self::All => None,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Drafts);
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}
