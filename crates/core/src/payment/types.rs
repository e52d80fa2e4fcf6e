//! Payment domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use classbill_shared::types::{InvoiceId, Money, StudentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceStatus;
use crate::payment::error::ReconciliationError;

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the desk.
    Cash,
    /// Bank transfer.
    Bank,
}

impl PaymentMethod {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "bank" => Ok(Self::Bank),
            other => Err(ReconciliationError::InvalidMethod(other.to_string())),
        }
    }
}

/// Parses `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns `ReconciliationError::InvalidPaidAt` if neither format matches.
pub fn parse_paid_at(raw: &str) -> Result<DateTime<Utc>, ReconciliationError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ReconciliationError::InvalidPaidAt(raw.to_string()))
}

/// Raw payment input as received from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    /// Paying student.
    pub student_id: StudentId,
    /// Invoice to link, if any.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    /// Amount paid.
    pub amount: Decimal,
    /// `cash` or `bank`.
    pub method: String,
    /// `YYYY-MM-DD` or RFC 3339.
    pub paid_at: String,
    /// Free-form note.
    #[serde(default)]
    pub note: String,
}

impl PaymentRequest {
    /// Validates the input fields.
    ///
    /// # Errors
    ///
    /// Returns a `ReconciliationError` for a non-positive student id or
    /// amount, an unknown method, or an unparseable date.
    pub fn validate(self) -> Result<NewPayment, ReconciliationError> {
        if self.student_id.into_inner() <= 0 {
            return Err(ReconciliationError::InvalidStudent(self.student_id));
        }
        let amount = Money::new(self.amount);
        if !amount.is_positive() {
            return Err(ReconciliationError::NonPositiveAmount(self.amount));
        }
        let method = self.method.parse()?;
        let paid_at = parse_paid_at(&self.paid_at)?;
        Ok(NewPayment {
            student_id: self.student_id,
            invoice_id: self.invoice_id,
            amount,
            method,
            paid_at,
            note: self.note,
        })
    }
}

/// A validated payment ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    /// Paying student.
    pub student_id: StudentId,
    /// Linked invoice, if any.
    pub invoice_id: Option<InvoiceId>,
    /// Amount rounded to cents.
    pub amount: Money,
    /// Payment method.
    pub method: PaymentMethod,
    /// When the money was received.
    pub paid_at: DateTime<Utc>,
    /// Free-form note.
    pub note: String,
}

/// What a student was invoiced versus what they paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentBalance {
    /// Student.
    pub student_id: StudentId,
    /// Student's full name.
    pub student_name: String,
    /// Sum of issued and paid invoice totals.
    pub total_invoiced: Money,
    /// Sum of all payments, linked or not.
    pub total_paid: Money,
    /// `total_paid - total_invoiced`.
    pub balance: Money,
    /// `max(0, -balance)`.
    pub debt: Money,
}

impl StudentBalance {
    /// Derives balance and debt from the two totals.
    #[must_use]
    pub fn from_totals(
        student_id: StudentId,
        student_name: String,
        total_invoiced: Money,
        total_paid: Money,
    ) -> Self {
        let balance = total_paid - total_invoiced;
        Self {
            student_id,
            student_name,
            total_invoiced,
            total_paid,
            balance,
            debt: (-balance).non_negative(),
        }
    }

    /// Returns true if the student owes money.
    #[must_use]
    pub fn is_debtor(&self) -> bool {
        self.debt.is_positive()
    }
}

/// A student who owes money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtorSummary {
    /// Student.
    pub student_id: StudentId,
    /// Student's full name.
    pub student_name: String,
    /// Amount owed.
    pub debt: Money,
    /// Sum of issued and paid invoice totals.
    pub total_invoiced: Money,
    /// Sum of all payments.
    pub total_paid: Money,
}

impl From<StudentBalance> for DebtorSummary {
    fn from(balance: StudentBalance) -> Self {
        Self {
            student_id: balance.student_id,
            student_name: balance.student_name,
            debt: balance.debt,
            total_invoiced: balance.total_invoiced,
            total_paid: balance.total_paid,
        }
    }
}

/// Payment position of a single invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    /// Invoice.
    pub invoice_id: InvoiceId,
    /// Invoice total.
    pub total: Money,
    /// Sum of linked payments.
    pub paid: Money,
    /// `max(0, total - paid)`.
    pub remaining: Money,
    /// Current status.
    pub status: InvoiceStatus,
    /// Invoice number, once issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl InvoiceSummary {
    /// Builds a summary from the invoice's total and the linked payment sum.
    #[must_use]
    pub fn new(
        invoice_id: InvoiceId,
        total: Money,
        paid: Money,
        status: InvoiceStatus,
        number: Option<String>,
    ) -> Self {
        Self { invoice_id, total, paid, remaining: (total - paid).non_negative(), status, number }
    }
}
