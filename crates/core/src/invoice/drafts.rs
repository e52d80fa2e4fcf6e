//! Draft invoice building.
//!
//! A draft is a pure function of the current attendance and price state:
//! building it twice from the same facts yields identical lines and total.

use classbill_shared::types::{CourseId, EnrollmentId, InvoiceId, Money};
use serde::Serialize;

use crate::invoice::types::{BillingMode, InvoiceStatus};
use crate::period::BillingPeriod;
use crate::pricing::ResolvedPrices;

/// Everything needed to bill one enrollment for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentCharge {
    /// Enrollment being billed.
    pub enrollment_id: EnrollmentId,
    /// Course of the enrollment.
    pub course_id: CourseId,
    /// How the enrollment is charged.
    pub billing_mode: BillingMode,
    /// Prices resolved for the period.
    pub prices: ResolvedPrices,
    /// Attended lessons in the period; `None` when no attendance was recorded.
    pub lessons_attended: Option<i32>,
}

/// A computed invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftLine {
    /// Enrollment the line bills.
    pub enrollment_id: EnrollmentId,
    /// Human-readable description.
    pub description: String,
    /// Quantity.
    pub qty: i32,
    /// Unit price.
    pub unit_price: Money,
    /// `round2(qty * unit_price)`.
    pub amount: Money,
}

/// Lines and total of a draft invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftInvoice {
    /// Lines in enrollment order.
    pub lines: Vec<DraftLine>,
    /// Sum of line amounts.
    pub total: Money,
}

/// What draft generation does with a student's invoice for the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    /// No invoice exists; create a draft.
    Create,
    /// A draft exists; replace its lines and total.
    Rebuild(InvoiceId),
    /// A non-draft invoice exists; leave it alone.
    Skip(InvoiceId, InvoiceStatus),
}

/// Counters reported by a draft generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerateResult {
    /// Drafts created.
    pub created: u32,
    /// Drafts rebuilt in place.
    pub updated: u32,
    /// Students whose invoice had already left draft.
    pub skipped_has_invoice: u32,
    /// Students with enrollments but nothing billable.
    pub skipped_no_lines: u32,
}

impl GenerateResult {
    /// Counts the outcome of one student's action.
    pub fn record(&mut self, action: DraftAction) {
        match action {
            DraftAction::Create => self.created += 1,
            DraftAction::Rebuild(_) => self.updated += 1,
            DraftAction::Skip(..) => self.skipped_has_invoice += 1,
        }
    }
}

/// Stateless draft builder.
pub struct DraftBuilder;

impl DraftBuilder {
    /// Builds the line for one enrollment.
    ///
    /// Per-lesson enrollments always produce a line, with quantity 0 when no
    /// attendance exists. Subscriptions without a positive price produce none.
    #[must_use]
    pub fn line_for(charge: &EnrollmentCharge, period: BillingPeriod) -> Option<DraftLine> {
        let (description, qty, unit_price) = match charge.billing_mode {
            BillingMode::PerLesson => (
                format!(
                    "Payment for lessons ({:02}.{}), course #{}",
                    period.month(),
                    period.year(),
                    charge.course_id
                ),
                charge.lessons_attended.unwrap_or(0),
                charge.prices.lesson_price,
            ),
            BillingMode::Subscription => {
                if !charge.prices.subscription_price.is_positive() {
                    return None;
                }
                (
                    format!(
                        "Subscription ({:02}.{}), course #{}",
                        period.month(),
                        period.year(),
                        charge.course_id
                    ),
                    1,
                    charge.prices.subscription_price,
                )
            }
        };

        Some(DraftLine {
            enrollment_id: charge.enrollment_id,
            description,
            qty,
            unit_price,
            amount: Money::line_amount(qty, unit_price.amount()),
        })
    }

    /// Builds the draft for a student, or `None` when nothing is billable.
    #[must_use]
    pub fn build(charges: &[EnrollmentCharge], period: BillingPeriod) -> Option<DraftInvoice> {
        let lines: Vec<DraftLine> =
            charges.iter().filter_map(|c| Self::line_for(c, period)).collect();
        if lines.is_empty() {
            return None;
        }
        let total = lines.iter().map(|l| l.amount).sum();
        Some(DraftInvoice { lines, total })
    }

    /// Decides the action from the existing invoice for (student, period), if any.
    #[must_use]
    pub fn decide(existing: Option<(InvoiceId, InvoiceStatus)>) -> DraftAction {
        match existing {
            None => DraftAction::Create,
            Some((id, InvoiceStatus::Draft)) => DraftAction::Rebuild(id),
            Some((id, status)) => DraftAction::Skip(id, status),
        }
    }
}
