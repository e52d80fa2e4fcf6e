//! Invoice status recomputation from linked payments.

use classbill_shared::types::{InvoiceId, Money, PAID_TOLERANCE, StudentId};

use crate::invoice::InvoiceStatus;
use crate::payment::error::ReconciliationError;
use crate::payment::types::{DebtorSummary, StudentBalance};

/// Stateless reconciliation rules.
pub struct Reconciler;

impl Reconciler {
    /// Computes the status an invoice should move to given its linked payments.
    ///
    /// Returns `None` when the status stays as it is. Draft and canceled
    /// invoices are never touched.
    #[must_use]
    pub fn recompute_status(
        current: InvoiceStatus,
        total: Money,
        paid: Money,
    ) -> Option<InvoiceStatus> {
        match current {
            InvoiceStatus::Draft | InvoiceStatus::Canceled => None,
            InvoiceStatus::Issued | InvoiceStatus::Paid => {
                let covered = paid.amount() + PAID_TOLERANCE >= total.amount();
                match (current, covered) {
                    (InvoiceStatus::Issued, true) => Some(InvoiceStatus::Paid),
                    (InvoiceStatus::Paid, false) => Some(InvoiceStatus::Issued),
                    _ => None,
                }
            }
        }
    }

    /// Checks that a payment from `student_id` may be linked to the invoice.
    ///
    /// # Errors
    ///
    /// - `ForeignInvoice` if the invoice belongs to another student
    /// - `InvoiceNotPayable` if the invoice is draft or canceled
    pub fn ensure_attachable(
        invoice_id: InvoiceId,
        invoice_student: StudentId,
        status: InvoiceStatus,
        student_id: StudentId,
    ) -> Result<(), ReconciliationError> {
        if invoice_student != student_id {
            return Err(ReconciliationError::ForeignInvoice { invoice_id, student_id });
        }
        if !status.accepts_payments() {
            return Err(ReconciliationError::InvoiceNotPayable(status));
        }
        Ok(())
    }

    /// Keeps students with positive debt, largest debt first.
    ///
    /// Equal debts are ordered by student id.
    #[must_use]
    pub fn rank_debtors(balances: Vec<StudentBalance>) -> Vec<DebtorSummary> {
        let mut debtors: Vec<DebtorSummary> = balances
            .into_iter()
            .filter(StudentBalance::is_debtor)
            .map(DebtorSummary::from)
            .collect();
        debtors.sort_by(|a, b| b.debt.cmp(&a.debt).then(a.student_id.cmp(&b.student_id)));
        debtors
    }
}
