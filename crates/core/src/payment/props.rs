//! Property-based tests for payment reconciliation.

use classbill_shared::types::{Money, StudentId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconciliation::Reconciler;
use super::types::StudentBalance;
use crate::invoice::InvoiceStatus;

fn cents() -> impl Strategy<Value = Money> {
    (0i64..10_000_000).prop_map(|c| Money::new(Decimal::new(c, 2)))
}

proptest! {
    /// After recomputation an issued/paid invoice is paid iff payments cover the total.
    #[test]
    fn prop_status_tracks_coverage(total in cents(), paid in cents(), start_paid in any::<bool>()) {
        let current = if start_paid { InvoiceStatus::Paid } else { InvoiceStatus::Issued };
        let next = Reconciler::recompute_status(current, total, paid).unwrap_or(current);
        prop_assert_eq!(next == InvoiceStatus::Paid, paid >= total);
    }

    /// One cent short never pays an invoice.
    #[test]
    fn prop_one_cent_short_stays_issued(total in cents()) {
        prop_assume!(total.is_positive());
        let short = total - Money::new(Decimal::new(1, 2));
        prop_assert_eq!(Reconciler::recompute_status(InvoiceStatus::Issued, total, short), None);
        prop_assert_eq!(
            Reconciler::recompute_status(InvoiceStatus::Issued, total, total),
            Some(InvoiceStatus::Paid)
        );
    }

    /// balance + debt identities hold for any totals.
    #[test]
    fn prop_balance_identities(invoiced in cents(), paid in cents()) {
        let b = StudentBalance::from_totals(StudentId::new(1), String::new(), invoiced, paid);
        prop_assert_eq!(b.balance.amount(), paid.amount() - invoiced.amount());
        prop_assert!(!b.debt.is_negative());
        prop_assert_eq!(b.is_debtor(), invoiced > paid);
    }
}
