//! Property-based tests for draft building and numbering.

use classbill_shared::types::{CourseId, EnrollmentId, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::drafts::{DraftBuilder, EnrollmentCharge};
use super::numbering::NumberingService;
use super::types::BillingMode;
use crate::period::BillingPeriod;
use crate::pricing::ResolvedPrices;

fn charge_strategy() -> impl Strategy<Value = (bool, i64, i64, Option<i32>)> {
    (any::<bool>(), 0i64..100_000, 0i64..100_000, proptest::option::of(0i32..40))
}

fn to_charge(idx: usize, (per_lesson, lesson, sub, qty): (bool, i64, i64, Option<i32>)) -> EnrollmentCharge {
    let id = i32::try_from(idx).unwrap() + 1;
    EnrollmentCharge {
        enrollment_id: EnrollmentId::new(id),
        course_id: CourseId::new(id),
        billing_mode: if per_lesson { BillingMode::PerLesson } else { BillingMode::Subscription },
        prices: ResolvedPrices {
            lesson_price: Money::new(Decimal::new(lesson, 2)),
            subscription_price: Money::new(Decimal::new(sub, 2)),
        },
        lessons_attended: qty,
    }
}

proptest! {
    /// The stored total equals the independent sum of line amounts exactly.
    #[test]
    fn prop_total_equals_line_sum(specs in proptest::collection::vec(charge_strategy(), 1..8)) {
        let charges: Vec<_> = specs.into_iter().enumerate().map(|(i, s)| to_charge(i, s)).collect();
        let period = BillingPeriod::new(2024, 5).unwrap();
        if let Some(draft) = DraftBuilder::build(&charges, period) {
            let raw: Decimal = draft.lines.iter().map(|l| l.amount.amount()).sum();
            prop_assert_eq!(draft.total.amount(), raw);
            for line in &draft.lines {
                prop_assert_eq!(line.amount, Money::line_amount(line.qty, line.unit_price.amount()));
            }
        } else {
            prop_assert!(charges.iter().all(|c| c.billing_mode == BillingMode::Subscription
                && !c.prices.subscription_price.is_positive()));
        }
    }

    /// Rebuilding from unchanged facts is identical.
    #[test]
    fn prop_build_is_deterministic(specs in proptest::collection::vec(charge_strategy(), 1..8)) {
        let charges: Vec<_> = specs.into_iter().enumerate().map(|(i, s)| to_charge(i, s)).collect();
        let period = BillingPeriod::new(2024, 5).unwrap();
        prop_assert_eq!(DraftBuilder::build(&charges, period), DraftBuilder::build(&charges, period));
    }

    /// N sequential assignments yield consecutive, distinct numbers.
    #[test]
    fn prop_numbers_strictly_increase(start in 1i32..5_000, n in 1usize..50, month in 1u32..=12) {
        let period = BillingPeriod::new(2024, month).unwrap();
        let mut seq = start;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..n {
            let assigned = NumberingService::assign("LS", seq, period).unwrap();
            prop_assert_eq!(assigned.next_seq, seq + 1);
            prop_assert!(seen.insert(assigned.number.clone()));
            let tail: i32 = assigned.number.rsplit('-').next().unwrap().parse().unwrap();
            prop_assert_eq!(tail, seq);
            seq = assigned.next_seq;
        }
    }
}
