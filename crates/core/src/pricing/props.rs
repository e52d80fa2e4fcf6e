//! Property-based tests for price resolution.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::resolver::PriceResolver;
use super::types::{CoursePrices, OverrideWindow};
use super::validation::{validate_override, windows_overlap};
use super::PriceOverrideInput;
use crate::period::BillingPeriod;

fn price() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn discount() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|bp| Decimal::new(bp, 2))
}

fn day_offset() -> impl Strategy<Value = i64> {
    0i64..1_500
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

fn window(from: i64, len: Option<i64>) -> OverrideWindow {
    let start = base_date() + chrono::Duration::days(from);
    OverrideWindow {
        valid_from: start,
        valid_to: len.map(|l| start + chrono::Duration::days(l)),
        lesson_price: Some(Decimal::ONE),
        subscription_price: None,
    }
}

proptest! {
    /// Resolved prices never exceed base prices and are always held at 2 places.
    #[test]
    fn prop_discount_never_increases_price(lesson in price(), sub in price(), pct in discount()) {
        let period = BillingPeriod::new(2024, 1).unwrap();
        let resolved = PriceResolver::resolve(
            CoursePrices { lesson_price: lesson, subscription_price: sub },
            pct,
            &[],
            period,
        );
        prop_assert!(resolved.lesson_price.amount() <= lesson);
        prop_assert!(resolved.subscription_price.amount() <= sub);
        prop_assert!(resolved.lesson_price.amount() >= Decimal::ZERO);
        prop_assert_eq!(resolved.lesson_price.amount().scale(), 2);
    }

    /// Overlap is symmetric.
    #[test]
    fn prop_overlap_symmetric(
        a in day_offset(), a_len in proptest::option::of(0i64..400),
        b in day_offset(), b_len in proptest::option::of(0i64..400),
    ) {
        let (x, y) = (window(a, a_len), window(b, b_len));
        prop_assert_eq!(
            windows_overlap(x.valid_from, x.valid_to, y.valid_from, y.valid_to),
            windows_overlap(y.valid_from, y.valid_to, x.valid_from, x.valid_to)
        );
    }

    /// Once overlaps are rejected at write time, no day is covered by two overrides.
    #[test]
    fn prop_validated_windows_are_disjoint(
        specs in proptest::collection::vec((day_offset(), proptest::option::of(0i64..200)), 1..8),
        probe in day_offset(),
    ) {
        let mut accepted: Vec<OverrideWindow> = Vec::new();
        for (from, len) in specs {
            let candidate = window(from, len);
            let input = PriceOverrideInput {
                valid_from: candidate.valid_from,
                valid_to: candidate.valid_to,
                lesson_price: candidate.lesson_price,
                subscription_price: None,
            };
            if validate_override(&input, &accepted).is_ok() {
                accepted.push(candidate);
            }
        }
        let day = base_date() + chrono::Duration::days(probe);
        let covering = accepted.iter().filter(|o| o.intersects(day, day)).count();
        prop_assert!(covering <= 1);
    }
}
