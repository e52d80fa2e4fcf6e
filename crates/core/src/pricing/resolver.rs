//! Price resolution: discount first, then the winning override.

use classbill_shared::types::Money;
use rust_decimal::Decimal;

use crate::period::BillingPeriod;
use crate::pricing::types::{CoursePrices, OverrideWindow, ResolvedPrices};

/// Stateless price resolver.
pub struct PriceResolver;

impl PriceResolver {
    /// Resolves the effective prices of an enrollment for a period.
    ///
    /// Both base prices are reduced by `discount_pct` and rounded independently.
    /// Then the override with the latest `valid_from` among those intersecting
    /// the period replaces whichever prices it sets.
    #[must_use]
    pub fn resolve(
        base: CoursePrices,
        discount_pct: Decimal,
        overrides: &[OverrideWindow],
        period: BillingPeriod,
    ) -> ResolvedPrices {
        let mut resolved = ResolvedPrices {
            lesson_price: Self::apply_discount(base.lesson_price, discount_pct),
            subscription_price: Self::apply_discount(base.subscription_price, discount_pct),
        };

        if let Some(winner) = Self::select_override(overrides, period) {
            if let Some(price) = winner.lesson_price {
                resolved.lesson_price = Money::new(price);
            }
            if let Some(price) = winner.subscription_price {
                resolved.subscription_price = Money::new(price);
            }
        }

        resolved
    }

    /// `round2(price * (1 - discount_pct / 100))`.
    #[must_use]
    pub fn apply_discount(price: Decimal, discount_pct: Decimal) -> Money {
        if discount_pct.is_zero() {
            return Money::new(price);
        }
        Money::new(price * (Decimal::ONE - discount_pct / Decimal::ONE_HUNDRED))
    }

    /// Picks the override that applies to the period, if any.
    ///
    /// Candidates start on or before the period end; among them the latest
    /// `valid_from` is tried first and the first one still open at the period
    /// start wins. Equal starts keep slice order.
    #[must_use]
    pub fn select_override(
        overrides: &[OverrideWindow],
        period: BillingPeriod,
    ) -> Option<&OverrideWindow> {
        let (start, end) = (period.start(), period.end());
        let mut candidates: Vec<&OverrideWindow> =
            overrides.iter().filter(|o| o.valid_from <= end).collect();
        candidates.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        candidates
            .into_iter()
            .find(|o| o.valid_to.is_none_or(|to| to >= start))
    }
}
