//! Pricing domain types.

use chrono::NaiveDate;
use classbill_shared::types::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Base prices of a course before any enrollment discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoursePrices {
    /// Price of a single attended lesson.
    pub lesson_price: Decimal,
    /// Monthly subscription price.
    pub subscription_price: Decimal,
}

/// A stored time-bounded price override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideWindow {
    /// First day the override applies.
    pub valid_from: NaiveDate,
    /// Last day the override applies; `None` is open-ended.
    pub valid_to: Option<NaiveDate>,
    /// Replacement lesson price.
    pub lesson_price: Option<Decimal>,
    /// Replacement subscription price.
    pub subscription_price: Option<Decimal>,
}

impl OverrideWindow {
    /// Returns true if the window intersects `[start, end]`.
    #[must_use]
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.valid_from <= end && self.valid_to.is_none_or(|to| to >= start)
    }
}

/// Input for creating a new price override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceOverrideInput {
    /// First day the override applies.
    pub valid_from: NaiveDate,
    /// Last day the override applies; omitted means open-ended.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Replacement lesson price.
    #[serde(default)]
    pub lesson_price: Option<Decimal>,
    /// Replacement subscription price.
    #[serde(default)]
    pub subscription_price: Option<Decimal>,
}

impl From<&PriceOverrideInput> for OverrideWindow {
    fn from(input: &PriceOverrideInput) -> Self {
        Self {
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            lesson_price: input.lesson_price,
            subscription_price: input.subscription_price,
        }
    }
}

/// Effective prices of an enrollment for one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPrices {
    /// Effective lesson price.
    pub lesson_price: Money,
    /// Effective subscription price.
    pub subscription_price: Money,
}
