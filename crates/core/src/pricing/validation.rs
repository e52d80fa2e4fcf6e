//! Write-time validation for discounts, prices and override windows.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::pricing::error::PricingError;
use crate::pricing::types::{OverrideWindow, PriceOverrideInput};

/// Checks that a discount percentage lies in 0..=100.
///
/// # Errors
///
/// Returns `PricingError::DiscountOutOfRange` otherwise.
pub fn validate_discount_pct(discount_pct: Decimal) -> Result<(), PricingError> {
    if discount_pct < Decimal::ZERO || discount_pct > Decimal::ONE_HUNDRED {
        return Err(PricingError::DiscountOutOfRange(discount_pct));
    }
    Ok(())
}

/// Checks that the given prices are non-negative.
///
/// # Errors
///
/// Returns `PricingError::NegativePrice` naming the first offending field.
pub fn validate_prices(
    lesson_price: Option<Decimal>,
    subscription_price: Option<Decimal>,
) -> Result<(), PricingError> {
    for (field, value) in [("lesson_price", lesson_price), ("subscription_price", subscription_price)] {
        if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
            return Err(PricingError::NegativePrice { field, value });
        }
    }
    Ok(())
}

/// Two windows overlap if `a_start <= b_end AND a_end >= b_start`,
/// where a missing end extends forever.
#[must_use]
pub fn windows_overlap(
    a_start: NaiveDate,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: Option<NaiveDate>,
) -> bool {
    b_end.is_none_or(|end| a_start <= end) && a_end.is_none_or(|end| end >= b_start)
}

/// Validates a new override against its own fields and the enrollment's
/// existing overrides.
///
/// # Errors
///
/// - `InvertedWindow` if `valid_to < valid_from`
/// - `EmptyOverride` if neither price is set
/// - `NegativePrice` if a price is negative
/// - `OverlappingWindow` if the window intersects an existing override
pub fn validate_override(
    input: &PriceOverrideInput,
    existing: &[OverrideWindow],
) -> Result<(), PricingError> {
    if let Some(valid_to) = input.valid_to
        && valid_to < input.valid_from
    {
        return Err(PricingError::InvertedWindow { valid_from: input.valid_from, valid_to });
    }
    if input.lesson_price.is_none() && input.subscription_price.is_none() {
        return Err(PricingError::EmptyOverride);
    }
    validate_prices(input.lesson_price, input.subscription_price)?;

    if let Some(conflict) = existing.iter().find(|o| {
        windows_overlap(input.valid_from, input.valid_to, o.valid_from, o.valid_to)
    }) {
        return Err(PricingError::OverlappingWindow { existing_from: conflict.valid_from });
    }
    Ok(())
}
