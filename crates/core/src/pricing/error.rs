//! Pricing error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when validating prices, discounts and overrides.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Discount percentage outside 0..=100.
    #[error("discount {0}% is out of range, expected 0..=100")]
    DiscountOutOfRange(Decimal),

    /// A price is negative.
    #[error("{field} must not be negative, got {value}")]
    NegativePrice {
        /// Which price was rejected.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// Override window ends before it starts.
    #[error("override window ends ({valid_to}) before it starts ({valid_from})")]
    InvertedWindow {
        /// Window start.
        valid_from: NaiveDate,
        /// Window end.
        valid_to: NaiveDate,
    },

    /// Override sets neither price.
    #[error("override must set a lesson price or a subscription price")]
    EmptyOverride,

    /// Override window intersects an existing override on the same enrollment.
    #[error("override window overlaps an existing override starting {existing_from}")]
    OverlappingWindow {
        /// Start of the conflicting override.
        existing_from: NaiveDate,
    },
}

impl PricingError {
    /// Returns true for errors caused by conflicting stored state rather than bad input.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::OverlappingWindow { .. })
    }
}
