//! Effective price resolution for enrollments.
//!
//! # Modules
//!
//! - `types` - Course prices, override windows, resolved prices
//! - `error` - Pricing validation errors
//! - `resolver` - Discount application and override selection
//! - `validation` - Write-time checks for discounts and override windows

pub mod error;
pub mod resolver;
pub mod types;
pub mod validation;

#[cfg(test)]
mod props;

pub use error::PricingError;
pub use resolver::PriceResolver;
pub use types::{CoursePrices, OverrideWindow, PriceOverrideInput, ResolvedPrices};
pub use validation::{validate_discount_pct, validate_override, validate_prices, windows_overlap};
