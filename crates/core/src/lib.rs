//! Core billing logic for Classbill.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! It turns attendance and enrollment facts into invoice drafts, numbers them,
//! and reconciles payments against them.
//!
//! # Modules
//!
//! - `period` - Billing period (year, month) bounds
//! - `pricing` - Effective price resolution with discounts and overrides
//! - `invoice` - Invoice status, draft line building, and sequential numbering
//! - `payment` - Payment validation, invoice status recomputation, balances
//! - `render` - Invoice documents and the renderer seam

pub mod invoice;
pub mod payment;
pub mod period;
pub mod pricing;
pub mod render;

pub use period::{BillingPeriod, PeriodError};
