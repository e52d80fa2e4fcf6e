//! Shared types, errors, and configuration for Classbill.
//!
//! This crate provides common types used across all other crates:
//! - Money with deterministic 2-decimal rounding
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
