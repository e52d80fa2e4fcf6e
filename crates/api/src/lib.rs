//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the billing pipeline
//! - Error-to-response mapping
//! - Request and response types

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use classbill_core::render::InvoiceRenderer;
use classbill_db::{InvoiceRepository, PaymentRepository, PricingRepository};
use classbill_shared::config::StudentSelection;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Draft generation, issuing and documents.
    pub invoices: InvoiceRepository,
    /// Payment recording and balances.
    pub payments: PaymentRepository,
    /// Price resolution and overrides.
    pub pricing: PricingRepository,
}

impl AppState {
    /// Builds the repositories over one connection pool.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        renderer: Arc<dyn InvoiceRenderer>,
        selection: StudentSelection,
    ) -> Self {
        Self {
            invoices: InvoiceRepository::new(db.clone(), renderer, selection),
            payments: PaymentRepository::new(db.clone()),
            pricing: PricingRepository::new(db.clone()),
            db: Arc::new(db),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
