//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod invoices;
pub mod payments;
pub mod pricing;

#[cfg(test)]
pub(crate) mod test_support;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(pricing::routes())
}
