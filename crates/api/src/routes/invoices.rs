//! Invoice drafting, issuing and document routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use classbill_core::BillingPeriod;
use classbill_core::invoice::StatusFilter;
use classbill_db::BillingError;
use classbill_shared::types::InvoiceId;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices/drafts", post(generate_drafts))
        .route("/invoices/issue", post(issue_all))
        .route("/invoices/{id}", get(get_invoice).delete(delete_draft))
        .route("/invoices/{id}/issue", post(issue_one))
        .route("/invoices/{id}/document", get(ensure_document))
        .route("/invoices/{id}/summary", get(invoice_summary))
}

/// Request body naming a billing period.
#[derive(Debug, Deserialize)]
pub struct PeriodRequest {
    /// Calendar year.
    pub year: i32,
    /// Month 1..=12.
    pub month: u32,
}

impl PeriodRequest {
    fn period(&self) -> Result<BillingPeriod, ApiError> {
        BillingPeriod::new(self.year, self.month).map_err(|e| BillingError::from(e).into())
    }
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Calendar year.
    pub year: i32,
    /// Month 1..=12.
    pub month: u32,
    /// `draft` (default), `issued`, `paid`, `canceled` or `all`.
    #[serde(default)]
    pub status: Option<String>,
}

/// POST `/invoices/drafts` - Build or refresh the drafts of a period.
async fn generate_drafts(
    State(state): State<AppState>,
    Json(payload): Json<PeriodRequest>,
) -> Response {
    let period = match payload.period() {
        Ok(period) => period,
        Err(e) => return e.into_response(),
    };

    match state.invoices.generate_drafts(period).await {
        Ok(result) => (StatusCode::OK, Json(json!(result))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/invoices?year&month&status` - List the invoices of a period.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Response {
    let period = match BillingPeriod::new(query.year, query.month) {
        Ok(period) => period,
        Err(e) => return ApiError::from(BillingError::from(e)).into_response(),
    };
    let filter = match query.status.as_deref().unwrap_or_default().parse::<StatusFilter>() {
        Ok(filter) => filter,
        Err(e) => return ApiError::from(BillingError::from(e)).into_response(),
    };

    match state.invoices.list_invoices(period, filter).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "invoices": items }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/invoices/{id}` - Invoice with its lines.
async fn get_invoice(State(state): State<AppState>, Path(id): Path<InvoiceId>) -> Response {
    match state.invoices.get_invoice(id).await {
        Ok(detail) => (StatusCode::OK, Json(json!(detail))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE `/invoices/{id}` - Delete a draft.
async fn delete_draft(State(state): State<AppState>, Path(id): Path<InvoiceId>) -> Response {
    match state.invoices.delete_draft(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/invoices/{id}/issue` - Number a draft and render its document.
async fn issue_one(State(state): State<AppState>, Path(id): Path<InvoiceId>) -> Response {
    match state.invoices.issue_one(id).await {
        Ok(outcome) => {
            info!(invoice_id = %id, number = %outcome.number, "invoice issued via api");
            (StatusCode::OK, Json(json!(outcome))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/invoices/issue` - Issue every draft of a period.
///
/// A failure part-way returns the error status with the count and paths
/// produced before it.
async fn issue_all(
    State(state): State<AppState>,
    Json(payload): Json<PeriodRequest>,
) -> Response {
    let period = match payload.period() {
        Ok(period) => period,
        Err(e) => return e.into_response(),
    };

    match state.invoices.issue_all(period).await {
        Ok(result) => (StatusCode::OK, Json(json!(result))).into_response(),
        Err(e) => {
            warn!(period = %period, count = e.issued.count, error = %e.source, "issue run stopped");
            let api = ApiError::from(e.source);
            let mut body = api.body();
            body["count"] = json!(e.issued.count);
            body["paths"] = json!(e.issued.paths);
            (api.status(), Json(body)).into_response()
        }
    }
}

/// GET `/invoices/{id}/document` - Path of the invoice document, rendered if missing.
async fn ensure_document(State(state): State<AppState>, Path(id): Path<InvoiceId>) -> Response {
    match state.invoices.ensure_document(id).await {
        Ok(path) => (StatusCode::OK, Json(json!({ "path": path }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/invoices/{id}/summary` - Paid and remaining amounts.
async fn invoice_summary(State(state): State<AppState>, Path(id): Path<InvoiceId>) -> Response {
    match state.payments.invoice_summary(id).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
