//! Payment, balance and debtor routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use classbill_core::payment::PaymentRequest;
use classbill_shared::types::{PaymentId, StudentId};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/quick-cash", post(quick_cash))
        .route("/payments/{id}", delete(delete_payment))
        .route("/students/{id}/payments", get(list_student_payments))
        .route("/students/{id}/balance", get(student_balance))
        .route("/debtors", get(list_debtors))
}

/// Request body for a quick cash payment.
#[derive(Debug, Deserialize)]
pub struct QuickCashRequest {
    /// Paying student.
    pub student_id: StudentId,
    /// Amount received.
    pub amount: Decimal,
    /// Optional note.
    #[serde(default)]
    pub note: String,
}

/// POST `/payments` - Record a payment, optionally linked to an invoice.
async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> Response {
    match state.payments.create_payment(payload).await {
        Ok(payment) => (StatusCode::CREATED, Json(json!(payment))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/payments/quick-cash` - Record an unlinked cash payment dated today.
async fn quick_cash(
    State(state): State<AppState>,
    Json(payload): Json<QuickCashRequest>,
) -> Response {
    match state
        .payments
        .quick_cash(payload.student_id, payload.amount, payload.note)
        .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(json!(payment))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE `/payments/{id}` - Delete a payment and recompute its invoice.
async fn delete_payment(State(state): State<AppState>, Path(id): Path<PaymentId>) -> Response {
    match state.payments.delete_payment(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn list_student_payments(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Response {
    match state.payments.list_payments_for_student(id).await {
        Ok(payments) => (StatusCode::OK, Json(json!({ "payments": payments }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn student_balance(State(state): State<AppState>, Path(id): Path<StudentId>) -> Response {
    match state.payments.student_balance(id).await {
        Ok(balance) => (StatusCode::OK, Json(json!(balance))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/debtors` - Active students who owe money, largest debt first.
async fn list_debtors(State(state): State<AppState>) -> Response {
    match state.payments.list_debtors().await {
        Ok(debtors) => (StatusCode::OK, Json(json!({ "debtors": debtors }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
