//! Mapping of repository errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use classbill_db::BillingError;
use classbill_shared::AppError;
use serde_json::json;
use tracing::error;

/// Error returned by handlers, rendered as `{ "error": CODE, "message": text }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status of the error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// JSON body of the error.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        let message = match &self.0 {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::Document(m) => m.clone(),
            AppError::Database(_) | AppError::Internal(_) => "An error occurred".to_string(),
        };
        json!({
            "error": self.0.error_code(),
            "message": message,
        })
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let app = match err {
            BillingError::Validation(m) => AppError::Validation(m),
            e @ BillingError::NotFound { .. } => AppError::NotFound(e.to_string()),
            BillingError::StateConflict(m) => AppError::Conflict(m),
            BillingError::Render(e) => AppError::Document(e.to_string()),
            BillingError::Database(e) => {
                error!(error = %e, "database operation failed");
                AppError::Database(e.to_string())
            }
        };
        Self(app)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
