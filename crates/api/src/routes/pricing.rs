//! Price override routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use classbill_core::pricing::PriceOverrideInput;
use classbill_shared::types::EnrollmentId;
use serde_json::json;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Creates the pricing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/enrollments/{id}/price-overrides", post(create_override))
}

/// POST `/enrollments/{id}/price-overrides` - Add a dated price override.
async fn create_override(
    State(state): State<AppState>,
    Path(id): Path<EnrollmentId>,
    Json(payload): Json<PriceOverrideInput>,
) -> Response {
    match state.pricing.create_override(id, payload).await {
        Ok(model) => {
            info!(enrollment_id = %id, override_id = model.id, "price override created");
            (StatusCode::CREATED, Json(json!(model))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_app;
    use classbill_core::BillingPeriod;
    use classbill_db::entities::enrollments;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_overlapping_override_conflicts() {
        let app = test_app().await;
        app.seed_student("Ana Kovac", BillingPeriod::new(2024, 1).unwrap()).await;
        let enrollment = enrollments::Entity::find().one(&app.db).await.unwrap().unwrap();
        let uri = format!("/api/v1/enrollments/{}/price-overrides", enrollment.id);

        let (status, body) = app
            .send("POST", &uri, Some(json!({"valid_from": "2024-02-01", "lesson_price": "10"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["enrollment_id"], enrollment.id);

        let (status, body) = app
            .send(
                "POST",
                &uri,
                Some(json!({"valid_from": "2024-01-01", "valid_to": "2024-02-15", "lesson_price": "9"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "STATE_CONFLICT");

        let (status, _) = app
            .send("POST", &uri, Some(json!({"valid_from": "2024-01-01", "valid_to": "2024-01-31"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_enrollment_is_not_found() {
        let app = test_app().await;

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/enrollments/5/price-overrides",
                Some(json!({"valid_from": "2024-02-01", "lesson_price": "10"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
