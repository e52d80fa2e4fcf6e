//! Router fixtures for handler tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use classbill_core::BillingPeriod;
use classbill_core::render::TextInvoiceRenderer;
use classbill_db::entities::{attendance_months, courses, enrollments, sea_orm_active_enums::CourseType, students};
use classbill_db::migration::{Migrator, MigratorTrait};
use classbill_shared::config::StudentSelection;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    _documents: tempfile::TempDir,
}

pub(crate) async fn test_app() -> TestApp {
    let db = classbill_db::connect_with("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let documents = tempfile::tempdir().expect("tempdir");
    let renderer = TextInvoiceRenderer::local(documents.path()).expect("renderer");
    let state = AppState::new(db.clone(), Arc::new(renderer), StudentSelection::ActiveOrAll);

    TestApp { router: create_router(state), db, _documents: documents }
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Student with 8 lessons at 15.00 less 20% plus a 120.00 subscription.
    pub async fn seed_student(&self, name: &str, billing: BillingPeriod) -> i32 {
        let student = students::ActiveModel {
            full_name: Set(name.to_string()),
            phone: Set(None),
            email: Set(None),
            note: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap();

        let lessons = self.course(&format!("{name} lessons"), Decimal::from(15), Decimal::ZERO).await;
        let club = self.course(&format!("{name} club"), Decimal::ZERO, Decimal::from(120)).await;
        self.enroll(student.id, lessons, "per_lesson", Decimal::from(20)).await;
        self.enroll(student.id, club, "subscription", Decimal::ZERO).await;

        attendance_months::ActiveModel {
            student_id: Set(student.id),
            course_id: Set(lessons),
            year: Set(billing.year()),
            month: Set(billing.month_i32()),
            lessons_count: Set(8),
            locked: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap();

        student.id
    }

    async fn course(&self, name: &str, lesson: Decimal, subscription: Decimal) -> i32 {
        courses::ActiveModel {
            name: Set(name.to_string()),
            course_type: Set(CourseType::Group),
            lesson_price: Set(lesson),
            subscription_price: Set(subscription),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }

    async fn enroll(&self, student_id: i32, course_id: i32, mode: &str, discount: Decimal) -> i32 {
        enrollments::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            billing_mode: Set(mode.to_string()),
            discount_pct: Set(discount),
            note: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }
}
