//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use classbill_core::BillingPeriod;
use classbill_core::render::{InvoiceDocument, InvoiceRenderer, RenderError, TextInvoiceRenderer};
use classbill_db::entities::{
    attendance_months, courses, enrollments, invoices, price_overrides,
    sea_orm_active_enums::{CourseType, InvoiceStatus},
    students,
};
use classbill_db::migration::{Migrator, MigratorTrait};
use classbill_db::{InvoiceRepository, PaymentRepository};
use classbill_shared::config::StudentSelection;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Overwrites an invoice's status and number directly, bypassing the repositories.
pub async fn force_invoice_state(
    db: &DatabaseConnection,
    id: i32,
    status: InvoiceStatus,
    number: Option<&str>,
) -> invoices::Model {
    let row = invoices::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query invoice")
        .expect("invoice row");
    let mut active: invoices::ActiveModel = row.into();
    active.status = Set(status);
    active.number = Set(number.map(String::from));
    active.update(db).await.expect("update invoice")
}

/// Fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps the in-memory database alive and
/// serialises transactions.
pub async fn setup() -> DatabaseConnection {
    let db = classbill_db::connect_with("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

pub fn period(year: i32, month: u32) -> BillingPeriod {
    BillingPeriod::new(year, month).expect("valid period")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub async fn create_student(db: &DatabaseConnection, name: &str, active: bool) -> students::Model {
    students::ActiveModel {
        full_name: Set(name.to_string()),
        phone: Set(None),
        email: Set(None),
        note: Set(None),
        is_active: Set(active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create student")
}

pub async fn create_course(
    db: &DatabaseConnection,
    name: &str,
    lesson_price: Decimal,
    subscription_price: Decimal,
) -> courses::Model {
    courses::ActiveModel {
        name: Set(name.to_string()),
        course_type: Set(CourseType::Group),
        lesson_price: Set(lesson_price),
        subscription_price: Set(subscription_price),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create course")
}

pub async fn enroll(
    db: &DatabaseConnection,
    student: &students::Model,
    course: &courses::Model,
    billing_mode: &str,
    discount_pct: Decimal,
) -> enrollments::Model {
    enrollments::ActiveModel {
        student_id: Set(student.id),
        course_id: Set(course.id),
        billing_mode: Set(billing_mode.to_string()),
        discount_pct: Set(discount_pct),
        note: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create enrollment")
}

pub async fn record_attendance(
    db: &DatabaseConnection,
    student: &students::Model,
    course: &courses::Model,
    period: BillingPeriod,
    lessons: i32,
) -> attendance_months::Model {
    attendance_months::ActiveModel {
        student_id: Set(student.id),
        course_id: Set(course.id),
        year: Set(period.year()),
        month: Set(period.month_i32()),
        lessons_count: Set(lessons),
        locked: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to record attendance")
}

pub async fn add_override(
    db: &DatabaseConnection,
    enrollment: &enrollments::Model,
    valid_from: NaiveDate,
    valid_to: Option<NaiveDate>,
    lesson_price: Option<Decimal>,
    subscription_price: Option<Decimal>,
) -> price_overrides::Model {
    price_overrides::ActiveModel {
        enrollment_id: Set(enrollment.id),
        valid_from: Set(valid_from),
        valid_to: Set(valid_to),
        lesson_price: Set(lesson_price),
        subscription_price: Set(subscription_price),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to add override")
}

/// Renderer that records every call and can be told to fail from the n-th call.
#[derive(Default)]
pub struct RecordingRenderer {
    calls: AtomicUsize,
    fail_from: Option<usize>,
}

impl RecordingRenderer {
    pub fn failing_from(call: usize) -> Self {
        Self { calls: AtomicUsize::new(0), fail_from: Some(call) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvoiceRenderer for RecordingRenderer {
    async fn render(&self, doc: &InvoiceDocument) -> Result<String, RenderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_from.is_some_and(|n| call >= n) {
            return Err(RenderError::Operation("disk full".into()));
        }
        let number = doc.number.clone().ok_or(RenderError::MissingNumber(doc.invoice_id))?;
        Ok(format!("/docs/{}", classbill_core::render::document_key(doc.period, &number)))
    }

    async fn existing(
        &self,
        _period: BillingPeriod,
        _number: &str,
    ) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}

pub fn invoice_repo(db: &DatabaseConnection, renderer: Arc<dyn InvoiceRenderer>) -> InvoiceRepository {
    InvoiceRepository::new(db.clone(), renderer, StudentSelection::ActiveOrAll)
}

pub fn recording_repo(db: &DatabaseConnection) -> (InvoiceRepository, Arc<RecordingRenderer>) {
    let renderer = Arc::new(RecordingRenderer::default());
    (invoice_repo(db, renderer.clone()), renderer)
}

pub fn text_repo(db: &DatabaseConnection, dir: &std::path::Path) -> InvoiceRepository {
    let renderer = TextInvoiceRenderer::local(dir).expect("renderer");
    invoice_repo(db, Arc::new(renderer))
}

pub fn payment_repo(db: &DatabaseConnection) -> PaymentRepository {
    PaymentRepository::new(db.clone())
}

/// The two-enrollment student from the pricing example:
/// 15.00 per lesson at 20% off with 8 lessons, plus a 120.00 subscription.
pub async fn seed_example_student(
    db: &DatabaseConnection,
    name: &str,
    billing: BillingPeriod,
) -> students::Model {
    use rust_decimal_macros::dec;

    let student = create_student(db, name, true).await;
    let lessons = create_course(db, &format!("{name} lessons"), dec!(15), dec!(0)).await;
    let club = create_course(db, &format!("{name} club"), dec!(0), dec!(120)).await;
    enroll(db, &student, &lessons, "per_lesson", dec!(20)).await;
    enroll(db, &student, &club, "subscription", dec!(0)).await;
    record_attendance(db, &student, &lessons, billing, 8).await;
    student
}
