//! Draft generation integration tests.

mod common;

use std::sync::Arc;

use classbill_core::invoice::{InvoiceStatus, StatusFilter};
use classbill_db::BillingError;
use classbill_db::entities::{invoice_lines, invoices, sea_orm_active_enums::InvoiceStatus as StoredStatus};
use classbill_shared::config::StudentSelection;
use classbill_shared::types::InvoiceId;
use common::*;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn test_generate_builds_discounted_lessons_and_subscription() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    let result = repo.generate_drafts(jan).await.expect("generate");
    assert_eq!(result.created, 1);
    assert_eq!(result.updated, 0);

    let list = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].student_id.into_inner(), student.id);
    assert_eq!(list[0].total.amount(), dec!(216.00));
    assert_eq!(list[0].lines_count, 2);
    assert_eq!(list[0].status, InvoiceStatus::Draft);
    assert!(list[0].number.is_none());

    let detail = repo.get_invoice(list[0].id).await.expect("detail");
    assert_eq!(detail.lines.len(), 2);
    assert_eq!(detail.lines[0].qty, 8);
    assert_eq!(detail.lines[0].unit_price.amount(), dec!(12.00));
    assert_eq!(detail.lines[0].amount.amount(), dec!(96.00));
    assert!(detail.lines[0].description.starts_with("Payment for lessons (01.2024)"));
    assert_eq!(detail.lines[1].qty, 1);
    assert_eq!(detail.lines[1].amount.amount(), dec!(120.00));
    assert!(detail.lines[1].description.starts_with("Subscription (01.2024)"));

    let line_total = detail.lines.iter().map(|l| l.amount).sum::<classbill_shared::types::Money>();
    assert_eq!(line_total, detail.total);
}

#[tokio::test]
async fn test_generate_twice_rebuilds_the_same_draft() {
    let db = setup().await;
    let jan = period(2024, 1);
    seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("first run");
    let second = repo.generate_drafts(jan).await.expect("second run");
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 1);

    assert_eq!(invoices::Entity::find().count(&db).await.expect("count"), 1);
    assert_eq!(invoice_lines::Entity::find().count(&db).await.expect("count"), 2);

    let list = repo.list_invoices(jan, StatusFilter::All).await.expect("list");
    assert_eq!(list[0].total.amount(), dec!(216.00));
}

#[tokio::test]
async fn test_rebuild_picks_up_attendance_changes() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = create_student(&db, "Ivo Horvat", true).await;
    let course = create_course(&db, "Chess", dec!(10), dec!(0)).await;
    enroll(&db, &student, &course, "per_lesson", dec!(0)).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let list = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list");
    assert_eq!(list[0].total.amount(), dec!(0.00));
    assert_eq!(list[0].lines_count, 1);

    record_attendance(&db, &student, &course, jan, 3).await;
    repo.generate_drafts(jan).await.expect("regenerate");
    let list = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list");
    assert_eq!(list[0].total.amount(), dec!(30.00));
}

#[tokio::test]
async fn test_issued_invoice_is_skipped_and_left_untouched() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let draft = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list")[0].id;
    repo.issue_one(draft).await.expect("issue");

    let extra = create_course(&db, "Extra", dec!(0), dec!(50)).await;
    enroll(&db, &student, &extra, "subscription", dec!(0)).await;

    let result = repo.generate_drafts(jan).await.expect("regenerate");
    assert_eq!(result.skipped_has_invoice, 1);
    assert_eq!(result.created, 0);
    assert_eq!(result.updated, 0);

    let detail = repo.get_invoice(draft).await.expect("detail");
    assert_eq!(detail.status, InvoiceStatus::Issued);
    assert_eq!(detail.total.amount(), dec!(216.00));
    assert_eq!(detail.lines.len(), 2);
}

#[tokio::test]
async fn test_canceled_invoice_is_skipped_and_left_untouched() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let draft = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list")[0].id;
    force_invoice_state(&db, draft.into_inner(), StoredStatus::Canceled, None).await;
    let extra = create_course(&db, "Extra", dec!(0), dec!(50)).await;
    enroll(&db, &student, &extra, "subscription", dec!(0)).await;

    let result = repo.generate_drafts(jan).await.expect("regenerate");
    assert_eq!(result.skipped_has_invoice, 1);
    assert_eq!(result.created, 0);
    assert_eq!(result.updated, 0);

    let detail = repo.get_invoice(draft).await.expect("detail");
    assert_eq!(detail.status, InvoiceStatus::Canceled);
    assert_eq!(detail.total.amount(), dec!(216.00));
    let lines = invoice_lines::Entity::find()
        .filter(invoice_lines::Column::InvoiceId.eq(draft.into_inner()))
        .count(&db)
        .await
        .expect("count lines");
    assert_eq!(lines, 2);
}

#[tokio::test]
async fn test_student_without_billable_lines_is_counted() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = create_student(&db, "Mia Babic", true).await;
    let free = create_course(&db, "Open day", dec!(0), dec!(0)).await;
    enroll(&db, &student, &free, "subscription", dec!(0)).await;
    create_student(&db, "No Enrollments", true).await;
    let (repo, _) = recording_repo(&db);

    let result = repo.generate_drafts(jan).await.expect("generate");
    assert_eq!(result.created, 0);
    assert_eq!(result.skipped_no_lines, 1);
    assert!(repo.list_invoices(jan, StatusFilter::All).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_unknown_billing_mode_is_skipped() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = create_student(&db, "Leo Maric", true).await;
    let weird = create_course(&db, "Weird", dec!(10), dec!(0)).await;
    let club = create_course(&db, "Club", dec!(0), dec!(40)).await;
    enroll(&db, &student, &weird, "weekly", dec!(0)).await;
    enroll(&db, &student, &club, "subscription", dec!(0)).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let list = repo.list_invoices(jan, StatusFilter::All).await.expect("list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].lines_count, 1);
    assert_eq!(list[0].total.amount(), dec!(40.00));
}

#[tokio::test]
async fn test_inactive_students_billed_when_none_active() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = create_student(&db, "Dormant", false).await;
    let club = create_course(&db, "Club", dec!(0), dec!(40)).await;
    enroll(&db, &student, &club, "subscription", dec!(0)).await;
    let (repo, _) = recording_repo(&db);

    let result = repo.generate_drafts(jan).await.expect("generate");
    assert_eq!(result.created, 1);
}

#[tokio::test]
async fn test_active_only_selection_never_bills_inactive_students() {
    let db = setup().await;
    let jan = period(2024, 1);
    let student = create_student(&db, "Dormant", false).await;
    let club = create_course(&db, "Club", dec!(0), dec!(40)).await;
    enroll(&db, &student, &club, "subscription", dec!(0)).await;
    let repo = classbill_db::InvoiceRepository::new(
        db.clone(),
        Arc::new(RecordingRenderer::default()),
        StudentSelection::ActiveOnly,
    );

    let result = repo.generate_drafts(jan).await.expect("generate");
    assert_eq!(result.created, 0);
    assert_eq!(invoices::Entity::find().count(&db).await.expect("count"), 0);
}

#[tokio::test]
async fn test_inactive_student_skipped_when_others_are_active() {
    let db = setup().await;
    let jan = period(2024, 1);
    seed_example_student(&db, "Ana Kovac", jan).await;
    let dormant = create_student(&db, "Dormant", false).await;
    let club = create_course(&db, "Club", dec!(0), dec!(40)).await;
    enroll(&db, &dormant, &club, "subscription", dec!(0)).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let billed = invoices::Entity::find()
        .filter(invoices::Column::StudentId.eq(dormant.id))
        .count(&db)
        .await
        .expect("count");
    assert_eq!(billed, 0);
}

#[tokio::test]
async fn test_list_filters_by_status_and_period() {
    let db = setup().await;
    let jan = period(2024, 1);
    seed_example_student(&db, "Ana Kovac", jan).await;
    seed_example_student(&db, "Ivo Horvat", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let drafts = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list");
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].student_name, "Ana Kovac");
    assert!(drafts[0].id < drafts[1].id);

    repo.issue_one(drafts[0].id).await.expect("issue");

    let drafts = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list");
    assert_eq!(drafts.len(), 1);
    let issued = repo
        .list_invoices(jan, StatusFilter::Only(InvoiceStatus::Issued))
        .await
        .expect("list");
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].number.as_deref(), Some("LS-202401-001"));
    assert_eq!(repo.list_invoices(jan, StatusFilter::All).await.expect("list").len(), 2);
    assert!(repo.list_invoices(period(2024, 2), StatusFilter::All).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_get_missing_invoice_is_not_found() {
    let db = setup().await;
    let (repo, _) = recording_repo(&db);

    let err = repo.get_invoice(InvoiceId::new(99)).await.unwrap_err();
    assert!(matches!(err, BillingError::NotFound { entity: "invoice", id: 99 }));
}

#[tokio::test]
async fn test_delete_draft_removes_invoice_and_lines() {
    let db = setup().await;
    let jan = period(2024, 1);
    seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let id = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list")[0].id;
    repo.delete_draft(id).await.expect("delete");

    assert_eq!(invoices::Entity::find().count(&db).await.expect("count"), 0);
    assert_eq!(invoice_lines::Entity::find().count(&db).await.expect("count"), 0);
}

#[tokio::test]
async fn test_delete_issued_invoice_is_a_conflict() {
    let db = setup().await;
    let jan = period(2024, 1);
    seed_example_student(&db, "Ana Kovac", jan).await;
    let (repo, _) = recording_repo(&db);

    repo.generate_drafts(jan).await.expect("generate");
    let id = repo.list_invoices(jan, StatusFilter::Drafts).await.expect("list")[0].id;
    repo.issue_one(id).await.expect("issue");

    let err = repo.delete_draft(id).await.unwrap_err();
    assert!(matches!(err, BillingError::StateConflict(_)));
    assert_eq!(
        repo.get_invoice(id).await.expect("still there").status,
        InvoiceStatus::Issued
    );
}
