//! Invoice repository: draft generation, listing, issuance and documents.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use classbill_core::invoice::{
    BillingMode, DraftAction, DraftBuilder, DraftInvoice, EnrollmentCharge, GenerateResult,
    InvoiceError, IssueDecision, NumberingService, StatusFilter,
};
use classbill_core::render::{DocumentLine, InvoiceDocument, InvoiceRenderer, OrganizationInfo};
use classbill_core::BillingPeriod;
use classbill_shared::config::StudentSelection;
use classbill_shared::types::{CourseId, EnrollmentId, InvoiceId, Money, StudentId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{
    attendance_months, enrollments, invoice_lines, invoices, sea_orm_active_enums, settings,
    students,
};

use super::error::BillingError;
use super::pricing::resolve_for_enrollment;

/// Invoice row in a period listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceListItem {
    /// Invoice id.
    pub id: InvoiceId,
    /// Billed student.
    pub student_id: StudentId,
    /// Student's full name.
    pub student_name: String,
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: i32,
    /// Invoice total.
    pub total: Money,
    /// Current status.
    pub status: classbill_core::invoice::InvoiceStatus,
    /// Number of lines.
    pub lines_count: i64,
    /// Invoice number, once issued.
    pub number: Option<String>,
}

/// A stored invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLineView {
    /// Billed enrollment.
    pub enrollment_id: EnrollmentId,
    /// Description.
    pub description: String,
    /// Quantity.
    pub qty: i32,
    /// Unit price.
    pub unit_price: Money,
    /// Line amount.
    pub amount: Money,
}

/// An invoice with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetail {
    /// Invoice id.
    pub id: InvoiceId,
    /// Billed student.
    pub student_id: StudentId,
    /// Student's full name.
    pub student_name: String,
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: i32,
    /// Invoice total.
    pub total: Money,
    /// Current status.
    pub status: classbill_core::invoice::InvoiceStatus,
    /// Invoice number, once issued.
    pub number: Option<String>,
    /// Lines in insertion order.
    pub lines: Vec<InvoiceLineView>,
}

/// Result of issuing one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueOutcome {
    /// Invoice id.
    pub invoice_id: InvoiceId,
    /// Assigned (or pre-existing) number.
    pub number: String,
    /// Path of the rendered document.
    pub path: String,
}

/// Progress of a period-wide issuance run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueAllResult {
    /// Invoices numbered.
    pub count: u32,
    /// Documents produced.
    pub paths: Vec<String>,
}

/// A period-wide issuance that stopped at the first error.
///
/// `issued` holds everything committed before the failure.
#[derive(Debug, thiserror::Error)]
#[error("issuance stopped after {} invoice(s): {source}", issued.count)]
pub struct IssueAllError {
    /// What was issued before the failure.
    pub issued: IssueAllResult,
    /// The error that stopped the run.
    #[source]
    pub source: BillingError,
}

/// Invoice repository.
#[derive(Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    renderer: Arc<dyn InvoiceRenderer>,
    selection: StudentSelection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        renderer: Arc<dyn InvoiceRenderer>,
        selection: StudentSelection,
    ) -> Self {
        Self { db, renderer, selection }
    }

    /// Builds or refreshes the draft invoice of every billable student for a period.
    ///
    /// Each student is processed in its own transaction with the existing
    /// invoice row locked. Issued, paid and canceled invoices are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails. Students processed
    /// before the failure stay committed.
    pub async fn generate_drafts(
        &self,
        period: BillingPeriod,
    ) -> Result<GenerateResult, BillingError> {
        let students = self.billable_students().await?;
        let mut result = GenerateResult::default();

        for student in &students {
            let txn = self.db.begin().await?;
            let outcome = draft_student(&txn, student, period).await?;
            txn.commit().await?;

            match outcome {
                StudentOutcome::NoEnrollments => {}
                StudentOutcome::NoLines => result.skipped_no_lines += 1,
                StudentOutcome::Applied(action) => result.record(action),
            }
        }

        tracing::info!(
            period = %period,
            created = result.created,
            updated = result.updated,
            skipped_has_invoice = result.skipped_has_invoice,
            skipped_no_lines = result.skipped_no_lines,
            "draft generation finished"
        );
        Ok(result)
    }

    /// Lists the invoices of a period.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list_invoices(
        &self,
        period: BillingPeriod,
        filter: StatusFilter,
    ) -> Result<Vec<InvoiceListItem>, BillingError> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::PeriodYear.eq(period.year()))
            .filter(invoices::Column::PeriodMonth.eq(period.month_i32()));
        if let Some(status) = filter.status() {
            query = query
                .filter(invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::from(status)));
        }
        let rows = query
            .find_also_related(students::Entity)
            .order_by_asc(invoices::Column::Id)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|(invoice, _)| invoice.id).collect();
        let counts: HashMap<i32, i64> = if ids.is_empty() {
            HashMap::new()
        } else {
            invoice_lines::Entity::find()
                .select_only()
                .column(invoice_lines::Column::InvoiceId)
                .column_as(Expr::col(invoice_lines::Column::Id).count(), "lines_count")
                .filter(invoice_lines::Column::InvoiceId.is_in(ids))
                .group_by(invoice_lines::Column::InvoiceId)
                .into_tuple::<(i32, i64)>()
                .all(&self.db)
                .await?
                .into_iter()
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|(invoice, student)| InvoiceListItem {
                id: InvoiceId::new(invoice.id),
                student_id: StudentId::new(invoice.student_id),
                student_name: student.map(|s| s.full_name).unwrap_or_default(),
                year: invoice.period_year,
                month: invoice.period_month,
                total: Money::new(invoice.total_amount),
                status: invoice.status.into(),
                lines_count: counts.get(&invoice.id).copied().unwrap_or(0),
                number: invoice.number,
            })
            .collect())
    }

    /// Loads an invoice with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or a database operation fails.
    pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<InvoiceDetail, BillingError> {
        let (invoice, student) = invoices::Entity::find_by_id(invoice_id.into_inner())
            .find_also_related(students::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| BillingError::not_found("invoice", invoice_id.into_inner()))?;

        let lines = load_lines(&self.db, invoice.id)
            .await?
            .into_iter()
            .map(|line| InvoiceLineView {
                enrollment_id: EnrollmentId::new(line.enrollment_id),
                description: line.description,
                qty: line.qty,
                unit_price: Money::new(line.unit_price),
                amount: Money::new(line.amount),
            })
            .collect();

        Ok(InvoiceDetail {
            id: InvoiceId::new(invoice.id),
            student_id: StudentId::new(invoice.student_id),
            student_name: student.map(|s| s.full_name).unwrap_or_default(),
            year: invoice.period_year,
            month: invoice.period_month,
            total: Money::new(invoice.total_amount),
            status: invoice.status.into(),
            number: invoice.number,
            lines,
        })
    }

    /// Deletes a draft invoice and its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Invoice is not found
    /// - Invoice is not a draft (state conflict)
    /// - Database operation fails
    pub async fn delete_draft(&self, invoice_id: InvoiceId) -> Result<(), BillingError> {
        let txn = self.db.begin().await?;

        let invoice = find_invoice_locked(&txn, invoice_id).await?;
        let status: classbill_core::invoice::InvoiceStatus = invoice.status.into();
        if status != classbill_core::invoice::InvoiceStatus::Draft {
            return Err(InvoiceError::NotDraft(status).into());
        }

        invoice_lines::Entity::delete_many()
            .filter(invoice_lines::Column::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
        invoices::Entity::delete_by_id(invoice.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(invoice_id = invoice.id, "draft invoice deleted");
        Ok(())
    }

    /// Numbers a draft invoice and renders its document.
    ///
    /// Calling this on an already numbered invoice returns its existing number
    /// without consuming the counter. A rendering failure is returned after the
    /// number has been committed; the invoice stays issued.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Invoice or the settings row is not found
    /// - Invoice left draft without a number (state conflict)
    /// - Database operation fails (nothing is committed)
    /// - Rendering fails
    pub async fn issue_one(&self, invoice_id: InvoiceId) -> Result<IssueOutcome, BillingError> {
        let (invoice, number) = self.assign_number(invoice_id).await?;
        let path = self.render_invoice(&invoice).await?;
        Ok(IssueOutcome { invoice_id, number, path })
    }

    /// Issues every draft invoice of a period in id order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure and returns an [`IssueAllError`] carrying the
    /// count and paths produced so far.
    pub async fn issue_all(
        &self,
        period: BillingPeriod,
    ) -> Result<IssueAllResult, IssueAllError> {
        let mut issued = IssueAllResult::default();

        let drafts = match invoices::Entity::find()
            .filter(invoices::Column::PeriodYear.eq(period.year()))
            .filter(invoices::Column::PeriodMonth.eq(period.month_i32()))
            .filter(invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::Draft))
            .order_by_asc(invoices::Column::Id)
            .all(&self.db)
            .await
        {
            Ok(drafts) => drafts,
            Err(err) => return Err(IssueAllError { issued, source: err.into() }),
        };

        for draft in drafts {
            let invoice = match self.assign_number(InvoiceId::new(draft.id)).await {
                Ok((invoice, _)) => invoice,
                Err(source) => return Err(IssueAllError { issued, source }),
            };
            issued.count += 1;

            match self.render_invoice(&invoice).await {
                Ok(path) => issued.paths.push(path),
                Err(source) => return Err(IssueAllError { issued, source }),
            }
        }

        tracing::info!(period = %period, count = issued.count, "period issued");
        Ok(issued)
    }

    /// Returns the document of a numbered invoice, rendering it if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Invoice is not found
    /// - Invoice has no number yet (state conflict)
    /// - Rendering or a database operation fails
    pub async fn ensure_document(&self, invoice_id: InvoiceId) -> Result<String, BillingError> {
        let invoice = invoices::Entity::find_by_id(invoice_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| BillingError::not_found("invoice", invoice_id.into_inner()))?;

        let Some(number) = invoice.number.as_deref().filter(|n| !n.is_empty()) else {
            return Err(InvoiceError::MissingNumber(invoice.status.into()).into());
        };
        let period = BillingPeriod::from_parts(invoice.period_year, invoice.period_month)?;

        if let Some(path) = self.renderer.existing(period, number).await? {
            return Ok(path);
        }
        tracing::warn!(invoice_id = invoice.id, number = %number, "document missing, rendering again");
        self.render_invoice(&invoice).await
    }

    /// Assigns a number inside one transaction that also advances the counter.
    async fn assign_number(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<(invoices::Model, String), BillingError> {
        let txn = self.db.begin().await?;

        let invoice = find_invoice_locked(&txn, invoice_id).await?;
        let decision = NumberingService::decide(invoice.status.into(), invoice.number.as_deref())?;
        if let IssueDecision::AlreadyIssued(number) = decision {
            txn.commit().await?;
            tracing::debug!(invoice_id = invoice.id, number = %number, "invoice already issued");
            return Ok((invoice, number));
        }

        let settings_row = settings::Entity::find_by_id(settings::SINGLETON_ID)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| BillingError::not_found("settings", settings::SINGLETON_ID))?;

        let period = BillingPeriod::from_parts(invoice.period_year, invoice.period_month)?;
        let assignment =
            NumberingService::assign(&settings_row.invoice_prefix, settings_row.next_seq, period)?;

        let mut active_settings: settings::ActiveModel = settings_row.into();
        active_settings.next_seq = Set(assignment.next_seq);
        active_settings.update(&txn).await?;

        let now = Utc::now();
        let mut active: invoices::ActiveModel = invoice.into();
        active.number = Set(Some(assignment.number.clone()));
        active.status = Set(sea_orm_active_enums::InvoiceStatus::Issued);
        active.issued_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            invoice_id = updated.id,
            number = %assignment.number,
            period = %period,
            "invoice issued"
        );
        Ok((updated, assignment.number))
    }

    async fn render_invoice(&self, invoice: &invoices::Model) -> Result<String, BillingError> {
        let doc = build_document(&self.db, invoice).await?;
        match self.renderer.render(&doc).await {
            Ok(path) => Ok(path),
            Err(err) => {
                tracing::error!(invoice_id = invoice.id, error = %err, "invoice rendering failed");
                Err(err.into())
            }
        }
    }

    async fn billable_students(&self) -> Result<Vec<students::Model>, BillingError> {
        let active = students::Entity::find()
            .filter(students::Column::IsActive.eq(true))
            .order_by_asc(students::Column::Id)
            .all(&self.db)
            .await?;
        if !active.is_empty() || self.selection == StudentSelection::ActiveOnly {
            return Ok(active);
        }

        let all = students::Entity::find()
            .order_by_asc(students::Column::Id)
            .all(&self.db)
            .await?;
        if !all.is_empty() {
            tracing::warn!(
                count = all.len(),
                "no active students found; billing all students (student_selection = active_or_all)"
            );
        }
        Ok(all)
    }
}

enum StudentOutcome {
    NoEnrollments,
    NoLines,
    Applied(DraftAction),
}

async fn draft_student(
    txn: &DatabaseTransaction,
    student: &students::Model,
    period: BillingPeriod,
) -> Result<StudentOutcome, BillingError> {
    let enrollments = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student.id))
        .order_by_asc(enrollments::Column::Id)
        .all(txn)
        .await?;
    if enrollments.is_empty() {
        return Ok(StudentOutcome::NoEnrollments);
    }

    let charges = collect_charges(txn, student.id, &enrollments, period).await?;
    let Some(draft) = DraftBuilder::build(&charges, period) else {
        tracing::debug!(student_id = student.id, period = %period, "nothing billable");
        return Ok(StudentOutcome::NoLines);
    };

    let existing = invoices::Entity::find()
        .filter(invoices::Column::StudentId.eq(student.id))
        .filter(invoices::Column::PeriodYear.eq(period.year()))
        .filter(invoices::Column::PeriodMonth.eq(period.month_i32()))
        .lock_exclusive()
        .one(txn)
        .await?;
    let action = DraftBuilder::decide(
        existing.as_ref().map(|i| (InvoiceId::new(i.id), i.status.into())),
    );

    let now = Utc::now();
    match (action, existing) {
        (DraftAction::Create, _) => {
            let invoice = invoices::ActiveModel {
                student_id: Set(student.id),
                period_year: Set(period.year()),
                period_month: Set(period.month_i32()),
                total_amount: Set(draft.total.amount()),
                status: Set(sea_orm_active_enums::InvoiceStatus::Draft),
                number: Set(None),
                issued_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            insert_lines(txn, invoice.id, &draft).await?;
            tracing::debug!(student_id = student.id, invoice_id = invoice.id, total = %draft.total, "draft created");
        }
        (DraftAction::Rebuild(_), Some(invoice)) => {
            invoice_lines::Entity::delete_many()
                .filter(invoice_lines::Column::InvoiceId.eq(invoice.id))
                .exec(txn)
                .await?;
            insert_lines(txn, invoice.id, &draft).await?;

            let invoice_id = invoice.id;
            let mut active: invoices::ActiveModel = invoice.into();
            active.total_amount = Set(draft.total.amount());
            active.updated_at = Set(now);
            active.update(txn).await?;
            tracing::debug!(student_id = student.id, invoice_id, total = %draft.total, "draft rebuilt");
        }
        (DraftAction::Skip(invoice_id, status), _) => {
            tracing::debug!(student_id = student.id, invoice_id = %invoice_id, status = %status, "invoice already past draft");
        }
        (DraftAction::Rebuild(invoice_id), None) => {
            return Err(BillingError::not_found("invoice", invoice_id.into_inner()));
        }
    }

    Ok(StudentOutcome::Applied(action))
}

async fn collect_charges<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
    enrollments: &[enrollments::Model],
    period: BillingPeriod,
) -> Result<Vec<EnrollmentCharge>, BillingError> {
    let mut charges = Vec::with_capacity(enrollments.len());

    for enrollment in enrollments {
        let billing_mode = match enrollment.billing_mode.parse::<BillingMode>() {
            Ok(mode) => mode,
            Err(err) => {
                tracing::warn!(enrollment_id = enrollment.id, error = %err, "enrollment skipped");
                continue;
            }
        };

        let prices = match resolve_for_enrollment(conn, enrollment, period).await {
            Ok(prices) => prices,
            Err(BillingError::Database(err)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(enrollment_id = enrollment.id, error = %err, "enrollment skipped");
                continue;
            }
        };

        let lessons_attended = match billing_mode {
            BillingMode::PerLesson => attendance_months::Entity::find()
                .filter(attendance_months::Column::StudentId.eq(student_id))
                .filter(attendance_months::Column::CourseId.eq(enrollment.course_id))
                .filter(attendance_months::Column::Year.eq(period.year()))
                .filter(attendance_months::Column::Month.eq(period.month_i32()))
                .one(conn)
                .await?
                .map(|a| a.lessons_count),
            BillingMode::Subscription => None,
        };

        charges.push(EnrollmentCharge {
            enrollment_id: EnrollmentId::new(enrollment.id),
            course_id: CourseId::new(enrollment.course_id),
            billing_mode,
            prices,
            lessons_attended,
        });
    }

    Ok(charges)
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    invoice_id: i32,
    draft: &DraftInvoice,
) -> Result<(), BillingError> {
    let rows = draft.lines.iter().map(|line| invoice_lines::ActiveModel {
        invoice_id: Set(invoice_id),
        enrollment_id: Set(line.enrollment_id.into_inner()),
        description: Set(line.description.clone()),
        qty: Set(line.qty),
        unit_price: Set(line.unit_price.amount()),
        amount: Set(line.amount.amount()),
        ..Default::default()
    });
    invoice_lines::Entity::insert_many(rows).exec(txn).await?;
    Ok(())
}

async fn find_invoice_locked(
    txn: &DatabaseTransaction,
    invoice_id: InvoiceId,
) -> Result<invoices::Model, BillingError> {
    invoices::Entity::find_by_id(invoice_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| BillingError::not_found("invoice", invoice_id.into_inner()))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<Vec<invoice_lines::Model>, BillingError> {
    Ok(invoice_lines::Entity::find()
        .filter(invoice_lines::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_lines::Column::Id)
        .all(conn)
        .await?)
}

async fn build_document<C: ConnectionTrait>(
    conn: &C,
    invoice: &invoices::Model,
) -> Result<InvoiceDocument, BillingError> {
    let student = students::Entity::find_by_id(invoice.student_id)
        .one(conn)
        .await?
        .ok_or_else(|| BillingError::not_found("student", invoice.student_id))?;
    let settings_row = settings::Entity::find_by_id(settings::SINGLETON_ID)
        .one(conn)
        .await?
        .ok_or_else(|| BillingError::not_found("settings", settings::SINGLETON_ID))?;
    let lines = load_lines(conn, invoice.id)
        .await?
        .into_iter()
        .map(|line| DocumentLine {
            description: line.description,
            qty: line.qty,
            unit_price: Money::new(line.unit_price),
            amount: Money::new(line.amount),
        })
        .collect();

    Ok(InvoiceDocument {
        invoice_id: InvoiceId::new(invoice.id),
        number: invoice.number.clone(),
        period: BillingPeriod::from_parts(invoice.period_year, invoice.period_month)?,
        student_name: student.full_name,
        total: Money::new(invoice.total_amount),
        lines,
        organization: OrganizationInfo {
            name: settings_row.org_name,
            address: settings_row.address,
            currency: settings_row.currency,
            locale: settings_row.locale,
        },
        issued_on: invoice.issued_at.unwrap_or(invoice.updated_at).date_naive(),
    })
}
