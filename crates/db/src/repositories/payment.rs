//! Payment repository: recording payments and reconciling invoices.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use classbill_core::payment::{
    DebtorSummary, InvoiceSummary, PaymentMethod, PaymentRequest, Reconciler, StudentBalance,
};
use classbill_shared::types::{InvoiceId, Money, PaymentId, StudentId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{invoices, payments, sea_orm_active_enums, students};

use super::error::BillingError;

/// A stored payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentView {
    /// Payment id.
    pub id: PaymentId,
    /// Paying student.
    pub student_id: StudentId,
    /// Linked invoice, if any.
    pub invoice_id: Option<InvoiceId>,
    /// When the money was received.
    pub paid_at: DateTime<Utc>,
    /// Amount.
    pub amount: Money,
    /// Payment method.
    pub method: PaymentMethod,
    /// Free-form note.
    pub note: String,
    /// When the payment was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<payments::Model> for PaymentView {
    fn from(model: payments::Model) -> Self {
        Self {
            id: PaymentId::new(model.id),
            student_id: StudentId::new(model.student_id),
            invoice_id: model.invoice_id.map(InvoiceId::new),
            paid_at: model.paid_at,
            amount: Money::new(model.amount),
            method: model.method.into(),
            note: model.note,
            created_at: model.created_at,
        }
    }
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment and recomputes the linked invoice's status.
    ///
    /// Insert and recomputation run in one transaction with the invoice locked.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Amount, method or date is invalid
    /// - Student or linked invoice is not found
    /// - Linked invoice belongs to another student or is draft/canceled
    /// - Database operation fails
    pub async fn create_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentView, BillingError> {
        let payment = request.validate()?;

        let txn = self.db.begin().await?;

        students::Entity::find_by_id(payment.student_id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| BillingError::not_found("student", payment.student_id.into_inner()))?;

        if let Some(invoice_id) = payment.invoice_id {
            let invoice = invoices::Entity::find_by_id(invoice_id.into_inner())
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| BillingError::not_found("invoice", invoice_id.into_inner()))?;
            Reconciler::ensure_attachable(
                invoice_id,
                StudentId::new(invoice.student_id),
                invoice.status.into(),
                payment.student_id,
            )?;
        }

        let created = payments::ActiveModel {
            student_id: Set(payment.student_id.into_inner()),
            invoice_id: Set(payment.invoice_id.map(InvoiceId::into_inner)),
            paid_at: Set(payment.paid_at),
            amount: Set(payment.amount.amount()),
            method: Set(payment.method.into()),
            note: Set(payment.note),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(invoice_id) = created.invoice_id {
            recompute(&txn, invoice_id).await?;
        }

        txn.commit().await?;

        tracing::info!(
            payment_id = created.id,
            student_id = created.student_id,
            invoice_id = ?created.invoice_id,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok(created.into())
    }

    /// Records an unlinked cash payment dated today.
    ///
    /// # Errors
    ///
    /// Same as [`PaymentRepository::create_payment`].
    pub async fn quick_cash(
        &self,
        student_id: StudentId,
        amount: Decimal,
        note: String,
    ) -> Result<PaymentView, BillingError> {
        self.create_payment(PaymentRequest {
            student_id,
            invoice_id: None,
            amount,
            method: PaymentMethod::Cash.as_str().to_string(),
            paid_at: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            note,
        })
        .await
    }

    /// Deletes a payment and recomputes the linked invoice's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not found or a database operation fails.
    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<(), BillingError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(payment_id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| BillingError::not_found("payment", payment_id.into_inner()))?;
        let invoice_id = payment.invoice_id;

        if let Some(invoice_id) = invoice_id {
            // lock before the sum changes
            invoices::Entity::find_by_id(invoice_id)
                .lock_exclusive()
                .one(&txn)
                .await?;
        }
        payment.delete(&txn).await?;

        if let Some(invoice_id) = invoice_id {
            recompute(&txn, invoice_id).await?;
        }

        txn.commit().await?;

        tracing::info!(payment_id = payment_id.into_inner(), invoice_id = ?invoice_id, "payment deleted");
        Ok(())
    }

    /// Lists a student's payments, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the student is not found or a database operation fails.
    pub async fn list_payments_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<PaymentView>, BillingError> {
        self.find_student(student_id).await?;

        let rows = payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student_id.into_inner()))
            .order_by_desc(payments::Column::PaidAt)
            .order_by_desc(payments::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(PaymentView::from).collect())
    }

    /// Computes what a student was invoiced versus what they paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the student is not found or a database operation fails.
    pub async fn student_balance(
        &self,
        student_id: StudentId,
    ) -> Result<StudentBalance, BillingError> {
        let student = self.find_student(student_id).await?;

        let invoiced: Money = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::TotalAmount)
            .filter(invoices::Column::StudentId.eq(student.id))
            .filter(invoices::Column::Status.is_in(invoiced_statuses()))
            .into_tuple::<Decimal>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(Money::new)
            .sum();
        let paid: Money = payments::Entity::find()
            .select_only()
            .column(payments::Column::Amount)
            .filter(payments::Column::StudentId.eq(student.id))
            .into_tuple::<Decimal>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(Money::new)
            .sum();

        Ok(StudentBalance::from_totals(student_id, student.full_name, invoiced, paid))
    }

    /// Lists active students with positive debt, largest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn list_debtors(&self) -> Result<Vec<DebtorSummary>, BillingError> {
        let active = students::Entity::find()
            .filter(students::Column::IsActive.eq(true))
            .order_by_asc(students::Column::Id)
            .all(&self.db)
            .await?;
        if active.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = active.iter().map(|s| s.id).collect();

        let mut invoiced: HashMap<i32, Money> = HashMap::new();
        for (student_id, total) in invoices::Entity::find()
            .select_only()
            .column(invoices::Column::StudentId)
            .column(invoices::Column::TotalAmount)
            .filter(invoices::Column::StudentId.is_in(ids.clone()))
            .filter(invoices::Column::Status.is_in(invoiced_statuses()))
            .into_tuple::<(i32, Decimal)>()
            .all(&self.db)
            .await?
        {
            *invoiced.entry(student_id).or_default() += Money::new(total);
        }

        let mut paid: HashMap<i32, Money> = HashMap::new();
        for (student_id, amount) in payments::Entity::find()
            .select_only()
            .column(payments::Column::StudentId)
            .column(payments::Column::Amount)
            .filter(payments::Column::StudentId.is_in(ids))
            .into_tuple::<(i32, Decimal)>()
            .all(&self.db)
            .await?
        {
            *paid.entry(student_id).or_default() += Money::new(amount);
        }

        let balances = active
            .into_iter()
            .map(|s| {
                StudentBalance::from_totals(
                    StudentId::new(s.id),
                    s.full_name,
                    invoiced.get(&s.id).copied().unwrap_or_default(),
                    paid.get(&s.id).copied().unwrap_or_default(),
                )
            })
            .collect();
        Ok(Reconciler::rank_debtors(balances))
    }

    /// Summarises the payment position of one invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or a database operation fails.
    pub async fn invoice_summary(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceSummary, BillingError> {
        let invoice = invoices::Entity::find_by_id(invoice_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| BillingError::not_found("invoice", invoice_id.into_inner()))?;
        let paid = sum_linked(&self.db, invoice.id).await?;

        Ok(InvoiceSummary::new(
            invoice_id,
            Money::new(invoice.total_amount),
            paid,
            invoice.status.into(),
            invoice.number,
        ))
    }

    async fn find_student(&self, student_id: StudentId) -> Result<students::Model, BillingError> {
        students::Entity::find_by_id(student_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| BillingError::not_found("student", student_id.into_inner()))
    }
}

fn invoiced_statuses() -> [sea_orm_active_enums::InvoiceStatus; 2] {
    [sea_orm_active_enums::InvoiceStatus::Issued, sea_orm_active_enums::InvoiceStatus::Paid]
}

async fn sum_linked<C: sea_orm::ConnectionTrait>(
    conn: &C,
    invoice_id: i32,
) -> Result<Money, BillingError> {
    Ok(payments::Entity::find()
        .select_only()
        .column(payments::Column::Amount)
        .filter(payments::Column::InvoiceId.eq(invoice_id))
        .into_tuple::<Decimal>()
        .all(conn)
        .await?
        .into_iter()
        .map(Money::new)
        .sum())
}

/// Re-derives an invoice's status from its linked payments.
async fn recompute(txn: &DatabaseTransaction, invoice_id: i32) -> Result<(), BillingError> {
    let Some(invoice) = invoices::Entity::find_by_id(invoice_id).one(txn).await? else {
        return Ok(());
    };
    let paid = sum_linked(txn, invoice_id).await?;
    let current: classbill_core::invoice::InvoiceStatus = invoice.status.into();
    let total = Money::new(invoice.total_amount);

    if let Some(next) = Reconciler::recompute_status(current, total, paid) {
        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now());
        active.update(txn).await?;
        tracing::info!(invoice_id, from = %current, to = %next, paid = %paid, total = %total, "invoice status recomputed");
    }
    Ok(())
}
