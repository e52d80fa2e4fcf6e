//! Price resolution and price override repository.

use classbill_core::pricing::{
    CoursePrices, OverrideWindow, PriceOverrideInput, PriceResolver, ResolvedPrices,
    validate_discount_pct, validate_override,
};
use classbill_core::BillingPeriod;
use classbill_shared::types::{EnrollmentId, Money};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{courses, enrollments, price_overrides};

use super::error::BillingError;

/// Price resolution and override repository.
#[derive(Debug, Clone)]
pub struct PricingRepository {
    db: DatabaseConnection,
}

impl PricingRepository {
    /// Creates a new pricing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the effective prices of an enrollment for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Enrollment or its course is not found
    /// - Stored discount is outside 0..=100
    /// - Database operation fails
    pub async fn resolve_prices(
        &self,
        enrollment_id: EnrollmentId,
        period: BillingPeriod,
    ) -> Result<ResolvedPrices, BillingError> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| BillingError::not_found("enrollment", enrollment_id.into_inner()))?;
        resolve_for_enrollment(&self.db, &enrollment, period).await
    }

    /// Creates a price override for an enrollment.
    ///
    /// The new window must not overlap any existing override of the enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Enrollment is not found
    /// - Window is inverted, sets no price, or has a negative price
    /// - Window overlaps an existing override (state conflict)
    /// - Database operation fails
    pub async fn create_override(
        &self,
        enrollment_id: EnrollmentId,
        input: PriceOverrideInput,
    ) -> Result<price_overrides::Model, BillingError> {
        let txn = self.db.begin().await?;

        let enrollment = enrollments::Entity::find_by_id(enrollment_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| BillingError::not_found("enrollment", enrollment_id.into_inner()))?;

        let existing: Vec<OverrideWindow> = price_overrides::Entity::find()
            .filter(price_overrides::Column::EnrollmentId.eq(enrollment.id))
            .all(&txn)
            .await?
            .iter()
            .map(to_window)
            .collect();
        validate_override(&input, &existing)?;

        let created = price_overrides::ActiveModel {
            enrollment_id: Set(enrollment.id),
            valid_from: Set(input.valid_from),
            valid_to: Set(input.valid_to),
            lesson_price: Set(input.lesson_price.map(Money::round2)),
            subscription_price: Set(input.subscription_price.map(Money::round2)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            enrollment_id = enrollment.id,
            override_id = created.id,
            valid_from = %created.valid_from,
            "price override created"
        );
        Ok(created)
    }
}

/// Resolves prices for a loaded enrollment on the given connection.
pub(crate) async fn resolve_for_enrollment<C: ConnectionTrait>(
    conn: &C,
    enrollment: &enrollments::Model,
    period: BillingPeriod,
) -> Result<ResolvedPrices, BillingError> {
    let discount_pct = enrollment.discount_pct.round_dp(2);
    validate_discount_pct(discount_pct)?;

    let course = courses::Entity::find_by_id(enrollment.course_id)
        .one(conn)
        .await?
        .ok_or_else(|| BillingError::not_found("course", enrollment.course_id))?;

    let overrides: Vec<OverrideWindow> = price_overrides::Entity::find()
        .filter(price_overrides::Column::EnrollmentId.eq(enrollment.id))
        .filter(price_overrides::Column::ValidFrom.lte(period.end()))
        .order_by_desc(price_overrides::Column::ValidFrom)
        .order_by_desc(price_overrides::Column::Id)
        .all(conn)
        .await?
        .iter()
        .map(to_window)
        .collect();

    Ok(PriceResolver::resolve(
        CoursePrices {
            lesson_price: course.lesson_price,
            subscription_price: course.subscription_price,
        },
        discount_pct,
        &overrides,
        period,
    ))
}

fn to_window(model: &price_overrides::Model) -> OverrideWindow {
    OverrideWindow {
        valid_from: model.valid_from,
        valid_to: model.valid_to,
        lesson_price: model.lesson_price,
        subscription_price: model.subscription_price,
    }
}
