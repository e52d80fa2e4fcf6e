//! Error type shared by the billing repositories.

use classbill_core::invoice::InvoiceError;
use classbill_core::payment::ReconciliationError;
use classbill_core::pricing::PricingError;
use classbill_core::render::RenderError;
use classbill_core::PeriodError;
use sea_orm::DbErr;

/// Errors returned by billing repository operations.
///
/// Validation, not-found and state-conflict errors are raised before any
/// mutation. `Database` errors raised inside a transaction roll it back.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Bad input.
    #[error("{0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested id.
        id: i32,
    },

    /// The stored state does not allow the operation.
    #[error("{0}")]
    StateConflict(String),

    /// Document rendering failed; any committed state stays committed.
    #[error("rendering failed: {0}")]
    Render(RenderError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BillingError {
    /// Create a not-found error.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<PeriodError> for BillingError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PricingError> for BillingError {
    fn from(err: PricingError) -> Self {
        if err.is_conflict() {
            Self::StateConflict(err.to_string())
        } else {
            Self::Validation(err.to_string())
        }
    }
}

impl From<InvoiceError> for BillingError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::UnknownStatus(_) | InvoiceError::UnknownBillingMode(_) => {
                Self::Validation(err.to_string())
            }
            InvoiceError::NotDraft(_)
            | InvoiceError::MissingNumber(_)
            | InvoiceError::SequenceExhausted(_)
            | InvoiceError::InvalidSequence(_) => Self::StateConflict(err.to_string()),
        }
    }
}

impl From<ReconciliationError> for BillingError {
    fn from(err: ReconciliationError) -> Self {
        if err.is_conflict() {
            Self::StateConflict(err.to_string())
        } else {
            Self::Validation(err.to_string())
        }
    }
}

impl From<RenderError> for BillingError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingNumber(_) => Self::StateConflict(err.to_string()),
            other => Self::Render(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbill_core::invoice::InvoiceStatus;
    use classbill_shared::types::InvoiceId;

    #[test]
    fn test_conflicts_and_validation_are_separated() {
        assert!(matches!(
            BillingError::from(InvoiceError::NotDraft(InvoiceStatus::Issued)),
            BillingError::StateConflict(_)
        ));
        assert!(matches!(
            BillingError::from(ReconciliationError::InvoiceNotPayable(InvoiceStatus::Draft)),
            BillingError::StateConflict(_)
        ));
        assert!(matches!(
            BillingError::from(ReconciliationError::InvalidMethod("card".into())),
            BillingError::Validation(_)
        ));
        assert!(matches!(
            BillingError::from(RenderError::MissingNumber(InvoiceId::new(3))),
            BillingError::StateConflict(_)
        ));
        assert!(matches!(
            BillingError::from(RenderError::Operation("disk full".into())),
            BillingError::Render(_)
        ));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(BillingError::not_found("invoice", 7).to_string(), "invoice not found: 7");
    }
}
