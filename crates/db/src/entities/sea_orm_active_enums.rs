//! `SeaORM` active enums, stored as strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvoiceStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Issued.
    #[sea_orm(string_value = "issued")]
    Issued,
    /// Paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Canceled.
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// Payment method column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "bank")]
    Bank,
}

/// Course type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CourseType {
    /// Group lessons.
    #[sea_orm(string_value = "group")]
    Group,
    /// One-to-one lessons.
    #[sea_orm(string_value = "individual")]
    Individual,
}

impl From<InvoiceStatus> for classbill_core::invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Issued => Self::Issued,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Canceled => Self::Canceled,
        }
    }
}

impl From<classbill_core::invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: classbill_core::invoice::InvoiceStatus) -> Self {
        use classbill_core::invoice::InvoiceStatus as Core;
        match status {
            Core::Draft => Self::Draft,
            Core::Issued => Self::Issued,
            Core::Paid => Self::Paid,
            Core::Canceled => Self::Canceled,
        }
    }
}

impl From<PaymentMethod> for classbill_core::payment::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Bank => Self::Bank,
        }
    }
}

impl From<classbill_core::payment::PaymentMethod> for PaymentMethod {
    fn from(method: classbill_core::payment::PaymentMethod) -> Self {
        use classbill_core::payment::PaymentMethod as Core;
        match method {
            Core::Cash => Self::Cash,
            Core::Bank => Self::Bank,
        }
    }
}
