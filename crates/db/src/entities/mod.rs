//! `SeaORM` entity definitions.

pub mod prelude;

pub mod attendance_months;
pub mod courses;
pub mod enrollments;
pub mod invoice_lines;
pub mod invoices;
pub mod payments;
pub mod price_overrides;
pub mod sea_orm_active_enums;
pub mod settings;
pub mod students;
