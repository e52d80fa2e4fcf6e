//! Entity re-exports.

pub use super::attendance_months::Entity as AttendanceMonths;
pub use super::courses::Entity as Courses;
pub use super::enrollments::Entity as Enrollments;
pub use super::invoice_lines::Entity as InvoiceLines;
pub use super::invoices::Entity as Invoices;
pub use super::payments::Entity as Payments;
pub use super::price_overrides::Entity as PriceOverrides;
pub use super::settings::Entity as Settings;
pub use super::students::Entity as Students;
