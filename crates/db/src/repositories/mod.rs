//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod error;
pub mod invoice;
pub mod payment;
pub mod pricing;

pub use error::BillingError;
pub use invoice::{
    InvoiceDetail, InvoiceLineView, InvoiceListItem, InvoiceRepository, IssueAllError,
    IssueAllResult, IssueOutcome,
};
pub use payment::{PaymentRepository, PaymentView};
pub use pricing::PricingRepository;
