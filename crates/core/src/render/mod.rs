//! Invoice document rendering.
//!
//! The billing pipeline hands a fully resolved invoice to an
//! [`InvoiceRenderer`] and receives the path of the produced document.
//!
//! # Modules
//!
//! - `document` - Document model and deterministic storage keys
//! - `error` - Rendering errors
//! - `text` - Plain-text renderer backed by an OpenDAL operator

pub mod document;
pub mod error;
pub mod text;

use async_trait::async_trait;

use crate::period::BillingPeriod;

pub use document::{DocumentLine, InvoiceDocument, OrganizationInfo, document_key};
pub use error::RenderError;
pub use text::TextInvoiceRenderer;

/// Produces invoice documents at deterministic locations.
#[async_trait]
pub trait InvoiceRenderer: Send + Sync {
    /// Renders the document and returns its path.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MissingNumber` if the invoice has not been
    /// numbered, or a storage error if the document cannot be written.
    async fn render(&self, doc: &InvoiceDocument) -> Result<String, RenderError>;

    /// Returns the path of an already rendered document, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be queried.
    async fn existing(
        &self,
        period: BillingPeriod,
        number: &str,
    ) -> Result<Option<String>, RenderError>;
}
