//! Rendering error types.

use classbill_shared::types::InvoiceId;
use thiserror::Error;

/// Errors raised while producing invoice documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The invoice has no number yet.
    #[error("invoice {0} has no number; issue it first")]
    MissingNumber(InvoiceId),

    /// Renderer backend could not be configured.
    #[error("renderer configuration error: {0}")]
    Configuration(String),

    /// Storage operation failed.
    #[error("document storage failed: {0}")]
    Operation(String),
}

impl RenderError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for RenderError {
    fn from(err: opendal::Error) -> Self {
        Self::Operation(err.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<std::fmt::Error> for RenderError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Operation(err.to_string())
    }
}
