//! Plain-text invoice renderer writing through Apache OpenDAL.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use opendal::{ErrorKind, Operator, services};

use crate::period::BillingPeriod;
use crate::render::InvoiceRenderer;
use crate::render::document::{InvoiceDocument, document_key};
use crate::render::error::RenderError;

/// Renders invoices as plain-text documents under a local directory.
pub struct TextInvoiceRenderer {
    operator: Operator,
    root: PathBuf,
}

impl TextInvoiceRenderer {
    /// Creates a renderer rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the operator
    /// cannot be initialized.
    pub fn local(root: impl AsRef<Path>) -> Result<Self, RenderError> {
        std::fs::create_dir_all(root.as_ref())?;
        let root = std::path::absolute(root.as_ref())?;
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| RenderError::configuration("invalid path"))?,
        );
        let operator = Operator::new(builder)
            .map_err(|e| RenderError::configuration(e.to_string()))?
            .finish();
        Ok(Self { operator, root })
    }

    /// Base directory documents are written under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }

    /// Lays the invoice out as text.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Operation` if formatting fails.
    pub fn layout(doc: &InvoiceDocument, number: &str) -> Result<String, RenderError> {
        let mut out = String::new();
        write_layout(&mut out, doc, number)?;
        Ok(out)
    }
}

fn write_layout(out: &mut String, doc: &InvoiceDocument, number: &str) -> fmt::Result {
    let org = &doc.organization;

    if !org.name.is_empty() {
        writeln!(out, "{}", org.name)?;
    }
    if !org.address.is_empty() {
        writeln!(out, "{}", org.address)?;
    }
    writeln!(out)?;
    writeln!(out, "INVOICE {number}")?;
    writeln!(out, "Period:  {:02}.{}", doc.period.month(), doc.period.year())?;
    writeln!(out, "Date:    {}", doc.issued_on.format("%Y-%m-%d"))?;
    writeln!(out, "Student: {}", doc.student_name)?;
    writeln!(out)?;
    writeln!(out, "{:<3} {:<48} {:>5} {:>10} {:>12}", "#", "Description", "Qty", "Price", "Amount")?;
    for (idx, line) in doc.lines.iter().enumerate() {
        writeln!(
            out,
            "{:<3} {:<48} {:>5} {:>10} {:>12}",
            idx + 1,
            line.description,
            line.qty,
            line.unit_price.to_string(),
            line.amount.to_string()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "TOTAL: {} {}", doc.total, org.currency)
}

#[async_trait]
impl InvoiceRenderer for TextInvoiceRenderer {
    async fn render(&self, doc: &InvoiceDocument) -> Result<String, RenderError> {
        let number = doc
            .number
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(RenderError::MissingNumber(doc.invoice_id))?;

        let key = document_key(doc.period, number);
        let body = Self::layout(doc, number)?;
        self.operator.write(&key, body.into_bytes()).await?;

        let path = self.path_of(&key);
        tracing::debug!(invoice_id = %doc.invoice_id, number, path = %path, "invoice document written");
        Ok(path)
    }

    async fn existing(
        &self,
        period: BillingPeriod,
        number: &str,
    ) -> Result<Option<String>, RenderError> {
        let key = document_key(period, number);
        match self.operator.stat(&key).await {
            Ok(_) => Ok(Some(self.path_of(&key))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
