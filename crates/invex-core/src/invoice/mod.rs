//! Invoice field extraction module.

mod assembler;
mod parser;
pub mod rules;

pub use assembler::assemble_records;
pub use parser::{ExtractionResult, InvoiceParser, PageInvoiceParser, PageSummary};

use crate::error::DocumentError;
use crate::models::document::InvoiceDocument;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Extract the records of one invoice with default settings.
pub fn extract_invoice(file_name: &str, pages: Vec<String>) -> Result<Vec<InvoiceRecord>> {
    let document = InvoiceDocument::new(file_name, pages);
    PageInvoiceParser::new()
        .parse(&document)
        .map(|result| result.records)
}
