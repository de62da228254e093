//! Core library for invoice text extraction.
//!
//! This crate provides:
//! - Amount parsing for European and US number formats
//! - Header field extraction (project id, invoice number, dates, VAT id)
//! - Service period detection and total resolution across pages
//! - Line item parsing with a fallback cascade of strategies
//! - Cost type classification and credit note detection

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{DocumentError, InvexError, Result};
pub use invoice::rules::{classify_cost, format_amount, is_credit_note, parse_amount};
pub use invoice::{extract_invoice, ExtractionResult, InvoiceParser, PageInvoiceParser, PageSummary};
pub use models::config::{BatchConfig, ExtractionConfig, InvexConfig};
pub use models::document::InvoiceDocument;
pub use models::invoice::{
    CostType, InvoiceHeader, InvoiceRecord, LineItem, TotalCandidate, TotalKind, UNKNOWN_PERIOD,
};
