//! Data models for documents, invoices and configuration.

pub mod config;
pub mod document;
pub mod invoice;
