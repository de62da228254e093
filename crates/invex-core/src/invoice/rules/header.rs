//! Document-level header field extraction.

use tracing::debug;

use crate::models::invoice::InvoiceHeader;

use super::classify::is_credit_note;
use super::dates::month_of_invoice;
use super::first_capture;
use super::patterns::{CURRENCY, CUSTOMER_ID, INVOICE_DATE, INVOICE_NUMBER, PROJECT_ID, VAT_ID};

/// Build the invoice header from the full document text.
pub fn extract_header(file_name: &str, text: &str) -> InvoiceHeader {
    let date_of_invoice = first_capture(&INVOICE_DATE, text);
    let month_of_invoice = date_of_invoice.as_deref().and_then(month_of_invoice);

    let header = InvoiceHeader {
        file_name: file_name.to_string(),
        project_id: first_capture(&PROJECT_ID, text),
        invoice_number: first_capture(&INVOICE_NUMBER, text),
        customer_id: first_capture(&CUSTOMER_ID, text),
        date_of_invoice,
        month_of_invoice,
        currency: first_capture(&CURRENCY, text),
        vat: first_capture(&VAT_ID, text),
        credit_note: is_credit_note(text),
    };

    debug!(
        file = file_name,
        invoice_number = ?header.invoice_number,
        project_id = ?header.project_id,
        credit_note = header.credit_note,
        "extracted header"
    );

    header
}
