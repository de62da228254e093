//! Invoice data models: header, total candidates, line items and output records.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel service period when no period could be found on a page.
pub const UNKNOWN_PERIOD: &str = "Unknown Period";

/// Document-level invoice metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceHeader {
    /// Source file name.
    pub file_name: String,

    /// Project / WBS identifier.
    pub project_id: Option<String>,

    /// Invoice or credit note number.
    pub invoice_number: Option<String>,

    /// Customer or client number.
    pub customer_id: Option<String>,

    /// Issue date as printed (`DD.MM.YYYY` or `DD/MM/YYYY`).
    pub date_of_invoice: Option<String>,

    /// Full month name derived from the issue date.
    pub month_of_invoice: Option<String>,

    /// ISO currency code.
    pub currency: Option<String>,

    /// Supplier VAT identifier.
    pub vat: Option<String>,

    /// Whether the document reads as a credit note.
    pub credit_note: bool,
}

/// Kind of total line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TotalKind {
    Total,
    Subtotal,
}

impl TotalKind {
    /// Selection priority; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            TotalKind::Total => 1,
            TotalKind::Subtotal => 2,
        }
    }
}

/// An amount found next to a Total/Subtotal keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCandidate {
    /// Signed amount.
    pub amount: Decimal,
    /// 1-indexed page the line was found on.
    pub page_number: u32,
    /// The keyword line, for diagnostics.
    pub source_line: String,
    pub kind: TotalKind,
    pub priority: u8,
}

impl TotalCandidate {
    pub fn new(amount: Decimal, page_number: u32, source_line: impl Into<String>, kind: TotalKind) -> Self {
        Self {
            amount,
            page_number,
            source_line: source_line.into(),
            kind,
            priority: kind.priority(),
        }
    }
}

/// Order total candidates from most to least authoritative.
///
/// Totals come before subtotals; within a priority the later page comes
/// first. Equal keys keep their scan order when used with a stable sort.
pub fn compare_total_candidates(a: &TotalCandidate, b: &TotalCandidate) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.page_number.cmp(&a.page_number))
}

/// Cost bucket of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostType {
    Internal,
    External,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Four-digit position number, leading zeros kept.
    pub position: String,

    /// Six-digit material number.
    pub material: Option<String>,

    pub position_description: String,

    /// Never negative; credit notes sign the amounts instead.
    pub position_quantity: Decimal,

    pub unit: Option<String>,

    /// VAT percentage and code token, e.g. `21%(V1)`.
    pub vat: String,

    pub unit_price: Decimal,

    pub position_total: Decimal,

    pub type_cost: CostType,

    pub service_provision_period: String,

    /// 1-indexed source page.
    pub page_number: u32,

    /// Invoice total; page-local until the document is assembled.
    pub extracted_invoice_total: Option<Decimal>,
}

/// Flat output record: header fields merged with one line item.
///
/// Header-only records leave every line-item field empty. The header's
/// `vat` takes the shared name; the line's VAT token is `positionVat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub file_name: String,
    pub project_id: Option<String>,
    pub invoice_number: Option<String>,
    pub customer_id: Option<String>,
    pub date_of_invoice: Option<String>,
    pub month_of_invoice: Option<String>,
    pub currency: Option<String>,
    pub vat: Option<String>,
    pub credit_note: bool,
    pub position: Option<String>,
    pub material: Option<String>,
    pub position_description: Option<String>,
    pub position_quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub position_vat: Option<String>,
    pub unit_price: Option<Decimal>,
    pub position_total: Option<Decimal>,
    pub type_cost: Option<CostType>,
    pub service_provision_period: Option<String>,
    pub page_number: Option<u32>,
    pub extracted_invoice_total: Option<Decimal>,
}

impl InvoiceRecord {
    /// Record for a document without line items.
    pub fn header_only(header: &InvoiceHeader, total: Option<Decimal>) -> Self {
        Self {
            file_name: header.file_name.clone(),
            project_id: header.project_id.clone(),
            invoice_number: header.invoice_number.clone(),
            customer_id: header.customer_id.clone(),
            date_of_invoice: header.date_of_invoice.clone(),
            month_of_invoice: header.month_of_invoice.clone(),
            currency: header.currency.clone(),
            vat: header.vat.clone(),
            credit_note: header.credit_note,
            position: None,
            material: None,
            position_description: None,
            position_quantity: None,
            unit: None,
            position_vat: None,
            unit_price: None,
            position_total: None,
            type_cost: None,
            service_provision_period: None,
            page_number: None,
            extracted_invoice_total: total,
        }
    }

    /// Merge a line item with the header; header fields win.
    pub fn from_line_item(header: &InvoiceHeader, item: LineItem) -> Self {
        Self {
            position: Some(item.position),
            material: item.material,
            position_description: Some(item.position_description),
            position_quantity: Some(item.position_quantity),
            unit: item.unit,
            position_vat: Some(item.vat),
            unit_price: Some(item.unit_price),
            position_total: Some(item.position_total),
            type_cost: Some(item.type_cost),
            service_provision_period: Some(item.service_provision_period),
            page_number: Some(item.page_number),
            ..Self::header_only(header, item.extracted_invoice_total)
        }
    }

    /// Whether this record carries a line item.
    pub fn is_line_item(&self) -> bool {
        self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn candidate(amount: &str, page: u32, kind: TotalKind) -> TotalCandidate {
        TotalCandidate::new(Decimal::from_str(amount).unwrap(), page, "", kind)
    }

    #[test]
    fn test_total_outranks_subtotal_on_any_page() {
        let subtotal = candidate("900.00", 3, TotalKind::Subtotal);
        let total = candidate("100.00", 1, TotalKind::Total);
        assert_eq!(compare_total_candidates(&total, &subtotal), Ordering::Less);
    }

    #[test]
    fn test_later_page_wins_priority_tie() {
        let early = candidate("80.00", 1, TotalKind::Subtotal);
        let late = candidate("120.00", 2, TotalKind::Subtotal);

        let mut pool = vec![early, late.clone()];
        pool.sort_by(compare_total_candidates);
        assert_eq!(pool[0], late);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let header = InvoiceHeader {
            file_name: "a.pdf".to_string(),
            vat: Some("NL001".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(InvoiceRecord::header_only(&header, None)).unwrap();

        assert_eq!(json["fileName"], "a.pdf");
        assert_eq!(json["vat"], "NL001");
        assert!(json["invoiceNumber"].is_null());
        assert!(json["extractedInvoiceTotal"].is_null());
    }
}
