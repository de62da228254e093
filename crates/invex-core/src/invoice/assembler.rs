//! Merge header, line items and the resolved total into output records.

use rust_decimal::Decimal;

use crate::models::invoice::{InvoiceHeader, InvoiceRecord, LineItem};

/// Build the output records of one document.
///
/// Every line item receives the same invoice total. Without line items a
/// single header-only record is returned.
pub fn assemble_records(
    header: &InvoiceHeader,
    items: Vec<LineItem>,
    invoice_total: Option<Decimal>,
) -> Vec<InvoiceRecord> {
    if items.is_empty() {
        return vec![InvoiceRecord::header_only(header, invoice_total)];
    }

    items
        .into_iter()
        .map(|mut item| {
            item.extracted_invoice_total = invoice_total;
            InvoiceRecord::from_line_item(header, item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::CostType;
    use std::str::FromStr;

    fn item(position: &str, page: u32, page_total: &str) -> LineItem {
        LineItem {
            position: position.to_string(),
            material: None,
            position_description: "Hosting".to_string(),
            position_quantity: Decimal::ONE,
            unit: None,
            vat: "21%(V1)".to_string(),
            unit_price: Decimal::TEN,
            position_total: Decimal::TEN,
            type_cost: CostType::Internal,
            service_provision_period: "January 2024".to_string(),
            page_number: page,
            extracted_invoice_total: Some(Decimal::from_str(page_total).unwrap()),
        }
    }

    #[test]
    fn test_header_only_record() {
        let header = InvoiceHeader {
            file_name: "empty.pdf".to_string(),
            ..Default::default()
        };
        let records = assemble_records(&header, Vec::new(), Some(Decimal::TEN));

        assert_eq!(records.len(), 1);
        assert!(!records[0].is_line_item());
        assert_eq!(records[0].extracted_invoice_total, Some(Decimal::TEN));
    }

    #[test]
    fn test_total_overwrites_page_local_values() {
        let header = InvoiceHeader {
            vat: Some("NL001".to_string()),
            ..Default::default()
        };
        let total = Decimal::from_str("250.00").unwrap();
        let records = assemble_records(
            &header,
            vec![item("0010", 1, "100.00"), item("0020", 2, "250.00")],
            Some(total),
        );

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.extracted_invoice_total == Some(total)));
        assert_eq!(records[0].position.as_deref(), Some("0010"));
        assert_eq!(records[1].page_number, Some(2));
        assert_eq!(records[0].vat.as_deref(), Some("NL001"));
        assert_eq!(records[0].position_vat.as_deref(), Some("21%(V1)"));
    }
}
