//! Page-by-page invoice parser.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::document::InvoiceDocument;
use crate::models::invoice::*;

use super::assembler::assemble_records;
use super::rules::{
    classify_cost, extract_header, resolve_invoice_total, resolve_service_period,
    totals::select_invoice_total, LineItemParser, LineStrategy, TotalScanner,
};
use super::Result;

/// Result of invoice extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Document header.
    pub header: InvoiceHeader,
    /// Output records, page order then line order.
    pub records: Vec<InvoiceRecord>,
    /// The total stamped onto every record.
    pub total: Option<TotalCandidate>,
    /// Per-page diagnostics.
    pub pages: Vec<PageSummary>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// What was found on a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page_number: u32,
    pub service_period: String,
    pub total_candidates: Vec<TotalCandidate>,
    /// Strategy that produced this page's line items.
    pub strategy: Option<LineStrategy>,
    pub attempted_strategies: Vec<LineStrategy>,
    pub candidate_lines: usize,
    pub line_items: usize,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse an invoice from its page texts.
    fn parse(&self, document: &InvoiceDocument) -> Result<ExtractionResult>;
}

/// Heuristic parser running header, period, total and line item rules.
#[derive(Debug, Clone, Default)]
pub struct PageInvoiceParser {
    totals: TotalScanner,
    line_items: LineItemParser,
}

impl PageInvoiceParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            totals: TotalScanner::from_config(config),
            line_items: LineItemParser::from_config(config),
        }
    }

    /// Replace the total scanner.
    pub fn with_total_scanner(mut self, scanner: TotalScanner) -> Self {
        self.totals = scanner;
        self
    }

    /// Replace the line item parser.
    pub fn with_line_item_parser(mut self, parser: LineItemParser) -> Self {
        self.line_items = parser;
        self
    }

    fn parse_page(&self, text: &str, page_number: u32) -> (Vec<LineItem>, PageSummary) {
        let service_period = resolve_service_period(text);
        let total_candidates = self.totals.scan_page(text, page_number);
        let page_total = select_invoice_total(&total_candidates).map(|c| c.amount);
        let extraction = self.line_items.parse_page(text);

        let items: Vec<LineItem> = extraction
            .items
            .into_iter()
            .map(|line| LineItem {
                type_cost: classify_cost(&line.description),
                position: line.position,
                material: line.material,
                position_description: line.description,
                position_quantity: line.quantity,
                unit: line.unit,
                vat: line.vat,
                unit_price: line.unit_price,
                position_total: line.total,
                service_provision_period: service_period.clone(),
                page_number,
                extracted_invoice_total: page_total,
            })
            .collect();

        debug!(
            page = page_number,
            period = %service_period,
            candidates = total_candidates.len(),
            items = items.len(),
            "parsed page"
        );

        let summary = PageSummary {
            page_number,
            service_period,
            total_candidates,
            strategy: extraction.strategy,
            attempted_strategies: extraction.attempted,
            candidate_lines: extraction.candidate_lines,
            line_items: items.len(),
        };

        (items, summary)
    }
}

impl InvoiceParser for PageInvoiceParser {
    fn parse(&self, document: &InvoiceDocument) -> Result<ExtractionResult> {
        document.validate()?;

        info!(
            file = %document.file_name,
            pages = document.page_count(),
            "Parsing invoice"
        );

        let header = extract_header(&document.file_name, &document.full_text());

        let mut items = Vec::new();
        let mut pages = Vec::with_capacity(document.page_count());
        for (index, text) in document.pages.iter().enumerate() {
            let (page_items, summary) = self.parse_page(text, index as u32 + 1);
            items.extend(page_items);
            pages.push(summary);
        }

        let candidates: Vec<TotalCandidate> = pages
            .iter()
            .flat_map(|p| p.total_candidates.iter().cloned())
            .collect();
        let total = resolve_invoice_total(&candidates, &document.pages);

        let mut warnings = Vec::new();
        if header.invoice_number.is_none() {
            warnings.push("Could not extract invoice number".to_string());
        }
        if header.project_id.is_none() {
            warnings.push("Could not extract project id".to_string());
        }
        if total.is_none() {
            warnings.push("Could not resolve invoice total".to_string());
        }
        if items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }

        let records = assemble_records(&header, items, total.as_ref().map(|t| t.amount));

        debug!(
            file = %document.file_name,
            records = records.len(),
            total = ?total.as_ref().map(|t| t.amount),
            "Extracted invoice"
        );

        Ok(ExtractionResult {
            header,
            records,
            total,
            pages,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const PAGE_ONE: &str = r#"ACME Cloud Services B.V.
VAT ID: NL123456789B01
Invoice No. 90012345
Customer ID: 4711
Invoice Date: 05.02.2024
Project DE12-PRO1234567
Service period JAN 2024
Pos Material Description Qty Unit VAT Price Position Total
0010 123456 Application hosting 2 PC 21%(V1) 1.000,00 2.000,00
0020 234567 Consultant services 10 H 21%(V1) 95,00 950,00
Subtotal (Net) 2.950,00
"#;

    const PAGE_TWO: &str = r#"Invoice No. 90012345 page 2
Service Provision Period: 02/2024
0030 345678 Infrastructure monitoring 1 PC 21%(V1) 300,00 300,00
Subtotal (Net) 300,00
VAT 21%(V1) 682,50
Total 3.932,50
"#;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn document() -> InvoiceDocument {
        InvoiceDocument::new("acme.pdf", vec![PAGE_ONE.to_string(), PAGE_TWO.to_string()])
    }

    #[test]
    fn test_parse_two_page_invoice() {
        let result = PageInvoiceParser::new().parse(&document()).unwrap();

        assert_eq!(result.header.invoice_number.as_deref(), Some("90012345"));
        assert_eq!(result.header.month_of_invoice.as_deref(), Some("February"));
        assert_eq!(result.records.len(), 3);

        let total = result.total.unwrap();
        assert_eq!(total.amount, dec("3932.50"));
        assert_eq!(total.kind, TotalKind::Total);
        assert_eq!(total.page_number, 2);

        let periods: Vec<_> = result
            .records
            .iter()
            .map(|r| r.service_provision_period.clone().unwrap())
            .collect();
        assert_eq!(periods, vec!["January 2024", "January 2024", "February 2024"]);

        let types: Vec<_> = result.records.iter().map(|r| r.type_cost.unwrap()).collect();
        assert_eq!(types, vec![CostType::Internal, CostType::External, CostType::Internal]);

        assert!(result
            .records
            .iter()
            .all(|r| r.extracted_invoice_total == Some(dec("3932.50"))));
    }

    #[test]
    fn test_page_summaries() {
        let result = PageInvoiceParser::new().parse(&document()).unwrap();

        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[0].strategy, Some(LineStrategy::Structured));
        assert_eq!(result.pages[0].line_items, 2);
        assert_eq!(result.pages[0].total_candidates.len(), 1);
        assert_eq!(result.pages[1].total_candidates.len(), 2);
    }

    #[test]
    fn test_header_only_when_no_items() {
        let doc = InvoiceDocument::new(
            "summary.pdf",
            vec!["Invoice No. 77\nMonthly fee\nTotal 1.234,56".to_string()],
        );
        let result = PageInvoiceParser::new().parse(&doc).unwrap();

        assert_eq!(result.records.len(), 1);
        assert!(!result.records[0].is_line_item());
        assert_eq!(result.records[0].extracted_invoice_total, Some(dec("1234.56")));
        assert!(result.warnings.contains(&"Could not extract line items".to_string()));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let doc = InvoiceDocument::new("empty.pdf", Vec::new());
        let err = PageInvoiceParser::new().parse(&doc).unwrap_err();
        assert!(err.to_string().contains("empty.pdf"));
    }

    #[test]
    fn test_config_changes_candidate_filter() {
        let config = ExtractionConfig {
            min_candidate_line_length: 200,
            ..Default::default()
        };
        let result = PageInvoiceParser::from_config(&config).parse(&document()).unwrap();

        assert_eq!(result.records.len(), 1);
        assert!(!result.records[0].is_line_item());
    }

    #[test]
    fn test_replaced_components() {
        let parser = PageInvoiceParser::new()
            .with_total_scanner(TotalScanner::new().with_min_amount(dec("5000")))
            .with_line_item_parser(LineItemParser::new().with_min_line_length(200));
        let result = parser.parse(&document()).unwrap();

        assert!(result.pages.iter().all(|p| p.total_candidates.is_empty()));
        assert_eq!(result.records.len(), 1);

        // Document fallback: the last nonzero total in reading order
        let total = result.total.unwrap();
        assert_eq!(total.amount, dec("3932.50"));
        assert_eq!(total.kind, TotalKind::Total);
        assert_eq!(total.page_number, 2);
    }
}
