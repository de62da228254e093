//! Rule-based extractors for invoice text.

pub mod amounts;
pub mod classify;
pub mod dates;
pub mod header;
pub mod line_items;
pub mod patterns;
pub mod period;
pub mod totals;

pub use amounts::{format_amount, parse_amount, AmountExtractor};
pub use classify::{classify_cost, is_credit_note};
pub use dates::month_of_invoice;
pub use header::extract_header;
pub use line_items::{LineItemExtraction, LineItemParser, LineStrategy, ParsedLine};
pub use period::resolve_service_period;
pub use totals::{resolve_invoice_total, TotalScanner};

use regex::Regex;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// First capture group of the first pattern that matches.
pub fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capture_respects_pattern_order() {
        let patterns = vec![
            Regex::new(r"B=(\d+)").unwrap(),
            Regex::new(r"A=(\d+)").unwrap(),
        ];
        assert_eq!(first_capture(&patterns, "A=1 B=2"), Some("2".to_string()));
        assert_eq!(first_capture(&patterns, "A=1"), Some("1".to_string()));
        assert_eq!(first_capture(&patterns, "C=3"), None);
    }
}
