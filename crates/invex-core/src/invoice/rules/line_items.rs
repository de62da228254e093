//! Line item extraction with a cascade of parsing strategies.
//!
//! Only lines above the first Total/Subtotal line of a page are considered,
//! and of those only lines carrying a VAT anchor such as `21%(V1)`. Each
//! strategy runs over all candidate lines of the page; the first strategy
//! that yields any item wins and later ones are not attempted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;

use super::amounts::parse_amount;
use super::patterns::{
    AMOUNT_TOKEN_EXACT, LINE_LOOSE, LINE_STRUCTURED, MATERIAL_PREFIX, MATERIAL_TOKEN, NUMERIC_SUFFIX,
    POSITION_TOKEN, QUANTITY_TOKEN, UNIT_TOKEN, VAT_ANCHOR,
};
use super::totals::is_total_line;

/// A line item as read from one text line, before page context is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub position: String,
    pub material: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub vat: String,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Line parsing strategies, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStrategy {
    /// Fixed columns: position, material, description, quantity, unit, VAT, price, total.
    Structured,
    /// Whitespace tokens located around the position and VAT anchor.
    Tokenized,
    /// Position, VAT anchor and trailing amount only.
    Loose,
}

impl LineStrategy {
    /// Order in which strategies are attempted.
    pub const CASCADE: [LineStrategy; 3] = [
        LineStrategy::Structured,
        LineStrategy::Tokenized,
        LineStrategy::Loose,
    ];

    /// Parse a single candidate line.
    pub fn parse_line(self, line: &str) -> Option<ParsedLine> {
        match self {
            LineStrategy::Structured => parse_structured(line),
            LineStrategy::Tokenized => parse_tokenized(line),
            LineStrategy::Loose => parse_loose(line),
        }
    }
}

/// Outcome of line item extraction on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemExtraction {
    /// Items in line order.
    pub items: Vec<ParsedLine>,
    /// Strategy that produced the items.
    pub strategy: Option<LineStrategy>,
    /// Strategies run, in order.
    pub attempted: Vec<LineStrategy>,
    /// Number of candidate lines on the page.
    pub candidate_lines: usize,
}

/// Per-page line item parser.
#[derive(Debug, Clone)]
pub struct LineItemParser {
    /// Candidate lines must be longer than this many characters.
    min_line_length: usize,
}

impl LineItemParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_line_length: config.min_candidate_line_length,
        }
    }

    /// Set the minimum candidate line length.
    pub fn with_min_line_length(mut self, chars: usize) -> Self {
        self.min_line_length = chars;
        self
    }

    /// Lines above the first total line that look like item rows.
    pub fn candidate_lines<'a>(&self, page_text: &'a str) -> Vec<&'a str> {
        page_text
            .lines()
            .take_while(|line| !is_total_line(line))
            .filter(|line| line.chars().count() > self.min_line_length && VAT_ANCHOR.is_match(line))
            .collect()
    }

    /// Extract the line items of one page.
    pub fn parse_page(&self, page_text: &str) -> LineItemExtraction {
        let lines = self.candidate_lines(page_text);
        let mut attempted = Vec::with_capacity(LineStrategy::CASCADE.len());

        for strategy in LineStrategy::CASCADE {
            attempted.push(strategy);

            let items: Vec<ParsedLine> = lines.iter().filter_map(|line| strategy.parse_line(line)).collect();
            trace!(?strategy, candidates = lines.len(), parsed = items.len(), "line strategy attempted");

            if !items.is_empty() {
                debug!(?strategy, items = items.len(), "line items extracted");
                return LineItemExtraction {
                    items,
                    strategy: Some(strategy),
                    attempted,
                    candidate_lines: lines.len(),
                };
            }
        }

        LineItemExtraction {
            items: Vec::new(),
            strategy: None,
            attempted,
            candidate_lines: lines.len(),
        }
    }
}

impl Default for LineItemParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_structured(line: &str) -> Option<ParsedLine> {
    let caps = LINE_STRUCTURED.captures(line)?;

    Some(ParsedLine {
        position: caps[1].to_string(),
        material: Some(caps[2].to_string()),
        description: caps[3].trim().to_string(),
        quantity: parse_amount(&caps[4])?.abs(),
        unit: Some(caps[5].to_string()),
        vat: caps[6].to_string(),
        unit_price: parse_amount(&caps[7])?,
        total: parse_amount(&caps[8])?,
    })
}

fn parse_tokenized(line: &str) -> Option<ParsedLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let position_idx = tokens.iter().position(|t| POSITION_TOKEN.is_match(t))?;
    let vat_idx = (position_idx + 1..tokens.len()).find(|&i| VAT_ANCHOR.is_match(tokens[i]))?;
    let vat = VAT_ANCHOR.find(tokens[vat_idx])?.as_str().to_string();
    let total = tokens[vat_idx + 1..]
        .iter()
        .find(|t| AMOUNT_TOKEN_EXACT.is_match(t))
        .and_then(|t| parse_amount(t))?;

    let mut desc_start = position_idx + 1;
    let material = if desc_start < vat_idx && MATERIAL_TOKEN.is_match(tokens[desc_start]) {
        desc_start += 1;
        Some(tokens[desc_start - 1].to_string())
    } else {
        None
    };

    let price_idx = Some(vat_idx - 1).filter(|&i| i >= desc_start && AMOUNT_TOKEN_EXACT.is_match(tokens[i]));
    let unit_price = price_idx
        .and_then(|i| parse_amount(tokens[i]))
        .unwrap_or(Decimal::ZERO);
    let desc_end = price_idx.unwrap_or(vat_idx);

    let quantity_idx = (desc_start..desc_end).find(|&i| QUANTITY_TOKEN.is_match(tokens[i]));
    let unit_idx = quantity_idx
        .map(|q| q + 1)
        .filter(|&u| u < desc_end && UNIT_TOKEN.is_match(tokens[u]));

    let quantity = quantity_idx
        .and_then(|i| parse_amount(tokens[i]))
        .map(|q| q.abs())
        .unwrap_or(Decimal::ONE);

    let description = (desc_start..desc_end)
        .filter(|&i| Some(i) != quantity_idx && Some(i) != unit_idx)
        .map(|i| tokens[i])
        .collect::<Vec<_>>()
        .join(" ");

    Some(ParsedLine {
        position: tokens[position_idx].to_string(),
        material,
        description,
        quantity,
        unit: unit_idx.map(|i| tokens[i].to_string()),
        vat,
        unit_price,
        total,
    })
}

fn parse_loose(line: &str) -> Option<ParsedLine> {
    let caps = LINE_LOOSE.captures(line)?;
    let total = parse_amount(&caps[4])?;

    let middle = &caps[2];
    let (material, rest) = match MATERIAL_PREFIX.captures(middle) {
        Some(m) => (Some(m[1].to_string()), &middle[m.get(0).map_or(0, |g| g.end())..]),
        None => (None, middle),
    };
    let description = NUMERIC_SUFFIX
        .replace(rest, "")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim()
        .to_string();

    Some(ParsedLine {
        position: caps[1].to_string(),
        material,
        description,
        quantity: Decimal::ONE,
        unit: None,
        vat: caps[3].to_string(),
        unit_price: total,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const STRUCTURED: &str = "0010 123456 Application hosting 2 PC 21%(V1) 1.000,00 2.000,00";
    const TOKENIZED: &str = "0020 Cloud support 3 h 150,00 21%(V1) 450,00 EUR";
    const LOOSE: &str = "0030: External audit fee 21%(V1) net:1.200,00";

    #[test]
    fn test_structured_line() {
        let item = LineStrategy::Structured.parse_line(STRUCTURED).unwrap();

        assert_eq!(
            item,
            ParsedLine {
                position: "0010".to_string(),
                material: Some("123456".to_string()),
                description: "Application hosting".to_string(),
                quantity: dec("2"),
                unit: Some("PC".to_string()),
                vat: "21%(V1)".to_string(),
                unit_price: dec("1000.00"),
                total: dec("2000.00"),
            }
        );
    }

    #[test]
    fn test_structured_rejects_free_layout() {
        assert_eq!(LineStrategy::Structured.parse_line(TOKENIZED), None);
    }

    #[test]
    fn test_tokenized_line() {
        let item = LineStrategy::Tokenized.parse_line(TOKENIZED).unwrap();

        assert_eq!(item.position, "0020");
        assert_eq!(item.material, None);
        assert_eq!(item.description, "Cloud support");
        assert_eq!(item.quantity, dec("3"));
        assert_eq!(item.unit.as_deref(), Some("h"));
        assert_eq!(item.unit_price, dec("150.00"));
        assert_eq!(item.total, dec("450.00"));
    }

    #[test]
    fn test_tokenized_defaults() {
        let item = LineStrategy::Tokenized
            .parse_line("0040 654321 Managed firewall 21%(V1) 99,00-")
            .unwrap();

        assert_eq!(item.material.as_deref(), Some("654321"));
        assert_eq!(item.description, "Managed firewall");
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert_eq!(item.total, dec("-99.00"));
    }

    #[test]
    fn test_loose_line() {
        assert_eq!(LineStrategy::Tokenized.parse_line(LOOSE), None);

        let item = LineStrategy::Loose.parse_line(LOOSE).unwrap();
        assert_eq!(item.position, "0030");
        assert_eq!(item.description, "External audit fee");
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.unit_price, dec("1200.00"));
        assert_eq!(item.total, dec("1200.00"));
    }

    #[test]
    fn test_loose_strips_material_and_numbers() {
        let item = LineStrategy::Loose
            .parse_line("0050 112233 Storage 500 GB 2 21%(V1)EUR 80,00")
            .unwrap();
        assert_eq!(item.material.as_deref(), Some("112233"));
        assert_eq!(item.description, "Storage 500 GB");
    }

    #[test]
    fn test_candidate_lines_stop_at_total() {
        let page = format!("Pos Mat Description\n{}\nshort 21%(V1)\nTotal 2.000,00\n{}", STRUCTURED, TOKENIZED);
        let parser = LineItemParser::new();

        assert_eq!(parser.candidate_lines(&page), vec![STRUCTURED]);
    }

    #[test]
    fn test_candidate_lines_must_exceed_twenty_chars() {
        let twenty = "0010 A 21%(V1) 10,00";
        let twenty_one = "0010 AB 21%(V1) 10,00";
        assert_eq!(twenty.chars().count(), 20);
        assert_eq!(twenty_one.chars().count(), 21);

        let page = format!("{}\n{}", twenty, twenty_one);
        assert_eq!(LineItemParser::new().candidate_lines(&page), vec![twenty_one]);
    }

    #[test]
    fn test_longer_minimum_line_length() {
        let page = format!("{}\n{}", STRUCTURED, TOKENIZED);
        let parser = LineItemParser::new().with_min_line_length(STRUCTURED.chars().count());

        assert!(parser.candidate_lines(&page).is_empty());
        assert_eq!(parser.parse_page(&page).strategy, None);
    }

    #[test]
    fn test_position_total_header_is_not_a_boundary() {
        let page = format!("Pos Description Qty Position Total\n{}", STRUCTURED);
        assert_eq!(LineItemParser::new().candidate_lines(&page).len(), 1);
    }

    #[test]
    fn test_cascade_stops_at_first_success() {
        let page = format!("{}\n{}", STRUCTURED, TOKENIZED);
        let result = LineItemParser::new().parse_page(&page);

        assert_eq!(result.strategy, Some(LineStrategy::Structured));
        assert_eq!(result.attempted, vec![LineStrategy::Structured]);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.candidate_lines, 2);
    }

    #[test]
    fn test_cascade_falls_through() {
        let result = LineItemParser::new().parse_page(LOOSE);

        assert_eq!(result.strategy, Some(LineStrategy::Loose));
        assert_eq!(result.attempted, LineStrategy::CASCADE.to_vec());
    }

    #[test]
    fn test_page_without_candidates() {
        let result = LineItemParser::new().parse_page("Invoice No. 1\nThank you for your business");

        assert!(result.items.is_empty());
        assert_eq!(result.strategy, None);
        assert_eq!(result.attempted, LineStrategy::CASCADE.to_vec());
        assert_eq!(result.candidate_lines, 0);
    }
}
