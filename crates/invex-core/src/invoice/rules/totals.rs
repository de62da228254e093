//! Total / subtotal candidate collection and cross-page resolution.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{compare_total_candidates, TotalCandidate, TotalKind};

use super::amounts::{followed_by_digit, parse_amount, AmountExtractor};
use super::patterns::{POSITION_TOTAL, TOTAL_FALLBACKS, TOTAL_ONLY_WORD, TOTAL_WORD, VAT_ANCHOR};
use super::{ExtractionMatch, FieldExtractor};

/// Whether a line is a Total/Subtotal line (column headers excluded).
///
/// Line-item parsing stops at the first such line on a page.
pub fn is_total_line(line: &str) -> bool {
    TOTAL_WORD.is_match(line) && !POSITION_TOTAL.is_match(line)
}

/// Whether a line carries a VAT percentage with tax code.
pub fn is_vat_line(line: &str) -> bool {
    VAT_ANCHOR.is_match(line)
}

/// Scans pages for total and subtotal amounts.
#[derive(Debug, Clone)]
pub struct TotalScanner {
    /// Characters after the keyword searched on the same line.
    keyword_window: usize,
    /// Lines searched below a keyword line without an amount.
    lookahead_lines: usize,
    /// Amounts must exceed this absolute value.
    min_amount: Decimal,
}

impl TotalScanner {
    /// Create a scanner with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a scanner from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            keyword_window: config.total_keyword_window,
            lookahead_lines: config.total_lookahead_lines,
            min_amount: config.min_total_amount,
        }
    }

    /// Set the same-line search window.
    pub fn with_keyword_window(mut self, chars: usize) -> Self {
        self.keyword_window = chars;
        self
    }

    /// Set how many following lines are searched.
    pub fn with_lookahead_lines(mut self, lines: usize) -> Self {
        self.lookahead_lines = lines;
        self
    }

    /// Set the noise floor for amounts.
    pub fn with_min_amount(mut self, amount: Decimal) -> Self {
        self.min_amount = amount;
        self
    }

    /// Collect the total candidates of one page, in line order.
    pub fn scan_page(&self, page_text: &str, page_number: u32) -> Vec<TotalCandidate> {
        let lines: Vec<&str> = page_text.lines().collect();
        let mut candidates = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if !is_total_line(line) || is_vat_line(line) {
                continue;
            }
            let Some(keyword) = TOTAL_WORD.find(line) else {
                continue;
            };

            let found = self.amount_after_keyword(line, keyword.end()).or_else(|| {
                let following = &lines[index + 1..lines.len().min(index + 1 + self.lookahead_lines)];
                self.amount_in_following_lines(following)
            });

            let Some(found) = found else {
                trace!(page = page_number, line = *line, "total line without amount");
                continue;
            };

            let kind = if TOTAL_ONLY_WORD.is_match(line) && !line.to_lowercase().contains("subtotal") {
                TotalKind::Total
            } else {
                TotalKind::Subtotal
            };

            debug!(
                page = page_number,
                amount = %found.value,
                token = %found.source,
                ?kind,
                line = line.trim(),
                "total candidate"
            );
            candidates.push(TotalCandidate::new(found.value, page_number, line.trim(), kind));
        }

        candidates
    }

    fn amount_after_keyword(&self, line: &str, keyword_end: usize) -> Option<ExtractionMatch<Decimal>> {
        let rest = &line[keyword_end..];
        let end = rest
            .char_indices()
            .nth(self.keyword_window)
            .map_or(rest.len(), |(i, _)| i);

        self.largest_qualifying(AmountExtractor::new().extract_all(&rest[..end]))
    }

    fn amount_in_following_lines(&self, lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
        let extractor = AmountExtractor::new();
        let matches = lines
            .iter()
            .filter(|line| !is_vat_line(line))
            .flat_map(|line| extractor.extract_all(line))
            .collect();

        self.largest_qualifying(matches)
    }

    /// Largest amount by absolute value above the noise floor; first wins ties.
    fn largest_qualifying(
        &self,
        matches: Vec<ExtractionMatch<Decimal>>,
    ) -> Option<ExtractionMatch<Decimal>> {
        matches
            .into_iter()
            .filter(|m| m.value.abs() > self.min_amount)
            .fold(None, |best: Option<ExtractionMatch<Decimal>>, m| match best {
                Some(b) if b.value.abs() >= m.value.abs() => Some(b),
                _ => Some(m),
            })
    }
}

impl Default for TotalScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the authoritative total from all pages' candidates.
pub fn select_invoice_total(candidates: &[TotalCandidate]) -> Option<TotalCandidate> {
    let mut pool = candidates.to_vec();
    pool.sort_by(compare_total_candidates);
    pool.into_iter().next()
}

/// Coarse whole-document search used when no page produced a candidate.
///
/// Every fallback pattern is matched on every page; the last nonzero match
/// in document order (page, then byte offset) wins. A `Subtotal (Net)` match
/// is recorded as a subtotal.
pub fn fallback_total<S: AsRef<str>>(pages: &[S]) -> Option<TotalCandidate> {
    let mut last: Option<((usize, usize), TotalCandidate)> = None;

    for (page_index, page) in pages.iter().enumerate() {
        let page = page.as_ref();

        for (pattern_index, pattern) in TOTAL_FALLBACKS.iter().enumerate() {
            let kind = if pattern_index == 1 {
                TotalKind::Subtotal
            } else {
                TotalKind::Total
            };

            for caps in pattern.captures_iter(page) {
                let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if followed_by_digit(page, token.end()) {
                    continue;
                }
                let Some(amount) = parse_amount(token.as_str()).filter(|a| !a.is_zero()) else {
                    continue;
                };

                let offset = (page_index, whole.start());
                if last.as_ref().is_none_or(|(seen, _)| offset >= *seen) {
                    let candidate =
                        TotalCandidate::new(amount, page_index as u32 + 1, whole.as_str(), kind);
                    last = Some((offset, candidate));
                }
            }
        }
    }

    last.map(|(_, candidate)| candidate)
}

/// Resolve one invoice total from pooled candidates, or the text fallback.
pub fn resolve_invoice_total<S: AsRef<str>>(
    candidates: &[TotalCandidate],
    pages: &[S],
) -> Option<TotalCandidate> {
    if candidates.is_empty() {
        let fallback = fallback_total(pages);
        debug!(found = fallback.is_some(), "no total candidates, used document fallback");
        return fallback;
    }
    select_invoice_total(candidates)
}
