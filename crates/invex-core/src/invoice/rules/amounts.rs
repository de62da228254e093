//! Amount parsing for European and English number formats.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_TOKEN;
use super::{ExtractionMatch, FieldExtractor};

/// Amount token extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT_TOKEN
            .find_iter(text)
            .filter(|m| !followed_by_digit(text, m.end()))
            .filter_map(|m| {
                parse_amount(m.as_str()).map(|amount| {
                    ExtractionMatch::new(amount, m.as_str()).with_position(m.start(), m.end())
                })
            })
            .collect()
    }
}

/// Whether a digit directly follows byte offset `end`, as in `1,000`.
pub(crate) fn followed_by_digit(text: &str, end: usize) -> bool {
    text[end..].starts_with(|c: char| c.is_ascii_digit())
}

/// Parse an amount token such as `1.234,56`, `1,234.56` or `1234,56-`.
///
/// A trailing `-` negates the value. When both separators occur, the later
/// one is the decimal point; a lone comma is always a decimal point.
/// Returns `None` when the token holds no digits.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let token = token.trim();
    let (body, negative) = match token.strip_suffix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    let value = parse_leading_decimal(&normalized)?;
    Some(if negative { -value } else { value })
}

/// Parse the longest numeric prefix, stopping at a second decimal point.
fn parse_leading_decimal(s: &str) -> Option<Decimal> {
    let prefix = match s.match_indices('.').nth(1) {
        Some((second_dot, _)) => &s[..second_dot],
        None => s,
    };

    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let prefix = prefix.trim_end_matches('.');
    if let Some(fraction) = prefix.strip_prefix('.') {
        return Decimal::from_str(&format!("0.{}", fraction)).ok();
    }
    Decimal::from_str(prefix).ok()
}

/// Format an amount the way invoices print it (`1.234,56`, `-` trailing).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{},{}{}", formatted, decimal_part, sign)
}
