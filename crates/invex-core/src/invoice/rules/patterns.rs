//! Common regex patterns for invoice text extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Amount shape: grouped thousands or plain digits, two decimals.
macro_rules! amount {
    () => {
        r"(?:\d{1,3}(?:[.,]\d{3})+|\d+)[.,]\d{2}"
    };
}

/// VAT percentage followed by a tax code, e.g. `21%(V1)`.
macro_rules! vat_anchor {
    () => {
        r"\d+[.,]?\d*%\([A-Z0-9]+\)"
    };
}

lazy_static! {
    // Amount tokens, optionally followed by the trailing minus sign.
    // A digit right after the token is rejected by `AmountExtractor`.
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        concat!(amount!(), r"-?")
    ).unwrap();

    pub static ref AMOUNT_TOKEN_EXACT: Regex = Regex::new(
        concat!(r"^", amount!(), r"-?$")
    ).unwrap();

    // VAT anchor marking line-item rows and VAT amount lines
    pub static ref VAT_ANCHOR: Regex = Regex::new(vat_anchor!()).unwrap();

    // Total / subtotal keywords
    pub static ref TOTAL_WORD: Regex = Regex::new(r"(?i)\b(?:sub)?total\b").unwrap();

    pub static ref TOTAL_ONLY_WORD: Regex = Regex::new(r"(?i)\btotal\b").unwrap();

    pub static ref POSITION_TOTAL: Regex = Regex::new(r"(?i)\bposition\s+total\b").unwrap();

    // Whole-document total fallbacks; the second one reads a subtotal
    pub static ref TOTAL_FALLBACKS: Vec<Regex> = vec![
        Regex::new(concat!(r"(?i)\btotal\s*:?\s*(", amount!(), r"-?)")).unwrap(),
        Regex::new(concat!(r"(?i)subtotal\s*\(net\)\s*(", amount!(), r"-?)")).unwrap(),
        Regex::new(concat!(r"(?i)grand\s+total\s*(", amount!(), r"-?)")).unwrap(),
    ];

    // Header fields, each list tried in order
    pub static ref PROJECT_ID: Vec<Regex> = vec![
        Regex::new(r"\b([A-Z]{2}\d{2}-PRO\d{7})\b").unwrap(),
        Regex::new(r"(?:^|[^A-Za-z0-9-])(PRO\d{7})\b").unwrap(),
        Regex::new(r"\b([A-Z]{2}-PRO\d{7})\b").unwrap(),
    ];

    pub static ref INVOICE_NUMBER: Vec<Regex> = vec![
        Regex::new(r"(?i)\binvoice\s+no\.?\s*:?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)\bcredit\s+note\s+no\.?\s*:?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)\binvoice\s+number\s*:?\s*(\d+)").unwrap(),
    ];

    pub static ref CUSTOMER_ID: Vec<Regex> = vec![
        Regex::new(r"(?i)\bcustomer\s+id\s*:?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)\bclient\s+id\s*:?\s*(\d+)").unwrap(),
    ];

    pub static ref INVOICE_DATE: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:\binvoice\s+date|\bdate)\s*:?\s*(\d{2}[./]\d{2}[./]\d{4})").unwrap(),
        Regex::new(r"\b(\d{2}[./]\d{2}[./]\d{4})\b").unwrap(),
    ];

    pub static ref CURRENCY: Vec<Regex> = vec![
        Regex::new(r"(?i:\bcurrency)\s*:?\s*([A-Z]{3})\b").unwrap(),
        Regex::new(r"\b(EUR|USD|GBP)\b").unwrap(),
    ];

    pub static ref VAT_ID: Vec<Regex> = vec![
        Regex::new(
            r"(?i:\bVAT[\s-]*ID|\bBTW)[\s.:#-]*(?:(?i:no|nr|number|nummer)\.?[\s:]*)?((?i:[A-Z0-9]{4,}))"
        ).unwrap(),
    ];

    // Service periods
    pub static ref MONTH_ABBR_YEAR: Regex = Regex::new(
        r"(?i)\b(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)\s*(\d{4})\b"
    ).unwrap();

    pub static ref PERIOD_LABEL: Regex = Regex::new(
        r"(?is)(?:service|provision|period).{0,100}?(?:^|[^\d./])(\d{1,2})[/.](\d{4})\b"
    ).unwrap();

    pub static ref MONTH_YEAR: Regex = Regex::new(
        r"(?:^|[^\d./])(\d{1,2})[/.](\d{4})\b"
    ).unwrap();

    // Line items
    pub static ref LINE_STRUCTURED: Regex = Regex::new(concat!(
        r"^\s*(\d{4})\s+(\d{6})\s+(.+?)\s+(\d+(?:[.,]\d+)?)\s+([A-Za-z][A-Za-z.]{0,9})\s+(",
        vat_anchor!(),
        r")\s+(",
        amount!(),
        r"-?)\s+(",
        amount!(),
        r"-?)\s*$"
    )).unwrap();

    pub static ref LINE_LOOSE: Regex = Regex::new(concat!(
        r"^\s*(\d{4})\b(.*?)(",
        vat_anchor!(),
        r").*?(",
        amount!(),
        r"-?)\s*$"
    )).unwrap();

    pub static ref POSITION_TOKEN: Regex = Regex::new(r"^\d{4}$").unwrap();

    pub static ref MATERIAL_TOKEN: Regex = Regex::new(r"^\d{6}$").unwrap();

    pub static ref QUANTITY_TOKEN: Regex = Regex::new(r"^\d{1,3}(?:[.,]\d{1,3})?$").unwrap();

    pub static ref UNIT_TOKEN: Regex = Regex::new(r"^[A-Za-z]{1,4}\.?$").unwrap();

    pub static ref MATERIAL_PREFIX: Regex = Regex::new(r"^\s*(\d{6})\b").unwrap();

    pub static ref NUMERIC_SUFFIX: Regex = Regex::new(r"[\s\d.,\-]+$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_token_reads_ungrouped_amounts_whole() {
        let found: Vec<&str> = AMOUNT_TOKEN
            .find_iter("1234,56 and 1.234,56- and 12,50EUR")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["1234,56", "1.234,56-", "12,50"]);
    }

    #[test]
    fn test_total_fallback_needs_whole_total_word() {
        assert!(TOTAL_FALLBACKS[0].captures("Subtotal: 5,00").is_none());
        assert_eq!(&TOTAL_FALLBACKS[0].captures("TOTAL: 5,00").unwrap()[1], "5,00");
    }

    #[test]
    fn test_vat_anchor() {
        assert!(VAT_ANCHOR.is_match("Hosting 21%(V1) 100,00"));
        assert!(VAT_ANCHOR.is_match("9,5%(L2)"));
        assert!(!VAT_ANCHOR.is_match("VAT 21% 100,00"));
    }

    #[test]
    fn test_total_word_is_whole_word() {
        assert!(TOTAL_WORD.is_match("Subtotal 10,00"));
        assert!(TOTAL_WORD.is_match("TOTAL: 10,00"));
        assert!(!TOTAL_WORD.is_match("Totals carried forward"));
        assert!(!TOTAL_ONLY_WORD.is_match("Subtotal 10,00"));
    }

    #[test]
    fn test_month_year_ignores_full_dates() {
        assert!(MONTH_YEAR.captures("Date 01.02.2024").is_none());
        assert_eq!(&MONTH_YEAR.captures("for 03/2024").unwrap()[1], "03");
    }
}
