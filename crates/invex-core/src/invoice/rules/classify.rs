//! Keyword classification of cost types and credit notes.

use crate::models::invoice::CostType;

const INTERNAL_KEYWORDS: &[&str] = &["application", "infrastructure"];
const EXTERNAL_KEYWORDS: &[&str] = &["external", "other"];
const EXTERNAL_SERVICE_KEYWORDS: &[&str] = &["consultant", "service", "support"];

const CREDIT_NOTE_KEYWORDS: &[&str] = &[
    "credit note",
    "creditnote",
    "credit memo",
    "refund",
    "return",
    "adjustment",
    "reversal",
];

/// Classify a line item by its description. First matching group wins.
pub fn classify_cost(description: &str) -> CostType {
    let description = description.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| description.contains(k));

    if contains_any(INTERNAL_KEYWORDS) {
        CostType::Internal
    } else if contains_any(EXTERNAL_KEYWORDS) || contains_any(EXTERNAL_SERVICE_KEYWORDS) {
        CostType::External
    } else {
        CostType::Internal
    }
}

/// Whether the document text reads as a credit note.
pub fn is_credit_note(text: &str) -> bool {
    let text = text.to_lowercase();
    CREDIT_NOTE_KEYWORDS.iter().any(|k| text.contains(k))
}
