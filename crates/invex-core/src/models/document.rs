//! Page-text input documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocumentError;

/// Page separator used by PDF-to-text tools.
pub const FORM_FEED: char = '\u{000C}';

/// Reading-order text of every page of one invoice file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    /// Source file name.
    pub file_name: String,

    /// Page texts, first page first. Lines are newline-separated.
    pub pages: Vec<String>,
}

impl InvoiceDocument {
    /// Create a document from already-split page texts.
    pub fn new(file_name: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            file_name: file_name.into(),
            pages,
        }
    }

    /// Split a form-feed separated text dump into pages.
    ///
    /// The empty page after a trailing form feed is dropped.
    pub fn from_form_feed_text(file_name: impl Into<String>, text: &str) -> Self {
        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self::new(file_name, pages)
    }

    /// Build a document from an untyped page list.
    pub fn from_pages_value(
        file_name: impl Into<String>,
        pages: &Value,
    ) -> Result<Self, DocumentError> {
        let file_name = file_name.into();

        let array = pages.as_array().ok_or_else(|| DocumentError::MalformedPages {
            file_name: file_name.clone(),
            reason: format!("expected an array of page texts, found {}", value_kind(pages)),
        })?;

        let mut texts = Vec::with_capacity(array.len());
        for (index, page) in array.iter().enumerate() {
            match page.as_str() {
                Some(text) => texts.push(text.to_string()),
                None => {
                    return Err(DocumentError::MalformedPages {
                        file_name,
                        reason: format!(
                            "page {} is {}, expected a string",
                            index + 1,
                            value_kind(page)
                        ),
                    });
                }
            }
        }

        Ok(Self::new(file_name, texts))
    }

    /// Parse a `{"fileName": ..., "pages": [...]}` JSON object.
    ///
    /// `default_file_name` is used when the object has no `fileName`.
    pub fn from_json_value(value: &Value, default_file_name: &str) -> Result<Self, DocumentError> {
        let file_name = value
            .get("fileName")
            .and_then(Value::as_str)
            .unwrap_or(default_file_name)
            .to_string();

        match value.get("pages") {
            Some(pages) => Self::from_pages_value(file_name, pages),
            None if value.is_array() => Self::from_pages_value(file_name, value),
            None => Err(DocumentError::MalformedPages {
                file_name,
                reason: "missing \"pages\" field".to_string(),
            }),
        }
    }

    /// Check that the document has something to extract from.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.pages.is_empty() {
            return Err(DocumentError::NoPages {
                file_name: self.file_name.clone(),
            });
        }

        if self.pages.iter().all(|p| p.trim().is_empty()) {
            return Err(DocumentError::NoText {
                file_name: self.file_name.clone(),
                pages: self.pages.len(),
            });
        }

        Ok(())
    }

    /// All pages joined by newlines.
    pub fn full_text(&self) -> String {
        self.pages.join("\n")
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_form_feed_split() {
        let doc = InvoiceDocument::from_form_feed_text("a.pdf", "page one\u{000C}page two\u{000C}");
        assert_eq!(doc.pages, vec!["page one".to_string(), "page two".to_string()]);
    }

    #[test]
    fn test_from_json_value() {
        let value = json!({ "fileName": "inv.pdf", "pages": ["one", "two"] });
        let doc = InvoiceDocument::from_json_value(&value, "fallback.json").unwrap();
        assert_eq!(doc.file_name, "inv.pdf");
        assert_eq!(doc.page_count(), 2);

        let doc = InvoiceDocument::from_json_value(&json!({ "pages": ["x"] }), "fallback.json").unwrap();
        assert_eq!(doc.file_name, "fallback.json");
    }

    #[test]
    fn test_malformed_pages() {
        let err = InvoiceDocument::from_pages_value("bad.pdf", &json!(["ok", 3])).unwrap_err();
        assert!(matches!(err, DocumentError::MalformedPages { .. }));
        assert!(err.to_string().starts_with("bad.pdf:"));

        let err = InvoiceDocument::from_pages_value("bad.pdf", &json!("text")).unwrap_err();
        assert!(err.to_string().contains("found a string"));
    }

    #[test]
    fn test_validate_empty_documents() {
        let err = InvoiceDocument::new("empty.pdf", vec![]).validate().unwrap_err();
        assert_eq!(
            err,
            DocumentError::NoPages {
                file_name: "empty.pdf".to_string()
            }
        );

        let err = InvoiceDocument::new("blank.pdf", vec!["  ".into(), "\n".into()])
            .validate()
            .unwrap_err();
        assert_eq!(err.file_name(), "blank.pdf");
    }
}
