//! WASM bindings for invoice text extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Page texts come in as a JS array of strings; results go out as plain JS
//! objects with camelCase keys and `null` for missing fields.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use invex_core::{
    classify_cost, is_credit_note, parse_amount, DocumentError, ExtractionConfig, InvoiceDocument,
    InvoiceParser, PageInvoiceParser,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract the records of one invoice.
///
/// Takes the source file name and an array of page texts, and returns an
/// array of flat records.
#[wasm_bindgen(js_name = extractInvoice)]
pub fn extract_invoice(file_name: &str, pages: JsValue) -> Result<JsValue, JsValue> {
    InvoiceExtractor::new().extract(file_name, pages)
}

/// Extract one invoice with per-page diagnostics and warnings.
#[wasm_bindgen(js_name = extractInvoiceWithDetails)]
pub fn extract_invoice_with_details(file_name: &str, pages: JsValue) -> Result<JsValue, JsValue> {
    InvoiceExtractor::new().extract_with_details(file_name, pages)
}

/// Parse an amount such as "1.234,56", "1,234.56" or "500,00-".
#[wasm_bindgen(js_name = parseAmount)]
pub fn parse_amount_js(amount: &str) -> Option<f64> {
    parse_amount(amount).and_then(|d| d.to_f64())
}

/// Whether the text reads as a credit note.
#[wasm_bindgen(js_name = detectCreditNote)]
pub fn detect_credit_note(text: &str) -> bool {
    is_credit_note(text)
}

/// Cost type of a line item description, "Internal" or "External".
#[wasm_bindgen(js_name = classifyCost)]
pub fn classify_cost_js(description: &str) -> String {
    format!("{:?}", classify_cost(description))
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    parser: PageInvoiceParser,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: PageInvoiceParser::new(),
        }
    }

    /// Create an extractor from an `extraction` settings object.
    ///
    /// Missing keys take their default values.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<InvoiceExtractor, JsValue> {
        let config: ExtractionConfig = if config.is_undefined() || config.is_null() {
            ExtractionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        Ok(Self {
            parser: PageInvoiceParser::from_config(&config),
        })
    }

    /// Extract the records of one invoice.
    #[wasm_bindgen]
    pub fn extract(&self, file_name: &str, pages: JsValue) -> Result<JsValue, JsValue> {
        let document = document_from_js(file_name, pages)?;
        let result = self.parser.parse(&document).map_err(to_js_error)?;

        for warning in &result.warnings {
            web_sys::console::debug_2(&JsValue::from_str(file_name), &JsValue::from_str(warning));
        }

        to_js(&result.records)
    }

    /// Extract one invoice with per-page diagnostics and warnings.
    #[wasm_bindgen(js_name = extractWithDetails)]
    pub fn extract_with_details(&self, file_name: &str, pages: JsValue) -> Result<JsValue, JsValue> {
        let document = document_from_js(file_name, pages)?;
        let result = self.parser.parse(&document).map_err(to_js_error)?;

        to_js(&result)
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn document_from_js(file_name: &str, pages: JsValue) -> Result<InvoiceDocument, JsValue> {
    if !js_sys::Array::is_array(&pages) {
        return Err(to_js_error(DocumentError::MalformedPages {
            file_name: file_name.to_string(),
            reason: "expected an array of strings".to_string(),
        }));
    }

    let value: serde_json::Value =
        serde_wasm_bindgen::from_value(pages).map_err(|e| JsValue::from_str(&e.to_string()))?;

    InvoiceDocument::from_pages_value(file_name, &value).map_err(to_js_error)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js_error(error: DocumentError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}
