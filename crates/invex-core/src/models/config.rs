//! Configuration structures for the extraction pipeline.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvexError;

/// Main configuration for invex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Tuning knobs for the extraction heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters after a Total/Subtotal keyword searched for its amount.
    pub total_keyword_window: usize,

    /// Lines below a Total/Subtotal line searched when the line has no amount.
    pub total_lookahead_lines: usize,

    /// Total candidates must exceed this absolute value.
    pub min_total_amount: Decimal,

    /// Line-item candidate lines must be longer than this many characters.
    pub min_candidate_line_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            total_keyword_window: 50,
            total_lookahead_lines: 2,
            min_total_amount: Decimal::ONE,
            min_candidate_line_length: 20,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed concurrently.
    pub jobs: usize,

    /// Keep going when a document fails.
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            continue_on_error: false,
        }
    }
}

impl InvexConfig {
    /// Settings addressable as `section.field`.
    pub const KEYS: [&'static str; 6] = [
        "extraction.total_keyword_window",
        "extraction.total_lookahead_lines",
        "extraction.min_total_amount",
        "extraction.min_candidate_line_length",
        "batch.jobs",
        "batch.continue_on_error",
    ];

    /// Read one setting as text.
    pub fn get(&self, key: &str) -> crate::Result<String> {
        let value = match key {
            "extraction.total_keyword_window" => self.extraction.total_keyword_window.to_string(),
            "extraction.total_lookahead_lines" => self.extraction.total_lookahead_lines.to_string(),
            "extraction.min_total_amount" => self.extraction.min_total_amount.to_string(),
            "extraction.min_candidate_line_length" => {
                self.extraction.min_candidate_line_length.to_string()
            }
            "batch.jobs" => self.batch.jobs.to_string(),
            "batch.continue_on_error" => self.batch.continue_on_error.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Parse `value` as the type of the setting and store it.
    ///
    /// The configuration is left untouched when the key is unknown, the
    /// value does not parse, or the result fails [`InvexConfig::check`].
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let mut updated = self.clone();
        let value = value.trim();

        match key {
            "extraction.total_keyword_window" => {
                updated.extraction.total_keyword_window = parse_value(key, value)?
            }
            "extraction.total_lookahead_lines" => {
                updated.extraction.total_lookahead_lines = parse_value(key, value)?
            }
            "extraction.min_total_amount" => {
                updated.extraction.min_total_amount = parse_value(key, value)?
            }
            "extraction.min_candidate_line_length" => {
                updated.extraction.min_candidate_line_length = parse_value(key, value)?
            }
            "batch.jobs" => updated.batch.jobs = parse_value(key, value)?,
            "batch.continue_on_error" => updated.batch.continue_on_error = parse_value(key, value)?,
            _ => return Err(unknown_key(key)),
        }

        updated.check()?;
        *self = updated;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn check(&self) -> crate::Result<()> {
        if self.batch.jobs == 0 {
            return Err(crate::InvexError::Config(
                "batch.jobs must be at least 1".to_string(),
            ));
        }
        if self.extraction.min_total_amount.is_sign_negative() {
            return Err(crate::InvexError::Config(
                "extraction.min_total_amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> InvexError {
    InvexError::Config(format!(
        "unknown key '{}' (expected one of: {})",
        key,
        InvexConfig::KEYS.join(", ")
    ))
}

fn parse_value<T>(key: &str, value: &str) -> crate::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| InvexError::Config(format!("invalid value '{}' for {}: {}", value, key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{ "extraction": { "total_lookahead_lines": 3 } }"#).unwrap();

        assert_eq!(config.extraction.total_lookahead_lines, 3);
        assert_eq!(config.extraction.total_keyword_window, 50);
        assert_eq!(config.batch.jobs, 4);
    }

    #[test]
    fn test_check_rejects_zero_jobs() {
        let mut config = InvexConfig::default();
        config.batch.jobs = 0;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_every_key_reads_back() {
        let config = InvexConfig::default();
        for key in InvexConfig::KEYS {
            assert!(config.get(key).is_ok(), "{}", key);
        }
        assert_eq!(config.get("extraction.total_keyword_window").unwrap(), "50");
        assert_eq!(config.get("batch.continue_on_error").unwrap(), "false");
    }

    #[test]
    fn test_set_parses_by_field_type() {
        let mut config = InvexConfig::default();

        config.set("extraction.min_total_amount", "2.50").unwrap();
        config.set("batch.continue_on_error", "true").unwrap();
        config.set("extraction.total_lookahead_lines", " 3 ").unwrap();

        assert_eq!(config.extraction.min_total_amount, Decimal::new(250, 2));
        assert!(config.batch.continue_on_error);
        assert_eq!(config.extraction.total_lookahead_lines, 3);
    }

    #[test]
    fn test_set_rejects_bad_input_and_keeps_config() {
        let mut config = InvexConfig::default();

        let err = config.set("extraction.window", "5").unwrap_err();
        assert!(err.to_string().contains("unknown key 'extraction.window'"));

        assert!(config.set("batch.jobs", "many").is_err());
        assert!(config.set("batch.continue_on_error", "yes").is_err());
        assert!(config.set("extraction.min_total_amount", "-1").is_err());
        assert!(config.set("batch.jobs", "0").is_err());

        assert_eq!(config, InvexConfig::default());
    }
}
