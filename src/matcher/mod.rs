//! Row matcher: decides per-row inclusion and extracts display text.
//!
//! Monitored cells hold free-text status phrases commingled with clock
//! times (e.g. `"No CNG, 14:30"`). The matcher tokenizes each cell on
//! `;`/`,`, throws away time-shaped tokens, and checks the survivors for
//! keyword substrings. Time tokens never trigger a match and a cell that is
//! nothing but a time contributes no text.
//!
//! Keywords, monitored columns and the time pattern are configuration
//! ([`MatchConfig`]), not hardwired logic.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{MatchError, MatchResult};

/// Default keyword set, matched case-insensitively as substrings of tokens.
pub const DEFAULT_KEYWORDS: [&str; 9] = [
    "no cng",
    "no zenput",
    "no dsd",
    "no eod",
    "emailed",
    "missing cng",
    "missing zenput",
    "missing dsd",
    "missing eod",
];

/// Default clock-time shape: 1-2 digits, a colon, exactly 2 digits.
/// The trailing `\b` keeps `14:305` from counting as a time.
pub const DEFAULT_TIME_PATTERN: &str = r"\b\d{1,2}:\d{2}\b";

/// Matcher configuration, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Keyword substrings, checked case-insensitively against tokens
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Source columns whose text triggers inclusion and feeds extraction
    #[serde(default)]
    pub monitored_columns: Vec<String>,

    /// Regex for time-shaped tokens, excluded from matching and extraction
    #[serde(default = "default_time_pattern")]
    pub time_pattern: String,
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_time_pattern() -> String {
    DEFAULT_TIME_PATTERN.to_string()
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            monitored_columns: Vec::new(),
            time_pattern: default_time_pattern(),
        }
    }
}

impl MatchConfig {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> MatchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Result of evaluating one row.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Whether the row qualifies for transfer
    pub included: bool,
    /// Display text per matching monitored column (non-empty values only)
    pub extracted: BTreeMap<String, String>,
}

/// Evaluates rows against a compiled [`MatchConfig`].
#[derive(Debug)]
pub struct Matcher {
    keywords: Vec<String>,
    time_re: Regex,
}

impl Matcher {
    /// Compile a matcher from configuration.
    ///
    /// Keywords are lowercased once here; an invalid time pattern is a
    /// configuration error, not a per-row condition.
    pub fn new(config: &MatchConfig) -> MatchResult<Self> {
        let time_re = Regex::new(&config.time_pattern).map_err(|e| MatchError::InvalidTimePattern {
            pattern: config.time_pattern.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            time_re,
        })
    }

    /// Evaluate one source row against the given monitored columns.
    ///
    /// The row is included iff at least one monitored column matches a
    /// keyword *and* yields non-empty display text. A cell that matches but
    /// extracts nothing (pure time value) contributes nothing; if that
    /// happens for every matching column the row is excluded, not an error.
    pub fn evaluate(&self, row: &Map<String, Value>, monitored: &[String]) -> MatchOutcome {
        let mut extracted = BTreeMap::new();

        for column in monitored {
            let text = match row.get(column).and_then(cell_text) {
                Some(t) => t,
                None => continue, // blank, missing, or malformed cell
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            if self.column_matches(trimmed) && !self.is_pure_time(trimmed) {
                extracted.insert(column.clone(), trimmed.to_string());
            }
        }

        MatchOutcome {
            included: !extracted.is_empty(),
            extracted,
        }
    }

    /// Whether any non-time token of the value contains a keyword.
    fn column_matches(&self, value: &str) -> bool {
        tokenize(value)
            .iter()
            .filter(|token| !self.time_re.is_match(token.as_str()))
            .any(|token| self.keywords.iter().any(|k| token.contains(k.as_str())))
    }

    /// Whether the whole value is a single time token.
    fn is_pure_time(&self, value: &str) -> bool {
        self.time_re
            .find(value)
            .is_some_and(|m| m.start() == 0 && m.end() == value.len())
    }
}

/// Stringify a cell for matching. Unexpected shapes (arrays, objects,
/// nulls) are treated as blank rather than errors.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split a cell value into lowercase tokens on `;` and `,`, trimmed, with
/// empty tokens dropped.
fn tokenize(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split([';', ','])
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matcher() -> Matcher {
        Matcher::new(&MatchConfig::default()).unwrap()
    }

    fn row(cells: Value) -> Map<String, Value> {
        cells.as_object().unwrap().clone()
    }

    fn status_cols() -> Vec<String> {
        vec!["Status".to_string()]
    }

    #[test]
    fn test_blank_monitored_excludes() {
        let m = matcher();
        for cell in [json!(""), json!("   "), Value::Null] {
            let outcome = m.evaluate(&row(json!({ "Status": cell })), &status_cols());
            assert!(!outcome.included);
            assert!(outcome.extracted.is_empty());
        }
    }

    #[test]
    fn test_keyword_match_case_insensitive() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": "MISSING dsd" })), &status_cols());
        assert!(outcome.included);
        assert_eq!(outcome.extracted["Status"], "MISSING dsd");
    }

    #[test]
    fn test_substring_containment_not_whole_token() {
        let m = matcher();
        // "emailed" embedded inside a longer token still matches
        let outcome = m.evaluate(&row(json!({ "Status": "re-emailed manager" })), &status_cols());
        assert!(outcome.included);
    }

    #[test]
    fn test_pure_time_never_matches() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": "14:45" })), &status_cols());
        assert!(!outcome.included);
        assert!(outcome.extracted.is_empty());
    }

    #[test]
    fn test_time_and_keyword_in_same_cell() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": "No CNG, 14:30" })), &status_cols());
        assert!(outcome.included);
        // Extraction keeps the original trimmed value verbatim
        assert_eq!(outcome.extracted["Status"], "No CNG, 14:30");
    }

    #[test]
    fn test_keyword_inside_time_token_is_dropped() {
        let m = matcher();
        // Single token (no separator) that is time-adjacent is dropped
        // whole, so the embedded keyword never counts.
        let outcome = m.evaluate(&row(json!({ "Status": "no cng at 2:15" })), &status_cols());
        assert!(!outcome.included);
    }

    #[test]
    fn test_semicolon_tokenization() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": "ok; no zenput; 9:00" })), &status_cols());
        assert!(outcome.included);
        assert_eq!(outcome.extracted["Status"], "ok; no zenput; 9:00");
    }

    #[test]
    fn test_trailing_digit_is_not_a_time() {
        let m = matcher();
        // "14:305" is not a clock time, so the token survives; it holds no
        // keyword either, so the row stays excluded.
        let outcome = m.evaluate(&row(json!({ "Status": "14:305" })), &status_cols());
        assert!(!outcome.included);
    }

    #[test]
    fn test_whitespace_plus_time_is_excluded() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": "   10:00  " })), &status_cols());
        assert!(!outcome.included);
    }

    #[test]
    fn test_or_across_monitored_columns() {
        let m = matcher();
        let cols = vec!["Morning".to_string(), "Evening".to_string()];
        let outcome = m.evaluate(
            &row(json!({ "Morning": "all good", "Evening": "Missing EOD" })),
            &cols,
        );
        assert!(outcome.included);
        assert_eq!(outcome.extracted.len(), 1);
        assert_eq!(outcome.extracted["Evening"], "Missing EOD");
    }

    #[test]
    fn test_numeric_cell_is_stringified_not_fatal() {
        let m = matcher();
        let outcome = m.evaluate(&row(json!({ "Status": 42 })), &status_cols());
        assert!(!outcome.included);
    }

    #[test]
    fn test_custom_keywords() {
        let config = MatchConfig {
            keywords: vec!["overdue".to_string()],
            ..MatchConfig::default()
        };
        let m = Matcher::new(&config).unwrap();

        assert!(m.evaluate(&row(json!({ "Status": "OVERDUE since Monday" })), &status_cols()).included);
        assert!(!m.evaluate(&row(json!({ "Status": "No CNG" })), &status_cols()).included);
    }

    #[test]
    fn test_invalid_time_pattern() {
        let config = MatchConfig {
            time_pattern: "[".to_string(),
            ..MatchConfig::default()
        };
        assert!(matches!(
            Matcher::new(&config),
            Err(MatchError::InvalidTimePattern { .. })
        ));
    }

    #[test]
    fn test_config_default_keywords() {
        let config = MatchConfig::default();
        assert_eq!(config.keywords.len(), 9);
        assert_eq!(config.keywords[0], "no cng");
        assert_eq!(config.time_pattern, DEFAULT_TIME_PATTERN);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{ "monitored_columns": ["Status"] }"#).unwrap();
        assert_eq!(config.monitored_columns, vec!["Status"]);
        assert_eq!(config.keywords.len(), 9);
    }
}
