//! Course record normalization and processed-table columns
//!
//! Shared by the processor (writing `processed.csv`) and by the QA and
//! relational stages (reading it back).

use crate::scoring::ScoreResult;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Delimiter joining `matched_keywords` and `matched_groups` cells
pub const LIST_DELIMITER: char = ';';

pub const COL_TITLE: &str = "title";
pub const COL_DESCRIPTION: &str = "description";
pub const COL_SOURCE: &str = "source";
pub const COL_RELEVANCE_SCORE: &str = "relevance_score";
pub const COL_MATCHED_KEYWORDS: &str = "matched_keywords";
pub const COL_MATCHED_GROUPS: &str = "matched_groups";
pub const COL_KEYWORD_FREQUENCIES: &str = "keyword_frequencies";

/// Legacy aliases, already in normalized key form
pub const LEGACY_TITLE: &str = "course_title";
pub const LEGACY_DESCRIPTION: &str = "course_description";

/// Columns appended after the passthrough fields, in output order
pub const SCORE_COLUMNS: [&str; 4] = [
    COL_RELEVANCE_SCORE,
    COL_MATCHED_KEYWORDS,
    COL_MATCHED_GROUPS,
    COL_KEYWORD_FREQUENCIES,
];

static CONTROL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r\t]+").expect("control run regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace run regex"));

/// Normalize a field name: trim, lower-case, spaces to underscores
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

/// Collapse newline/tab runs and the whitespace around them to one space
pub fn collapse_whitespace(value: &str) -> String {
    let without_controls = CONTROL_RUN.replace_all(value, " ");
    WHITESPACE_RUN.replace_all(&without_controls, " ").into_owned()
}

/// Text used for scoring from an arbitrary JSON field value
///
/// Collections are joined with spaces so every element is searchable.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// CSV cell for a passthrough field value
///
/// Strings are whitespace-collapsed; collections keep their JSON form so
/// downstream stages can recover the elements.
pub fn value_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => collapse_whitespace(s),
        other => other.to_string(),
    }
}

/// Encode a frequency map as its JSON object string (sorted keys)
pub fn encode_frequencies(frequencies: &BTreeMap<String, u64>) -> Result<String> {
    Ok(serde_json::to_string(frequencies)?)
}

/// Decode a `keyword_frequencies` cell
///
/// Malformed text yields `None`; individual non-integer counts are skipped.
pub fn decode_frequencies(cell: &str) -> Option<BTreeMap<String, u64>> {
    let value: Value = serde_json::from_str(cell.trim()).ok()?;
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .filter_map(|(k, v)| v.as_u64().map(|count| (k.clone(), count)))
            .collect(),
    )
}

/// Split a `;`-joined cell into trimmed, non-empty items
pub fn split_list(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(LIST_DELIMITER).map(str::trim).filter(|s| !s.is_empty())
}

/// Join a sorted set with the list delimiter
pub fn join_list(items: &BTreeSet<String>) -> String {
    let delimiter = LIST_DELIMITER.to_string();
    items.iter().map(String::as_str).collect::<Vec<_>>().join(&delimiter)
}

/// Format a score as a decimal cell
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

/// One scored course record with normalized passthrough fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    /// Normalized key → original value, augmented columns excluded
    pub fields: BTreeMap<String, Value>,
    pub score: ScoreResult,
}

impl ProcessedRecord {
    pub fn relevance_score(&self) -> f64 {
        self.score.relevance_score
    }

    /// Render every column (passthrough then score columns) as CSV cells
    pub fn cells(&self, columns: &[String]) -> Result<Vec<String>> {
        columns.iter().map(|col| self.cell(col)).collect()
    }

    fn cell(&self, column: &str) -> Result<String> {
        let raw = match column {
            COL_RELEVANCE_SCORE => format_score(self.score.relevance_score),
            COL_MATCHED_KEYWORDS => join_list(&self.score.matched_keywords),
            COL_MATCHED_GROUPS => join_list(&self.score.matched_groups),
            COL_KEYWORD_FREQUENCIES => encode_frequencies(&self.score.keyword_frequencies)?,
            other => return Ok(self.fields.get(other).map(value_cell).unwrap_or_default()),
        };
        // Score cells are string fields too and get the same collapse, entries included
        Ok(collapse_whitespace(&raw))
    }
}

/// Header for a set of records: sorted passthrough keys, then score columns
pub fn processed_columns(records: &[ProcessedRecord]) -> Vec<String> {
    let passthrough: BTreeSet<&String> = records.iter().flat_map(|r| r.fields.keys()).collect();
    passthrough
        .into_iter()
        .cloned()
        .chain(SCORE_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Course Title "), "course_title");
        assert_eq!(normalize_key("Credit Hours"), "credit_hours");
        assert_eq!(normalize_key("description"), "description");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Intro\n\n   to\tData"), "Intro to Data");
        assert_eq!(collapse_whitespace("a\r\n b"), "a b");
        assert_eq!(collapse_whitespace("two  spaces"), "two spaces");
        assert_eq!(collapse_whitespace("single space"), "single space");
    }

    #[test]
    fn test_value_text_and_cell() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(["CS 101", "Intro"])), "CS 101 Intro");
        assert_eq!(value_text(&json!(3)), "3");
        assert_eq!(value_cell(&json!(["CS 101", "Intro"])), r#"["CS 101","Intro"]"#);
        assert_eq!(value_cell(&json!("a\n\nb")), "a b");
        assert_eq!(value_cell(&json!(true)), "true");
    }

    #[test]
    fn test_frequencies_round_trip() {
        let mut freqs = BTreeMap::new();
        freqs.insert("python".to_string(), 2u64);
        freqs.insert("données".to_string(), 1u64);

        let encoded = encode_frequencies(&freqs).unwrap();
        assert_eq!(decode_frequencies(&encoded), Some(freqs));
    }

    #[test]
    fn test_decode_frequencies_tolerates_bad_input() {
        assert_eq!(decode_frequencies("not json"), None);
        assert_eq!(decode_frequencies("[1, 2]"), None);
        assert_eq!(decode_frequencies(""), None);

        let partial = decode_frequencies(r#"{"a": 2, "b": "x", "c": -1}"#).unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.get("a"), Some(&2));
    }

    #[test]
    fn test_split_and_join_list() {
        let set: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_list(&set), "a;b");
        assert_eq!(split_list(" a ; ;b;").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_processed_columns_order() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), json!("T"));
        fields.insert("credits".to_string(), json!(3));
        let record = ProcessedRecord {
            fields,
            score: ScoreResult::default(),
        };

        let columns = processed_columns(&[record.clone()]);
        assert_eq!(
            columns,
            vec![
                "credits",
                "title",
                "relevance_score",
                "matched_keywords",
                "matched_groups",
                "keyword_frequencies"
            ]
        );

        let cells = record.cells(&columns).unwrap();
        assert_eq!(cells, vec!["3", "T", "0", "", "", "{}"]);
    }
}
