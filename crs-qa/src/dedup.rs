//! Intra-corpus duplicate detection
//!
//! Walks a corpus in order with two seen-sets (primary title, description).
//! A record is flagged on the second and later occurrence of a value; the
//! first occurrence never is. Values are remembered even for flagged rows.

use crs_common::record::value_text;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Title field as stored: one string or a collection of alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleField {
    Single(String),
    Many(Vec<String>),
}

impl TitleField {
    /// Interpret a processed-table title cell
    ///
    /// Bracketed cells are collections: JSON arrays first, then the
    /// `['a', 'b']` list form some scrapers emit.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
            return TitleField::Single(cell.to_string());
        }

        if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
            return TitleField::Many(items.iter().map(value_text).collect());
        }

        let inner = trimmed.trim_start_matches('[').trim_end_matches(']').replace(['\'', '"'], "");
        TitleField::Many(inner.split(',').map(|t| t.trim().to_string()).collect())
    }

    /// First element of a collection, else the title verbatim
    pub fn primary(&self) -> &str {
        match self {
            TitleField::Single(title) => title,
            TitleField::Many(titles) => titles.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Why a record was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    Title,
    Description,
    TitleAndDescription,
}

impl DuplicateReason {
    fn from_flags(title: bool, description: bool) -> Option<Self> {
        match (title, description) {
            (true, true) => Some(DuplicateReason::TitleAndDescription),
            (true, false) => Some(DuplicateReason::Title),
            (false, true) => Some(DuplicateReason::Description),
            (false, false) => None,
        }
    }
}

impl fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateReason::Title => f.write_str("duplicate title"),
            DuplicateReason::Description => f.write_str("duplicate description"),
            DuplicateReason::TitleAndDescription => f.write_str("duplicate title or description"),
        }
    }
}

/// One corpus row as seen by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRow {
    pub title: TitleField,
    pub description: String,
    pub source: String,
}

/// A flagged record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    pub title: String,
    pub description: String,
    pub source: String,
    pub reason: DuplicateReason,
}

impl DuplicateEntry {
    /// First `max_chars` characters of the description
    pub fn description_excerpt(&self, max_chars: usize) -> &str {
        match self.description.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &self.description[..byte_index],
            None => &self.description,
        }
    }
}

/// Streaming duplicate detector
#[derive(Debug, Default)]
pub struct DuplicateScanner {
    seen_titles: HashSet<String>,
    seen_descriptions: HashSet<String>,
}

impl DuplicateScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a row against everything seen so far, then remember it
    pub fn check(&mut self, primary_title: &str, description: &str) -> Option<DuplicateReason> {
        let title_seen = !self.seen_titles.insert(primary_title.to_string());
        let description_seen = !self.seen_descriptions.insert(description.to_string());
        DuplicateReason::from_flags(title_seen, description_seen)
    }
}

/// Flag every repeated title or description in corpus order
pub fn scan_duplicates(rows: &[CorpusRow]) -> Vec<DuplicateEntry> {
    let mut scanner = DuplicateScanner::new();

    rows.iter()
        .filter_map(|row| {
            let primary = row.title.primary();
            scanner.check(primary, &row.description).map(|reason| DuplicateEntry {
                title: primary.to_string(),
                description: row.description.clone(),
                source: row.source.clone(),
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, description: &str) -> CorpusRow {
        CorpusRow {
            title: TitleField::from_cell(title),
            description: description.to_string(),
            source: "catalog".to_string(),
        }
    }

    #[test]
    fn test_second_identical_description_is_flagged() {
        let rows = vec![
            row("HIST 101", "Basic survey of world history"),
            row("HIST 102", "Basic survey of world history"),
        ];
        let dups = scan_duplicates(&rows);

        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].title, "HIST 102");
        assert_eq!(dups[0].reason, DuplicateReason::Description);
        assert!(dups[0].reason.to_string().contains("duplicate description"));
    }

    #[test]
    fn test_first_occurrence_never_flagged() {
        let rows = vec![row("A", "x"), row("B", "y"), row("C", "z")];
        assert!(scan_duplicates(&rows).is_empty());
    }

    #[test]
    fn test_both_reasons_and_later_repeats() {
        let rows = vec![
            row("Data 100", "Intro to data"),
            row("Data 100", "Intro to data"),
            row("Data 100", "Something else"),
            row("Other", "Intro to data"),
        ];
        let dups = scan_duplicates(&rows);

        let reasons: Vec<DuplicateReason> = dups.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DuplicateReason::TitleAndDescription,
                DuplicateReason::Title,
                DuplicateReason::Description
            ]
        );
        assert_eq!(dups[0].reason.to_string(), "duplicate title or description");
    }

    #[test]
    fn test_primary_title_of_collections() {
        assert_eq!(TitleField::from_cell(r#"["CS 101","Intro to CS"]"#).primary(), "CS 101");
        assert_eq!(TitleField::from_cell("['CS 101', 'Intro to CS']").primary(), "CS 101");
        assert_eq!(TitleField::from_cell("[]").primary(), "");
        assert_eq!(TitleField::from_cell("Data, Society").primary(), "Data, Society");
    }

    #[test]
    fn test_collection_titles_share_primary() {
        let rows = vec![
            row(r#"["CS 101","Intro"]"#, "a"),
            row(r#"["CS 101","Intro (online)"]"#, "b"),
        ];
        let dups = scan_duplicates(&rows);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].reason, DuplicateReason::Title);
    }

    #[test]
    fn test_description_excerpt_is_char_safe() {
        let entry = DuplicateEntry {
            title: "t".to_string(),
            description: "éé€ab".to_string(),
            source: String::new(),
            reason: DuplicateReason::Description,
        };
        assert_eq!(entry.description_excerpt(3), "éé€");
        assert_eq!(entry.description_excerpt(100), "éé€ab");
    }
}
