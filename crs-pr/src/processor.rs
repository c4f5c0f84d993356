//! Raw record ingestion, scoring and processed-table output
//!
//! **Per record:**
//! 1. Normalize keys (trim, lower-case, spaces → `_`)
//! 2. Read title/description from `title`/`description`, falling back to the
//!    legacy `course title`/`course description` aliases
//! 3. Score against the registry and attach the score columns
//! 4. Collapse newline/tab runs in every string field
//! 5. Drop records with `relevance_score <= 0`
//!
//! **Per corpus:** the processed CSV is only replaced when at least one record
//! qualifies. Empty or missing input never touches the previous output.

use crs_common::layout::{json_files, SchoolDir, Source};
use crs_common::output::write_csv_atomic;
use crs_common::record::{
    collapse_whitespace, normalize_key, processed_columns, value_text, ProcessedRecord,
    COL_DESCRIPTION, COL_TITLE, LEGACY_DESCRIPTION, LEGACY_TITLE, SCORE_COLUMNS,
};
use crs_common::{score, Error, KeywordGroupRegistry, Result};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Records gathered from one raw directory
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    pub records: Vec<Value>,
    pub files_read: usize,
    pub files_skipped: usize,
}

/// Parse one raw JSON file, which must hold a list of records
pub fn parse_batch_file(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::InputParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| Error::InputParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(Error::InputParse {
            path: path.to_path_buf(),
            reason: "not a list of records".to_string(),
        }),
    }
}

/// Load every `*.json` file in `dir`
///
/// Unparseable files are logged and skipped. A missing directory is
/// [`Error::MissingInput`].
pub fn load_raw_batch(dir: &Path) -> Result<RawBatch> {
    let mut batch = RawBatch::default();

    for file in json_files(dir)? {
        match parse_batch_file(&file) {
            Ok(items) => {
                debug!(file = %file.display(), records = items.len(), "Read raw batch file");
                batch.files_read += 1;
                batch.records.extend(items);
            }
            Err(e) if e.is_recoverable() => {
                warn!("{}, skipping", e);
                batch.files_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(batch)
}

fn first_text(fields: &BTreeMap<String, Value>, keys: [&str; 2]) -> String {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .map(value_text)
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
}

/// Score and normalize one raw record
///
/// Incoming fields that collide with a score column are replaced by the
/// computed values.
pub fn process_record(raw: &Map<String, Value>, registry: &KeywordGroupRegistry) -> ProcessedRecord {
    let mut fields: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in raw {
        let key = normalize_key(key);
        if SCORE_COLUMNS.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key, value.clone());
    }

    let title = first_text(&fields, [COL_TITLE, LEGACY_TITLE]);
    let description = first_text(&fields, [COL_DESCRIPTION, LEGACY_DESCRIPTION]);
    let score = score(&title, &description, registry);

    for value in fields.values_mut() {
        if let Value::String(s) = value {
            *s = collapse_whitespace(s);
        }
    }

    ProcessedRecord { fields, score }
}

/// Score a batch and keep only records with a positive relevance score
pub fn process_records(raw: &[Value], registry: &KeywordGroupRegistry) -> Vec<ProcessedRecord> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| match value.as_object() {
            Some(object) => Some(process_record(object, registry)),
            None => {
                warn!(index, "Record is not a JSON object, skipping");
                None
            }
        })
        .filter(|record| record.relevance_score() > 0.0)
        .collect()
}

/// Atomically replace `path` with the processed table
pub fn write_processed_csv(path: &Path, records: &[ProcessedRecord]) -> Result<()> {
    let columns = processed_columns(records);
    let rows = records
        .iter()
        .map(|record| record.cells(&columns))
        .collect::<Result<Vec<_>>>()?;
    write_csv_atomic(path, &columns, rows)
}

/// What happened to one corpus output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// New processed table written
    Written { records: usize, path: PathBuf },
    /// No raw directory or no records in it; previous output untouched
    NoInput,
    /// Records were read but none scored above zero; previous output untouched
    NothingQualified { scanned: usize },
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Written { records, path } => {
                write!(f, "wrote {} records to {}", records, path.display())
            }
            ProcessOutcome::NoInput => write!(f, "no input"),
            ProcessOutcome::NothingQualified { scanned } => {
                write!(f, "none of {} records qualified, kept previous output", scanned)
            }
        }
    }
}

/// Process one raw directory into one processed CSV
pub fn process_source(
    input_dir: &Path,
    output_csv: &Path,
    registry: &KeywordGroupRegistry,
) -> Result<ProcessOutcome> {
    let batch = match load_raw_batch(input_dir) {
        Ok(batch) => batch,
        Err(Error::MissingInput(path)) => {
            info!("No raw JSON directory at {}, skipping", path.display());
            return Ok(ProcessOutcome::NoInput);
        }
        Err(e) => return Err(e),
    };

    if batch.records.is_empty() {
        info!(
            files_read = batch.files_read,
            files_skipped = batch.files_skipped,
            "No records found in {}",
            input_dir.display()
        );
        return Ok(ProcessOutcome::NoInput);
    }

    let scanned = batch.records.len();
    let records = process_records(&batch.records, registry);

    if records.is_empty() {
        warn!(
            scanned,
            "Filtered out everything from {}, keeping previous {}",
            input_dir.display(),
            output_csv.display()
        );
        return Ok(ProcessOutcome::NothingQualified { scanned });
    }

    write_processed_csv(output_csv, &records)?;
    info!(scanned, kept = records.len(), "Wrote {}", output_csv.display());

    Ok(ProcessOutcome::Written {
        records: records.len(),
        path: output_csv.to_path_buf(),
    })
}

/// Per-school result of a processing run
#[derive(Debug)]
pub struct SchoolReport {
    pub school: String,
    pub outcomes: Vec<(Source, Result<ProcessOutcome>)>,
}

impl SchoolReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, r)| matches!(r, Ok(ProcessOutcome::Written { .. })))
            .count()
    }
}

/// Process both corpora of one school
///
/// A failure on one source is logged and does not stop the other.
pub fn process_school(school: &SchoolDir, registry: &KeywordGroupRegistry) -> SchoolReport {
    let outcomes = Source::ALL
        .iter()
        .map(|&source| {
            let result = process_source(&school.raw_dir(source), &school.processed_csv(source), registry);
            match &result {
                Ok(outcome) => info!(school = %school.id(), %source, "{}", outcome),
                Err(e) => error!(school = %school.id(), %source, "Processing failed: {}", e),
            }
            (source, result)
        })
        .collect();

    SchoolReport {
        school: school.id(),
        outcomes,
    }
}

/// Process every school in parallel, sharing one registry
pub fn process_all(schools: &[SchoolDir], registry: &KeywordGroupRegistry) -> Vec<SchoolReport> {
    schools
        .par_iter()
        .map(|school| process_school(school, registry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn registry() -> KeywordGroupRegistry {
        KeywordGroupRegistry::from_json_str(
            r#"{"programming-3": ["python, coding"], "data-1": ["data, statistics"]}"#,
            "{}",
        )
        .unwrap()
    }

    #[test]
    fn test_process_record_reference_example() {
        let raw = json!({
            "Title": "Intro to Python Programming",
            "Description": "covers coding and\n\n  statistics basics",
            "Credit Hours": 3
        });
        let record = process_record(raw.as_object().unwrap(), &registry());

        assert_eq!(record.relevance_score(), 5.5);
        assert_eq!(record.fields["description"], json!("covers coding and statistics basics"));
        assert_eq!(record.fields["credit_hours"], json!(3));
        assert!(!record.fields.contains_key("Title"));
    }

    #[test]
    fn test_legacy_aliases_are_fallbacks() {
        let raw = json!({
            "course title": "Python Lab",
            "course description": "coding practice"
        });
        let record = process_record(raw.as_object().unwrap(), &registry());
        assert!(record.score.matched_groups.contains("programming-3"));
        assert!(record.fields.contains_key("course_title"));

        let raw = json!({
            "title": "",
            "course title": "Statistics",
            "description": "basics"
        });
        let record = process_record(raw.as_object().unwrap(), &registry());
        assert!(record.score.matched_groups.contains("data-1"));
    }

    #[test]
    fn test_list_title_is_searchable() {
        let raw = json!({"title": ["CS 101", "Python"], "description": ""});
        let record = process_record(raw.as_object().unwrap(), &registry());
        assert!(record.score.matched_groups.contains("programming-3"));
    }

    #[test]
    fn test_incoming_score_columns_are_replaced() {
        let raw = json!({"title": "Ceramics", "Relevance Score": 99});
        let record = process_record(raw.as_object().unwrap(), &registry());
        assert!(!record.fields.contains_key("relevance_score"));
        assert_eq!(record.relevance_score(), 0.0);
    }

    #[test]
    fn test_process_records_filters_zero_and_non_objects() {
        let raw = vec![
            json!({"title": "Python", "description": ""}),
            json!({"title": "Ceramics", "description": "clay"}),
            json!("not an object"),
        ];
        let records = process_records(&raw, &registry());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["title"], json!("Python"));
    }

    #[test]
    fn test_parse_batch_file_rejects_non_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("object.json");
        std::fs::write(&path, r#"{"title": "x"}"#).unwrap();
        assert!(matches!(parse_batch_file(&path), Err(Error::InputParse { .. })));

        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(parse_batch_file(&path), Err(Error::InputParse { .. })));
    }

    #[test]
    fn test_load_raw_batch_skips_bad_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.json"), r#"[{"title": "Python"}]"#).unwrap();
        std::fs::write(temp.path().join("b.json"), "not json").unwrap();
        std::fs::write(temp.path().join("c.json"), r#"{"title": "x"}"#).unwrap();
        std::fs::write(temp.path().join("d.json"), r#"[{"title": "Data"}, {"title": "Art"}]"#).unwrap();

        let batch = load_raw_batch(temp.path()).unwrap();
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.files_read, 2);
        assert_eq!(batch.files_skipped, 2);
    }

    #[test]
    fn test_process_source_missing_dir_is_no_input() {
        let temp = TempDir::new().unwrap();
        let outcome = process_source(
            &temp.path().join("raw_data"),
            &temp.path().join("out").join("processed.csv"),
            &registry(),
        )
        .unwrap();
        assert_eq!(outcome, ProcessOutcome::NoInput);
        assert!(!temp.path().join("out").exists());
    }
}
