//! Relational flattening of processed tables
//!
//! Each processed row becomes one `relevance_scores` row plus one row per
//! matched keyword, matched group and keyword frequency, all keyed by
//! `course_id = "<school>__<row index>"`.

use crs_common::layout::Source;
use crs_common::output::{read_csv_rows, write_csv_atomic, Row};
use crs_common::record::{decode_frequencies, split_list, COL_KEYWORD_FREQUENCIES, COL_MATCHED_GROUPS, COL_MATCHED_KEYWORDS, COL_RELEVANCE_SCORE};
use crs_common::{Error, Result, SchoolDir};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// The four relational tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    RelevanceScores,
    KeywordMatches,
    GroupMatches,
    KeywordFrequencies,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::RelevanceScores,
        Relation::KeywordMatches,
        Relation::GroupMatches,
        Relation::KeywordFrequencies,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Relation::RelevanceScores => "relevance_scores.csv",
            Relation::KeywordMatches => "keyword_matches.csv",
            Relation::GroupMatches => "group_matches.csv",
            Relation::KeywordFrequencies => "keyword_frequencies.csv",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Relation::RelevanceScores => &["school", "course_id", "relevance_score"],
            Relation::KeywordMatches => &["school", "course_id", "keyword"],
            Relation::GroupMatches => &["school", "course_id", "group"],
            Relation::KeywordFrequencies => &["school", "course_id", "keyword", "count"],
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name().trim_end_matches(".csv"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceRow {
    pub school: String,
    pub course_id: String,
    /// Cell passed through verbatim; empty when the column is absent
    pub relevance_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRow {
    pub school: String,
    pub course_id: String,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub school: String,
    pub course_id: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRow {
    pub school: String,
    pub course_id: String,
    pub keyword: String,
    pub count: u64,
}

/// Flattened tables for one or more schools
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    pub relevance: Vec<RelevanceRow>,
    pub keywords: Vec<KeywordRow>,
    pub groups: Vec<GroupRow>,
    pub frequencies: Vec<FrequencyRow>,
}

impl Relations {
    pub fn append(&mut self, mut other: Relations) {
        self.relevance.append(&mut other.relevance);
        self.keywords.append(&mut other.keywords);
        self.groups.append(&mut other.groups);
        self.frequencies.append(&mut other.frequencies);
    }

    pub fn len(&self, relation: Relation) -> usize {
        match relation {
            Relation::RelevanceScores => self.relevance.len(),
            Relation::KeywordMatches => self.keywords.len(),
            Relation::GroupMatches => self.groups.len(),
            Relation::KeywordFrequencies => self.frequencies.len(),
        }
    }

    /// CSV cells of one relation, in row order
    pub fn cells(&self, relation: Relation) -> Vec<Vec<String>> {
        match relation {
            Relation::RelevanceScores => self
                .relevance
                .iter()
                .map(|r| vec![r.school.clone(), r.course_id.clone(), r.relevance_score.clone()])
                .collect(),
            Relation::KeywordMatches => self
                .keywords
                .iter()
                .map(|r| vec![r.school.clone(), r.course_id.clone(), r.keyword.clone()])
                .collect(),
            Relation::GroupMatches => self
                .groups
                .iter()
                .map(|r| vec![r.school.clone(), r.course_id.clone(), r.group.clone()])
                .collect(),
            Relation::KeywordFrequencies => self
                .frequencies
                .iter()
                .map(|r| {
                    vec![
                        r.school.clone(),
                        r.course_id.clone(),
                        r.keyword.clone(),
                        r.count.to_string(),
                    ]
                })
                .collect(),
        }
    }
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Flatten one school's processed rows
pub fn flatten(school: &str, rows: &[Row]) -> Relations {
    let mut relations = Relations::default();

    for (index, row) in rows.iter().enumerate() {
        let course_id = format!("{}__{}", school, index);

        relations.relevance.push(RelevanceRow {
            school: school.to_string(),
            course_id: course_id.clone(),
            relevance_score: cell(row, COL_RELEVANCE_SCORE).to_string(),
        });

        relations
            .keywords
            .extend(split_list(cell(row, COL_MATCHED_KEYWORDS)).map(|keyword| KeywordRow {
                school: school.to_string(),
                course_id: course_id.clone(),
                keyword: keyword.to_string(),
            }));

        relations
            .groups
            .extend(split_list(cell(row, COL_MATCHED_GROUPS)).map(|group| GroupRow {
                school: school.to_string(),
                course_id: course_id.clone(),
                group: group.to_string(),
            }));

        match decode_frequencies(cell(row, COL_KEYWORD_FREQUENCIES)) {
            Some(frequencies) => {
                relations
                    .frequencies
                    .extend(frequencies.into_iter().map(|(keyword, count)| FrequencyRow {
                        school: school.to_string(),
                        course_id: course_id.clone(),
                        keyword,
                        count,
                    }))
            }
            None => debug!(course_id = %course_id, "Skipping unreadable keyword frequencies"),
        }
    }

    relations
}

/// Read every school's processed table for `source`
///
/// Schools without a table are skipped; an unreadable table is logged and
/// skipped. Tables come back in school order.
pub fn read_tables(schools: &[SchoolDir], source: Source) -> Vec<(String, Vec<Row>)> {
    let tables: Vec<Option<(String, Vec<Row>)>> = schools
        .par_iter()
        .map(|school| {
            let path = school.processed_csv(source);
            match read_csv_rows(&path) {
                Ok(rows) => Some((school.name.clone(), rows)),
                Err(Error::MissingInput(_)) => None,
                Err(e) => {
                    warn!(school = %school.id(), "Skipping unreadable {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    tables.into_iter().flatten().collect()
}

/// Flatten every school's processed table for `source`
///
/// Returns `None` when no school has a processed table at all.
pub fn flatten_all(schools: &[SchoolDir], source: Source) -> Option<Relations> {
    let tables = read_tables(schools, source);
    if tables.is_empty() {
        return None;
    }

    let mut relations = Relations::default();
    for (school, rows) in &tables {
        relations.append(flatten(school, rows));
    }
    info!(
        tables = tables.len(),
        courses = relations.relevance.len(),
        "Flattened {} processed tables",
        source
    );
    Some(relations)
}

/// Output directory for a source: web tables at the top, pdf in `pdf/`
pub fn output_dir(base: &Path, source: Source) -> PathBuf {
    match source {
        Source::Web => base.to_path_buf(),
        Source::Pdf => base.join("pdf"),
    }
}

/// Write each relation atomically and independently
///
/// A failed relation is logged and returned as an error; its previous file
/// is left untouched and the remaining relations are still written.
pub fn write_relations(relations: &Relations, out_dir: &Path) -> Vec<(Relation, Result<PathBuf>)> {
    Relation::ALL
        .iter()
        .map(|&relation| {
            let path = out_dir.join(relation.file_name());
            let header: Vec<String> = relation.header().iter().map(|c| c.to_string()).collect();

            let result = write_csv_atomic(&path, &header, relations.cells(relation)).map(|_| path);
            match &result {
                Ok(path) => info!(rows = relations.len(relation), "Wrote {}", path.display()),
                Err(e) => error!("Failed to write {}: {}", relation, e),
            }
            (relation, result)
        })
        .collect()
}
