//! Cross-corpus comparison
//!
//! Reads a school's web and pdf processed tables, computes per-corpus
//! statistics (course count, average relevance, duplicates) and the
//! similarity between the two corpora.

use crate::dedup::{scan_duplicates, CorpusRow, DuplicateEntry, TitleField};
use crate::report;
use crs_common::layout::Source;
use crs_common::output::{read_csv_rows, write_string_atomic, Row};
use crs_common::record::{normalize_key, COL_DESCRIPTION, COL_RELEVANCE_SCORE, COL_SOURCE, COL_TITLE, LEGACY_DESCRIPTION, LEGACY_TITLE};
use crs_common::{Error, Result, SchoolDir};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Statistics for one corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub source: Source,
    pub path: PathBuf,
    /// Whether the processed table could be read
    pub found: bool,
    /// Rows with a parseable relevance score
    pub course_count: usize,
    pub avg_relevance: f64,
    pub duplicates: Vec<DuplicateEntry>,
    /// Why the statistics are empty, when they are
    pub notice: Option<String>,
}

impl CorpusStats {
    /// Zero statistics for a corpus that could not be read
    pub fn empty(source: Source, path: &Path, notice: impl Into<String>) -> Self {
        Self {
            source,
            path: path.to_path_buf(),
            found: false,
            course_count: 0,
            avg_relevance: 0.0,
            duplicates: Vec::new(),
            notice: Some(notice.into()),
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} courses, average relevance {:.2}, {} duplicates",
            self.course_count,
            self.avg_relevance,
            self.duplicate_count()
        )
    }
}

/// Cell of the column named `name` (normalized header match)
fn column<'a>(row: &'a Row, name: &str) -> Option<&'a str> {
    row.iter()
        .find(|(key, _)| normalize_key(key) == name)
        .map(|(_, value)| value.as_str())
}

/// First non-blank cell among the `names` aliases
///
/// Mixed-alias tables carry every alias column with blanks where a record
/// used the other key. All-blank gives `Some("")` when any alias column
/// exists, `None` when none does.
fn lookup<'a>(row: &'a Row, names: &[&str]) -> Option<&'a str> {
    let mut present = None;
    for name in names {
        if let Some(value) = column(row, name) {
            if !value.trim().is_empty() {
                return Some(value);
            }
            present.get_or_insert(value);
        }
    }
    present
}

/// Compute corpus statistics from processed-table rows
///
/// Rows without a title column are skipped entirely. Rows whose relevance
/// score does not parse still take part in duplicate detection but are left
/// out of the count and average.
pub fn stats_from_rows(source: Source, path: &Path, rows: &[Row]) -> CorpusStats {
    let mut corpus = Vec::with_capacity(rows.len());
    let mut total = 0.0;
    let mut count = 0usize;

    for row in rows {
        let Some(title) = lookup(row, &[COL_TITLE, LEGACY_TITLE]) else {
            continue;
        };
        let description = lookup(row, &[COL_DESCRIPTION, LEGACY_DESCRIPTION])
            .unwrap_or("")
            .trim()
            .to_string();

        corpus.push(CorpusRow {
            title: TitleField::from_cell(title),
            description,
            source: lookup(row, &[COL_SOURCE]).unwrap_or("").to_string(),
        });

        match lookup(row, &[COL_RELEVANCE_SCORE]).map(|s| s.trim().parse::<f64>()) {
            Some(Ok(relevance)) if relevance.is_finite() => {
                total += relevance;
                count += 1;
            }
            _ => debug!(path = %path.display(), "Row without usable relevance score"),
        }
    }

    CorpusStats {
        source,
        path: path.to_path_buf(),
        found: true,
        course_count: count,
        avg_relevance: if count > 0 { total / count as f64 } else { 0.0 },
        duplicates: scan_duplicates(&corpus),
        notice: None,
    }
}

/// Read one corpus, degrading to zero statistics with a notice
pub fn read_corpus(source: Source, path: &Path) -> CorpusStats {
    match read_csv_rows(path) {
        Ok(rows) => stats_from_rows(source, path, &rows),
        Err(Error::MissingInput(_)) => {
            let notice = format!("{} processed data not found", source.label());
            warn!("{}: {}", notice, path.display());
            CorpusStats::empty(source, path, notice)
        }
        Err(e) => {
            let notice = format!("{} processed data could not be read: {}", source.label(), e);
            warn!("{}", notice);
            CorpusStats::empty(source, path, notice)
        }
    }
}

/// Qualitative similarity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    VeryHigh,
    High,
    Moderate,
    Low,
}

impl SimilarityBand {
    pub fn from_similarity(overall: f64) -> Self {
        if overall > 0.8 {
            SimilarityBand::VeryHigh
        } else if overall > 0.6 {
            SimilarityBand::High
        } else if overall > 0.4 {
            SimilarityBand::Moderate
        } else {
            SimilarityBand::Low
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SimilarityBand::VeryHigh => "VERY HIGH",
            SimilarityBand::High => "HIGH",
            SimilarityBand::Moderate => "MODERATE",
            SimilarityBand::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// Web-versus-pdf comparison metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// web count minus pdf count
    pub count_difference: i64,
    /// web average minus pdf average
    pub score_difference: f64,
    pub count_similarity: f64,
    pub score_similarity: f64,
    pub overall_similarity: f64,
    pub band: SimilarityBand,
}

/// Compare two corpora
pub fn compare(pdf: &CorpusStats, web: &CorpusStats) -> Comparison {
    let count_difference = web.course_count as i64 - pdf.course_count as i64;
    let score_difference = web.avg_relevance - pdf.avg_relevance;

    let max_count = pdf.course_count.max(web.course_count).max(1) as f64;
    let max_score = pdf.avg_relevance.max(web.avg_relevance).max(1.0);

    let count_similarity = (1.0 - count_difference.unsigned_abs() as f64 / max_count).clamp(0.0, 1.0);
    let score_similarity = (1.0 - score_difference.abs() / max_score).clamp(0.0, 1.0);
    let overall_similarity = (count_similarity + score_similarity) / 2.0;

    Comparison {
        count_difference,
        score_difference,
        count_similarity,
        score_similarity,
        overall_similarity,
        band: SimilarityBand::from_similarity(overall_similarity),
    }
}

/// Everything one school's QA report shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub school: String,
    pub pdf: CorpusStats,
    pub web: CorpusStats,
    pub comparison: Comparison,
}

impl ComparisonReport {
    pub fn notices(&self) -> impl Iterator<Item = &str> {
        [&self.pdf, &self.web]
            .into_iter()
            .filter_map(|stats| stats.notice.as_deref())
    }
}

/// Build the comparison report for one school
pub fn compare_school(school: &SchoolDir) -> ComparisonReport {
    let pdf = read_corpus(Source::Pdf, &school.processed_csv(Source::Pdf));
    let web = read_corpus(Source::Web, &school.processed_csv(Source::Web));
    let comparison = compare(&pdf, &web);

    ComparisonReport {
        school: school.id(),
        pdf,
        web,
        comparison,
    }
}

/// Compare one school and write `comparison_report.txt`
pub fn write_school_report(school: &SchoolDir) -> Result<ComparisonReport> {
    let report = compare_school(school);
    let path = school.comparison_report();
    write_string_atomic(&path, &report::render(&report))?;

    info!(
        school = %report.school,
        similarity = %format!("{:.1}%", report.comparison.overall_similarity * 100.0),
        "Wrote {}",
        path.display()
    );
    Ok(report)
}

/// Write reports for every school in parallel; failures are logged per school
pub fn compare_all(schools: &[SchoolDir]) -> Vec<(String, Result<ComparisonReport>)> {
    schools
        .par_iter()
        .map(|school| {
            let result = write_school_report(school);
            if let Err(e) = &result {
                error!(school = %school.id(), "Comparison report failed: {}", e);
            }
            (school.id(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DuplicateReason;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn stats(source: Source, count: usize, avg: f64) -> CorpusStats {
        CorpusStats {
            source,
            path: PathBuf::from("x.csv"),
            found: true,
            course_count: count,
            avg_relevance: avg,
            duplicates: Vec::new(),
            notice: None,
        }
    }

    #[test]
    fn test_identical_corpora_are_fully_similar() {
        let cmp = compare(&stats(Source::Pdf, 10, 4.0), &stats(Source::Web, 10, 4.0));

        assert_eq!(cmp.count_difference, 0);
        assert_eq!(cmp.score_difference, 0.0);
        assert_eq!(cmp.overall_similarity, 1.0);
        assert_eq!(cmp.band, SimilarityBand::VeryHigh);
    }

    #[test]
    fn test_empty_corpora_do_not_divide_by_zero() {
        let cmp = compare(&stats(Source::Pdf, 0, 0.0), &stats(Source::Web, 0, 0.0));
        assert_eq!(cmp.count_similarity, 1.0);
        assert_eq!(cmp.score_similarity, 1.0);
    }

    #[test]
    fn test_directional_differences_and_band() {
        let cmp = compare(&stats(Source::Pdf, 4, 2.0), &stats(Source::Web, 10, 4.0));

        assert_eq!(cmp.count_difference, 6);
        assert_eq!(cmp.score_difference, 2.0);
        assert!((cmp.count_similarity - 0.4).abs() < 1e-9);
        assert!((cmp.score_similarity - 0.5).abs() < 1e-9);
        assert_eq!(cmp.band, SimilarityBand::Moderate);
    }

    #[test]
    fn test_band_thresholds_are_exclusive() {
        assert_eq!(SimilarityBand::from_similarity(0.81), SimilarityBand::VeryHigh);
        assert_eq!(SimilarityBand::from_similarity(0.8), SimilarityBand::High);
        assert_eq!(SimilarityBand::from_similarity(0.6), SimilarityBand::Moderate);
        assert_eq!(SimilarityBand::from_similarity(0.4), SimilarityBand::Low);
    }

    #[test]
    fn test_stats_skip_untitled_and_unscored_rows() {
        let rows = vec![
            row(&[("title", "A"), ("description", " x "), ("relevance_score", "2")]),
            row(&[("description", "no title"), ("relevance_score", "9")]),
            row(&[("title", "B"), ("description", "x"), ("relevance_score", "n/a")]),
            row(&[("course_title", "C"), ("relevance_score", "4")]),
        ];
        let stats = stats_from_rows(Source::Web, Path::new("p.csv"), &rows);

        assert_eq!(stats.course_count, 2);
        assert_eq!(stats.avg_relevance, 3.0);
        // "B" repeats the trimmed description of "A" despite its bad score
        assert_eq!(stats.duplicate_count(), 1);
        assert_eq!(stats.duplicates[0].title, "B");
    }

    #[test]
    fn test_mixed_alias_rows_read_their_own_columns() {
        let rows = vec![
            row(&[
                ("title", "Python I"),
                ("description", "Intro to programming"),
                ("course_title", ""),
                ("course_description", ""),
                ("relevance_score", "3"),
            ]),
            row(&[
                ("title", ""),
                ("description", ""),
                ("course_title", "Statistics"),
                ("course_description", "Probability and inference"),
                ("relevance_score", "2"),
            ]),
            row(&[
                ("title", ""),
                ("description", ""),
                ("course_title", "Data Mining"),
                ("course_description", "Patterns in large datasets"),
                ("relevance_score", "4"),
            ]),
        ];
        let stats = stats_from_rows(Source::Web, Path::new("p.csv"), &rows);

        assert_eq!(stats.course_count, 3);
        assert!(stats.duplicates.is_empty(), "{:?}", stats.duplicates);
    }

    #[test]
    fn test_blank_titles_in_every_alias_still_repeat() {
        let rows = vec![
            row(&[("title", ""), ("course_title", ""), ("description", "a")]),
            row(&[("title", ""), ("course_title", ""), ("description", "b")]),
        ];
        let stats = stats_from_rows(Source::Web, Path::new("p.csv"), &rows);

        assert_eq!(stats.duplicate_count(), 1);
        assert_eq!(stats.duplicates[0].reason, DuplicateReason::Title);
    }

    #[test]
    fn test_missing_file_gives_zero_stats_and_notice() {
        let stats = read_corpus(Source::Pdf, Path::new("/nonexistent/crs/pdfs/processed.csv"));

        assert!(!stats.found);
        assert_eq!(stats.course_count, 0);
        assert_eq!(stats.avg_relevance, 0.0);
        assert_eq!(stats.notice.as_deref(), Some("PDF processed data not found"));
    }
}
