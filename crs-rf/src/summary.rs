//! Per-school keyword frequency summary
//!
//! Totals the processed tables' frequencies and group matches per school.
//! Collapsed totals fold synonym parts into their canonical term through
//! the equivalency map; they are for reporting only and never feed back into
//! scoring.

use crs_common::output::{write_csv_atomic, Row};
use crs_common::record::{decode_frequencies, split_list, COL_KEYWORD_FREQUENCIES, COL_MATCHED_GROUPS};
use crs_common::{EquivalencyMap, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Output file name, placed in the relational output directory
pub const SUMMARY_FILE: &str = "frequency_summary.csv";

/// Which total a summary row holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalKind {
    /// Raw part counts summed across rows
    Keyword,
    /// Number of rows matching each group
    Group,
    /// Keyword totals re-keyed by canonical term
    Collapsed,
}

impl TotalKind {
    pub const ALL: [TotalKind; 3] = [TotalKind::Keyword, TotalKind::Group, TotalKind::Collapsed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TotalKind::Keyword => "keyword",
            TotalKind::Group => "group",
            TotalKind::Collapsed => "collapsed",
        }
    }
}

impl fmt::Display for TotalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolSummary {
    pub school: String,
    pub keyword_totals: BTreeMap<String, u64>,
    pub group_totals: BTreeMap<String, u64>,
    pub collapsed_totals: BTreeMap<String, u64>,
}

impl SchoolSummary {
    pub fn totals(&self, kind: TotalKind) -> &BTreeMap<String, u64> {
        match kind {
            TotalKind::Keyword => &self.keyword_totals,
            TotalKind::Group => &self.group_totals,
            TotalKind::Collapsed => &self.collapsed_totals,
        }
    }
}

/// Summarize one school's processed rows
pub fn summarize(school: &str, rows: &[Row], equivalencies: &EquivalencyMap) -> SchoolSummary {
    let mut summary = SchoolSummary {
        school: school.to_string(),
        ..Default::default()
    };

    for row in rows {
        if let Some(frequencies) = row.get(COL_KEYWORD_FREQUENCIES).and_then(|c| decode_frequencies(c)) {
            for (part, count) in frequencies {
                *summary.keyword_totals.entry(part).or_insert(0) += count;
            }
        }
        if let Some(groups) = row.get(COL_MATCHED_GROUPS) {
            for group in split_list(groups) {
                *summary.group_totals.entry(group.to_string()).or_insert(0) += 1;
            }
        }
    }

    summary.collapsed_totals = equivalencies.collapse(&summary.keyword_totals);
    summary
}

/// Largest single total of one kind across all schools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub kind: TotalKind,
    pub school: String,
    pub term: String,
    pub count: u64,
}

/// Highest total per kind; ties keep the first school and term in order
pub fn leaders(summaries: &[SchoolSummary]) -> Vec<Leader> {
    TotalKind::ALL
        .iter()
        .filter_map(|&kind| {
            let mut best: Option<Leader> = None;
            for summary in summaries {
                for (term, &count) in summary.totals(kind) {
                    if best.as_ref().map_or(true, |b| count > b.count) {
                        best = Some(Leader {
                            kind,
                            school: summary.school.clone(),
                            term: term.clone(),
                            count,
                        });
                    }
                }
            }
            best
        })
        .collect()
}

/// Atomically write `school,kind,term,count` rows
pub fn write_summary(path: &Path, summaries: &[SchoolSummary]) -> Result<()> {
    let header: Vec<String> = ["school", "kind", "term", "count"].iter().map(|c| c.to_string()).collect();

    let rows = summaries.iter().flat_map(|summary| {
        TotalKind::ALL.iter().flat_map(move |&kind| {
            summary.totals(kind).iter().map(move |(term, count)| {
                vec![
                    summary.school.clone(),
                    kind.to_string(),
                    term.clone(),
                    count.to_string(),
                ]
            })
        })
    });

    write_csv_atomic(path, &header, rows)?;
    info!(schools = summaries.len(), "Wrote {}", path.display());
    Ok(())
}
