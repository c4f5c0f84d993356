//! Per-school pipeline status metrics (`metrics.csv`)

use chrono::{DateTime, SecondsFormat, Utc};
use crs_common::layout::{json_files, Source};
use crs_common::output::write_csv_atomic;
use crs_common::{Result, SchoolDir};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Column order of `metrics.csv`
pub const METRICS_COLUMNS: [&str; 6] = [
    "school",
    "category",
    "web_scraped",
    "pdf_scraped",
    "confirmed",
    "last_updated",
];

/// Status of one school directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolStatus {
    pub school: String,
    pub category: String,
    pub web_scraped: bool,
    pub pdf_scraped: bool,
    pub confirmed: bool,
    pub last_updated: DateTime<Utc>,
}

impl SchoolStatus {
    fn cells(&self) -> Vec<String> {
        vec![
            self.school.clone(),
            self.category.clone(),
            self.web_scraped.to_string(),
            self.pdf_scraped.to_string(),
            self.confirmed.to_string(),
            self.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }
}

/// Any `*.json` batch in the web raw-data directory
pub fn check_web_scraped(school: &SchoolDir) -> bool {
    json_files(&school.raw_dir(Source::Web)).map_or(false, |files| !files.is_empty())
}

/// `pdfs/` exists and holds anything at all
pub fn check_pdf_scraped(school: &SchoolDir) -> bool {
    std::fs::read_dir(school.pdfs_dir()).map_or(false, |mut entries| entries.next().is_some())
}

pub fn check_confirmed(school: &SchoolDir) -> bool {
    school.confirmation_marker().exists()
}

/// Status rows for `schools`, all stamped with `now`
pub fn gather(schools: &[SchoolDir], now: DateTime<Utc>) -> Vec<SchoolStatus> {
    schools
        .iter()
        .map(|school| SchoolStatus {
            school: school.name.clone(),
            category: school.category.clone(),
            web_scraped: check_web_scraped(school),
            pdf_scraped: check_pdf_scraped(school),
            confirmed: check_confirmed(school),
            last_updated: now,
        })
        .collect()
}

/// Atomically write `metrics.csv`
///
/// Returns `false` without touching `path` when there are no rows.
pub fn write_metrics(path: &Path, statuses: &[SchoolStatus]) -> Result<bool> {
    if statuses.is_empty() {
        return Ok(false);
    }

    let header: Vec<String> = METRICS_COLUMNS.iter().map(|c| c.to_string()).collect();
    write_csv_atomic(path, &header, statuses.iter().map(SchoolStatus::cells))?;
    info!(schools = statuses.len(), "Wrote metrics to {}", path.display());
    Ok(true)
}
