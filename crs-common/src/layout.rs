//! School directory layout
//!
//! ```text
//! <root>/schools/<category>/<school>/
//!     raw_data/*.json                web input
//!     processed_data/processed.csv   web output
//!     pdfs/raw_data/*.json           pdf input
//!     pdfs/processed.csv             pdf output
//!     comparison_report.txt
//!     confirmed.txt
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// School categories, in processing order
pub const CATEGORIES: [&str; 2] = ["priority", "non_priority"];

/// Extraction source of a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Web,
    Pdf,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Web, Source::Pdf];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Web => "web",
            Source::Pdf => "pdf",
        }
    }

    /// Upper-case label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Source::Web => "WEB",
            Source::Pdf => "PDF",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(Source::Web),
            "pdf" => Ok(Source::Pdf),
            other => Err(Error::InvalidInput(format!("Unknown source '{}' (expected web or pdf)", other))),
        }
    }
}

/// One school's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolDir {
    pub category: String,
    pub name: String,
    pub path: PathBuf,
}

impl SchoolDir {
    pub fn new(category: impl Into<String>, name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            path,
        }
    }

    /// Resolve a `<category>/<school>` argument under the schools directory
    pub fn from_arg(schools_dir: &Path, arg: &str) -> Result<Self> {
        let trimmed = arg.trim().trim_matches('/');
        let (category, name) = trimmed.split_once('/').ok_or_else(|| {
            Error::InvalidInput(format!("School must be given as <category>/<name>, got '{}'", arg))
        })?;

        if !CATEGORIES.contains(&category) {
            return Err(Error::InvalidInput(format!("Unknown school category '{}'", category)));
        }
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidInput(format!("Invalid school name '{}'", name)));
        }

        let path = schools_dir.join(category).join(name);
        if !path.is_dir() {
            return Err(Error::MissingInput(path));
        }
        Ok(Self::new(category, name, path))
    }

    /// `<category>/<school>` identifier
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    pub fn raw_dir(&self, source: Source) -> PathBuf {
        match source {
            Source::Web => self.path.join("raw_data"),
            Source::Pdf => self.path.join("pdfs").join("raw_data"),
        }
    }

    pub fn processed_csv(&self, source: Source) -> PathBuf {
        match source {
            Source::Web => self.path.join("processed_data").join("processed.csv"),
            Source::Pdf => self.path.join("pdfs").join("processed.csv"),
        }
    }

    pub fn comparison_report(&self) -> PathBuf {
        self.path.join("comparison_report.txt")
    }

    pub fn confirmation_marker(&self) -> PathBuf {
        self.path.join("confirmed.txt")
    }

    pub fn pdfs_dir(&self) -> PathBuf {
        self.path.join("pdfs")
    }
}

/// Discover every school under `<schools_dir>/<category>/`
///
/// Categories are visited in [`CATEGORIES`] order and schools in sorted name
/// order. A missing category is skipped; an unreadable one is logged.
pub fn discover_schools(schools_dir: &Path) -> Vec<SchoolDir> {
    let mut schools = Vec::new();

    for category in CATEGORIES {
        let category_dir = schools_dir.join(category);
        if !category_dir.is_dir() {
            continue;
        }

        let entries = match std::fs::read_dir(&category_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read category {}: {}", category_dir.display(), e);
                continue;
            }
        };

        let mut found: Vec<SchoolDir> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some(SchoolDir::new(category, name, path))
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        schools.extend(found);
    }

    schools
}

/// `*.json` files directly inside `dir`, sorted by file name
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}
