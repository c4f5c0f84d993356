//! crs-qa library - Deduplication Analyzer
//!
//! Quality assurance over processed tables: intra-corpus duplicate
//! detection, web-versus-pdf comparison reports and per-school status
//! metrics.

pub mod comparison;
pub mod dedup;
pub mod report;
pub mod status;

pub use comparison::{compare, compare_all, compare_school, write_school_report, Comparison, ComparisonReport, CorpusStats, SimilarityBand};
pub use dedup::{scan_duplicates, CorpusRow, DuplicateEntry, DuplicateReason, TitleField};
