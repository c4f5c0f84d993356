//! crs-pr library - Record Processor
//!
//! Scores raw course JSON into per-school processed CSVs and compiles the
//! keyword configuration from the curated phrase sheet.

pub mod compile;
pub mod processor;

pub use processor::{
    load_raw_batch, process_all, process_record, process_records, process_school, process_source,
    ProcessOutcome, RawBatch, SchoolReport,
};
