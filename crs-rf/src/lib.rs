//! crs-rf library - Relational Flattener
//!
//! Explodes processed tables into normalized relational CSVs and summarizes
//! keyword frequencies per school.

pub mod flatten;
pub mod summary;

pub use flatten::{flatten, flatten_all, output_dir, read_tables, write_relations, Relation, Relations};
pub use summary::{leaders, summarize, write_summary, Leader, SchoolSummary, TotalKind};
