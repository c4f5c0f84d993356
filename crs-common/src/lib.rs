//! # CRS Common Library
//!
//! Shared code for all CRS pipeline stages including:
//! - Keyword group registry and equivalency map
//! - Relevance scoring engine
//! - Record normalization and processed-table columns
//! - School directory layout
//! - Atomic CSV/text output
//! - Configuration loading, logging setup and error types

pub mod config;
pub mod error;
pub mod keywords;
pub mod layout;
pub mod logging;
pub mod output;
pub mod record;
pub mod scoring;

pub use error::{Error, Result};
pub use keywords::{EquivalencyMap, KeywordGroup, KeywordGroupRegistry};
pub use layout::{SchoolDir, Source};
pub use scoring::{score, ScoreResult};
