//! Keyword Frequency Summary
//!
//! Totals keyword frequencies and group matches per school, folds synonyms
//! through the equivalency map and reports the largest totals.
//!
//! **Usage:**
//! ```bash
//! frequency-summary [--source web|pdf] [--root-folder <dir>]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use crs_common::config::Settings;
use crs_common::layout::{discover_schools, Source};
use crs_common::logging::init_tracing;
use crs_common::KeywordGroupRegistry;
use crs_rf::summary::{leaders, summarize, write_summary, SUMMARY_FILE};
use std::path::PathBuf;
use tracing::{info, warn};

/// Keyword frequency summary
#[derive(Parser, Debug)]
#[command(name = "frequency-summary")]
#[command(about = "Summarize keyword frequencies per school")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus to summarize: web or pdf
    #[arg(long, default_value = "web")]
    source: Source,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);
    info!("Starting frequency-summary v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();

    let registry = KeywordGroupRegistry::load(&settings.keyword_groups, &settings.equivalencies)
        .context("Failed to load keyword configuration")?;

    let schools = discover_schools(&settings.schools_dir());
    let tables = crs_rf::read_tables(&schools, args.source);
    if tables.is_empty() {
        warn!("No {} processed tables found; nothing written", args.source);
        return Ok(());
    }

    let summaries: Vec<_> = tables
        .iter()
        .map(|(school, rows)| summarize(school, rows, registry.equivalencies()))
        .collect();

    for leader in leaders(&summaries) {
        info!(
            "Highest {} total: '{}' at {} ({})",
            leader.kind, leader.term, leader.school, leader.count
        );
    }

    let path = crs_rf::output_dir(&settings.relational_output, args.source).join(SUMMARY_FILE);
    write_summary(&path, &summaries).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
