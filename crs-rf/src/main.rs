//! crs-rf - Relational Flattener
//!
//! Concatenates every school's processed table into four relational CSVs
//! (relevance scores, keyword matches, group matches, keyword frequencies)
//! under the relational output directory.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crs_common::config::Settings;
use crs_common::layout::{discover_schools, Source};
use crs_common::logging::init_tracing;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for crs-rf
#[derive(Parser, Debug)]
#[command(name = "crs-rf")]
#[command(about = "Flatten processed tables into relational CSVs")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus to flatten: web or pdf
    #[arg(long, default_value = "web")]
    source: Source,

    /// Output directory (default: <root>/data/relational_output)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);

    info!("Starting crs-rf (Relational Flattener) v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();
    info!("Root folder: {}", settings.root_folder.display());

    let schools = discover_schools(&settings.schools_dir());
    let Some(relations) = crs_rf::flatten_all(&schools, args.source) else {
        warn!("No {} processed tables found; nothing written", args.source);
        return Ok(());
    };

    let base = args.output.unwrap_or_else(|| settings.relational_output.clone());
    let out_dir = crs_rf::output_dir(&base, args.source);
    let results = crs_rf::write_relations(&relations, &out_dir);

    let failed: Vec<String> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .map(|(relation, _)| relation.to_string())
        .collect();
    if !failed.is_empty() {
        bail!("Failed to write relation(s): {}", failed.join(", "));
    }

    info!("Wrote relational output to {}", out_dir.display());
    Ok(())
}
