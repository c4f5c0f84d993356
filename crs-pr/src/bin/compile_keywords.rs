//! Keyword Sheet Compiler
//!
//! Rebuilds the keyword group and equivalency JSON files from the curated
//! phrase sheet (CSV export).
//!
//! **Usage:**
//! ```bash
//! compile-keywords [--sheet <file>] [--root-folder <dir>]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use crs_common::config::Settings;
use crs_common::logging::init_tracing;
use std::path::PathBuf;
use tracing::info;

/// Keyword sheet compiler
#[derive(Parser, Debug)]
#[command(name = "compile-keywords")]
#[command(about = "Compile the phrase sheet into keyword group and equivalency JSON")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Phrase sheet CSV (default: <root>/data/word_groups/phrases_spreadsheet.csv)
    #[arg(long, value_name = "FILE")]
    sheet: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);
    info!("Starting compile-keywords v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();

    let sheet = args.sheet.unwrap_or_else(|| settings.phrase_sheet());
    info!("Compiling keywords from {}", sheet.display());

    let compiled = crs_pr::compile::compile_file(&sheet, &settings.keyword_groups, &settings.equivalencies)
        .with_context(|| format!("Failed to compile {}", sheet.display()))?;

    info!(
        "Compiled {} keyword group(s) and {} equivalency term(s)",
        compiled.groups.len(),
        compiled.equivalencies.len()
    );
    Ok(())
}
