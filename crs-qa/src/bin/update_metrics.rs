//! School Status Metrics
//!
//! Records which schools have web batches, pdf material and a manual
//! confirmation marker.
//!
//! **Usage:**
//! ```bash
//! update-metrics [--root-folder <dir>] [--output <file>]
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crs_common::config::Settings;
use crs_common::layout::discover_schools;
use crs_common::logging::init_tracing;
use crs_qa::status::{gather, write_metrics};
use std::path::PathBuf;
use tracing::{info, warn};

/// School status metrics writer
#[derive(Parser, Debug)]
#[command(name = "update-metrics")]
#[command(about = "Write per-school scrape and confirmation status to metrics.csv")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Output file (default: <root>/metrics.csv)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);
    info!("Starting update-metrics v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();

    let schools = discover_schools(&settings.schools_dir());
    let statuses = gather(&schools, Utc::now());

    let output = args.output.unwrap_or_else(|| settings.metrics_file());
    let written = write_metrics(&output, &statuses)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !written {
        warn!("No schools found under {}", settings.schools_dir().display());
    }
    Ok(())
}
