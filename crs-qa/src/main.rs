//! crs-qa - Deduplication Analyzer
//!
//! Compares each school's web and pdf processed tables, flags duplicate
//! titles and descriptions and writes `comparison_report.txt` next to the
//! school's data.

use anyhow::{Context, Result};
use clap::Parser;
use crs_common::config::Settings;
use crs_common::layout::{discover_schools, SchoolDir};
use crs_common::logging::init_tracing;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for crs-qa
#[derive(Parser, Debug)]
#[command(name = "crs-qa")]
#[command(about = "Write web-versus-pdf comparison reports with duplicate detection")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Report on a single school, given as <category>/<name>
    #[arg(short, long)]
    school: Option<String>,

    /// Also print each report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);

    info!("Starting crs-qa (Deduplication Analyzer) v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();
    info!("Root folder: {}", settings.root_folder.display());

    let schools = match &args.school {
        Some(arg) => vec![SchoolDir::from_arg(&settings.schools_dir(), arg)
            .with_context(|| format!("Unknown school '{}'", arg))?],
        None => discover_schools(&settings.schools_dir()),
    };

    if schools.is_empty() {
        warn!("No schools found under {}", settings.schools_dir().display());
        return Ok(());
    }

    let results = crs_qa::compare_all(&schools);

    let mut failures = 0;
    for (school, result) in &results {
        match result {
            Ok(report) => {
                info!("{} pdf: {}", school, report.pdf.display_string());
                info!("{} web: {}", school, report.web.display_string());
                for notice in report.notices() {
                    warn!("{}: {}", school, notice);
                }
                if args.json {
                    let json = serde_json::to_string_pretty(report)
                        .with_context(|| format!("Failed to encode report for {}", school))?;
                    println!("{}", json);
                }
            }
            Err(_) => failures += 1,
        }
    }

    info!(
        "Done: {} report(s) written, {} failure(s)",
        results.len() - failures,
        failures
    );
    Ok(())
}
