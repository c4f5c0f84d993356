//! crs-pr - Record Processor
//!
//! Reads every school's raw JSON batches (web and pdf), scores each record
//! against the keyword registry and writes `processed.csv` per corpus.
//! Schools are processed in parallel; a failure in one school or file is
//! logged and never stops the rest of the run.

use anyhow::{Context, Result};
use clap::Parser;
use crs_common::config::Settings;
use crs_common::layout::{discover_schools, SchoolDir};
use crs_common::logging::init_tracing;
use crs_common::KeywordGroupRegistry;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for crs-pr
#[derive(Parser, Debug)]
#[command(name = "crs-pr")]
#[command(about = "Score raw course records into processed CSVs")]
#[command(version)]
struct Args {
    /// Project root folder (overrides CRS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: ~/.config/crs/config.toml)
    #[arg(short, long, env = "CRS_CONFIG")]
    config: Option<PathBuf>,

    /// Process a single school, given as <category>/<name>
    #[arg(short, long)]
    school: Option<String>,

    /// Worker threads for school-level parallelism (default: all cores)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.root_folder.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&settings.log_level);

    info!("Starting crs-pr (Record Processor) v{}", env!("CARGO_PKG_VERSION"));
    settings.config_source.log();
    info!("Root folder: {}", settings.root_folder.display());

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker pool")?;
    }

    // Scoring cannot proceed without a valid registry
    let registry = KeywordGroupRegistry::load(&settings.keyword_groups, &settings.equivalencies)
        .context("Failed to load keyword configuration")?;

    let schools = match &args.school {
        Some(arg) => vec![SchoolDir::from_arg(&settings.schools_dir(), arg)
            .with_context(|| format!("Unknown school '{}'", arg))?],
        None => discover_schools(&settings.schools_dir()),
    };

    if schools.is_empty() {
        warn!("No schools found under {}", settings.schools_dir().display());
        return Ok(());
    }

    info!("Processing {} school(s)", schools.len());
    let reports = crs_pr::process_all(&schools, &registry);

    let written: usize = reports.iter().map(|r| r.written()).sum();
    let failures: usize = reports.iter().map(|r| r.failures()).sum();
    for report in reports.iter().filter(|r| r.failures() > 0) {
        warn!("{}: {} source(s) failed", report.school, report.failures());
    }

    info!(
        "Done: {} school(s), {} processed table(s) written, {} failure(s)",
        reports.len(),
        written,
        failures
    );

    Ok(())
}
