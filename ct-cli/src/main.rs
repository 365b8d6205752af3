mod batch;
mod config;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ct_core::Taxonomy;
use tracing::{debug, error, info};

use batch::Job;
use config::CliConfig;
use output::OutputFormat;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tagged corporation tax computations.
///
/// Reads computation records from TOML (one per file) or CSV (one per row),
/// generates an inline XBRL computation for each, validates it, and writes
/// the results. Exits non-zero when any record cannot be generated or fails
/// validation.
#[derive(Debug, Parser)]
#[command(name = "ct-comp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input files (.toml or .csv).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the artifacts are written to.
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Which artifacts to write.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,

    /// Settings file with optional [generator] and [validator] tables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate only; write nothing.
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. `debug`, `ct_core=trace`).
    #[arg(long)]
    log_level: Option<String>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref());
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let config = Arc::new(CliConfig::load(cli.config.as_deref())?);
    debug!(?config, "configuration loaded");

    let mut jobs = Vec::new();
    for path in &cli.inputs {
        let records = ct_data::load_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let multi = records.len() > 1;
        jobs.extend(records.into_iter().enumerate().map(|(idx, input)| Job {
            label: if multi {
                format!("{}#{}", path.display(), idx + 1)
            } else {
                path.display().to_string()
            },
            input,
        }));
    }
    info!(records = jobs.len(), "processing records");

    let outcomes = batch::run(jobs, Arc::clone(&config)).await;
    let taxonomy = Taxonomy::default();
    let stems = output::unique_stems(outcomes.iter().map(|o| &o.input));

    for (outcome, stem) in outcomes.iter().zip(&stems) {
        let (document, report) = match &outcome.result {
            Ok(pair) => pair,
            Err(e) => {
                error!(record = %outcome.label, error = %e, "generation failed");
                println!("{}: generation failed: {e}", outcome.label);
                continue;
            }
        };

        print!("{} ({}): {report}", outcome.label, outcome.input.company.name);

        if !cli.check {
            output::write_artifacts(
                &cli.output_dir,
                stem,
                cli.format,
                &outcome.input,
                document,
                report,
                &taxonomy,
            )?;
        }
    }

    let failures = batch::failures(&outcomes);
    info!(records = outcomes.len(), failures, "batch complete");
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
