mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use docsift_ingest::BatchRunner;

use crate::cli::CliArgs;

fn main() -> Result<()> {
    docsift_core::config::load_dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = config::resolve(&args)?;
    config.log_summary();

    let runner = BatchRunner::new(config);
    let report = runner
        .run(&args.root)
        .with_context(|| format!("batch over {} aborted", args.root.display()))?;
    report.log();

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
