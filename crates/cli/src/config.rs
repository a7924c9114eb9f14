use anyhow::{Context, Result};
use docsift_core::Config;
use tracing::debug;

use crate::cli::CliArgs;

/// Resolve the run configuration.
/// Priority: cli argument > env var > built-in default.
pub fn resolve(args: &CliArgs) -> Result<Config> {
    let mut config = Config::from_env().context("invalid environment configuration")?;

    if let Some(workers) = args.workers {
        config.pdf_workers = workers;
    }
    if let Some(secs) = args.timeout_secs {
        config.worker_timeout_secs = secs;
    }
    if args.include_images {
        config.include_images = true;
    }
    if let Some(dir) = &args.stage_dir {
        config.stage_dir = Some(dir.clone());
    }

    config.validate().context("invalid configuration")?;
    debug!(?config, "resolved configuration");
    Ok(config)
}
