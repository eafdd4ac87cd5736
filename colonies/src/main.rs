use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use colonies::{Config, Pipeline, VoronoiSummary};
use common::log_setup::{LogOptions, setup_logging};

const DEFAULT_CONFIG: &str = "colonies.yaml";

fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let loaded = Config::load_optional(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // Logging needs the configured level, so it starts after the config is read.
    setup_logging(&LogOptions::new(&config.log_level, Path::new("logs"), "colonies"))
        .context("initializing logging")?;
    if !found {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(config = %config_path.display(), input = %config.input.display(), "Starting analysis");

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run().inspect_err(|e| error!("Analysis failed: {e}"))?;

    for channel in &summary.channels {
        info!(
            channel = %channel.channel,
            clusters = channel.clusters.len(),
            noise = channel.noise,
            "Channel done"
        );
    }
    if let VoronoiSummary::InsufficientCentroids { found } = summary.voronoi {
        info!(found, "Voronoi validation skipped");
    }
    info!(output = %pipeline.config().output_dir.display(), "Analysis complete");

    Ok(())
}
