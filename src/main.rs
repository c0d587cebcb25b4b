mod baseline;
mod chart;
mod color;
mod config;
mod data;
mod pipeline;
mod summary;

use std::path::Path;

use anyhow::{Context, Result};
use config::{PipelineConfig, CONFIG_FILE};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::load_or_default(Path::new(CONFIG_FILE))
        .context("loading configuration")?;

    let report = pipeline::run(&config)?;
    log::info!(
        "Summarised {} metrics into {}; {} charts written",
        report.metrics.len(),
        report.summary_path.display(),
        report.chart_paths.len()
    );
    Ok(())
}
