mod cli;
mod config;
mod data;
mod export;
mod processor;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Cli;
use processor::DatasetProcessor;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut processor = DatasetProcessor::new(cli.config());
    let summary = processor.run()?;

    info!(
        "Wrote {} sample files from {} rows ({} skipped), stage {:?}",
        summary.files_written(),
        summary.rows,
        summary.skipped_rows,
        processor.stage()
    );

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
        println!("Summary Written: {}", path.display());
    }

    Ok(())
}
