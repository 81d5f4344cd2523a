//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::{DEFAULT_INPUT, ProcessorConfig};

#[derive(Parser, Debug)]
#[command(name = "uv-risk-dataset")]
#[command(
    about = "Scale UV sensor readings and write one CSV sample per row, grouped by risk level",
    version
)]
pub struct Cli {
    /// Input dataset (.csv, .parquet or .json)
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Directory for the sample files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write a JSON summary of the run to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn config(&self) -> ProcessorConfig {
        ProcessorConfig::new(&self.input, &self.output_dir)
    }

    /// Default log level when `RUST_LOG` is unset.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
