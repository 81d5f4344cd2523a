//! Configuration for the dataset processor.

use std::path::PathBuf;

use serde::Serialize;

/// Default input file name.
pub const DEFAULT_INPUT: &str = "UV_DATA.CSV";

/// Where the processor reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorConfig {
    /// Sensor dataset (`.csv`, `.parquet` or `.json`).
    pub input: PathBuf,

    /// Directory receiving the sample files.
    pub output_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ProcessorConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }
}
