//! Sample-file writer.
//!
//! Every qualifying row becomes its own two-line CSV: the feature header
//! followed by the row's scaled values.

use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use crate::data::model::{FEATURE_COLUMNS, ScaledReading};

/// Header written at the top of every sample file.
///
/// These are the raw column names even though the values beneath are scaled;
/// downstream tooling keys on them.
pub const SAMPLE_HEADER: [&str; 4] = FEATURE_COLUMNS;

/// Errors that can occur while writing sample files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to create the output directory.
    #[error("failed to create output directory '{path}'")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open a sample file.
    #[error("failed to open sample file '{path}'")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}'")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Failed to flush buffered output.
    #[error("failed to flush '{path}'")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Create the output directory if it doesn't exist.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| ExportError::CreateDirectory {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// Render a value the way the sample files expect: shortest round-trip
/// representation, always with a fractional part (`32.0`, `0.98`).
///
/// Exponents carry an explicit sign and at least two digits (`1e-05`,
/// `1.5e+16`); non-finite values are written as `nan`, `inf` and `-inf`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let repr = format!("{v:?}");
    let Some((mantissa, exp)) = repr.split_once('e') else {
        return repr;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Write one sample to `path`.
///
/// The file is opened in append mode, so re-running into a directory that
/// already holds samples extends those files instead of truncating them.
pub fn write_sample(path: &Path, sample: &ScaledReading) -> Result<()> {
    let path_str = path.display().to_string();

    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExportError::OpenFile {
            path: path_str.clone(),
            source: e,
        })?;
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(BufWriter::new(file));

    csv_writer
        .write_record(SAMPLE_HEADER)
        .map_err(|e| ExportError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

    let values = sample.features().map(format_value);
    csv_writer
        .write_record(&values)
        .map_err(|e| ExportError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

    csv_writer.flush().map_err(|e| ExportError::Flush {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
