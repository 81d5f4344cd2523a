use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FEATURE_COLUMNS, LABEL_COLUMN, SensorDataset, SensorReading};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sensor dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least `uv_index`, `temperature`,
///   `pressure`, `altitude` and `risk_level`
/// * `.parquet` – numeric columns with the same names
/// * `.json`    – `[{ "uv_index": 7, ..., "risk_level": 1 }, ...]`
///
/// Any other columns are ignored. A missing column or an unparseable cell
/// fails the whole load.
pub fn load_file(path: &Path) -> Result<SensorDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Every column the pipeline reads, features first.
fn required_columns() -> impl Iterator<Item = &'static str> {
    FEATURE_COLUMNS.into_iter().chain(std::iter::once(LABEL_COLUMN))
}

fn ignored_columns<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| !required_columns().any(|r| r == *n))
        .map(str::to_string)
        .collect()
}

/// Accepts `1` as well as `1.0`; dataframe exports often write whole-number labels as floats.
fn label_from_f64(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn parse_label(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(label_from_f64))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SensorDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let position = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let feature_idx = [
        position(FEATURE_COLUMNS[0])?,
        position(FEATURE_COLUMNS[1])?,
        position(FEATURE_COLUMNS[2])?,
        position(FEATURE_COLUMNS[3])?,
    ];
    let label_idx = position(LABEL_COLUMN)?;

    let mut readings = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let mut values = [0.0; 4];
        for (slot, (&idx, col)) in values
            .iter_mut()
            .zip(feature_idx.iter().zip(FEATURE_COLUMNS))
        {
            let raw = cell(idx);
            *slot = raw
                .parse::<f64>()
                .with_context(|| format!("Row {row_no}, {col}: '{raw}' is not a number"))?;
        }

        let raw_label = cell(label_idx);
        let risk_level = parse_label(raw_label).with_context(|| {
            format!("Row {row_no}, {LABEL_COLUMN}: '{raw_label}' is not an integer")
        })?;

        readings.push(reading_from(values, risk_level));
    }

    Ok(SensorDataset::new(
        readings,
        ignored_columns(headers.iter().map(String::as_str)),
    ))
}

fn reading_from(values: [f64; 4], risk_level: i64) -> SensorReading {
    let [uv_index, temperature, pressure, altitude] = values;
    SensorReading {
        uv_index,
        temperature,
        pressure,
        altitude,
        risk_level,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "uv_index": 7, "temperature": 3200, "pressure": 98000, "altitude": 150, "risk_level": 1 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SensorDataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading JSON file {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut readings = Vec::with_capacity(records.len());
    let mut extra: Vec<String> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut values = [0.0; 4];
        for (slot, col) in values.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = obj
                .get(col)
                .and_then(JsonValue::as_f64)
                .with_context(|| format!("Row {i}: missing or non-numeric '{col}'"))?;
        }

        let label = obj
            .get(LABEL_COLUMN)
            .with_context(|| format!("Row {i}: missing '{LABEL_COLUMN}'"))?;
        let risk_level = label
            .as_i64()
            .or_else(|| label.as_f64().and_then(label_from_f64))
            .with_context(|| format!("Row {i}: '{LABEL_COLUMN}' is not an integer"))?;

        for key in ignored_columns(obj.keys().map(String::as_str)) {
            if !extra.contains(&key) {
                extra.push(key);
            }
        }

        readings.push(reading_from(values, risk_level));
    }

    Ok(SensorDataset::new(readings, extra))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of sensor readings.
///
/// Feature columns may be Int32, Int64, Float32 or Float64. The label column
/// may be integral or a float holding whole numbers. Nulls are rejected.
fn load_parquet(path: &Path) -> Result<SensorDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut readings = Vec::new();
    let mut extra = Vec::new();
    let mut offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let feature_cols = [
            batch_column(&batch, FEATURE_COLUMNS[0])?,
            batch_column(&batch, FEATURE_COLUMNS[1])?,
            batch_column(&batch, FEATURE_COLUMNS[2])?,
            batch_column(&batch, FEATURE_COLUMNS[3])?,
        ];
        let label_col = batch_column(&batch, LABEL_COLUMN)?;

        if extra.is_empty() {
            extra = ignored_columns(schema.fields().iter().map(|f| f.name().as_str()));
        }

        for row in 0..batch.num_rows() {
            let global_row = offset + row;
            let mut values = [0.0; 4];
            for (slot, (col, name)) in values
                .iter_mut()
                .zip(feature_cols.iter().zip(FEATURE_COLUMNS))
            {
                *slot = extract_f64(col, row)
                    .with_context(|| format!("Row {global_row}: failed to read '{name}'"))?;
            }
            let risk_level = extract_label(label_col, row)
                .with_context(|| format!("Row {global_row}: failed to read '{LABEL_COLUMN}'"))?;

            readings.push(reading_from(values, risk_level));
        }
        offset += batch.num_rows();
    }

    Ok(SensorDataset::new(readings, extra))
}

// -- Parquet / Arrow helpers --

fn batch_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Read one numeric cell as `f64`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => {
            any.downcast_ref::<Float64Array>()
                .context("expected Float64Array")?
                .value(row)
        }
        DataType::Float32 => {
            any.downcast_ref::<Float32Array>()
                .context("expected Float32Array")?
                .value(row) as f64
        }
        DataType::Int64 => {
            any.downcast_ref::<Int64Array>()
                .context("expected Int64Array")?
                .value(row) as f64
        }
        DataType::Int32 => {
            any.downcast_ref::<Int32Array>()
                .context("expected Int32Array")?
                .value(row) as f64
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(value)
}

/// Read one label cell as an integer.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in label column");
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Int64 => Ok(any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row)),
        DataType::Int32 => Ok(any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as i64),
        DataType::Float64 | DataType::Float32 => {
            let v = extract_f64(col, row)?;
            label_from_f64(v).with_context(|| format!("label {v} is not a whole number"))
        }
        other => bail!("Expected an integer label column, got {other:?}"),
    }
}
