use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// RiskLevel – the fixed label taxonomy
// ---------------------------------------------------------------------------

/// Sun-exposure danger class attached to every reading.
///
/// The discriminant is the integer stored in the `risk_level` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Tolerable = 0,
    Risky = 1,
    Perilous = 2,
}

impl RiskLevel {
    /// Every class, in export order.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Tolerable, RiskLevel::Risky, RiskLevel::Perilous];

    /// Map a raw `risk_level` value to its class, if it is one of the known labels.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(RiskLevel::Tolerable),
            1 => Some(RiskLevel::Risky),
            2 => Some(RiskLevel::Perilous),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    /// Human-readable class name used in sample file names.
    pub fn class_name(self) -> &'static str {
        match self {
            RiskLevel::Tolerable => "Tolerable",
            RiskLevel::Risky => "Risky",
            RiskLevel::Perilous => "Perilous",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.class_name())
    }
}

// ---------------------------------------------------------------------------
// SensorReading – one row of the input table
// ---------------------------------------------------------------------------

/// A single raw observation, as read from the input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub uv_index: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub altitude: f64,
    /// Raw label. Values outside the known taxonomy are kept so they can be reported.
    pub risk_level: i64,
}

impl SensorReading {
    pub fn risk(&self) -> Option<RiskLevel> {
        RiskLevel::from_label(self.risk_level)
    }
}

// ---------------------------------------------------------------------------
// SensorDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Required input columns, in the order they appear in sample headers.
pub const FEATURE_COLUMNS: [&str; 4] = ["uv_index", "temperature", "pressure", "altitude"];

/// Name of the label column.
pub const LABEL_COLUMN: &str = "risk_level";

/// The full parsed dataset. Row order is input order.
#[derive(Debug, Clone, Default)]
pub struct SensorDataset {
    pub readings: Vec<SensorReading>,
    /// Columns present in the input but not used by the pipeline.
    pub ignored_columns: Vec<String>,
}

impl SensorDataset {
    pub fn new(readings: Vec<SensorReading>, ignored_columns: Vec<String>) -> Self {
        SensorDataset {
            readings,
            ignored_columns,
        }
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Row count per raw label value.
    pub fn label_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.readings {
            *counts.entry(r.risk_level).or_default() += 1;
        }
        counts
    }

    /// Rows whose label is not one of the known classes.
    pub fn unlabeled_rows(&self) -> usize {
        self.readings.iter().filter(|r| r.risk().is_none()).count()
    }
}

// ---------------------------------------------------------------------------
// ScaledReading / ScaledDataset – normalizer output
// ---------------------------------------------------------------------------

/// The four derived columns for one row, plus the label they came with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledReading {
    pub scaled_uv_index: f64,
    pub scaled_temperature: f64,
    pub scaled_pressure: f64,
    pub scaled_altitude: f64,
    pub risk_level: i64,
}

impl ScaledReading {
    /// Feature values in header order.
    pub fn features(&self) -> [f64; 4] {
        [
            self.scaled_uv_index,
            self.scaled_temperature,
            self.scaled_pressure,
            self.scaled_altitude,
        ]
    }
}

/// Normalized table, row-aligned with the [`SensorDataset`] it was built from.
#[derive(Debug, Clone, Default)]
pub struct ScaledDataset {
    pub rows: Vec<ScaledReading>,
}

impl ScaledDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
