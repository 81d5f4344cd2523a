use super::model::{ScaledDataset, ScaledReading, SensorDataset, SensorReading};

// ---------------------------------------------------------------------------
// Fixed divisors
// ---------------------------------------------------------------------------

pub const UV_INDEX_DIVISOR: f64 = 10.0;
pub const TEMPERATURE_DIVISOR: f64 = 100.0;
pub const PRESSURE_DIVISOR: f64 = 100_000.0;
pub const ALTITUDE_DIVISOR: f64 = 100.0;

/// Divisors in header order (`uv_index`, `temperature`, `pressure`, `altitude`).
pub const DIVISORS: [f64; 4] = [
    UV_INDEX_DIVISOR,
    TEMPERATURE_DIVISOR,
    PRESSURE_DIVISOR,
    ALTITUDE_DIVISOR,
];

/// Normalize a single reading.
pub fn scale_reading(r: &SensorReading) -> ScaledReading {
    let [uv_index, temperature, pressure, altitude] = DIVISORS;
    ScaledReading {
        scaled_uv_index: r.uv_index / uv_index,
        scaled_temperature: r.temperature / temperature,
        scaled_pressure: r.pressure / pressure,
        scaled_altitude: r.altitude / altitude,
        risk_level: r.risk_level,
    }
}

/// Build the normalized table.
///
/// Always computed from the raw readings, so calling this again on the same
/// dataset yields the same values rather than scaling twice.
pub fn scale(dataset: &SensorDataset) -> ScaledDataset {
    ScaledDataset {
        rows: dataset.readings.iter().map(scale_reading).collect(),
    }
}
