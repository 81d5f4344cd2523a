//! Writes a deterministic synthetic `UV_DATA.CSV` (plus a Parquet twin) for
//! trying out the processor.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 120;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Sensor units as logged by the watch: UV index, centi-°C, Pa, cm.
struct Row {
    uv_index: f64,
    temperature: f64,
    pressure: f64,
    altitude: f64,
    risk_level: i64,
}

fn risk_for(uv_index: f64, temperature: f64) -> i64 {
    // Heat pushes a borderline UV reading up one class.
    let uv = if temperature > 3500.0 { uv_index + 1.0 } else { uv_index };
    match uv {
        u if u < 4.0 => 0,
        u if u < 8.0 => 1,
        _ => 2,
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|_| {
            let uv_index = (rng.uniform(0.0, 12.0) * 10.0).round() / 10.0;
            let temperature = rng.uniform(1200.0, 4200.0).round();
            let altitude = rng.uniform(0.0, 900.0).round();
            // Roughly 12 Pa lost per metre of height.
            let pressure = (101_325.0 - altitude * 0.12 + rng.uniform(-600.0, 600.0)).round();
            Row {
                uv_index,
                temperature,
                pressure,
                altitude,
                risk_level: risk_for(uv_index, temperature),
            }
        })
        .collect()
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["uv_index", "temperature", "pressure", "altitude", "risk_level"])?;
    for r in rows {
        writer.write_record(&[
            r.uv_index.to_string(),
            r.temperature.to_string(),
            r.pressure.to_string(),
            r.altitude.to_string(),
            r.risk_level.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let column = |f: fn(&Row) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("uv_index", DataType::Float64, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("pressure", DataType::Float64, false),
        Field::new("altitude", DataType::Float64, false),
        Field::new("risk_level", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(column(|r| r.uv_index)),
            Arc::new(column(|r| r.temperature)),
            Arc::new(column(|r| r.pressure)),
            Arc::new(column(|r| r.altitude)),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.risk_level).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv("UV_DATA.CSV", &rows)?;
    write_parquet("uv_data.parquet", &rows)?;

    let mut counts = [0usize; 3];
    for r in &rows {
        counts[r.risk_level as usize] += 1;
    }
    println!(
        "Wrote {} readings to UV_DATA.CSV and uv_data.parquet (Tolerable {}, Risky {}, Perilous {})",
        rows.len(),
        counts[0],
        counts[1],
        counts[2]
    );
    Ok(())
}
