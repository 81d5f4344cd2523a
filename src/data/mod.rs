/// Data layer: core types, loading, scaling, and partitioning.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → SensorDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  scale   │  fixed divisors → ScaledDataset (raw rows untouched)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ partition │  rows of one class → numbered sample slots
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod partition;
pub mod scale;
