use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ProcessorConfig;
use crate::data::loader::load_file;
use crate::data::model::{RiskLevel, ScaledDataset, SensorDataset};
use crate::data::partition::assign_samples;
use crate::data::scale::scale;
use crate::export::{ensure_output_dir, write_sample};

// ---------------------------------------------------------------------------
// Pipeline stage
// ---------------------------------------------------------------------------

/// Where the processor is in its load → scale → export sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loaded,
    Scaled,
    Exported(RiskLevel),
    Done,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Files written for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassExport {
    pub class: RiskLevel,
    pub files: Vec<PathBuf>,
}

/// What a full run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub config: ProcessorConfig,
    pub rows: usize,
    /// Rows whose label is outside the known classes.
    pub skipped_rows: usize,
    pub classes: Vec<ClassExport>,
}

impl ExportSummary {
    pub fn files_written(&self) -> usize {
        self.classes.iter().map(|c| c.files.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// DatasetProcessor
// ---------------------------------------------------------------------------

/// Loads a sensor dataset, normalizes it and writes one sample file per row.
pub struct DatasetProcessor {
    config: ProcessorConfig,

    /// Raw readings (None until `load`).
    dataset: Option<SensorDataset>,

    /// Normalized table (None until `scale`).
    scaled: Option<ScaledDataset>,

    stage: Stage,
}

impl DatasetProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            dataset: None,
            scaled: None,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn dataset(&self) -> Option<&SensorDataset> {
        self.dataset.as_ref()
    }

    /// Read the configured input file.
    pub fn load(&mut self) -> Result<&SensorDataset> {
        let path = &self.config.input;
        let dataset = load_file(path)
            .with_context(|| format!("loading dataset from {}", path.display()))?;

        info!(
            "Loaded {} rows from {} (label counts: {:?})",
            dataset.len(),
            path.display(),
            dataset.label_counts()
        );
        if !dataset.ignored_columns.is_empty() {
            debug!("Ignoring columns: {:?}", dataset.ignored_columns);
        }
        if dataset.is_empty() {
            warn!("{} has no data rows; no samples will be written", path.display());
        }
        let unlabeled = dataset.unlabeled_rows();
        if unlabeled > 0 {
            warn!("{unlabeled} rows have a risk_level outside 0..=2 and will not be exported");
        }
        println!("Dataset Loaded: {} rows from {}", dataset.len(), path.display());

        self.scaled = None;
        self.stage = Stage::Loaded;
        Ok(self.dataset.insert(dataset))
    }

    /// Normalize the loaded readings.
    ///
    /// May be called again at any point after `load`; the table is rebuilt
    /// from the raw readings each time.
    pub fn scale(&mut self) -> Result<&ScaledDataset> {
        let Some(dataset) = &self.dataset else {
            bail!("cannot scale before a dataset is loaded");
        };
        let scaled = scale(dataset);
        debug!("Scaled {} rows", scaled.len());
        println!("Data Elements Scaled Successfully!");

        if self.stage == Stage::Loaded {
            self.stage = Stage::Scaled;
        }
        Ok(self.scaled.insert(scaled))
    }

    /// Write one sample file per row labelled `class`.
    ///
    /// Files are named `<Class>.sample_<n>.csv` with `n` counting from 1 in
    /// row order. A write failure aborts the pass; files already written stay.
    pub fn export(&mut self, class: RiskLevel) -> Result<ClassExport> {
        let Some(scaled) = &self.scaled else {
            bail!("cannot export {class} samples before the dataset is scaled");
        };

        let out_dir = &self.config.output_dir;
        ensure_output_dir(out_dir)?;

        let assignments = assign_samples(scaled, class);
        let mut files = Vec::with_capacity(assignments.len());
        for a in &assignments {
            let path = out_dir.join(&a.file_name);
            debug!("{class} sample {} <- row {}", a.sample_number, a.row);
            write_sample(&path, &scaled.rows[a.row])
                .with_context(|| format!("exporting row {} as {}", a.row, a.file_name))?;
            println!("CSV File Successfully Created: {}", a.file_name);
            files.push(path);
        }
        info!("{class}: wrote {} samples", files.len());

        self.stage = if class == RiskLevel::Perilous {
            Stage::Done
        } else {
            Stage::Exported(class)
        };
        Ok(ClassExport { class, files })
    }

    /// Full pipeline: load, scale, then export every class in order.
    pub fn run(&mut self) -> Result<ExportSummary> {
        self.load()?;
        self.scale()?;

        let mut classes = Vec::with_capacity(RiskLevel::ALL.len());
        for class in RiskLevel::ALL {
            classes.push(self.export(class)?);
        }

        let (rows, skipped_rows) = self
            .dataset()
            .map(|d| (d.len(), d.unlabeled_rows()))
            .unwrap_or_default();

        Ok(ExportSummary {
            config: self.config.clone(),
            rows,
            skipped_rows,
            classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    use crate::data::scale::DIVISORS;

    const INPUT: &str = "\
uv_index,temperature,pressure,altitude,risk_level,note
7,3200,98000,150,1,example
1,1500,101300,20,0,
9,3900,99000,300,2,
4,2800,100500,80,1,
12,4200,97500,410,2,
2,1900,101000,35,0,
6,3000,99800,120,5,bogus label
";

    fn setup(input: &str) -> (TempDir, ProcessorConfig) {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("UV_DATA.CSV");
        fs::write(&input_path, input).unwrap();
        let config = ProcessorConfig::new(input_path, dir.path().join("out"));
        (dir, config)
    }

    fn sample_files(dir: &Path, class: RiskLevel) -> Vec<String> {
        let prefix = format!("{}.sample_", class.class_name());
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(&prefix) && n.ends_with(".csv"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_run_writes_one_file_per_labelled_row() {
        let (_dir, config) = setup(INPUT);
        let out = config.output_dir.clone();
        let mut processor = DatasetProcessor::new(config);

        let summary = processor.run().unwrap();

        assert_eq!(processor.stage(), Stage::Done);
        assert_eq!(summary.rows, 7);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.files_written(), 6);

        let dataset = processor.dataset().unwrap();
        for class in RiskLevel::ALL {
            let expected = dataset
                .readings
                .iter()
                .filter(|r| r.risk_level == class.index())
                .count();
            assert_eq!(sample_files(&out, class).len(), expected, "{class}");
        }
        assert_eq!(
            sample_files(&out, RiskLevel::Risky),
            vec!["Risky.sample_1.csv", "Risky.sample_2.csv"]
        );
    }

    #[test]
    fn test_sample_content_matches_source_row() {
        let (_dir, config) = setup(INPUT);
        let out = config.output_dir.clone();
        DatasetProcessor::new(config).run().unwrap();

        let first = fs::read_to_string(out.join("Risky.sample_1.csv")).unwrap();
        assert_eq!(
            first,
            "uv_index,temperature,pressure,altitude\r\n0.7,32.0,0.98,1.5\r\n"
        );

        // Second Risky row is input row 4: 4,2800,100500,80
        let second = fs::read_to_string(out.join("Risky.sample_2.csv")).unwrap();
        let values: Vec<f64> = second
            .lines()
            .nth(1)
            .unwrap()
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        let restored: Vec<f64> = values.iter().zip(DIVISORS).map(|(v, d)| v * d).collect();
        for (got, want) in restored.iter().zip([4.0, 2800.0, 100500.0, 80.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rerun_into_fresh_directory_is_byte_identical() {
        let (dir, config) = setup(INPUT);
        let mut second_config = config.clone();
        second_config.output_dir = dir.path().join("out2");

        DatasetProcessor::new(config.clone()).run().unwrap();
        DatasetProcessor::new(second_config.clone()).run().unwrap();

        for class in RiskLevel::ALL {
            for name in sample_files(&config.output_dir, class) {
                let a = fs::read(config.output_dir.join(&name)).unwrap();
                let b = fs::read(second_config.output_dir.join(&name)).unwrap();
                assert_eq!(a, b, "{name}");
            }
        }
    }

    #[test]
    fn test_write_failure_aborts_run_and_keeps_earlier_samples() {
        let (_dir, config) = setup(INPUT);
        let out = config.output_dir.clone();
        // A directory squatting on the second Risky sample makes its open fail.
        fs::create_dir_all(out.join("Risky.sample_2.csv")).unwrap();

        let mut processor = DatasetProcessor::new(config);
        let err = processor.run().unwrap_err();

        assert!(format!("{err:#}").contains("Risky.sample_2.csv"), "{err:#}");
        assert_eq!(processor.stage(), Stage::Exported(RiskLevel::Tolerable));
        assert_eq!(
            fs::read_to_string(out.join("Risky.sample_1.csv")).unwrap(),
            "uv_index,temperature,pressure,altitude\r\n0.7,32.0,0.98,1.5\r\n"
        );
        assert_eq!(sample_files(&out, RiskLevel::Tolerable).len(), 2);
        assert!(sample_files(&out, RiskLevel::Perilous).is_empty());
    }

    #[test]
    fn test_small_scaled_values_use_signed_exponent() {
        let (_dir, config) = setup(
            "uv_index,temperature,pressure,altitude,risk_level\n7,3200,1,1e18,1\n",
        );
        let out = config.output_dir.clone();
        DatasetProcessor::new(config).run().unwrap();

        assert_eq!(
            fs::read_to_string(out.join("Risky.sample_1.csv")).unwrap(),
            "uv_index,temperature,pressure,altitude\r\n0.7,32.0,1e-05,1e+16\r\n"
        );
    }

    #[test]
    fn test_export_before_scale_fails() {
        let (_dir, config) = setup(INPUT);
        let mut processor = DatasetProcessor::new(config);
        processor.load().unwrap();

        assert!(processor.export(RiskLevel::Tolerable).is_err());
        assert_eq!(processor.stage(), Stage::Loaded);
    }

    #[test]
    fn test_scale_before_load_fails() {
        let (_dir, config) = setup(INPUT);
        let mut processor = DatasetProcessor::new(config);
        assert!(processor.scale().is_err());
        assert_eq!(processor.stage(), Stage::Idle);
    }

    #[test]
    fn test_rescaling_does_not_compound() {
        let (_dir, config) = setup(INPUT);
        let mut processor = DatasetProcessor::new(config);
        processor.load().unwrap();
        let first = processor.scale().unwrap().clone();
        let second = processor.scale().unwrap().clone();

        assert_eq!(first.rows, second.rows);
        assert_eq!(second.rows[0].scaled_uv_index, 0.7);
    }

    #[test]
    fn test_stage_progression() {
        let (_dir, config) = setup(INPUT);
        let mut processor = DatasetProcessor::new(config);
        processor.load().unwrap();
        processor.scale().unwrap();
        assert_eq!(processor.stage(), Stage::Scaled);

        processor.export(RiskLevel::Tolerable).unwrap();
        assert_eq!(processor.stage(), Stage::Exported(RiskLevel::Tolerable));
        processor.export(RiskLevel::Risky).unwrap();
        assert_eq!(processor.stage(), Stage::Exported(RiskLevel::Risky));
        processor.export(RiskLevel::Perilous).unwrap();
        assert_eq!(processor.stage(), Stage::Done);
    }

    #[test]
    fn test_missing_column_aborts_run() {
        let (dir, config) = setup("uv_index,temperature,pressure,risk_level\n1,2,3,0\n");
        let err = DatasetProcessor::new(config.clone()).run().unwrap_err();

        assert!(format!("{err:#}").contains("altitude"));
        assert!(!config.output_dir.exists());
        drop(dir);
    }

    #[test]
    fn test_missing_input_file_aborts_run() {
        let dir = tempdir().unwrap();
        let config = ProcessorConfig::new(dir.path().join("UV_DATA.CSV"), dir.path());
        assert!(DatasetProcessor::new(config).run().is_err());
    }

    #[test]
    fn test_summary_serializes_class_names() {
        let (_dir, config) = setup(INPUT);
        let summary = DatasetProcessor::new(config).run().unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["rows"], 7);
        assert_eq!(json["classes"][2]["class"], "Perilous");
        assert_eq!(json["classes"][2]["files"].as_array().unwrap().len(), 2);
    }
}
