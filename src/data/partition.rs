use super::model::{RiskLevel, ScaledDataset};

// ---------------------------------------------------------------------------
// Per-class sample assignment
// ---------------------------------------------------------------------------

/// One qualifying row and the sample slot it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleAssignment {
    /// Index of the source row in the dataset.
    pub row: usize,
    /// 1-based counter, local to the class.
    pub sample_number: usize,
    pub file_name: String,
}

/// File name for the `n`-th sample of a class, e.g. `Risky.sample_1.csv`.
pub fn sample_file_name(class: RiskLevel, n: usize) -> String {
    format!("{}.sample_{n}.csv", class.class_name())
}

/// Return indices of rows labelled with `class`, in input order.
pub fn class_indices(dataset: &ScaledDataset, class: RiskLevel) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.risk_level == class.index())
        .map(|(i, _)| i)
        .collect()
}

/// Number the rows of one class.
///
/// Counters start at 1 and are contiguous in row order; each call starts a
/// fresh count.
pub fn assign_samples(dataset: &ScaledDataset, class: RiskLevel) -> Vec<SampleAssignment> {
    class_indices(dataset, class)
        .into_iter()
        .zip(1..)
        .map(|(row, sample_number)| SampleAssignment {
            row,
            sample_number,
            file_name: sample_file_name(class, sample_number),
        })
        .collect()
}
