//! Seeded train/test partitioning.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::AnalysisError;

/// Row indices for the train and held-out test partitions.
#[derive(Debug, Clone)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `n_rows` row indices into train and test partitions.
///
/// The shuffle is seeded, so identical inputs and seed reproduce the same
/// partitions. When `stratify_by` is given (one class label per row), the
/// test fraction is drawn per class so skewed labels keep both classes in
/// the held-out set.
///
/// # Errors
///
/// [`AnalysisError::EmptyPartition`] when either side ends up with zero
/// rows, [`AnalysisError::LabelAlignmentMismatch`] when `stratify_by` does
/// not carry exactly one label per row.
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
    stratify_by: Option<&[usize]>,
) -> Result<SplitIndices, AnalysisError> {
    if n_rows == 0 {
        return Err(AnalysisError::EmptyPartition {
            stage: "train/test split",
            detail: "dataset has zero rows".to_string(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (train, test) = match stratify_by {
        None => {
            let mut indices: Vec<usize> = (0..n_rows).collect();
            indices.shuffle(&mut rng);
            let n_test = ((n_rows as f64) * test_fraction).round() as usize;
            let test = indices[..n_test].to_vec();
            let train = indices[n_test..].to_vec();
            (train, test)
        }
        Some(labels) => {
            if labels.len() != n_rows {
                return Err(AnalysisError::LabelAlignmentMismatch {
                    label: "stratification".to_string(),
                    expected: n_rows,
                    got: labels.len(),
                });
            }
            let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
            let mut per_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
            for (idx, &class) in labels.iter().enumerate() {
                per_class[class].push(idx);
            }
            let mut train = Vec::new();
            let mut test = Vec::new();
            for mut members in per_class {
                members.shuffle(&mut rng);
                let n_test = ((members.len() as f64) * test_fraction).round() as usize;
                test.extend_from_slice(&members[..n_test]);
                train.extend_from_slice(&members[n_test..]);
            }
            (train, test)
        }
    };

    if train.is_empty() || test.is_empty() {
        let side = if train.is_empty() { "train" } else { "test" };
        return Err(AnalysisError::EmptyPartition {
            stage: "train/test split",
            detail: format!("{side} partition has zero rows (n = {n_rows}, test fraction = {test_fraction})"),
        });
    }

    Ok(SplitIndices { train, test })
}

/// Select the given rows from a row-major matrix.
#[must_use]
pub fn take_rows(matrix: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    indices.iter().map(|&i| matrix[i].clone()).collect()
}

/// Select the given entries from a label vector.
#[must_use]
pub fn take_labels(labels: &[usize], indices: &[usize]) -> Vec<usize> {
    indices.iter().map(|&i| labels[i]).collect()
}
