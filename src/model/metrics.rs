//! Classification metrics: confusion matrix and per-class scores.

use serde::Serialize;

use crate::error::AnalysisError;

/// Precision, recall, F1, and support for a single class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub class: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Confusion matrix over `n_classes` classes. Rows index the true class,
/// columns the predicted class.
#[derive(Debug, Clone, Serialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build the matrix from aligned truth and prediction vectors.
    pub fn from_predictions(
        truth: &[usize],
        predicted: &[usize],
    ) -> Result<Self, AnalysisError> {
        if truth.len() != predicted.len() {
            return Err(AnalysisError::LabelAlignmentMismatch {
                label: "evaluation".to_string(),
                expected: truth.len(),
                got: predicted.len(),
            });
        }
        if truth.is_empty() {
            return Err(AnalysisError::EmptyPartition {
                stage: "evaluation",
                detail: "no samples to score".to_string(),
            });
        }

        let n_classes = truth
            .iter()
            .chain(predicted.iter())
            .max()
            .copied()
            .unwrap_or(0)
            + 1;
        let mut counts = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            counts[t][p] += 1;
        }
        Ok(Self { n_classes, counts })
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Count of samples with true class `t` predicted as class `p`.
    pub fn count(&self, t: usize, p: usize) -> usize {
        self.counts[t][p]
    }

    /// Fraction of samples on the matrix diagonal.
    pub fn accuracy(&self) -> f64 {
        let total: usize = self.counts.iter().map(|row| row.iter().sum::<usize>()).sum();
        let diagonal: usize = (0..self.n_classes).map(|i| self.counts[i][i]).sum();
        diagonal as f64 / total as f64
    }

    /// Per-class precision, recall, F1, and support. A class never
    /// predicted gets precision 0; one with no true samples gets recall 0.
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|class| {
                let tp = self.counts[class][class];
                let predicted: usize = (0..self.n_classes).map(|t| self.counts[t][class]).sum();
                let support: usize = self.counts[class].iter().sum();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Unweighted mean of per-class F1 scores.
    pub fn macro_f1(&self) -> f64 {
        let metrics = self.class_metrics();
        metrics.iter().map(|m| m.f1).sum::<f64>() / metrics.len() as f64
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let truth = vec![0, 1, 0, 1, 1];
        let cm = ConfusionMatrix::from_predictions(&truth, &truth).unwrap();
        assert_eq!(cm.accuracy(), 1.0);
        for m in cm.class_metrics() {
            assert_eq!(m.precision, 1.0);
            assert_eq!(m.recall, 1.0);
            assert_eq!(m.f1, 1.0);
        }
    }

    #[test]
    fn known_binary_counts() {
        //            predicted 0  predicted 1
        // true 0:        3            1
        // true 1:        2            4
        let truth = vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
        let predicted = vec![0, 0, 0, 1, 0, 0, 1, 1, 1, 1];
        let cm = ConfusionMatrix::from_predictions(&truth, &predicted).unwrap();
        assert_eq!(cm.count(0, 0), 3);
        assert_eq!(cm.count(0, 1), 1);
        assert_eq!(cm.count(1, 0), 2);
        assert_eq!(cm.count(1, 1), 4);
        assert!((cm.accuracy() - 0.7).abs() < 1e-12);

        let metrics = cm.class_metrics();
        assert!((metrics[1].precision - 4.0 / 5.0).abs() < 1e-12);
        assert!((metrics[1].recall - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(metrics[1].support, 6);
        assert_eq!(metrics[0].support, 4);
    }

    #[test]
    fn never_predicted_class_gets_zero_precision() {
        let truth = vec![0, 1, 1];
        let predicted = vec![1, 1, 1];
        let cm = ConfusionMatrix::from_predictions(&truth, &predicted).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[0].precision, 0.0);
        assert_eq!(metrics[0].recall, 0.0);
        assert_eq!(metrics[0].f1, 0.0);
    }

    #[test]
    fn macro_f1_averages_classes() {
        let truth = vec![0, 0, 1, 1];
        let predicted = vec![0, 0, 1, 0];
        let cm = ConfusionMatrix::from_predictions(&truth, &predicted).unwrap();
        let metrics = cm.class_metrics();
        let expected = (metrics[0].f1 + metrics[1].f1) / 2.0;
        assert!((cm.macro_f1() - expected).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = ConfusionMatrix::from_predictions(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(err, AnalysisError::LabelAlignmentMismatch { .. }));
    }

    #[test]
    fn empty_inputs_rejected() {
        let err = ConfusionMatrix::from_predictions(&[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyPartition { .. }));
    }
}
