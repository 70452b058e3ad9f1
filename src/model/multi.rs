//! Multi-output wrapper: one forest per label column, trained on shared
//! features.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::AnalysisError;
use crate::model::forest::{RandomForest, RandomForestConfig};

/// A set of forests fitted jointly, one per label column.
#[derive(Debug)]
pub struct MultiOutputForest {
    outputs: Vec<(String, RandomForest)>,
    n_features: usize,
}

impl MultiOutputForest {
    /// Fit one forest per `(label name, label vector)` pair.
    ///
    /// Every label vector must align with `x` row-for-row. Each output gets
    /// its own seed drawn from the base config's seed, so adding or
    /// reordering outputs never silently reuses another output's RNG
    /// stream.
    pub fn fit(
        config: &RandomForestConfig,
        x: &[Vec<f64>],
        labels: &[(String, Vec<usize>)],
    ) -> Result<Self, AnalysisError> {
        if labels.is_empty() {
            return Err(AnalysisError::EmptyPartition {
                stage: "model training",
                detail: "no label columns to fit".to_string(),
            });
        }

        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = labels.iter().map(|_| master.gen()).collect();

        let mut outputs = Vec::with_capacity(labels.len());
        for ((name, y), seed) in labels.iter().zip(seeds) {
            if y.len() != x.len() {
                return Err(AnalysisError::LabelAlignmentMismatch {
                    label: name.clone(),
                    expected: x.len(),
                    got: y.len(),
                });
            }
            let forest = config.clone().with_seed(seed).fit(x, y)?;
            outputs.push((name.clone(), forest));
        }

        let n_features = outputs[0].1.n_features();
        Ok(Self { outputs, n_features })
    }

    /// Predict every output for a batch of samples. Results pair each label
    /// name with its predicted class vector, in training order.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<(String, Vec<usize>)>, AnalysisError> {
        self.outputs
            .iter()
            .map(|(name, forest)| Ok((name.clone(), forest.predict(x)?)))
            .collect()
    }

    /// Per-feature importances averaged across all outputs; still sums to 1
    /// when every output's own importances do.
    pub fn mean_feature_importances(&self) -> Vec<f64> {
        let mut mean = vec![0.0f64; self.n_features];
        for (_, forest) in &self.outputs {
            for (acc, &v) in mean.iter_mut().zip(forest.feature_importances()) {
                *acc += v;
            }
        }
        let k = self.outputs.len() as f64;
        for v in &mut mean {
            *v /= k;
        }
        mean
    }

    /// The fitted forests, paired with their label names.
    pub fn outputs(&self) -> &[(String, RandomForest)] {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_data() -> (Vec<Vec<f64>>, Vec<(String, Vec<usize>)>) {
        let mut x = Vec::new();
        let mut first = Vec::new();
        let mut second = Vec::new();
        for i in 0..24 {
            x.push(vec![i as f64, (23 - i) as f64]);
            first.push(usize::from(i >= 12));
            second.push(usize::from(i < 12));
        }
        (
            x,
            vec![
                ("Access_Basic_Computer_Knowledge".to_string(), first),
                ("Gain_Basic_Computer_Knowledge".to_string(), second),
            ],
        )
    }

    fn config() -> RandomForestConfig {
        RandomForestConfig::default()
            .with_n_trees(20)
            .with_min_samples_leaf(1)
            .with_min_samples_split(2)
    }

    #[test]
    fn fits_and_predicts_every_output() {
        let (x, labels) = training_data();
        let model = MultiOutputForest::fit(&config(), &x, &labels).unwrap();
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].0, "Access_Basic_Computer_Knowledge");
        assert_eq!(preds[1].0, "Gain_Basic_Computer_Knowledge");
        for (name, pred) in &preds {
            let truth = &labels.iter().find(|(n, _)| n == name).unwrap().1;
            let correct = pred.iter().zip(truth).filter(|(p, t)| p == t).count();
            assert!(correct >= 22, "{name}: {correct}/24 correct");
        }
    }

    #[test]
    fn outputs_get_independent_seeds() {
        // Opposite labels on the same features: identical seeds would make
        // the two forests mirror images tree-for-tree, which is fine, but
        // the per-output streams must at least be deterministic.
        let (x, labels) = training_data();
        let a = MultiOutputForest::fit(&config(), &x, &labels).unwrap();
        let b = MultiOutputForest::fit(&config(), &x, &labels).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn mean_importances_sum_to_one() {
        let (x, labels) = training_data();
        let model = MultiOutputForest::fit(&config(), &x, &labels).unwrap();
        let sum: f64 = model.mean_feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn misaligned_label_vector_rejected() {
        let (x, mut labels) = training_data();
        labels[1].1.pop();
        let err = MultiOutputForest::fit(&config(), &x, &labels).unwrap_err();
        match err {
            AnalysisError::LabelAlignmentMismatch { label, expected, got } => {
                assert_eq!(label, "Gain_Basic_Computer_Knowledge");
                assert_eq!(expected, 24);
                assert_eq!(got, 23);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_labels_rejected() {
        let (x, _) = training_data();
        let err = MultiOutputForest::fit(&config(), &x, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyPartition { .. }));
    }
}
