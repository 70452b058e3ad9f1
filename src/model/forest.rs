//! Random forest over class-weighted CART trees.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::AnalysisError;
use crate::model::tree::{DecisionTree, TreeParams};

/// Random forest training configuration.
///
/// Defaults match the readiness analysis: 200 trees, depth cap 15, leaf
/// minimum 4, split minimum 5, √k feature subsampling, bootstrap resampling,
/// and balanced (inverse-frequency) class weights.
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Inverse-frequency class weighting in the Gini criterion.
    pub balanced_class_weights: bool,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 4,
            balanced_class_weights: true,
            seed: 42,
        }
    }
}

impl RandomForestConfig {
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    #[must_use]
    pub fn with_balanced_class_weights(mut self, balanced: bool) -> Self {
        self.balanced_class_weights = balanced;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a forest on row-major features and class labels.
    ///
    /// Per-tree seeds and bootstrap samples are all drawn from one master
    /// RNG before the trees are handed to rayon, so the parallel schedule
    /// cannot change the result.
    pub fn fit(&self, x: &[Vec<f64>], y: &[usize]) -> Result<RandomForest, AnalysisError> {
        validate_training_data(x, y)?;

        let n_samples = x.len();
        let n_features = x[0].len();
        let n_classes = y.iter().max().copied().unwrap_or(0) + 1;
        let max_features = (n_features as f64).sqrt().ceil() as usize;

        // Column-major copy: split search scans one feature at a time.
        let mut col_features = vec![vec![0.0f64; n_samples]; n_features];
        for (row_idx, row) in x.iter().enumerate() {
            for (col_idx, &v) in row.iter().enumerate() {
                col_features[col_idx][row_idx] = v;
            }
        }

        let class_weights = if self.balanced_class_weights {
            balanced_weights(y, n_classes)
        } else {
            vec![1.0; n_classes]
        };

        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_inputs: Vec<(u64, Vec<usize>)> = (0..self.n_trees)
            .map(|_| {
                let seed = master.gen::<u64>();
                let sample: Vec<usize> =
                    (0..n_samples).map(|_| master.gen_range(0..n_samples)).collect();
                (seed, sample)
            })
            .collect();

        let trees: Vec<DecisionTree> = tree_inputs
            .into_par_iter()
            .map(|(seed, sample)| {
                let params = TreeParams {
                    max_depth: self.max_depth,
                    min_samples_split: self.min_samples_split,
                    min_samples_leaf: self.min_samples_leaf,
                    max_features,
                    seed,
                };
                DecisionTree::fit(&col_features, y, &sample, n_classes, &class_weights, &params)
            })
            .collect();

        let importances = aggregate_importances(&trees, n_features);

        Ok(RandomForest {
            trees,
            n_features,
            n_classes,
            importances,
        })
    }
}

/// A fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    /// Mean-decrease-in-impurity feature importances, normalized to sum 1
    /// (all zeros when no tree ever split).
    importances: Vec<f64>,
}

impl RandomForest {
    /// Predict classes for a batch of samples by averaging per-tree class
    /// distributions and taking the argmax.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<usize>, AnalysisError> {
        x.iter().map(|sample| self.predict_one(sample)).collect()
    }

    fn predict_one(&self, sample: &[f64]) -> Result<usize, AnalysisError> {
        let mut votes = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            let dist = tree.predict_proba(sample)?;
            for (acc, &p) in votes.iter_mut().zip(dist.iter()) {
                *acc += p;
            }
        }
        Ok(votes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Normalized mean-decrease-in-impurity importances, one per feature.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

fn validate_training_data(x: &[Vec<f64>], y: &[usize]) -> Result<(), AnalysisError> {
    if x.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(AnalysisError::ZeroFeatures);
    }
    if x.len() != y.len() {
        return Err(AnalysisError::LabelAlignmentMismatch {
            label: "training".to_string(),
            expected: x.len(),
            got: y.len(),
        });
    }
    for (sample_index, row) in x.iter().enumerate() {
        if row.len() != n_features {
            return Err(AnalysisError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &v) in row.iter().enumerate() {
            if !v.is_finite() {
                return Err(AnalysisError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(())
}

/// Inverse-frequency weights: w_c = n / (k · count_c). Absent classes get
/// weight 0 and can never dominate a leaf.
fn balanced_weights(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &c in y {
        counts[c] += 1;
    }
    let n = y.len() as f64;
    let k = n_classes as f64;
    counts
        .iter()
        .map(|&c| if c > 0 { n / (k * c as f64) } else { 0.0 })
        .collect()
}

fn aggregate_importances(trees: &[DecisionTree], n_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0f64; n_features];
    for tree in trees {
        for (acc, &v) in totals.iter_mut().zip(tree.importance_totals()) {
            *acc += v;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        for v in &mut totals {
            *v /= sum;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            x.push(vec![i as f64, (i % 3) as f64]);
            y.push(usize::from(i >= 10));
        }
        (x, y)
    }

    fn small_config() -> RandomForestConfig {
        RandomForestConfig::default()
            .with_n_trees(25)
            .with_min_samples_leaf(1)
            .with_min_samples_split(2)
    }

    #[test]
    fn default_config_matches_analysis_settings() {
        let c = RandomForestConfig::default();
        assert_eq!(c.n_trees, 200);
        assert_eq!(c.max_depth, 15);
        assert_eq!(c.min_samples_split, 5);
        assert_eq!(c.min_samples_leaf, 4);
        assert!(c.balanced_class_weights);
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = separable_data();
        let forest = small_config().fit(&x, &y).unwrap();
        let preds = forest.predict(&x).unwrap();
        let correct = preds.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 18, "only {correct}/20 correct");
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let (x, y) = separable_data();
        let a = small_config().with_seed(7).fit(&x, &y).unwrap();
        let b = small_config().with_seed(7).fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn importances_sum_to_one() {
        let (x, y) = separable_data();
        let forest = small_config().fit(&x, &y).unwrap();
        let sum: f64 = forest.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn empty_dataset_rejected() {
        let err = small_config().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset));
    }

    #[test]
    fn zero_features_rejected() {
        let err = small_config().fit(&[vec![]], &[0]).unwrap_err();
        assert!(matches!(err, AnalysisError::ZeroFeatures));
    }

    #[test]
    fn ragged_rows_rejected() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let err = small_config().fit(&x, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn non_finite_value_rejected() {
        let x = vec![vec![1.0, 2.0], vec![3.0, f64::NAN]];
        let err = small_config().fit(&x, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NonFiniteValue {
                sample_index: 1,
                feature_index: 1
            }
        ));
    }

    #[test]
    fn label_length_mismatch_rejected() {
        let x = vec![vec![1.0], vec![2.0]];
        let err = small_config().fit(&x, &[0]).unwrap_err();
        assert!(matches!(err, AnalysisError::LabelAlignmentMismatch { .. }));
    }

    #[test]
    fn balanced_weights_inverse_frequency() {
        let y = vec![0, 0, 0, 1];
        let w = balanced_weights(&y, 2);
        // n / (k * count): 4 / (2*3) and 4 / (2*1).
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((w[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn prediction_feature_mismatch_surfaces() {
        let (x, y) = separable_data();
        let forest = small_config().fit(&x, &y).unwrap();
        let err = forest.predict(&[vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }
}
