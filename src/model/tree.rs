//! Class-weighted CART decision tree.
//!
//! Arena-based nodes with index references; splits are found by exact
//! scan over a random feature subset, scoring candidates with weighted
//! Gini impurity so balanced class weighting flows through every split
//! decision.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::AnalysisError;

/// Tree-level training parameters, resolved by the forest.
#[derive(Debug, Clone)]
pub(crate) struct TreeParams {
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: usize,
    pub(crate) seed: u64,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        prediction: usize,
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted decision tree.
#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    /// Raw (unnormalized) impurity-decrease totals per feature.
    importance_totals: Vec<f64>,
}

impl DecisionTree {
    /// Fit a tree on column-major features restricted to `sample_indices`.
    ///
    /// `class_weights[c]` scales every sample of class c in the impurity
    /// computation; pass all-ones for unweighted Gini.
    pub(crate) fn fit(
        col_features: &[Vec<f64>],
        labels: &[usize],
        sample_indices: &[usize],
        n_classes: usize,
        class_weights: &[f64],
        params: &TreeParams,
    ) -> Self {
        let n_features = col_features.len();
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut arena: Vec<Node> = Vec::new();
        let mut importance_totals = vec![0.0f64; n_features];

        build_node(
            col_features,
            labels,
            sample_indices,
            n_classes,
            class_weights,
            params,
            0,
            &mut rng,
            &mut arena,
            &mut importance_totals,
        );

        Self {
            nodes: arena,
            n_features,
            importance_totals,
        }
    }

    /// Class probability distribution for one sample.
    pub(crate) fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], AnalysisError> {
        if sample.len() != self.n_features {
            return Err(AnalysisError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution, .. } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Majority-class prediction for one sample.
    pub(crate) fn predict(&self, sample: &[f64]) -> Result<usize, AnalysisError> {
        if sample.len() != self.n_features {
            return Err(AnalysisError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { prediction, .. } => return Ok(*prediction),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Raw per-feature impurity-decrease totals for this tree.
    pub(crate) fn importance_totals(&self) -> &[f64] {
        &self.importance_totals
    }
}

/// Weighted Gini impurity: 1 − Σ(w_c / W)².
fn weighted_gini(weighted_counts: &[f64], total_weight: f64) -> f64 {
    if total_weight <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = weighted_counts
        .iter()
        .map(|&w| {
            let p = w / total_weight;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    col_features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    class_weights: &[f64],
    params: &TreeParams,
    depth: usize,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<Node>,
    importance_totals: &mut [f64],
) -> usize {
    let n_samples = sample_indices.len();

    let mut weighted_counts = vec![0.0f64; n_classes];
    for &si in sample_indices {
        weighted_counts[labels[si]] += class_weights[labels[si]];
    }
    let total_weight: f64 = weighted_counts.iter().sum();
    let impurity = weighted_gini(&weighted_counts, total_weight);

    let make_leaf = |arena: &mut Vec<Node>| -> usize {
        let distribution: Vec<f64> = weighted_counts
            .iter()
            .map(|&w| if total_weight > 0.0 { w / total_weight } else { 0.0 })
            .collect();
        let prediction = distribution
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let idx = arena.len();
        arena.push(Node::Leaf {
            prediction,
            distribution,
        });
        idx
    };

    let stop = depth >= params.max_depth
        || n_samples < params.min_samples_split
        || impurity == 0.0;
    if stop {
        return make_leaf(arena);
    }

    let split = find_best_split(
        col_features,
        labels,
        sample_indices,
        n_classes,
        class_weights,
        impurity,
        total_weight,
        params,
        rng,
    );

    let Some(split) = split else {
        return make_leaf(arena);
    };

    importance_totals[split.feature] += split.impurity_decrease;

    // Reserve the arena slot, recurse, then overwrite with the split node.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        prediction: 0,
        distribution: vec![0.0; n_classes],
    });

    let left = build_node(
        col_features,
        labels,
        &split.left_indices,
        n_classes,
        class_weights,
        params,
        depth + 1,
        rng,
        arena,
        importance_totals,
    );
    let right = build_node(
        col_features,
        labels,
        &split.right_indices,
        n_classes,
        class_weights,
        params,
        depth + 1,
        rng,
        arena,
        importance_totals,
    );

    arena[node_idx] = Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left,
        right,
    };

    node_idx
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity_decrease: f64,
    left_indices: Vec<usize>,
    right_indices: Vec<usize>,
}

/// Exact split search over a random subset of `max_features` features.
///
/// Sorts (value, sample) pairs per candidate feature and scans boundaries
/// with incremental weighted class counts. Returns `None` when no boundary
/// satisfies `min_samples_leaf` or every candidate feature is constant.
#[allow(clippy::too_many_arguments)]
fn find_best_split(
    col_features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    class_weights: &[f64],
    parent_impurity: f64,
    parent_weight: f64,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let n_features = col_features.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    // Partial Fisher-Yates: shuffle only the first `take` positions.
    let take = params.max_features.min(n_features);
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }

    let mut parent_counts = vec![0.0f64; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += class_weights[labels[si]];
    }

    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;

    for &feat_idx in &feature_order[..take] {
        let feat_col = &col_features[feat_idx];
        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (feat_col[si], si))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0.0f64; n_classes];
        let mut right_counts = parent_counts.clone();
        let mut left_weight = 0.0f64;

        for i in 0..(n_samples - 1) {
            let (val_i, si) = sorted[i];
            let class_i = labels[si];
            let w = class_weights[class_i];
            left_counts[class_i] += w;
            right_counts[class_i] -= w;
            left_weight += w;

            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let right_weight = parent_weight - left_weight;
            let decrease = parent_weight * parent_impurity
                - left_weight * weighted_gini(&left_counts, left_weight)
                - right_weight * weighted_gini(&right_counts, right_weight);

            if decrease > best_decrease {
                best_decrease = decrease;
                best = Some((feat_idx, (val_i + val_next) / 2.0));
            }
        }
    }

    let (feature, threshold) = best?;
    let feat_col = &col_features[feature];
    let mut left_indices = Vec::with_capacity(n_samples / 2);
    let mut right_indices = Vec::with_capacity(n_samples / 2);
    for &si in sample_indices {
        if feat_col[si] <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }

    Some(BestSplit {
        feature,
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}
