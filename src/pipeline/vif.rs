//! Variance-inflation-factor multicollinearity diagnostic.
//!
//! VIF_i = 1 / (1 − R²_i), where R²_i comes from regressing feature i on
//! the remaining features. Rather than running k separate regressions,
//! the scores are read off the diagonal of the inverse feature-correlation
//! matrix — the two formulations are algebraically identical.

use faer::prelude::*;
use faer::Mat;
use polars::prelude::*;

use crate::error::AnalysisError;

/// Scores above this value conventionally flag problematic collinearity.
/// Interpretation policy only — nothing is removed automatically.
pub const VIF_FLAG_THRESHOLD: f64 = 5.0;

/// One feature's variance-inflation score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VifScore {
    /// Feature column name.
    pub feature: String,
    /// The variance-inflation factor; `f64::INFINITY` under perfect
    /// collinearity.
    pub vif: f64,
}

/// Compute VIF for the given numeric feature columns.
///
/// Requires at least two columns, each numeric, complete (no nulls), and
/// non-constant; otherwise fails with
/// [`AnalysisError::InsufficientFeatures`] reporting how many usable
/// columns were found. Results are returned in input column order.
///
/// Perfectly collinear pairs (|r| within 1e-12 of 1) score
/// `f64::INFINITY`; the remaining features are scored with one member of
/// each such pair removed, since the full matrix is singular.
pub fn compute_vif(df: &DataFrame, columns: &[String]) -> Result<Vec<VifScore>, AnalysisError> {
    let mut usable: Vec<(String, Vec<f64>)> = Vec::with_capacity(columns.len());

    for name in columns {
        let Ok(col) = df.column(name) else {
            continue;
        };
        if !col.dtype().is_primitive_numeric() || col.null_count() > 0 {
            continue;
        }
        let values: Vec<f64> = col
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .flatten()
            .collect();
        // Constant columns cannot be standardized.
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
        if variance == 0.0 {
            continue;
        }
        usable.push((name.clone(), values));
    }

    if usable.len() < 2 || usable.len() < columns.len() {
        return Err(AnalysisError::InsufficientFeatures {
            available: usable.len(),
        });
    }

    let n_rows = usable[0].1.len();
    let k = usable.len();
    if n_rows < 2 {
        return Err(AnalysisError::InsufficientFeatures { available: 0 });
    }

    // Standardize each column to zero mean, unit norm, so R = Zᵀ·Z is the
    // correlation matrix.
    let mut z = Mat::<f64>::zeros(n_rows, k);
    for (col_idx, (_, values)) in usable.iter().enumerate() {
        let mean = values.iter().sum::<f64>() / n_rows as f64;
        let norm = values
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            .sqrt();
        for (row_idx, &v) in values.iter().enumerate() {
            z[(row_idx, col_idx)] = (v - mean) / norm;
        }
    }

    let corr = z.transpose() * &z;

    // A perfectly collinear pair makes R singular and would corrupt every
    // diagonal entry of the inverse, not just the pair's. Flag such pairs
    // as unbounded up front, keep one member of each, and invert the
    // reduced matrix so uninvolved features keep their finite scores.
    let mut unbounded = vec![false; k];
    let mut dropped = vec![false; k];
    for i in 0..k {
        if dropped[i] {
            continue;
        }
        for j in (i + 1)..k {
            if !dropped[j] && corr[(i, j)].abs() >= 1.0 - 1e-12 {
                unbounded[i] = true;
                unbounded[j] = true;
                dropped[j] = true;
            }
        }
    }

    let kept: Vec<usize> = (0..k).filter(|&i| !dropped[i]).collect();
    let mut vifs = vec![f64::INFINITY; k];
    if kept.len() >= 2 {
        let m = kept.len();
        let reduced = Mat::<f64>::from_fn(m, m, |r, c| corr[(kept[r], kept[c])]);
        let inverse = reduced
            .partial_piv_lu()
            .solve(&Mat::<f64>::identity(m, m));
        for (reduced_idx, &orig_idx) in kept.iter().enumerate() {
            if unbounded[orig_idx] {
                continue;
            }
            let diag = inverse[(reduced_idx, reduced_idx)];
            vifs[orig_idx] = if diag.is_finite() { diag } else { f64::INFINITY };
        }
    }

    let scores = usable
        .iter()
        .enumerate()
        .map(|(i, (name, _))| VifScore {
            feature: name.clone(),
            vif: vifs[i],
        })
        .collect();

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_features_near_one() {
        // Orthogonal-ish columns: VIF should sit close to 1.
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            "b" => [5.0f64, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0],
        }
        .unwrap();
        let cols = vec!["a".to_string(), "b".to_string()];
        let scores = compute_vif(&df, &cols).unwrap();
        assert_eq!(scores.len(), 2);
        for s in &scores {
            assert!(s.vif >= 1.0 - 1e-9, "{}: vif {}", s.feature, s.vif);
            assert!(s.vif < 2.0, "{}: vif {}", s.feature, s.vif);
        }
    }

    #[test]
    fn perfect_collinearity_unbounded() {
        // b = 2a exactly: both VIFs must blow up.
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
            "b" => [2.0f64, 4.0, 6.0, 8.0, 10.0],
            "c" => [3.0f64, 1.0, 4.0, 1.0, 5.0],
        }
        .unwrap();
        let cols = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let scores = compute_vif(&df, &cols).unwrap();
        let a = scores.iter().find(|s| s.feature == "a").unwrap();
        let b = scores.iter().find(|s| s.feature == "b").unwrap();
        assert!(a.vif.is_infinite(), "a.vif = {}", a.vif);
        assert!(b.vif.is_infinite(), "b.vif = {}", b.vif);
    }

    #[test]
    fn uninvolved_feature_keeps_finite_score() {
        // c is independent of the collinear a/b pair; its score must stay
        // finite (VIF against a alone is 1/(1 − 0.125) ≈ 1.14) instead of
        // being dragged to infinity by the singular full matrix.
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
            "b" => [2.0f64, 4.0, 6.0, 8.0, 10.0],
            "c" => [3.0f64, 1.0, 4.0, 1.0, 5.0],
        }
        .unwrap();
        let cols = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let scores = compute_vif(&df, &cols).unwrap();
        let c = scores.iter().find(|s| s.feature == "c").unwrap();
        assert!(c.vif.is_finite(), "c.vif = {}", c.vif);
        assert!((c.vif - 1.0 / (1.0 - 0.125)).abs() < 1e-6, "c.vif = {}", c.vif);
    }

    #[test]
    fn two_collinear_columns_both_unbounded() {
        let df = df! {
            "a" => [1.0f64, 2.0, 3.0, 4.0],
            "b" => [10.0f64, 20.0, 30.0, 40.0],
        }
        .unwrap();
        let cols = vec!["a".to_string(), "b".to_string()];
        let scores = compute_vif(&df, &cols).unwrap();
        assert!(scores.iter().all(|s| s.vif.is_infinite()));
    }

    #[test]
    fn single_column_insufficient() {
        let df = df! { "a" => [1.0f64, 2.0, 3.0] }.unwrap();
        let cols = vec!["a".to_string()];
        let err = compute_vif(&df, &cols).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientFeatures { available: 1 }
        ));
    }

    #[test]
    fn null_column_insufficient() {
        let df = df! {
            "a" => [Some(1.0f64), None, Some(3.0)],
            "b" => [1.0f64, 2.0, 3.0],
        }
        .unwrap();
        let cols = vec!["a".to_string(), "b".to_string()];
        let err = compute_vif(&df, &cols).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientFeatures { .. }));
    }

    #[test]
    fn results_in_input_order() {
        let df = df! {
            "x" => [1.0f64, 4.0, 2.0, 8.0, 5.0],
            "y" => [3.0f64, 1.0, 9.0, 2.0, 7.0],
            "z" => [2.0f64, 6.0, 1.0, 5.0, 3.0],
        }
        .unwrap();
        let cols = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let scores = compute_vif(&df, &cols).unwrap();
        let names: Vec<&str> = scores.iter().map(|s| s.feature.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
