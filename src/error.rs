//! Typed errors for the analysis pipeline.

use thiserror::Error;

/// Everything that can go wrong between loading the survey and scoring
/// the forests. The binary layer wraps these with `anyhow` context;
/// library callers can match on the variants.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("required column '{column}' not found during {stage}")]
    MissingColumn { column: String, stage: &'static str },

    #[error("column '{column}' has type {found}, expected {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("unmapped category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("collinearity check needs at least 2 usable numeric feature columns, found {available}")]
    InsufficientFeatures { available: usize },

    #[error("empty partition during {stage}: {detail}")]
    EmptyPartition { stage: &'static str, detail: String },

    #[error("label '{label}' is single-class (all rows fell to class {class} at threshold {threshold})")]
    DegenerateLabel {
        label: String,
        threshold: f64,
        class: u32,
    },

    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    #[error("cannot train on samples with zero features")]
    ZeroFeatures,

    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    #[error("prediction input has {got} features, model was trained on {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    #[error("label '{label}' has {got} entries for {expected} samples")]
    LabelAlignmentMismatch {
        label: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid quantile {q} for label '{label}' (must be in (0, 1))")]
    InvalidQuantile { label: String, q: f64 },

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}
