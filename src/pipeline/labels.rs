//! Binary label construction from continuous scores.
//!
//! Two interchangeable strategies produce the access and gain labels:
//! a median split (balanced, outlier-robust, easy to interpret) and a
//! quantile split with per-domain thresholds tuned to sharpen the
//! minority "underserved" class. Both are named variants and can be run
//! on the same frame — neither overwrites the other's columns unless the
//! caller asks it to.

use polars::prelude::*;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::pipeline::schema::Domain;

/// Class code for scores at or below the threshold.
pub const BELOW_AVERAGE: u32 = 0;
/// Class code for scores above the threshold.
pub const ABOVE_AVERAGE: u32 = 1;

/// Per-domain quantiles for the quantile-split strategy.
///
/// Defaults are the thresholds used in the historical analysis runs.
#[derive(Debug, Clone, Serialize)]
pub struct QuantileConfig {
    pub access_computer: f64,
    pub access_internet: f64,
    pub access_mobile: f64,
    pub gain_computer: f64,
    pub gain_internet: f64,
    pub gain_mobile: f64,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            access_computer: 0.63,
            access_internet: 0.56,
            access_mobile: 0.69,
            gain_computer: 0.56,
            gain_internet: 0.55,
            gain_mobile: 0.60,
        }
    }
}

impl QuantileConfig {
    /// Quantile for a domain's access label.
    #[must_use]
    pub fn access(&self, domain: Domain) -> f64 {
        match domain {
            Domain::BasicComputerKnowledge => self.access_computer,
            Domain::InternetUsage => self.access_internet,
            Domain::MobileLiteracy => self.access_mobile,
        }
    }

    /// Quantile for a domain's gain label.
    #[must_use]
    pub fn gain(&self, domain: Domain) -> f64 {
        match domain {
            Domain::BasicComputerKnowledge => self.gain_computer,
            Domain::InternetUsage => self.gain_internet,
            Domain::MobileLiteracy => self.gain_mobile,
        }
    }
}

/// Strategy for converting a continuous column into a binary label.
#[derive(Debug, Clone)]
pub enum LabelStrategy {
    /// Threshold at the column median: label 0 iff value ≤ median.
    MedianSplit,
    /// Threshold at a per-domain quantile of the source column.
    QuantileSplit(QuantileConfig),
}

/// Record of one constructed label column.
#[derive(Debug, Clone, Serialize)]
pub struct LabelSummary {
    /// Name of the label column produced.
    pub label: String,
    /// Column the threshold was computed from and applied to.
    pub source_column: String,
    /// The threshold used for this run's snapshot.
    pub threshold: f64,
    /// Rows at or below the threshold (class 0).
    pub below: usize,
    /// Rows above the threshold (class 1).
    pub above: usize,
}

/// Construct the six binary labels (access + gain per domain).
///
/// Access labels threshold the pre-training score column; gain labels
/// threshold the gain column. Thresholds are computed from the current
/// frame — rerunning on a different snapshot recomputes them.
///
/// Returns the frame with the label columns appended, plus a summary per
/// label. A label that comes out single-class aborts with
/// [`AnalysisError::DegenerateLabel`] — a one-class target would make
/// training and evaluation meaningless.
pub fn build_labels(
    df: &DataFrame,
    strategy: &LabelStrategy,
) -> Result<(DataFrame, Vec<LabelSummary>), AnalysisError> {
    let mut out = df.clone();
    let mut summaries = Vec::with_capacity(6);

    for domain in Domain::ALL {
        let access_q = match strategy {
            LabelStrategy::MedianSplit => None,
            LabelStrategy::QuantileSplit(config) => Some(config.access(domain)),
        };
        let gain_q = match strategy {
            LabelStrategy::MedianSplit => None,
            LabelStrategy::QuantileSplit(config) => Some(config.gain(domain)),
        };

        summaries.push(attach_label(
            &mut out,
            &domain.score_column(),
            &domain.access_label(),
            access_q,
        )?);
        summaries.push(attach_label(
            &mut out,
            &domain.gain_column(),
            &domain.gain_label(),
            gain_q,
        )?);
    }

    Ok((out, summaries))
}

/// Threshold one column and append the resulting binary label.
///
/// `quantile = None` means a median split.
fn attach_label(
    df: &mut DataFrame,
    source_column: &str,
    label: &str,
    quantile: Option<f64>,
) -> Result<LabelSummary, AnalysisError> {
    if df.column(source_column).is_err() {
        return Err(AnalysisError::MissingColumn {
            column: source_column.to_string(),
            stage: "label construction",
        });
    }

    let q = quantile.unwrap_or(0.5);
    if !(0.0..1.0).contains(&q) || q == 0.0 {
        return Err(AnalysisError::InvalidQuantile {
            label: label.to_string(),
            q,
        });
    }

    let values: Vec<f64> = df
        .column(source_column)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .flatten()
        .collect();

    if values.is_empty() {
        return Err(AnalysisError::EmptyPartition {
            stage: "label construction",
            detail: format!("column '{source_column}' has no values to threshold"),
        });
    }

    let threshold = interpolated_quantile(&values, q);

    let codes: Vec<u32> = values
        .iter()
        .map(|&v| if v <= threshold { BELOW_AVERAGE } else { ABOVE_AVERAGE })
        .collect();

    let below = codes.iter().filter(|&&c| c == BELOW_AVERAGE).count();
    let above = codes.len() - below;
    if below == 0 || above == 0 {
        let class = if below == 0 { ABOVE_AVERAGE } else { BELOW_AVERAGE };
        return Err(AnalysisError::DegenerateLabel {
            label: label.to_string(),
            threshold,
            class,
        });
    }

    df.with_column(Series::new(label.into(), codes))?;

    Ok(LabelSummary {
        label: label.to_string(),
        source_column: source_column.to_string(),
        threshold,
        below,
        above,
    })
}

/// Linear-interpolated quantile of a slice (q in (0, 1)).
///
/// Matches the convention of interpolating between the two order
/// statistics around `q * (n - 1)`, so `q = 0.5` is the usual median.
#[must_use]
pub fn interpolated_quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
