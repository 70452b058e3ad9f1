//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{LabelStrategy, QuantileConfig};

/// Gapscan - Explore digital readiness gaps with random-forest analysis
#[derive(Parser, Debug)]
#[command(name = "gapscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input survey file path (CSV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Label construction strategy.
    /// Options: "median" (median split, default) or "quantile" (per-label quantile split)
    #[arg(long, default_value = "median")]
    pub strategy: String,

    /// RNG seed for the train/test split and forest training
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of trees per forest
    #[arg(long, default_value = "200")]
    pub trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "15")]
    pub max_depth: usize,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2", value_parser = validate_test_fraction)]
    pub test_fraction: f64,

    /// Stratify the train/test split by the first label column.
    /// Keeps both classes represented in the held-out set under class skew.
    #[arg(long, default_value = "false")]
    pub stratify: bool,

    /// Demographic columns for the equity report (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Gender,Education_Level,Employment_Status"
    )]
    pub group_columns: Vec<String>,

    /// How many worst-served groups to report per demographic column
    #[arg(long, default_value = "3")]
    pub top_n: usize,

    /// Override the per-domain quantiles for the quantile strategy.
    /// Six comma-separated values in (0, 1): access then gain, each in
    /// domain order (computer, internet, mobile). Ignored under "median".
    #[arg(long, value_delimiter = ',')]
    pub quantiles: Option<Vec<f64>>,

    /// Number of rows to use for CSV schema inference.
    /// Use 0 for full table scan (slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Write the full run summary as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Cli {
    /// Resolve the label strategy from the CLI string and any quantile
    /// overrides.
    pub fn label_strategy(&self) -> Result<LabelStrategy, String> {
        parse_strategy(&self.strategy, self.quantiles.as_deref())
    }
}

fn parse_strategy(s: &str, quantiles: Option<&[f64]>) -> Result<LabelStrategy, String> {
    match s {
        "median" => Ok(LabelStrategy::MedianSplit),
        "quantile" => {
            let config = match quantiles {
                None => QuantileConfig::default(),
                Some(q) => {
                    if q.len() != 6 {
                        return Err(format!(
                            "--quantiles expects 6 values (access then gain per domain), got {}",
                            q.len()
                        ));
                    }
                    if let Some(bad) = q.iter().find(|v| !(0.0 < **v && **v < 1.0)) {
                        return Err(format!(
                            "quantile {} out of range, must be strictly between 0 and 1",
                            bad
                        ));
                    }
                    QuantileConfig {
                        access_computer: q[0],
                        access_internet: q[1],
                        access_mobile: q[2],
                        gain_computer: q[3],
                        gain_internet: q[4],
                        gain_mobile: q[5],
                    }
                }
            };
            Ok(LabelStrategy::QuantileSplit(config))
        }
        other => Err(format!(
            "unknown strategy '{}'. Options: median, quantile",
            other
        )),
    }
}

/// Validator for test_fraction parameter
fn validate_test_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value > 0.0 && value < 1.0) {
        Err(format!(
            "test_fraction must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}
