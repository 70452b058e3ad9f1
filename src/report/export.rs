//! Run summary export functionality
//!
//! Serializes the full analysis run (labels, VIF, evaluations,
//! importances, group distributions) to a JSON file for downstream
//! consumption.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::model::ClassMetrics;
use crate::pipeline::{GroupDistribution, LabelSummary, VifScore, WorstGroup};

/// Metadata about the analysis run
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Gapscan version
    pub gapscan_version: String,
    /// Input file path
    pub input_file: String,
    /// Label strategy used ("median" or "quantile")
    pub label_strategy: String,
    /// RNG seed
    pub seed: u64,
    /// Number of trees per forest
    pub n_trees: usize,
    /// Held-out test fraction
    pub test_fraction: f64,
}

/// Dataset-level counts
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows_loaded: usize,
    pub rows_after_cleaning: usize,
    pub feature_count: usize,
}

/// Held-out evaluation for one label column
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvaluation {
    pub label: String,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub classes: Vec<ClassMetrics>,
}

/// One feature's mean importance across outputs
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportanceEntry {
    pub feature: String,
    pub importance: f64,
}

/// Per-group distributions for one (group column, label) pairing
#[derive(Debug, Clone, Serialize)]
pub struct GroupReportEntry {
    pub group_column: String,
    pub label: String,
    pub distributions: Vec<GroupDistribution>,
}

/// Complete run summary export
#[derive(Debug, Clone, Serialize)]
pub struct RunSummaryExport {
    pub metadata: RunMetadata,
    pub dataset: DatasetSummary,
    pub labels: Vec<LabelSummary>,
    pub vif: Vec<VifScore>,
    pub evaluations: Vec<OutputEvaluation>,
    pub importances: Vec<FeatureImportanceEntry>,
    pub groups: Vec<GroupReportEntry>,
    pub worst_groups: Vec<WorstGroup>,
}

impl RunMetadata {
    pub fn new(
        input_file: &str,
        label_strategy: &str,
        seed: u64,
        n_trees: usize,
        test_fraction: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            gapscan_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            label_strategy: label_strategy.to_string(),
            seed,
            n_trees,
            test_fraction,
        }
    }
}

/// Export the run summary to a JSON file
pub fn export_run_summary(export: &RunSummaryExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize run summary to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run summary to {}", output_path.display()))?;

    Ok(())
}
