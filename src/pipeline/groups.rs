//! Per-group label distributions and worst-served group ranking.

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::pipeline::labels::BELOW_AVERAGE;

/// Label proportions for one demographic group value.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDistribution {
    /// The group value (category label or code rendered as text).
    pub group: String,
    /// Proportion of rows with the "Below Average" label.
    pub below: f64,
    /// Proportion of rows with the "Above Average" label.
    pub above: f64,
    /// Number of rows in the group.
    pub count: usize,
}

/// One entry of the combined worst-served ranking.
#[derive(Debug, Clone, Serialize)]
pub struct WorstGroup {
    /// The demographic column this group came from.
    pub group_column: String,
    /// The group value.
    pub group: String,
    /// Proportion of the group with the "Below Average" label.
    pub below: f64,
    /// Number of rows in the group.
    pub count: usize,
}

/// Group rows by `group_column` and compute normalized label proportions.
///
/// For every group value, `below + above == 1.0` (a class with no rows in
/// the group gets proportion 0). Groups are returned in first-seen row
/// order, which also fixes tie-breaking downstream.
pub fn compute_group_distribution(
    df: &DataFrame,
    group_column: &str,
    label_column: &str,
) -> Result<Vec<GroupDistribution>, AnalysisError> {
    if df.height() == 0 {
        return Err(AnalysisError::EmptyPartition {
            stage: "group aggregation",
            detail: format!("no rows to group by '{group_column}'"),
        });
    }

    let groups = column_to_strings(df, group_column, "group aggregation")?;
    let labels = label_codes(df, label_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (group, label) in groups.into_iter().zip(labels.into_iter()) {
        let entry = counts.entry(group.clone()).or_insert_with(|| {
            order.push(group);
            (0, 0)
        });
        if label == BELOW_AVERAGE {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    let distributions = order
        .into_iter()
        .map(|group| {
            let (below, above) = counts[&group];
            let total = (below + above) as f64;
            GroupDistribution {
                below: below as f64 / total,
                above: above as f64 / total,
                count: below + above,
                group,
            }
        })
        .collect();

    Ok(distributions)
}

/// Rank the top `n` groups with the highest "Below Average" proportion,
/// independently per group column, combined into one tagged list.
///
/// Ties keep first-seen order (the sort is stable).
pub fn top_n_worst_groups(
    df: &DataFrame,
    group_columns: &[String],
    label_column: &str,
    n: usize,
) -> Result<Vec<WorstGroup>, AnalysisError> {
    let mut combined = Vec::new();

    for group_column in group_columns {
        let mut distributions = compute_group_distribution(df, group_column, label_column)?;
        distributions.sort_by(|a, b| b.below.partial_cmp(&a.below).unwrap_or(std::cmp::Ordering::Equal));
        combined.extend(distributions.into_iter().take(n).map(|d| WorstGroup {
            group_column: group_column.clone(),
            group: d.group,
            below: d.below,
            count: d.count,
        }));
    }

    Ok(combined)
}

/// Render a column's values as strings, so numeric-coded and raw
/// categorical group columns are handled uniformly.
fn column_to_strings(
    df: &DataFrame,
    column: &str,
    stage: &'static str,
) -> Result<Vec<String>, AnalysisError> {
    let Ok(col) = df.column(column) else {
        return Err(AnalysisError::MissingColumn {
            column: column.to_string(),
            stage,
        });
    };

    let cast = col.cast(&DataType::String)?;
    let values: Vec<String> = cast
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("<null>").to_string())
        .collect();
    Ok(values)
}

fn label_codes(df: &DataFrame, label_column: &str) -> Result<Vec<u32>, AnalysisError> {
    let Ok(col) = df.column(label_column) else {
        return Err(AnalysisError::MissingColumn {
            column: label_column.to_string(),
            stage: "group aggregation",
        });
    };
    let cast = col.cast(&DataType::UInt32)?;
    let values: Vec<u32> = cast.u32()?.into_iter().map(|v| v.unwrap_or(0)).collect();
    Ok(values)
}
