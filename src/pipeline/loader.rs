//! Dataset loader and schema validation for the survey CSV.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::error::AnalysisError;
use crate::pipeline::schema::{self, Domain};

/// Load the survey dataset from a comma-delimited UTF-8 file with a header row.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let infer = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(infer)
        .finish()
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

    Ok(df)
}

/// Validate the loaded frame against the declared schema.
///
/// Checks run once, directly after load, so type problems fail fast instead
/// of propagating silently-coerced values through the pipeline:
/// - every required column is present;
/// - the demographic categoricals are string-typed;
/// - age and the six score columns are numeric.
pub fn validate_schema(df: &DataFrame) -> Result<(), AnalysisError> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for required in schema::required_columns() {
        if !present.contains(&required) {
            return Err(AnalysisError::MissingColumn {
                column: required,
                stage: "load",
            });
        }
    }

    for col_name in [schema::GENDER, schema::EDUCATION, schema::EMPLOYMENT] {
        let col = df.column(col_name)?;
        if !matches!(col.dtype(), DataType::String) {
            return Err(AnalysisError::ColumnTypeMismatch {
                column: col_name.to_string(),
                expected: "str".to_string(),
                found: col.dtype().to_string(),
            });
        }
    }

    let mut numeric_cols = vec![schema::AGE.to_string()];
    for domain in Domain::ALL {
        numeric_cols.push(domain.score_column());
        numeric_cols.push(domain.post_score_column());
    }
    for col_name in numeric_cols {
        let col = df.column(&col_name)?;
        if !col.dtype().is_primitive_numeric() {
            return Err(AnalysisError::ColumnTypeMismatch {
                column: col_name,
                expected: "numeric".to_string(),
                found: col.dtype().to_string(),
            });
        }
    }

    Ok(())
}

/// Row count, column count, and estimated memory footprint in MB.
#[must_use]
pub fn dataset_stats(df: &DataFrame) -> (usize, usize, f64) {
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    (rows, cols, memory_mb)
}
