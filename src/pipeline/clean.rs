//! Row filtering and category normalization.
//!
//! Cleaning is a pure function: the input frame is never mutated in place,
//! so later stages can be composed and tested against known snapshots.

use polars::prelude::*;

use crate::error::AnalysisError;
use crate::pipeline::schema::{self, EncodingConfig};

/// Clean the raw survey frame.
///
/// - drops rows containing a null in any required column;
/// - normalizes the three categorical columns (trim + lowercase) and
///   collapses gender spelling variants to the two-symbol vocabulary;
/// - removes rows whose education is the `unknown` sentinel.
///
/// Row count strictly decreases or stays equal. Fails with
/// [`AnalysisError::MissingColumn`] when the gender or education column is
/// absent, rather than silently producing a corrupted frame.
pub fn clean_dataset(
    df: &DataFrame,
    config: &EncodingConfig,
) -> Result<DataFrame, AnalysisError> {
    for col_name in [schema::GENDER, schema::EDUCATION] {
        if df.column(col_name).is_err() {
            return Err(AnalysisError::MissingColumn {
                column: col_name.to_string(),
                stage: "clean",
            });
        }
    }

    let required: Vec<Expr> = schema::required_columns()
        .into_iter()
        .filter(|c| df.column(c).is_ok())
        .map(|c| col(c))
        .collect();

    let mut cleaned = df
        .clone()
        .lazy()
        .drop_nulls(Some(required))
        .collect()?;

    for col_name in [schema::GENDER, schema::EDUCATION, schema::EMPLOYMENT] {
        if cleaned.column(col_name).is_err() {
            continue;
        }
        let normalized: StringChunked = cleaned
            .column(col_name)?
            .str()?
            .into_iter()
            .map(|value| {
                value.map(|v| {
                    let lowered = v.trim().to_lowercase();
                    if col_name == schema::GENDER {
                        normalize_gender(&lowered, config)
                    } else {
                        lowered
                    }
                })
            })
            .collect();
        cleaned.replace(col_name, normalized.into_series().with_name(col_name.into()))?;
    }

    // Education "unknown" rows carry no usable attainment signal.
    let education = cleaned.column(schema::EDUCATION)?.str()?;
    let keep: BooleanChunked = education
        .into_iter()
        .map(|value| Some(value.is_some_and(|v| v != schema::EDUCATION_UNKNOWN)))
        .collect();
    let cleaned = cleaned.filter(&keep)?;

    Ok(cleaned)
}

/// Collapse common gender spellings onto the configured two-symbol vocabulary.
fn normalize_gender(value: &str, config: &EncodingConfig) -> String {
    match value {
        "m" | "male" => config.gender.first().cloned().unwrap_or_else(|| value.to_string()),
        "f" | "female" => config.gender.get(1).cloned().unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
