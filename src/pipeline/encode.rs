//! Categorical feature encoding and gain-column derivation.

use polars::prelude::*;

use crate::error::AnalysisError;
use crate::pipeline::schema::{self, Domain, EncodingConfig};

/// Append the three gain columns: `{Domain}_Gain = Post_{Domain}_Score − {Domain}_Score`.
///
/// Exact subtraction in f64 — no clipping or rounding, negative gains
/// (post < pre) are preserved.
pub fn add_gain_columns(df: &DataFrame) -> Result<DataFrame, AnalysisError> {
    let gains: Vec<Expr> = Domain::ALL
        .iter()
        .map(|domain| {
            (col(domain.post_score_column()).cast(DataType::Float64)
                - col(domain.score_column()).cast(DataType::Float64))
            .alias(domain.gain_column())
        })
        .collect();

    let out = df.clone().lazy().with_columns(gains).collect()?;
    Ok(out)
}

/// Replace the categorical demographic columns with their integer codes.
///
/// The mapping is total over the configured vocabularies: any value without
/// an entry aborts with [`AnalysisError::UnknownCategory`] instead of being
/// coerced to a missing value.
pub fn encode_features(
    df: &DataFrame,
    config: &EncodingConfig,
) -> Result<DataFrame, AnalysisError> {
    let mut encoded = df.clone();

    let columns: [(&str, fn(&EncodingConfig, &str) -> Option<u32>); 3] = [
        (schema::GENDER, |c, v| c.gender_code(v)),
        (schema::EDUCATION, |c, v| c.education_code(v)),
        (schema::EMPLOYMENT, |c, v| c.employment_code(v)),
    ];

    for (col_name, lookup) in columns {
        let source = encoded.column(col_name)?.str()?.clone();
        let mut codes: Vec<u32> = Vec::with_capacity(source.len());
        for value in source.into_iter() {
            let value = value.ok_or_else(|| AnalysisError::UnknownCategory {
                column: col_name.to_string(),
                value: "<null>".to_string(),
            })?;
            let code = lookup(config, value).ok_or_else(|| AnalysisError::UnknownCategory {
                column: col_name.to_string(),
                value: value.to_string(),
            })?;
            codes.push(code);
        }
        encoded.replace(col_name, Series::new(col_name.into(), codes))?;
    }

    Ok(encoded)
}

/// Restore the categorical demographic columns from integer codes back to
/// their category names.
///
/// Inverse of [`encode_features`]; group reports run on a decoded frame so
/// they show `female` / `bachelor` rather than raw codes. A code outside
/// the configured vocabulary aborts with [`AnalysisError::UnknownCategory`].
pub fn decode_features(
    df: &DataFrame,
    config: &EncodingConfig,
) -> Result<DataFrame, AnalysisError> {
    let mut decoded = df.clone();

    let columns: [(&str, &[String]); 3] = [
        (schema::GENDER, &config.gender),
        (schema::EDUCATION, &config.education),
        (schema::EMPLOYMENT, &config.employment),
    ];

    for (col_name, vocabulary) in columns {
        let codes = decoded.column(col_name)?.cast(&DataType::UInt32)?;
        let mut names: Vec<String> = Vec::with_capacity(codes.len());
        for code in codes.u32()?.into_iter() {
            let code = code.ok_or_else(|| AnalysisError::UnknownCategory {
                column: col_name.to_string(),
                value: "<null>".to_string(),
            })?;
            let name = vocabulary.get(code as usize).ok_or_else(|| {
                AnalysisError::UnknownCategory {
                    column: col_name.to_string(),
                    value: code.to_string(),
                }
            })?;
            names.push(name.clone());
        }
        decoded.replace(col_name, Series::new(col_name.into(), names))?;
    }

    Ok(decoded)
}

/// The encoded demographic columns used as classifier features.
#[must_use]
pub fn feature_columns() -> Vec<String> {
    vec![
        schema::GENDER.to_string(),
        schema::AGE.to_string(),
        schema::EDUCATION.to_string(),
        schema::EMPLOYMENT.to_string(),
    ]
}

/// Extract a row-major f64 feature matrix for the given columns.
///
/// Row i of the result corresponds to row i of `df`; callers must do all
/// row filtering before extraction so X and y stay aligned.
pub fn feature_matrix(
    df: &DataFrame,
    columns: &[String],
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let mut cols: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
    for name in columns {
        if df.column(name).is_err() {
            return Err(AnalysisError::MissingColumn {
                column: name.clone(),
                stage: "feature extraction",
            });
        }
        let ca = df.column(name)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = ca
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        cols.push(values);
    }

    let n_rows = df.height();
    let matrix: Vec<Vec<f64>> = (0..n_rows)
        .map(|row| cols.iter().map(|c| c[row]).collect())
        .collect();
    Ok(matrix)
}

/// Extract a binary label column as zero-based class indices.
pub fn label_vector(df: &DataFrame, label: &str) -> Result<Vec<usize>, AnalysisError> {
    if df.column(label).is_err() {
        return Err(AnalysisError::MissingColumn {
            column: label.to_string(),
            stage: "label extraction",
        });
    }
    let ca = df.column(label)?.cast(&DataType::UInt32)?;
    let values: Vec<usize> = ca
        .u32()?
        .into_iter()
        .map(|v| v.unwrap_or(0) as usize)
        .collect();
    Ok(values)
}
