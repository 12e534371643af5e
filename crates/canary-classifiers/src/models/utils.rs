//! Fit/predict plumbing shared by the value-based classifiers.
use ndarray::Array2;

use crate::data_handling::{check_width, validate_rows, value_column};
use crate::error::{ClassifierError, Result};
use crate::models::prediction::Prediction;
use crate::stats::{summarize, Summary};

/// Baseline summary of one value column, with the fitted row width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueState {
    pub summary: Summary,
    pub ncols: usize,
}

/// Validate a baseline and summarize its value column.
pub fn fit_value_state(label: &str, rows: &Array2<f64>, column: usize) -> Result<ValueState> {
    validate_rows(label, rows, "baseline")?;
    let values = value_column(label, rows, column)?;
    let summary = summarize(values).ok_or_else(|| ClassifierError::EmptyInput {
        label: label.to_string(),
        what: "baseline",
    })?;
    Ok(ValueState {
        summary,
        ncols: rows.ncols(),
    })
}

/// Validate test rows against a fitted width and judge each value with `verdict`.
pub fn predict_values<F>(
    label: &str,
    rows: &Array2<f64>,
    column: usize,
    ncols: usize,
    verdict: F,
) -> Result<Prediction>
where
    F: Fn(f64) -> i32,
{
    validate_rows(label, rows, "test rows")?;
    check_width(label, ncols, rows)?;
    let values = value_column(label, rows, column)?;
    Ok(Prediction::from_verdicts(
        values.iter().map(|&v| verdict(v)).collect(),
    ))
}
