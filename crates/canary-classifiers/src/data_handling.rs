//! Labelled control/test samples and the input checks shared by classifiers.
//!
//! A sample is a row-major matrix: column 0 conventionally carries an identity
//! or grouping value, column 1 the metric value under test. Classifiers that
//! only look at one value column take the index from their config so callers
//! with a different layout are not forced to reshape.
use ndarray::{concatenate, Array2, ArrayView1, Axis};

use crate::error::{ClassifierError, Result};

/// Column holding the identity / grouping value.
pub const IDENTITY_COLUMN: usize = 0;
/// Column holding the metric value under test.
pub const VALUE_COLUMN: usize = 1;

/// A named dataset, either the control (baseline) or the test population.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub label: String,
    pub values: Array2<f64>,
}

impl LabeledSample {
    pub fn new(label: impl Into<String>, values: Array2<f64>) -> Self {
        LabeledSample {
            label: label.into(),
            values,
        }
    }

    /// Build a sample from row vectors. All rows must have the same width.
    pub fn from_rows(label: impl Into<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let label = label.into();
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(ClassifierError::ShapeMismatch {
                    label,
                    expected: ncols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        let values = Array2::from_shape_vec((rows.len(), ncols), data).map_err(|_| {
            ClassifierError::InvalidParameter {
                name: "rows",
                value: format!("{}x{}", rows.len(), ncols),
                reason: "rows do not form a matrix",
            }
        })?;
        Ok(LabeledSample { label, values })
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn identities(&self) -> Result<ArrayView1<'_, f64>> {
        value_column(&self.label, &self.values, IDENTITY_COLUMN)
    }

    pub fn metric_values(&self) -> Result<ArrayView1<'_, f64>> {
        value_column(&self.label, &self.values, VALUE_COLUMN)
    }

    pub fn validate(&self) -> Result<()> {
        validate_rows(&self.label, &self.values, "rows")
    }
}

/// Reject empty matrices, zero-width rows and non-finite values.
///
/// `what` names the rejected input in the error ("baseline", "test rows").
pub fn validate_rows(label: &str, rows: &Array2<f64>, what: &'static str) -> Result<()> {
    if rows.nrows() == 0 || rows.ncols() == 0 {
        return Err(ClassifierError::EmptyInput {
            label: label.to_string(),
            what,
        });
    }
    if rows.iter().any(|v| !v.is_finite()) {
        return Err(ClassifierError::NonFinite {
            label: label.to_string(),
        });
    }
    Ok(())
}

/// Borrow a single column, failing with the label when it does not exist.
pub fn value_column<'a>(
    label: &str,
    rows: &'a Array2<f64>,
    column: usize,
) -> Result<ArrayView1<'a, f64>> {
    if column >= rows.ncols() {
        return Err(ClassifierError::ColumnOutOfRange {
            label: label.to_string(),
            column,
            ncols: rows.ncols(),
        });
    }
    Ok(rows.column(column))
}

/// Test rows must have the width the label was fitted with.
pub fn check_width(label: &str, expected: usize, rows: &Array2<f64>) -> Result<()> {
    if rows.ncols() != expected {
        return Err(ClassifierError::ShapeMismatch {
            label: label.to_string(),
            expected,
            actual: rows.ncols(),
        });
    }
    Ok(())
}

/// Stack `test` below `baseline`; the first `baseline.nrows()` rows of the
/// result are the baseline.
pub fn stack_rows(label: &str, baseline: &Array2<f64>, test: &Array2<f64>) -> Result<Array2<f64>> {
    check_width(label, baseline.ncols(), test)?;
    concatenate(Axis(0), &[baseline.view(), test.view()]).map_err(|_| {
        ClassifierError::ShapeMismatch {
            label: label.to_string(),
            expected: baseline.ncols(),
            actual: test.ncols(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn from_rows_builds_matrix() {
        let sample = LabeledSample::from_rows("cpu", &[vec![1.0, 7.0], vec![2.0, 9.0]]).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.metric_values().unwrap().to_vec(), vec![7.0, 9.0]);
        assert_eq!(sample.identities().unwrap().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = LabeledSample::from_rows("cpu", &[vec![1.0, 7.0], vec![2.0]]).unwrap_err();
        assert!(matches!(err, ClassifierError::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn validate_rejects_empty_and_nan() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            validate_rows("m", &empty, "baseline"),
            Err(ClassifierError::EmptyInput { what: "baseline", .. })
        ));
        let zero_width = Array2::<f64>::zeros((3, 0));
        assert!(validate_rows("m", &zero_width, "baseline").is_err());
        let nan = array![[1.0, f64::NAN]];
        assert!(matches!(
            validate_rows("m", &nan, "baseline"),
            Err(ClassifierError::NonFinite { .. })
        ));
    }

    #[test]
    fn value_column_out_of_range() {
        let rows = array![[1.0]];
        let err = value_column("m", &rows, VALUE_COLUMN).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ColumnOutOfRange {
                label: "m".to_string(),
                column: 1,
                ncols: 1
            }
        );
    }

    #[test]
    fn stack_rows_keeps_baseline_first() {
        let base = array![[1.0, 2.0]];
        let test = array![[3.0, 4.0], [5.0, 6.0]];
        let all = stack_rows("m", &base, &test).unwrap();
        assert_eq!(all.nrows(), 3);
        assert_eq!(all.row(0).to_vec(), vec![1.0, 2.0]);
        assert!(stack_rows("m", &base, &array![[1.0]]).is_err());
    }
}
