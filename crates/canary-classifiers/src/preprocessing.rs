//! Feature standardization shared by the isolation-forest classifier and the
//! connected-set partitioner.
//!
//! Columns are scaled to zero mean and unit variance. Constant columns are
//! floored at `Scaler::MIN_STD` so they transform to zeros instead of NaN.

use ndarray::{Array1, Array2, Axis};

use crate::error::{ClassifierError, Result};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    pub const MIN_STD: f64 = 1e-6;

    /// Fit a `Scaler` where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(ClassifierError::EmptyInput {
                label: String::new(),
                what: "scaler input",
            });
        }
        let mean = x.mean_axis(Axis(0)).ok_or(ClassifierError::EmptyInput {
            label: String::new(),
            what: "scaler input",
        })?;
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Self::MIN_STD));
        Ok(Scaler { mean, std })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Transform all rows and return a new matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ClassifierError::ShapeMismatch {
                label: String::new(),
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok((x - &self.mean) / &self.std)
    }
}

/// Fit a scaler and return the transformed matrix in one call.
pub fn fit_transform(x: &Array2<f64>) -> Result<(Scaler, Array2<f64>)> {
    let sc = Scaler::fit(x)?;
    let scaled = sc.transform(x)?;
    Ok((sc, scaled))
}
