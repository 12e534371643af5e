use ndarray::Array2;

use crate::error::Result;
use crate::models::prediction::{Direction, Prediction};

/// A small trait abstraction for control-vs-test classifiers.
///
/// State is kept per label: `fit` stores (or overwrites) the parameters learned
/// from a baseline and `predict` judges test rows against the state of the same
/// label. Implementations own their label map; nothing is shared between
/// instances.
pub trait Classifier {
    /// Learn the baseline for `label`. A failed fit leaves every previously
    /// fitted label untouched.
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()>;

    /// Judge `rows` against the baseline of `label`. Unknown labels are an error.
    fn predict(&self, label: &str, rows: &Array2<f64>, direction: Direction) -> Result<Prediction>;

    /// Whether `label` has been fitted.
    fn is_fitted(&self, label: &str) -> bool;

    /// Optional human readable name for the classifier
    fn name(&self) -> &str {
        "classifier"
    }
}
