use ndarray::ArrayView1;
use statrs::statistics::{Data, Median, OrderStatistics, Statistics};

/// Location and spread of a value column.
///
/// `std` is the population standard deviation, so a single observation (or a
/// constant column) has `std == 0.0` rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

/// Summarize a column. Returns `None` for an empty column.
pub fn summarize(values: ArrayView1<'_, f64>) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().mean();
    let std = if values.len() == 1 {
        0.0
    } else {
        values.iter().population_std_dev()
    };
    Some(Summary {
        mean,
        std,
        count: values.len(),
    })
}

/// Median of a set of values, `None` when empty.
pub fn median(values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values).median())
}

/// Empirical quantile (`tau` in `[0, 1]`), `None` when empty.
pub fn quantile(values: Vec<f64>, tau: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values).quantile(tau.clamp(0.0, 1.0)))
}
