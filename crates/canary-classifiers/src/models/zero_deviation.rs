use std::collections::HashMap;

use ndarray::Array2;

use crate::config::ZeroDeviationConfig;
use crate::data_handling::VALUE_COLUMN;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};
use crate::models::utils::{fit_value_state, predict_values, ValueState};
use crate::stats::Summary;

impl ZeroDeviationConfig {
    /// A value is anomalous when its deviation in the bad direction exceeds
    /// the tolerance and also exceeds `deviation_ratio` of the baseline mean.
    pub fn verdict(&self, summary: &Summary, value: f64, direction: Direction) -> i32 {
        let magnitude = direction.magnitude(value - summary.mean);
        let mut anomaly = magnitude > self.tolerance;
        anomaly &= magnitude > self.deviation_ratio * summary.mean.abs();
        if anomaly {
            ANOMALY
        } else {
            NORMAL
        }
    }
}

/// Percentage-of-mean rule for baselines without spread.
///
/// Used when the baseline standard deviation is (close to) zero, where any
/// sigma-scaled threshold collapses.
#[derive(Debug, Clone)]
pub struct ZeroDeviationClassifier {
    config: ZeroDeviationConfig,
    value_column: usize,
    states: HashMap<String, ValueState>,
}

impl ZeroDeviationClassifier {
    pub fn new(config: ZeroDeviationConfig) -> Self {
        ZeroDeviationClassifier {
            config,
            value_column: VALUE_COLUMN,
            states: HashMap::new(),
        }
    }

    pub fn with_value_column(mut self, column: usize) -> Self {
        self.value_column = column;
        self
    }

    pub fn summary(&self, label: &str) -> Option<&Summary> {
        self.states.get(label).map(|s| &s.summary)
    }
}

impl Classifier for ZeroDeviationClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        let state = fit_value_state(label, rows, self.value_column)?;
        self.states.insert(label.to_string(), state);
        Ok(())
    }

    fn predict(&self, label: &str, rows: &Array2<f64>, direction: Direction) -> Result<Prediction> {
        let state = self
            .states
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        predict_values(label, rows, self.value_column, state.ncols, |v| {
            self.config.verdict(&state.summary, v, direction)
        })
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.states.contains_key(label)
    }

    fn name(&self) -> &str {
        "zero_deviation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fitted() -> ZeroDeviationClassifier {
        let mut clf = ZeroDeviationClassifier::new(ZeroDeviationConfig::default());
        clf.fit("errors", &array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]])
            .unwrap();
        clf
    }

    #[test]
    fn small_deviation_is_normal() {
        let clf = fitted();
        let p = clf
            .predict("errors", &array![[1.0, 12.0], [1.0, 8.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![NORMAL, NORMAL]);
        assert_eq!(p.score, 1.0);
    }

    #[test]
    fn both_conditions_are_required() {
        // 16 is past the tolerance and past 50% of the mean.
        let clf = fitted();
        let p = clf
            .predict("errors", &array![[1.0, 16.0], [1.0, 14.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![ANOMALY, NORMAL]);
        assert_eq!(p.score, 0.5);
    }

    #[test]
    fn direction_masks_the_allowed_side() {
        let clf = fitted();
        let rows = array![[1.0, 20.0], [1.0, 0.0]];
        let higher = clf.predict("errors", &rows, Direction::Higher).unwrap();
        assert_eq!(higher.verdicts, vec![ANOMALY, NORMAL]);
        let lower = clf.predict("errors", &rows, Direction::Lower).unwrap();
        assert_eq!(lower.verdicts, vec![NORMAL, ANOMALY]);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let clf = fitted();
        assert_eq!(
            clf.predict("latency", &array![[1.0, 1.0]], Direction::Both),
            Err(ClassifierError::UnknownLabel("latency".to_string()))
        );
    }
}
