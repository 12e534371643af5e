use std::collections::HashMap;

use ndarray::Array2;

use crate::config::ThreeSigmaConfig;
use crate::data_handling::VALUE_COLUMN;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};
use crate::models::utils::{fit_value_state, predict_values, ValueState};
use crate::stats::Summary;

impl ThreeSigmaConfig {
    /// A value is anomalous when its deviation in the bad direction exceeds
    /// the tolerance and also exceeds `sigma_multiplier` standard deviations.
    pub fn verdict(&self, summary: &Summary, value: f64, direction: Direction) -> i32 {
        let magnitude = direction.magnitude(value - summary.mean);
        let mut anomaly = magnitude > self.tolerance;
        anomaly &= magnitude > self.sigma_multiplier * summary.std;
        if anomaly {
            ANOMALY
        } else {
            NORMAL
        }
    }
}

/// Mean ± k·σ rule with an absolute tolerance floor.
#[derive(Debug, Clone)]
pub struct ThreeSigmaClassifier {
    config: ThreeSigmaConfig,
    value_column: usize,
    states: HashMap<String, ValueState>,
}

impl ThreeSigmaClassifier {
    pub fn new(config: ThreeSigmaConfig) -> Self {
        ThreeSigmaClassifier {
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

impl Classifier for ThreeSigmaClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        let state = fit_value_state(label, rows, self.value_column)?;
        log::trace!(
            "three-sigma baseline for '{}': mean {:.4}, std {:.4}",
            label,
            state.summary.mean,
            state.summary.std
        );
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
        "three_sigma"
    }
}
