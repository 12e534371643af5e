//! Per-label dispatch between the zero-deviation and three-sigma rules.
use std::collections::HashMap;

use ndarray::Array2;

use crate::config::FrequencyConfig;
use crate::data_handling::VALUE_COLUMN;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction};
use crate::models::utils::{fit_value_state, predict_values};
use crate::stats::Summary;

/// Rule chosen for a label at fit time, with the baseline it judges against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyModel {
    ZeroDeviation(Summary),
    ThreeSigma(Summary),
}

impl FrequencyModel {
    pub fn summary(&self) -> &Summary {
        match self {
            FrequencyModel::ZeroDeviation(s) | FrequencyModel::ThreeSigma(s) => s,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FrequencyModel::ZeroDeviation(_) => "zero_deviation",
            FrequencyModel::ThreeSigma(_) => "three_sigma",
        }
    }
}

/// Pick the rule for a baseline: no spread below `std_cutoff`, sigma rule otherwise.
pub fn select_model(summary: Summary, std_cutoff: f64) -> FrequencyModel {
    if summary.std < std_cutoff {
        FrequencyModel::ZeroDeviation(summary)
    } else {
        FrequencyModel::ThreeSigma(summary)
    }
}

#[derive(Debug, Clone, Copy)]
struct FittedModel {
    model: FrequencyModel,
    ncols: usize,
}

/// Anomaly detector for event frequencies (log cluster counts, error rates).
#[derive(Debug, Clone)]
pub struct FrequencyAnomalyDetector {
    config: FrequencyConfig,
    value_column: usize,
    models: HashMap<String, FittedModel>,
}

impl FrequencyAnomalyDetector {
    pub fn new(config: FrequencyConfig) -> Self {
        FrequencyAnomalyDetector {
            config,
            value_column: VALUE_COLUMN,
            models: HashMap::new(),
        }
    }

    pub fn with_value_column(mut self, column: usize) -> Self {
        self.value_column = column;
        self
    }

    /// The rule selected for `label`, if fitted.
    pub fn selected(&self, label: &str) -> Option<&FrequencyModel> {
        self.models.get(label).map(|m| &m.model)
    }
}

impl Default for FrequencyAnomalyDetector {
    fn default() -> Self {
        FrequencyAnomalyDetector::new(FrequencyConfig::default())
    }
}

impl Classifier for FrequencyAnomalyDetector {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        let state = fit_value_state(label, rows, self.value_column)?;
        let model = select_model(state.summary, self.config.std_cutoff);
        log::debug!(
            "label '{}': std {:.6} -> {} rule",
            label,
            state.summary.std,
            model.kind()
        );
        self.models.insert(
            label.to_string(),
            FittedModel {
                model,
                ncols: state.ncols,
            },
        );
        Ok(())
    }

    fn predict(&self, label: &str, rows: &Array2<f64>, direction: Direction) -> Result<Prediction> {
        let fitted = self
            .models
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        predict_values(label, rows, self.value_column, fitted.ncols, |v| {
            match &fitted.model {
                FrequencyModel::ZeroDeviation(s) => self.config.zero_deviation.verdict(s, v, direction),
                FrequencyModel::ThreeSigma(s) => self.config.three_sigma.verdict(s, v, direction),
            }
        })
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.models.contains_key(label)
    }

    fn name(&self) -> &str {
        "frequency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction::{ANOMALY, NORMAL};
    use ndarray::array;

    #[test]
    fn constant_baseline_selects_zero_deviation() {
        let mut det = FrequencyAnomalyDetector::default();
        det.fit("count", &array![[0.0, 4.0], [1.0, 4.0], [2.0, 4.0]]).unwrap();
        assert!(matches!(det.selected("count"), Some(FrequencyModel::ZeroDeviation(_))));
    }

    #[test]
    fn spread_baseline_selects_three_sigma() {
        let mut det = FrequencyAnomalyDetector::default();
        det.fit("count", &array![[0.0, 4.0], [1.0, 6.0]]).unwrap();
        assert!(matches!(det.selected("count"), Some(FrequencyModel::ThreeSigma(_))));
    }

    #[test]
    fn select_model_respects_cutoff_boundary() {
        let s = Summary { mean: 3.0, std: 0.5, count: 4 };
        assert_eq!(select_model(s, 0.5).kind(), "three_sigma");
        assert_eq!(select_model(s, 0.6).kind(), "zero_deviation");
    }

    #[test]
    fn prediction_uses_selected_rule() {
        let mut det = FrequencyAnomalyDetector::default();
        det.fit("count", &array![[0.0, 10.0], [0.0, 10.0]]).unwrap();
        // zero-deviation: needs > 1 and > 5 away from 10
        let p = det
            .predict("count", &array![[0.0, 14.0], [0.0, 16.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![NORMAL, ANOMALY]);
    }
}
