use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView1, Zip};
use rayon::prelude::*;

use crate::config::SimpleDistanceConfig;
use crate::data_handling::{check_width, validate_rows};
use crate::error::{ClassifierError, Result};
use crate::math::bray_curtis;
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};

/// Bray-Curtis distance after clamping the test row toward the baseline row
/// on the side that is not considered bad.
pub fn directional_distance(
    test: ArrayView1<'_, f64>,
    baseline: ArrayView1<'_, f64>,
    direction: Direction,
) -> f64 {
    let adjusted: Array1<f64> = match direction {
        Direction::Higher => Zip::from(&test).and(&baseline).map_collect(|&t, &b| t.max(b)),
        Direction::Lower => Zip::from(&test).and(&baseline).map_collect(|&t, &b| t.min(b)),
        Direction::Both => test.to_owned(),
    };
    bray_curtis(adjusted.view(), baseline)
}

/// Nearest-match classifier: a test row is normal when any baseline row lies
/// within the distance threshold.
///
/// Every test row is compared against every baseline row, so this is meant for
/// small baselines.
#[derive(Debug, Clone)]
pub struct SimpleDistanceClassifier {
    config: SimpleDistanceConfig,
    baselines: HashMap<String, Array2<f64>>,
}

impl SimpleDistanceClassifier {
    pub fn new(config: SimpleDistanceConfig) -> Self {
        SimpleDistanceClassifier {
            config,
            baselines: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }
}

impl Default for SimpleDistanceClassifier {
    fn default() -> Self {
        SimpleDistanceClassifier::new(SimpleDistanceConfig::default())
    }
}

impl Classifier for SimpleDistanceClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        validate_rows(label, rows, "baseline")?;
        self.baselines.insert(label.to_string(), rows.clone());
        Ok(())
    }

    fn predict(&self, label: &str, rows: &Array2<f64>, direction: Direction) -> Result<Prediction> {
        let baseline = self
            .baselines
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        validate_rows(label, rows, "test rows")?;
        check_width(label, baseline.ncols(), rows)?;

        let threshold = self.config.threshold;
        let verdicts: Vec<i32> = (0..rows.nrows())
            .into_par_iter()
            .map(|i| {
                let matched = baseline
                    .outer_iter()
                    .any(|b| directional_distance(rows.row(i), b, direction) <= threshold);
                if matched {
                    NORMAL
                } else {
                    ANOMALY
                }
            })
            .collect();
        Ok(Prediction::from_verdicts(verdicts))
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.baselines.contains_key(label)
    }

    fn name(&self) -> &str {
        "simple_distance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn clamping_ignores_the_allowed_side() {
        let t = array![1.0, 2.0];
        let b = array![1.0, 8.0];
        assert_eq!(directional_distance(t.view(), b.view(), Direction::Higher), 0.0);
        let lower = directional_distance(t.view(), b.view(), Direction::Lower);
        assert!((lower - 0.5).abs() < 1e-12);
        let both = directional_distance(t.view(), b.view(), Direction::Both);
        assert_eq!(lower, both);
    }

    #[test]
    fn any_baseline_row_within_threshold_accepts() {
        let mut clf = SimpleDistanceClassifier::default();
        clf.fit("lat", &array![[1.0, 7.0], [1.0, 100.0]]).unwrap();
        let p = clf
            .predict("lat", &array![[1.0, 8.0], [1.0, 98.0], [1.0, 40.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![NORMAL, NORMAL, ANOMALY]);
        assert!((p.score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn identical_rows_are_always_normal() {
        let mut clf = SimpleDistanceClassifier::default();
        let base = array![[0.0, 0.0], [3.0, 5.0]];
        clf.fit("lat", &base).unwrap();
        for dir in [Direction::Higher, Direction::Lower, Direction::Both] {
            assert!(clf.predict("lat", &base, dir).unwrap().all_normal());
        }
    }

    #[test]
    fn rows_cancelling_the_baseline_are_anomalous() {
        let mut clf = SimpleDistanceClassifier::default();
        clf.fit("lat", &array![[0.0, -5.0]]).unwrap();
        let p = clf
            .predict("lat", &array![[0.0, 5.0], [0.0, -5.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![ANOMALY, NORMAL]);
    }
}
