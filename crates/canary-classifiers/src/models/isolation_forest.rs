//! Isolation-forest classifier.
//!
//! Rows are standardised with a scaler fitted on the baseline, then scored by
//! an ensemble of random isolation trees. The decision threshold is the
//! `1 - contamination` quantile of the baseline's own scores, so roughly a
//! `contamination` share of the baseline would itself be flagged.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::IsolationForestConfig;
use crate::data_handling::{check_width, validate_rows};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};
use crate::preprocessing::Scaler;
use crate::stats::quantile;

/// Isolation Tree node
#[derive(Debug, Clone)]
enum IsolationTree {
    Internal {
        feature: usize,
        threshold: f64,
        /// Values below `threshold`.
        left: Box<IsolationTree>,
        right: Box<IsolationTree>,
    },
    External {
        size: usize,
    },
}

impl IsolationTree {
    fn build(
        x: &Array2<f64>,
        indices: &[usize],
        height: usize,
        max_height: usize,
        rng: &mut StdRng,
    ) -> Self {
        let n_samples = indices.len();
        if height >= max_height || n_samples <= 1 {
            return IsolationTree::External { size: n_samples };
        }

        let feature = rng.gen_range(0..x.ncols());
        let (min_val, max_val) = indices
            .iter()
            .map(|&i| x[[i, feature]])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        // All values equal on this feature
        if (max_val - min_val).abs() < 1e-10 {
            return IsolationTree::External { size: n_samples };
        }

        let threshold = rng.gen_range(min_val..max_val);
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] < threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        let left = Box::new(Self::build(x, &left_indices, height + 1, max_height, rng));
        let right = Box::new(Self::build(x, &right_indices, height + 1, max_height, rng));
        IsolationTree::Internal {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn path_length(&self, sample: ArrayView1<'_, f64>) -> f64 {
        let mut node = self;
        let mut height = 0usize;
        loop {
            match node {
                IsolationTree::External { size } => return height as f64 + average_path(*size),
                IsolationTree::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold { &**left } else { &**right };
                    height += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree
/// holding `n` keys: `2 H(n-1) - 2(n-1)/n`.
fn average_path(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n_f = n as f64;
            2.0 * ((n_f - 1.0).ln() + 0.5772156649) - 2.0 * (n_f - 1.0) / n_f
        }
    }
}

/// Ensemble of isolation trees over already-scaled rows.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    samples_per_tree: usize,
}

impl IsolationForest {
    pub fn fit(x: &Array2<f64>, config: &IsolationForestConfig) -> Result<Self> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(ClassifierError::EmptyInput {
                label: String::new(),
                what: "forest input",
            });
        }
        let samples_per_tree = config.max_samples.max(1).min(n_samples);
        let max_height = (samples_per_tree as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_estimators.max(1))
            .map(|_| {
                let indices: Vec<usize> = (0..samples_per_tree)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();
                IsolationTree::build(x, &indices, 0, max_height, &mut rng)
            })
            .collect();

        Ok(IsolationForest {
            trees,
            samples_per_tree,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Anomaly score `2^(-E[h(x)] / c(n))` per row, in `(0, 1]`; higher is
    /// more anomalous.
    pub fn score(&self, x: &Array2<f64>) -> Vec<f64> {
        let c_n = average_path(self.samples_per_tree).max(f64::MIN_POSITIVE);
        (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mean_path = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
                    / self.trees.len() as f64;
                2.0_f64.powf(-mean_path / c_n)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct FittedForest {
    scaler: Scaler,
    forest: IsolationForest,
    threshold: f64,
}

/// The score of a prediction is the share of rows at or below the threshold.
/// Because the threshold is calibrated on the baseline alone, this share is an
/// approximation of how typical the test rows are.
#[derive(Debug, Clone)]
pub struct IsolationForestClassifier {
    config: IsolationForestConfig,
    models: HashMap<String, FittedForest>,
}

impl IsolationForestClassifier {
    pub fn new(mut config: IsolationForestConfig) -> Self {
        config.contamination = config.contamination.clamp(0.0, 0.5);
        IsolationForestClassifier {
            config,
            models: HashMap::new(),
        }
    }

    /// Decision threshold fitted for `label`.
    pub fn threshold(&self, label: &str) -> Option<f64> {
        self.models.get(label).map(|m| m.threshold)
    }

    /// Raw anomaly scores of `rows` under the forest fitted for `label`.
    pub fn score_samples(&self, label: &str, rows: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self
            .models
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        validate_rows(label, rows, "test rows")?;
        check_width(label, model.scaler.n_features(), rows)?;
        let scaled = model.scaler.transform(rows)?;
        Ok(model.forest.score(&scaled))
    }
}

impl Default for IsolationForestClassifier {
    fn default() -> Self {
        IsolationForestClassifier::new(IsolationForestConfig::default())
    }
}

impl Classifier for IsolationForestClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        validate_rows(label, rows, "baseline")?;
        let scaler = Scaler::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        let forest = IsolationForest::fit(&scaled, &self.config)?;
        let scores = forest.score(&scaled);
        let threshold = quantile(scores, 1.0 - self.config.contamination).ok_or_else(|| {
            ClassifierError::EmptyInput {
                label: label.to_string(),
                what: "baseline",
            }
        })?;
        log::trace!(
            "{}: {} trees, decision threshold {:.4}",
            label,
            forest.n_trees(),
            threshold
        );
        self.models.insert(
            label.to_string(),
            FittedForest {
                scaler,
                forest,
                threshold,
            },
        );
        Ok(())
    }

    /// Direction is ignored; isolation has no notion of a bad side.
    fn predict(&self, label: &str, rows: &Array2<f64>, _direction: Direction) -> Result<Prediction> {
        let scores = self.score_samples(label, rows)?;
        let threshold = self
            .threshold(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        let verdicts = scores
            .into_iter()
            .map(|s| if s > threshold { ANOMALY } else { NORMAL })
            .collect();
        Ok(Prediction::from_verdicts(verdicts))
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.models.contains_key(label)
    }

    fn name(&self) -> &str {
        "isolation_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use statrs::distribution::{ContinuousCDF, Normal};

    /// 100 evenly spaced normal quantiles: dense centre, sparse tails.
    fn bell_baseline() -> Array2<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        Array2::from_shape_fn((100, 1), |(i, _)| {
            normal.inverse_cdf((i as f64 + 0.5) / 100.0)
        })
    }

    #[test]
    fn average_path_matches_known_values() {
        assert_eq!(average_path(1), 0.0);
        assert_eq!(average_path(2), 1.0);
        // 2 (ln 2 + gamma) - 4/3
        assert!((average_path(3) - 1.2074).abs() < 1e-3);
    }

    #[test]
    fn tails_are_flagged_and_centre_is_not() {
        let mut clf = IsolationForestClassifier::default();
        clf.fit("latency", &bell_baseline()).unwrap();
        let test = array![[8.0], [0.0], [-8.0], [0.3]];
        let p = clf.predict("latency", &test, Direction::Both).unwrap();
        assert_eq!(p.verdicts, vec![ANOMALY, NORMAL, ANOMALY, NORMAL]);
        assert!((p.score - 0.5).abs() < 1e-12);

        let scores = clf.score_samples("latency", &test).unwrap();
        assert!(scores.iter().all(|s| *s > 0.0 && *s <= 1.0));
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let base = bell_baseline();
        let mut a = IsolationForestClassifier::default();
        let mut b = IsolationForestClassifier::default();
        a.fit("m", &base).unwrap();
        b.fit("m", &base).unwrap();
        assert_eq!(a.threshold("m"), b.threshold("m"));
        assert_eq!(
            a.score_samples("m", &base).unwrap(),
            b.score_samples("m", &base).unwrap()
        );
    }

    #[test]
    fn contamination_is_clamped() {
        let clf = IsolationForestClassifier::new(IsolationForestConfig {
            contamination: 0.9,
            ..Default::default()
        });
        assert_eq!(clf.config.contamination, 0.5);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let mut clf = IsolationForestClassifier::default();
        clf.fit("m", &bell_baseline()).unwrap();
        assert!(matches!(
            clf.predict("m", &array![[1.0, 2.0]], Direction::Both),
            Err(ClassifierError::ShapeMismatch { .. })
        ));
    }
}
