use std::collections::{HashMap, HashSet};

use ndarray::Array2;

use crate::clustering::Hdbscan;
use crate::config::DensityConfig;
use crate::data_handling::{stack_rows, validate_rows};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::Classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};

/// Density-based classifier built on a joint HDBSCAN run.
///
/// Baseline and test rows are clustered together. A test row is anomalous when
/// it lands in a cluster (or in noise) that no baseline row shares, or when it
/// is a weak member of a cluster whose baseline members are all weak as well.
#[derive(Debug, Clone)]
pub struct DensityClassifier {
    config: DensityConfig,
    baselines: HashMap<String, Array2<f64>>,
}

impl DensityClassifier {
    pub fn new(config: DensityConfig) -> Self {
        DensityClassifier {
            config,
            baselines: HashMap::new(),
        }
    }

    fn clusterer(&self) -> Result<Hdbscan> {
        Ok(
            Hdbscan::new(self.config.min_cluster_size, self.config.min_samples)?
                .with_allow_single_cluster(self.config.allow_single_cluster),
        )
    }
}

impl Default for DensityClassifier {
    fn default() -> Self {
        DensityClassifier::new(DensityConfig::default())
    }
}

impl Classifier for DensityClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        validate_rows(label, rows, "baseline")?;
        self.baselines.insert(label.to_string(), rows.clone());
        Ok(())
    }

    /// Direction is not used: membership is symmetric in every feature.
    fn predict(&self, label: &str, rows: &Array2<f64>, _direction: Direction) -> Result<Prediction> {
        let baseline = self
            .baselines
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        validate_rows(label, rows, "test rows")?;
        let joint = stack_rows(label, baseline, rows)?;

        let result = self.clusterer()?.fit(&joint);
        let n_base = baseline.nrows();
        let threshold = self.config.membership_threshold;

        let baseline_labels: HashSet<i64> = result.labels[..n_base].iter().copied().collect();
        let strong_labels: HashSet<i64> = result.labels[..n_base]
            .iter()
            .zip(&result.probabilities[..n_base])
            .filter(|(_, &p)| p >= threshold)
            .map(|(&l, _)| l)
            .collect();
        log::trace!(
            "{}: {} clusters over {} baseline and {} test rows",
            label,
            result.n_clusters,
            n_base,
            rows.nrows()
        );

        let verdicts = result.labels[n_base..]
            .iter()
            .zip(&result.probabilities[n_base..])
            .map(|(l, &p)| {
                if !baseline_labels.contains(l) {
                    ANOMALY
                } else if p < threshold && !strong_labels.contains(l) {
                    ANOMALY
                } else {
                    NORMAL
                }
            })
            .collect();
        Ok(Prediction::from_verdicts(verdicts))
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.baselines.contains_key(label)
    }

    fn name(&self) -> &str {
        "density"
    }
}
