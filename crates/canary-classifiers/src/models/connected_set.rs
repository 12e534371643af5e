//! Composite classifier that partitions a heterogeneous baseline before
//! classifying.
//!
//! A baseline that mixes several regimes (two hosts, day and night traffic) is
//! split into connected sets and each accepted set gets its own delegate
//! state under a sub-label `"<label>-<i>"`. A test row is normal when any
//! partition considers it normal.
//!
//! Splitting works on standardised rows. For a group of `n` rows the
//! neighbourhood radius `eps` is the median distance to the `(k-1)`-th nearest
//! neighbour, tried for `k = n` down to `2`; the first radius at which DBSCAN
//! (`min_samples = 1`) yields more than one cluster splits the group. A
//! sub-cluster whose median pairwise distance exceeds `threshold * eps` is
//! split again; every other sub-cluster is accepted.

use std::collections::{HashMap, VecDeque};

use ndarray::{Array2, Axis};

use crate::clustering::dbscan::{members_by_label, Dbscan};
use crate::config::{ClassifierConfig, ConnectedSetConfig};
use crate::data_handling::validate_rows;
use crate::error::{ClassifierError, Result};
use crate::math::{pair_distances, pairwise_euclidean, sorted_neighbor_distances};
use crate::models::classifier_trait::Classifier;
use crate::models::factory::build_classifier;
use crate::models::prediction::{Direction, Prediction, ANOMALY, NORMAL};
use crate::preprocessing::fit_transform;
use crate::stats::median;

/// Offset added to the neighbourhood radius so exact ties stay connected.
const EPS_OFFSET: f64 = 1e-6;

/// Node of the partition tree. Indices in `parent` and `children` point into
/// the same arena; `members` are row indices of the fitted baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub members: Vec<usize>,
    /// Set once the partition is accepted and fitted.
    pub sub_label: Option<String>,
}

impl Partition {
    fn new(parent: Option<usize>, members: Vec<usize>) -> Self {
        Partition {
            parent,
            children: Vec::new(),
            members,
            sub_label: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.sub_label.is_some()
    }
}

struct FittedPartitions {
    nodes: Vec<Partition>,
    sub_labels: Vec<String>,
    delegate: Box<dyn Classifier>,
}

pub struct ConnectedSetClassifier {
    config: ConnectedSetConfig,
    fitted: HashMap<String, FittedPartitions>,
}

/// Outcome of looking for a split of one group.
enum Split {
    Whole,
    Clusters { groups: Vec<Vec<usize>>, eps: f64 },
}

fn find_split(dist: &Array2<f64>) -> Split {
    let n = dist.nrows();
    let sorted = sorted_neighbor_distances(dist);
    for k in (2..=n).rev() {
        let kth: Vec<f64> = sorted.iter().map(|row| row[k - 1]).collect();
        let eps = match median(kth) {
            Some(m) => m + EPS_OFFSET,
            None => return Split::Whole,
        };
        let groups = members_by_label(&Dbscan::new(eps, 1).fit_distances(dist));
        if groups.len() > 1 {
            return Split::Clusters { groups, eps };
        }
    }
    Split::Whole
}

/// Build the partition tree of `values`. Returns the arena and the ids of the
/// accepted nodes in acceptance order.
fn partition(values: &Array2<f64>, threshold: f64) -> Result<(Vec<Partition>, Vec<usize>)> {
    let mut nodes = vec![Partition::new(None, (0..values.nrows()).collect())];
    let mut accepted = Vec::new();
    let mut work = VecDeque::from([0usize]);

    while let Some(id) = work.pop_front() {
        let members = nodes[id].members.clone();
        if members.len() == 1 {
            accepted.push(id);
            continue;
        }

        let (_, scaled) = fit_transform(&values.select(Axis(0), &members))?;
        let dist = pairwise_euclidean(&scaled);
        let (groups, eps) = match find_split(&dist) {
            Split::Whole => {
                log::trace!("accepting {} rows whole", members.len());
                accepted.push(id);
                continue;
            }
            Split::Clusters { groups, eps } => (groups, eps),
        };

        for group in groups {
            let child = nodes.len();
            let ratio = if group.len() > 1 {
                median(pair_distances(&dist, &group)).unwrap_or(0.0) / eps
            } else {
                0.0
            };
            nodes.push(Partition::new(
                Some(id),
                group.iter().map(|&i| members[i]).collect(),
            ));
            nodes[id].children.push(child);

            if group.len() > 1 && ratio > threshold {
                log::trace!(
                    "re-splitting {} rows (spread ratio {:.3} > {})",
                    group.len(),
                    ratio,
                    threshold
                );
                work.push_back(child);
            } else {
                accepted.push(child);
            }
        }
    }

    Ok((nodes, accepted))
}

impl ConnectedSetClassifier {
    pub fn new(config: ConnectedSetConfig) -> Self {
        ConnectedSetClassifier {
            config,
            fitted: HashMap::new(),
        }
    }

    pub fn delegate_config(&self) -> &ClassifierConfig {
        &self.config.delegate
    }

    /// Partition `values` and fit one delegate state per accepted partition.
    ///
    /// `threshold` bounds the median intra-partition distance relative to the
    /// neighbourhood radius and must be positive; larger values accept looser
    /// partitions.
    pub fn fit_transform(&mut self, label: &str, values: &Array2<f64>, threshold: f64) -> Result<()> {
        validate_rows(label, values, "baseline")?;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ClassifierError::InvalidParameter {
                name: "threshold",
                value: threshold.to_string(),
                reason: "must be a positive number",
            });
        }

        let (mut nodes, accepted) = partition(values, threshold)?;
        let mut delegate = build_classifier((*self.config.delegate).clone());
        let mut sub_labels = Vec::with_capacity(accepted.len());
        for (i, &id) in accepted.iter().enumerate() {
            let sub_label = format!("{}-{}", label, i);
            let rows = values.select(Axis(0), &nodes[id].members);
            delegate.fit(&sub_label, &rows)?;
            nodes[id].sub_label = Some(sub_label.clone());
            sub_labels.push(sub_label);
        }
        log::debug!(
            "{}: {} partitions over {} rows",
            label,
            sub_labels.len(),
            values.nrows()
        );

        self.fitted.insert(
            label.to_string(),
            FittedPartitions {
                nodes,
                sub_labels,
                delegate,
            },
        );
        Ok(())
    }

    /// The partition tree of `label`; node 0 is the root.
    pub fn partitions(&self, label: &str) -> Option<&[Partition]> {
        self.fitted.get(label).map(|f| f.nodes.as_slice())
    }

    /// Sub-labels of the accepted partitions, in acceptance order.
    pub fn sub_labels(&self, label: &str) -> Option<&[String]> {
        self.fitted.get(label).map(|f| f.sub_labels.as_slice())
    }
}

impl Default for ConnectedSetClassifier {
    fn default() -> Self {
        ConnectedSetClassifier::new(ConnectedSetConfig::default())
    }
}

impl Classifier for ConnectedSetClassifier {
    fn fit(&mut self, label: &str, rows: &Array2<f64>) -> Result<()> {
        self.fit_transform(label, rows, self.config.threshold)
    }

    fn predict(&self, label: &str, rows: &Array2<f64>, direction: Direction) -> Result<Prediction> {
        let fitted = self
            .fitted
            .get(label)
            .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        validate_rows(label, rows, "test rows")?;

        let mut verdicts = vec![ANOMALY; rows.nrows()];
        for sub_label in &fitted.sub_labels {
            let p = fitted.delegate.predict(sub_label, rows, direction)?;
            for (v, &sub) in verdicts.iter_mut().zip(&p.verdicts) {
                if sub == NORMAL {
                    *v = NORMAL;
                }
            }
        }
        Ok(Prediction::from_verdicts(verdicts))
    }

    fn is_fitted(&self, label: &str) -> bool {
        self.fitted.contains_key(label)
    }

    fn name(&self) -> &str {
        "connected_set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_regimes() -> Array2<f64> {
        array![
            [1.0, 10.0],
            [1.0, 10.1],
            [1.0, 10.2],
            [1.0, 100.0],
            [1.0, 100.5],
            [1.0, 110.0],
            [1.0, 110.5]
        ]
    }

    fn accepted_members(clf: &ConnectedSetClassifier, label: &str) -> Vec<Vec<usize>> {
        clf.partitions(label)
            .unwrap()
            .iter()
            .filter(|p| p.is_accepted())
            .map(|p| p.members.clone())
            .collect()
    }

    #[test]
    fn identical_rows_form_one_partition() {
        let mut clf = ConnectedSetClassifier::default();
        let base = array![[1.0, 5.0], [1.0, 5.0], [1.0, 5.0], [1.0, 5.0]];
        clf.fit("lat", &base).unwrap();
        assert_eq!(clf.sub_labels("lat").unwrap(), ["lat-0".to_string()]);
        assert_eq!(clf.partitions("lat").unwrap().len(), 1);

        let p = clf
            .predict("lat", &array![[1.0, 5.0], [1.0, 500.0]], Direction::Both)
            .unwrap();
        assert_eq!(p.verdicts, vec![NORMAL, ANOMALY]);
    }

    #[test]
    fn separated_regimes_are_partitioned() {
        let mut clf = ConnectedSetClassifier::default();
        clf.fit("lat", &two_regimes()).unwrap();
        assert_eq!(
            accepted_members(&clf, "lat"),
            vec![vec![0, 1, 2], vec![3, 4, 5, 6]]
        );

        let nodes = clf.partitions("lat").unwrap();
        assert_eq!(nodes[0].children, vec![1, 2]);
        assert_eq!(nodes[1].parent, Some(0));

        let p = clf
            .predict(
                "lat",
                &array![[1.0, 10.05], [1.0, 105.0], [1.0, 50.0]],
                Direction::Both,
            )
            .unwrap();
        assert_eq!(p.verdicts, vec![NORMAL, NORMAL, ANOMALY]);
    }

    #[test]
    fn tight_threshold_splits_loose_partitions_again() {
        let mut clf = ConnectedSetClassifier::default();
        clf.fit_transform("lat", &two_regimes(), 0.5).unwrap();
        assert_eq!(
            clf.sub_labels("lat").unwrap(),
            ["lat-0".to_string(), "lat-1".to_string(), "lat-2".to_string()]
        );
        assert_eq!(
            accepted_members(&clf, "lat"),
            vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]
        );
        let nodes = clf.partitions("lat").unwrap();
        assert_eq!(nodes.len(), 5);
        assert!(!nodes[2].is_accepted());
        assert_eq!(nodes[2].children, vec![3, 4]);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let clf = ConnectedSetClassifier::default();
        assert_eq!(
            clf.predict("nope", &array![[1.0, 2.0]], Direction::Both)
                .unwrap_err(),
            ClassifierError::UnknownLabel("nope".to_string())
        );
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let mut clf = ConnectedSetClassifier::default();
        for threshold in [-1.0, 0.0, f64::NAN] {
            assert!(matches!(
                clf.fit_transform("lat", &two_regimes(), threshold),
                Err(ClassifierError::InvalidParameter { name: "threshold", .. })
            ));
        }
        assert!(!clf.is_fitted("lat"));
    }
}
