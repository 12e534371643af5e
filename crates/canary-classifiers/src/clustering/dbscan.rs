use ndarray::Array2;

use crate::clustering::NOISE;
use crate::math::pairwise_euclidean;

/// DBSCAN (Density-Based Spatial Clustering of Applications with Noise)
///
/// Points are classified as core, border, or noise:
/// - Core: has ≥ min_samples neighbors within eps radius (itself included)
/// - Border: within eps of a core point but not core itself
/// - Noise: neither core nor border (label = -1)
///
/// With `min_samples == 1` every point is core and the clusters are the
/// connected components of the "within eps" graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    pub eps: f64,
    pub min_samples: usize,
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self {
            eps,
            min_samples: min_samples.max(1),
        }
    }

    /// Cluster the rows of `x` under Euclidean distance.
    pub fn fit(&self, x: &Array2<f64>) -> Vec<i64> {
        self.fit_distances(&pairwise_euclidean(x))
    }

    /// Cluster from a precomputed square distance matrix. Cluster ids are
    /// assigned in order of their lowest-index core point.
    pub fn fit_distances(&self, dist: &Array2<f64>) -> Vec<i64> {
        let n_samples = dist.nrows();
        let neighbors: Vec<Vec<usize>> = (0..n_samples)
            .map(|i| {
                (0..n_samples)
                    .filter(|&j| dist[(i, j)] <= self.eps)
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|n| n.len() >= self.min_samples)
            .collect();

        let mut labels = vec![NOISE; n_samples];
        let mut cluster_id: i64 = 0;

        for i in 0..n_samples {
            if labels[i] != NOISE || !is_core[i] {
                continue;
            }

            // Expand cluster from core point i
            labels[i] = cluster_id;
            let mut queue: Vec<usize> = neighbors[i].clone();
            let mut head = 0;

            while head < queue.len() {
                let q = queue[head];
                head += 1;

                if labels[q] == NOISE {
                    labels[q] = cluster_id;
                }
                if !is_core[q] {
                    continue;
                }
                for &neighbor in &neighbors[q] {
                    if labels[neighbor] == NOISE {
                        labels[neighbor] = cluster_id;
                        queue.push(neighbor);
                    }
                }
            }

            cluster_id += 1;
        }

        labels
    }
}

/// Group point indices by cluster label, noise excluded, in label order.
pub fn members_by_label(labels: &[i64]) -> Vec<Vec<usize>> {
    let n_clusters = labels.iter().copied().max().map(|m| m + 1).unwrap_or(0).max(0) as usize;
    let mut groups = vec![Vec::new(); n_clusters];
    for (i, &l) in labels.iter().enumerate() {
        if l >= 0 {
            groups[l as usize].push(i);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_two_groups() {
        let x = array![[0.0, 0.0], [0.1, 0.0], [5.0, 5.0], [5.1, 5.0]];
        let labels = Dbscan::new(0.5, 1).fit(&x);
        assert_eq!(labels, vec![0, 0, 1, 1]);
        assert_eq!(members_by_label(&labels), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn sparse_points_are_noise() {
        let x = array![[0.0], [0.1], [0.2], [10.0]];
        let labels = Dbscan::new(0.15, 2).fit(&x);
        assert_eq!(labels, vec![0, 0, 0, NOISE]);
    }

    #[test]
    fn chains_link_with_min_samples_one() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let labels = Dbscan::new(1.0, 1).fit(&x);
        assert!(labels.iter().all(|&l| l == 0));
    }
}
