//! Hierarchical density clustering (HDBSCAN).
//!
//! The pipeline follows Campello et al.: core distances, a minimum spanning
//! tree over mutual-reachability distances, the single-linkage hierarchy, a
//! tree condensed by `min_cluster_size`, and excess-of-mass cluster selection.
//! Each point also receives a membership probability in `[0, 1]`: how long it
//! stays in its cluster relative to the cluster's most persistent point.
use ndarray::Array2;

use crate::clustering::NOISE;
use crate::error::{ClassifierError, Result};
use crate::math::{pairwise_euclidean, sorted_neighbor_distances};

/// Lambda (1 / distance) assigned to zero-distance merges.
const MAX_LAMBDA: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hdbscan {
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub allow_single_cluster: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HdbscanResult {
    /// Cluster label per point, `NOISE` for unclustered points.
    pub labels: Vec<i64>,
    /// Membership strength per point; 0 for noise.
    pub probabilities: Vec<f64>,
    pub n_clusters: usize,
}

#[derive(Debug, Clone, Copy)]
struct Merge {
    left: usize,
    right: usize,
    distance: f64,
    size: usize,
}

#[derive(Debug, Clone, Default)]
struct CondensedCluster {
    parent: Option<usize>,
    birth: f64,
    size: usize,
    children: Vec<usize>,
    /// Points leaving this cluster and the lambda at which they leave.
    fallen: Vec<(usize, f64)>,
}

fn lambda_of(distance: f64) -> f64 {
    if distance > 1.0 / MAX_LAMBDA {
        1.0 / distance
    } else {
        MAX_LAMBDA
    }
}

impl Hdbscan {
    pub fn new(min_cluster_size: usize, min_samples: Option<usize>) -> Result<Self> {
        if min_cluster_size < 2 {
            return Err(ClassifierError::InvalidParameter {
                name: "min_cluster_size",
                value: min_cluster_size.to_string(),
                reason: "must be at least 2",
            });
        }
        let min_samples = min_samples.unwrap_or(min_cluster_size);
        if min_samples == 0 {
            return Err(ClassifierError::InvalidParameter {
                name: "min_samples",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(Hdbscan {
            min_cluster_size,
            min_samples,
            allow_single_cluster: false,
        })
    }

    pub fn with_allow_single_cluster(mut self, allow: bool) -> Self {
        self.allow_single_cluster = allow;
        self
    }

    pub fn fit(&self, x: &Array2<f64>) -> HdbscanResult {
        self.fit_distances(&pairwise_euclidean(x))
    }

    pub fn fit_distances(&self, dist: &Array2<f64>) -> HdbscanResult {
        let n = dist.nrows();
        if n < 2 {
            let clustered = n == 1 && self.allow_single_cluster;
            return HdbscanResult {
                labels: vec![if clustered { 0 } else { NOISE }; n],
                probabilities: vec![if clustered { 1.0 } else { 0.0 }; n],
                n_clusters: usize::from(clustered),
            };
        }

        let core = self.core_distances(dist);
        let edges = minimum_spanning_tree(dist, &core);
        let merges = single_linkage(n, edges);
        let clusters = self.condense(n, &merges);
        let selected = self.select(&clusters);
        label_points(n, &clusters, &selected)
    }

    fn core_distances(&self, dist: &Array2<f64>) -> Vec<f64> {
        let k = self.min_samples.min(dist.nrows());
        sorted_neighbor_distances(dist)
            .into_iter()
            .map(|sorted| sorted[k - 1])
            .collect()
    }

    /// Walk the single-linkage hierarchy from the root, keeping a cluster alive
    /// while only small groups peel off it and opening two new clusters when
    /// both sides of a merge are large enough.
    fn condense(&self, n: usize, merges: &[Merge]) -> Vec<CondensedCluster> {
        let root = n + merges.len() - 1;
        let size_of = |node: usize| if node < n { 1 } else { merges[node - n].size };

        let mut clusters = vec![CondensedCluster {
            parent: None,
            birth: 0.0,
            size: n,
            ..Default::default()
        }];
        let mut stack = vec![(root, 0usize)];

        while let Some((node, cluster)) = stack.pop() {
            if node < n {
                // Only reachable for a singleton root, which fit_distances rules out.
                clusters[cluster].fallen.push((node, MAX_LAMBDA));
                continue;
            }
            let merge = merges[node - n];
            let lambda = lambda_of(merge.distance);
            let left_big = size_of(merge.left) >= self.min_cluster_size;
            let right_big = size_of(merge.right) >= self.min_cluster_size;

            match (left_big, right_big) {
                (true, true) => {
                    for child in [merge.left, merge.right] {
                        let id = clusters.len();
                        clusters.push(CondensedCluster {
                            parent: Some(cluster),
                            birth: lambda,
                            size: size_of(child),
                            ..Default::default()
                        });
                        clusters[cluster].children.push(id);
                        stack.push((child, id));
                    }
                }
                (true, false) => {
                    fall_out(n, merges, merge.right, lambda, &mut clusters[cluster]);
                    stack.push((merge.left, cluster));
                }
                (false, true) => {
                    fall_out(n, merges, merge.left, lambda, &mut clusters[cluster]);
                    stack.push((merge.right, cluster));
                }
                (false, false) => {
                    fall_out(n, merges, merge.left, lambda, &mut clusters[cluster]);
                    fall_out(n, merges, merge.right, lambda, &mut clusters[cluster]);
                }
            }
        }
        clusters
    }

    /// Excess-of-mass selection. Children always carry larger ids than their
    /// parent, so one reverse pass sees every subtree before its root.
    fn select(&self, clusters: &[CondensedCluster]) -> Vec<bool> {
        let stability: Vec<f64> = clusters
            .iter()
            .map(|c| {
                let fallen: f64 = c.fallen.iter().map(|(_, l)| l - c.birth).sum();
                let children: f64 = c
                    .children
                    .iter()
                    .map(|&ch| (clusters[ch].birth - c.birth) * clusters[ch].size as f64)
                    .sum();
                fallen + children
            })
            .collect();

        let mut selected = vec![false; clusters.len()];
        let mut subtree = vec![0.0; clusters.len()];
        for id in (0..clusters.len()).rev() {
            let c = &clusters[id];
            let is_root = c.parent.is_none();
            if c.children.is_empty() {
                selected[id] = !is_root || self.allow_single_cluster;
                subtree[id] = stability[id];
                continue;
            }
            let child_sum: f64 = c.children.iter().map(|&ch| subtree[ch]).sum();
            if (is_root && !self.allow_single_cluster) || child_sum > stability[id] {
                subtree[id] = child_sum;
            } else {
                selected[id] = true;
                subtree[id] = stability[id];
                let mut stack = c.children.clone();
                while let Some(ch) = stack.pop() {
                    selected[ch] = false;
                    stack.extend(clusters[ch].children.iter().copied());
                }
            }
        }
        selected
    }
}

/// Prim's algorithm over the dense mutual-reachability graph.
fn minimum_spanning_tree(dist: &Array2<f64>, core: &[f64]) -> Vec<(usize, usize, f64)> {
    let n = dist.nrows();
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut from = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[0] = true;
    for _ in 1..n {
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let reach = dist[(current, j)].max(core[current]).max(core[j]);
            if reach < best[j] {
                best[j] = reach;
                from[j] = current;
            }
        }
        let mut next = usize::MAX;
        for j in 0..n {
            if !in_tree[j] && (next == usize::MAX || best[j] < best[next]) {
                next = j;
            }
        }
        in_tree[next] = true;
        edges.push((from[next], next, best[next]));
        current = next;
    }
    edges
}

/// Turn MST edges into a merge list; merge `k` creates node `n + k`.
fn single_linkage(n: usize, mut edges: Vec<(usize, usize, f64)>) -> Vec<Merge> {
    edges.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut parent: Vec<usize> = (0..2 * n - 1).collect();
    let mut size = vec![1usize; 2 * n - 1];
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut merges = Vec::with_capacity(n - 1);
    for (k, (a, b, distance)) in edges.into_iter().enumerate() {
        let ra = find(&mut parent, a);
        let rb = find(&mut parent, b);
        let node = n + k;
        parent[ra] = node;
        parent[rb] = node;
        size[node] = size[ra] + size[rb];
        merges.push(Merge {
            left: ra,
            right: rb,
            distance,
            size: size[node],
        });
    }
    merges
}

fn fall_out(n: usize, merges: &[Merge], node: usize, lambda: f64, cluster: &mut CondensedCluster) {
    let mut stack = vec![node];
    while let Some(x) = stack.pop() {
        if x < n {
            cluster.fallen.push((x, lambda));
        } else {
            let m = merges[x - n];
            stack.push(m.left);
            stack.push(m.right);
        }
    }
}

fn label_points(n: usize, clusters: &[CondensedCluster], selected: &[bool]) -> HdbscanResult {
    let mut label_of_cluster = vec![NOISE; clusters.len()];
    let mut n_clusters = 0usize;
    for (id, &sel) in selected.iter().enumerate() {
        if sel {
            label_of_cluster[id] = n_clusters as i64;
            n_clusters += 1;
        }
    }

    let mut labels = vec![NOISE; n];
    let mut point_lambda = vec![0.0; n];
    for (id, cluster) in clusters.iter().enumerate() {
        // Nearest selected ancestor (the cluster itself included).
        let mut owner = Some(id);
        while let Some(c) = owner {
            if selected[c] {
                break;
            }
            owner = clusters[c].parent;
        }
        let label = owner.map(|c| label_of_cluster[c]).unwrap_or(NOISE);
        for &(point, lambda) in &cluster.fallen {
            labels[point] = label;
            point_lambda[point] = lambda;
        }
    }

    let mut max_lambda = vec![0.0f64; n_clusters];
    for (p, &l) in labels.iter().enumerate() {
        if l >= 0 {
            max_lambda[l as usize] = max_lambda[l as usize].max(point_lambda[p]);
        }
    }
    let probabilities = labels
        .iter()
        .zip(point_lambda.iter())
        .map(|(&l, &lambda)| {
            if l < 0 {
                0.0
            } else {
                let max = max_lambda[l as usize];
                if max <= 0.0 {
                    1.0
                } else {
                    (lambda.min(max) / max).clamp(0.0, 1.0)
                }
            }
        })
        .collect();

    HdbscanResult {
        labels,
        probabilities,
        n_clusters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn blobs() -> Array2<f64> {
        let mut rows = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (10.0, 10.0)] {
            for (dx, dy) in [(0.0, 0.0), (0.1, 0.0), (0.0, 0.1), (0.1, 0.1), (0.05, 0.05), (0.2, 0.1)] {
                rows.push(cx + dx);
                rows.push(cy + dy);
            }
        }
        rows.extend_from_slice(&[50.0, 50.0]);
        Array2::from_shape_vec((13, 2), rows).unwrap()
    }

    #[test]
    fn finds_two_blobs_and_noise() {
        let res = Hdbscan::new(3, None).unwrap().fit(&blobs());
        assert_eq!(res.n_clusters, 2);
        assert!(res.labels[..6].iter().all(|&l| l == res.labels[0]));
        assert!(res.labels[6..12].iter().all(|&l| l == res.labels[6]));
        assert_ne!(res.labels[0], res.labels[6]);
        assert_eq!(res.labels[12], NOISE);
        assert_eq!(res.probabilities[12], 0.0);
    }

    #[test]
    fn probabilities_are_bounded_and_peak_at_one() {
        let res = Hdbscan::new(3, None).unwrap().fit(&blobs());
        assert!(res.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        for label in 0..res.n_clusters as i64 {
            let max = res
                .labels
                .iter()
                .zip(&res.probabilities)
                .filter(|(&l, _)| l == label)
                .map(|(_, &p)| p)
                .fold(0.0, f64::max);
            assert_eq!(max, 1.0);
        }
    }

    #[test]
    fn single_blob_needs_allow_single_cluster() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 0.1, 0.2, 0.3]).unwrap();
        let strict = Hdbscan::new(5, None).unwrap().fit(&x);
        assert_eq!(strict.n_clusters, 0);
        assert!(strict.labels.iter().all(|&l| l == NOISE));

        let relaxed = Hdbscan::new(5, None)
            .unwrap()
            .with_allow_single_cluster(true)
            .fit(&x);
        assert_eq!(relaxed.n_clusters, 1);
        assert!(relaxed.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn duplicate_points_do_not_produce_nan() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 8.0]).unwrap();
        let res = Hdbscan::new(2, None)
            .unwrap()
            .with_allow_single_cluster(true)
            .fit(&x);
        assert!(res.probabilities.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn rejects_tiny_min_cluster_size() {
        assert!(Hdbscan::new(1, None).is_err());
    }
}
