use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{ClassifierError, Result};

/// Lloyd's k-means with k-means++ seeding.
///
/// The generator is seeded from `seed`, so equal inputs and settings give equal
/// clusterings.
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
    centroids: Option<Array2<f64>>,
    labels: Option<Vec<usize>>,
    inertia: Option<f64>,
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Index of the centroid closest to `row` (first one on ties).
fn nearest(row: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> usize {
    let mut best_c = 0;
    let mut best_dist = f64::MAX;
    for (c, centroid) in centroids.outer_iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best_dist {
            best_dist = d;
            best_c = c;
        }
    }
    best_c
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
            centroids: None,
            labels: None,
            inertia: None,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// K-means++ initialization: pick centroids spread apart
    fn kmeans_pp_init(x: &Array2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
        let n_samples = x.nrows();
        let mut centroids = Array2::zeros((k, x.ncols()));

        let first = rng.gen_range(0..n_samples);
        centroids.row_mut(0).assign(&x.row(first));

        for c in 1..k {
            let dists: Vec<f64> = x
                .outer_iter()
                .map(|row| {
                    (0..c)
                        .map(|j| squared_distance(row, centroids.row(j)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            // Weighted random selection proportional to D²
            let total: f64 = dists.iter().sum();
            if total <= 0.0 {
                let idx = rng.gen_range(0..n_samples);
                centroids.row_mut(c).assign(&x.row(idx));
                continue;
            }

            let r = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n_samples - 1;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if cumulative >= r && d > 0.0 {
                    chosen = i;
                    break;
                }
            }
            centroids.row_mut(c).assign(&x.row(chosen));
        }

        centroids
    }

    /// Fit the model (unsupervised)
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if self.n_clusters == 0 || n_samples < self.n_clusters {
            return Err(ClassifierError::InvalidParameter {
                name: "n_clusters",
                value: self.n_clusters.to_string(),
                reason: "must be between 1 and the number of samples",
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = Self::kmeans_pp_init(x, self.n_clusters, &mut rng);
        let mut labels = vec![usize::MAX; n_samples];

        for _iter in 0..self.max_iter {
            // Assignment step: assign each point to nearest centroid
            let new_labels: Vec<usize> = (0..n_samples)
                .into_par_iter()
                .map(|i| nearest(x.row(i), &centroids))
                .collect();
            let changed = new_labels
                .iter()
                .zip(labels.iter())
                .filter(|(a, b)| a != b)
                .count();
            labels = new_labels;

            // Update step: recompute centroids
            let mut new_centroids = Array2::zeros(centroids.dim());
            let mut counts = vec![0usize; self.n_clusters];
            for (i, &c) in labels.iter().enumerate() {
                counts[c] += 1;
                let mut row = new_centroids.row_mut(c);
                row += &x.row(i);
            }
            for c in 0..self.n_clusters {
                if counts[c] > 0 {
                    new_centroids
                        .row_mut(c)
                        .mapv_inplace(|v| v / counts[c] as f64);
                } else {
                    // Empty cluster, reseed from a random sample
                    let idx = rng.gen_range(0..n_samples);
                    new_centroids.row_mut(c).assign(&x.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            centroids = new_centroids;

            if changed == 0 || shift < self.tol {
                break;
            }
        }

        // Centroids may have moved after the last assignment.
        let labels: Vec<usize> = (0..n_samples)
            .into_par_iter()
            .map(|i| nearest(x.row(i), &centroids))
            .collect();
        let inertia: f64 = labels
            .iter()
            .enumerate()
            .map(|(i, &c)| squared_distance(x.row(i), centroids.row(c)))
            .sum();

        self.centroids = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        Ok(self)
    }

    /// Predict cluster labels for new data
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let centroids = self.centroids.as_ref().ok_or(ClassifierError::NotFitted)?;
        if x.ncols() != centroids.ncols() {
            return Err(ClassifierError::ShapeMismatch {
                label: String::new(),
                expected: centroids.ncols(),
                actual: x.ncols(),
            });
        }
        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| nearest(x.row(i), centroids))
            .collect())
    }

    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn inertia(&self) -> Option<f64> {
        self.inertia
    }
}
