//! Picks the smallest k for which every k-means cluster is homogeneous.
//!
//! A cluster is homogeneous when every pair of its members has cosine
//! similarity and Jaccard similarity (over non-zero features) of at least the
//! configured threshold. The search is a binary search over `[1, min(n, max_k)]`,
//! which assumes homogeneity is monotone in k. When no candidate qualifies the
//! model at the upper bound is kept.

use ndarray::Array2;

use crate::clustering::KMeans;
use crate::config::KMeansSearchConfig;
use crate::data_handling::validate_rows;
use crate::error::{ClassifierError, Result};
use crate::math::{cosine_similarity, euclidean, jaccard_similarity};

#[derive(Debug, Clone)]
pub struct KMeansClusterSearch {
    config: KMeansSearchConfig,
    model: Option<KMeans>,
    homogeneous: bool,
}

impl Default for KMeansClusterSearch {
    fn default() -> Self {
        Self::new(KMeansSearchConfig::default())
    }
}

impl KMeansClusterSearch {
    pub fn new(config: KMeansSearchConfig) -> Self {
        Self {
            config,
            model: None,
            homogeneous: false,
        }
    }

    pub fn config(&self) -> &KMeansSearchConfig {
        &self.config
    }

    fn fit_k(&self, x: &Array2<f64>, k: usize) -> Result<KMeans> {
        let mut model = KMeans::new(k)
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol)
            .with_seed(self.config.seed);
        model.fit(x)?;
        Ok(model)
    }

    fn is_homogeneous_clustering(&self, x: &Array2<f64>, model: &KMeans) -> bool {
        let labels = match model.labels() {
            Some(labels) => labels,
            None => return false,
        };
        let threshold = self.config.homogeneity_threshold;
        for cluster in members_of(labels, model.n_clusters()) {
            for (pos, &i) in cluster.iter().enumerate() {
                for &j in &cluster[pos + 1..] {
                    let (a, b) = (x.row(i), x.row(j));
                    if cosine_similarity(a, b) < threshold || jaccard_similarity(a, b) < threshold {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Search for the cluster count and keep the chosen model.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        validate_rows("", x, "cluster input")?;
        if self.config.max_k == 0 {
            return Err(ClassifierError::InvalidParameter {
                name: "max_k",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }

        let mut lo = 1;
        let mut hi = x.nrows().min(self.config.max_k);
        let mut best: Option<KMeans> = None;

        while lo < hi {
            let mid = (lo + hi) / 2;
            let model = self.fit_k(x, mid)?;
            let ok = self.is_homogeneous_clustering(x, &model);
            log::trace!("k-search: k = {} homogeneous = {}", mid, ok);
            if ok {
                hi = mid;
                best = Some(model);
            } else {
                lo = mid + 1;
            }
        }

        let (model, homogeneous) = match best {
            Some(model) if model.n_clusters() == lo => (model, true),
            _ => {
                let model = self.fit_k(x, lo)?;
                let ok = self.is_homogeneous_clustering(x, &model);
                (model, ok)
            }
        };

        if homogeneous {
            log::debug!("k-search: selected k = {}", lo);
        } else {
            log::warn!(
                "k-search: no homogeneous clustering up to k = {}, keeping it as best effort",
                lo
            );
        }

        self.model = Some(model);
        self.homogeneous = homogeneous;
        Ok(self)
    }

    fn model(&self) -> Result<&KMeans> {
        self.model.as_ref().ok_or(ClassifierError::NotFitted)
    }

    pub fn k(&self) -> Result<usize> {
        Ok(self.model()?.n_clusters())
    }

    /// Whether the kept clustering met the homogeneity threshold.
    pub fn is_homogeneous(&self) -> Result<bool> {
        self.model()?;
        Ok(self.homogeneous)
    }

    pub fn labels(&self) -> Result<&[usize]> {
        self.model()?.labels().ok_or(ClassifierError::NotFitted)
    }

    pub fn centroids(&self) -> Result<&Array2<f64>> {
        self.model()?.centroids().ok_or(ClassifierError::NotFitted)
    }

    pub fn cluster_sizes(&self) -> Result<Vec<usize>> {
        let mut sizes = vec![0; self.k()?];
        for &c in self.labels()? {
            sizes[c] += 1;
        }
        Ok(sizes)
    }

    /// Members of each cluster ordered by distance to its centroid, closest
    /// first. `x` must be the matrix passed to `fit`.
    pub fn centroid_ranking(&self, x: &Array2<f64>) -> Result<Vec<Vec<usize>>> {
        let labels = self.labels()?;
        let centroids = self.centroids()?;
        if x.nrows() != labels.len() || x.ncols() != centroids.ncols() {
            return Err(ClassifierError::ShapeMismatch {
                label: String::new(),
                expected: centroids.ncols(),
                actual: x.ncols(),
            });
        }

        let mut ranking = members_of(labels, centroids.nrows());
        for (c, members) in ranking.iter_mut().enumerate() {
            let centroid = centroids.row(c);
            members.sort_by(|&a, &b| {
                euclidean(x.row(a), centroid).total_cmp(&euclidean(x.row(b), centroid))
            });
        }
        Ok(ranking)
    }

    /// Nearest-centroid assignment for new rows.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        self.model()?.predict(x)
    }
}

fn members_of(labels: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut members = vec![Vec::new(); k];
    for (i, &c) in labels.iter().enumerate() {
        members[c].push(i);
    }
    members
}
