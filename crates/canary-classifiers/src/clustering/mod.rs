//! Clustering passes used by the density classifier, the connected-set
//! partitioner and the cluster-count search.
//!
//! All passes are deterministic: DBSCAN and HDBSCAN have no random state and
//! k-means is seeded from its config.
pub mod dbscan;
pub mod hdbscan;
pub mod kmeans;
pub mod search;

pub use dbscan::Dbscan;
pub use hdbscan::{Hdbscan, HdbscanResult};
pub use kmeans::KMeans;
pub use search::KMeansClusterSearch;

/// Label given to points that belong to no cluster.
pub const NOISE: i64 = -1;
