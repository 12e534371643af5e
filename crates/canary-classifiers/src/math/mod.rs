//! Distance and similarity kernels over feature rows.
//!
//! `distance` holds the per-pair kernels; `matrix` builds pairwise and
//! nearest-neighbour tables on top of them (in parallel with rayon, results
//! are independent of scheduling).
pub mod distance;
pub mod matrix;

pub use distance::{bray_curtis, cosine_similarity, euclidean, jaccard_similarity};
pub use matrix::{pair_distances, pairwise_euclidean, sorted_neighbor_distances};
