use ndarray::Array2;
use rayon::prelude::*;

use crate::math::distance::euclidean;

/// Symmetric matrix of Euclidean distances between the rows of `x`.
pub fn pairwise_euclidean(x: &Array2<f64>) -> Array2<f64> {
    let n = x.nrows();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| euclidean(x.row(i), x.row(j))).collect())
        .collect();
    Array2::from_shape_fn((n, n), |(i, j)| rows[i][j])
}

/// For each row of a distance matrix, its distances sorted ascending.
///
/// Index 0 of each list is the row's distance to itself, so the `k`-th entry
/// is the distance to the `k`-th nearest other row.
pub fn sorted_neighbor_distances(dist: &Array2<f64>) -> Vec<Vec<f64>> {
    dist.outer_iter()
        .map(|row| {
            let mut sorted = row.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            sorted
        })
        .collect()
}

/// Distances between every unordered pair of the given row indices.
pub fn pair_distances(dist: &Array2<f64>, members: &[usize]) -> Vec<f64> {
    let mut out = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
    for (pos, &i) in members.iter().enumerate() {
        for &j in &members[pos + 1..] {
            out.push(dist[(i, j)]);
        }
    }
    out
}
