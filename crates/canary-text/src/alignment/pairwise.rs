use ndarray::Array2;
use rayon::prelude::*;

use crate::alignment::Aligner;
use crate::error::{Result, TextError};

impl<T: Clone + PartialEq + Sync> Aligner<T> {
    /// Symmetric matrix of alignment costs between every pair of sequences.
    ///
    /// Only the upper triangle is computed, so the substitution cost is
    /// assumed to be symmetric.
    pub fn pairwise_costs(&self, seqs: &[Vec<T>]) -> Result<Array2<f64>> {
        if seqs.is_empty() {
            return Err(TextError::EmptyCorpus);
        }
        let n = seqs.len();
        let upper: Vec<Vec<u64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| self.alignment_cost(&seqs[i], &seqs[j]))
                    .collect()
            })
            .collect();
        log::debug!("computed {} pairwise alignment costs", n * (n - 1) / 2);

        Ok(Array2::from_shape_fn((n, n), |(i, j)| match i.cmp(&j) {
            std::cmp::Ordering::Less => upper[i][j - i - 1] as f64,
            std::cmp::Ordering::Greater => upper[j][i - j - 1] as f64,
            std::cmp::Ordering::Equal => 0.0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let aligner = Aligner::new('x');
        let seqs: Vec<Vec<char>> = ["abc", "abd", "xbc", "zzz"]
            .iter()
            .map(|s| s.chars().collect())
            .collect();
        let costs = aligner.pairwise_costs(&seqs).unwrap();
        assert_eq!(costs.dim(), (4, 4));
        for i in 0..4 {
            assert_eq!(costs[(i, i)], 0.0);
            for j in 0..4 {
                assert_eq!(costs[(i, j)], costs[(j, i)]);
            }
        }
        assert_eq!(costs[(0, 1)], 10.0);
        assert_eq!(costs[(0, 3)], 30.0);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let aligner = Aligner::new('x');
        assert_eq!(aligner.pairwise_costs(&[]), Err(TextError::EmptyCorpus));
    }
}
