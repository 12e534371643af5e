use crate::alignment::{Aligner, Alignment, WILDCARD_SOURCE};

impl<T: Clone + PartialEq> Aligner<T> {
    /// Full dynamic-programming table; `table[i][j]` is the cost of aligning
    /// `a[..i]` against `b[..j]`.
    fn cost_table(&self, a: &[T], b: &[T]) -> Vec<Vec<u64>> {
        let (n, m) = (a.len(), b.len());
        let mut table = vec![vec![0u64; m + 1]; n + 1];
        for i in 1..=n {
            table[i][0] = table[i - 1][0] + self.gap_cost(&a[i - 1]);
        }
        for j in 1..=m {
            table[0][j] = table[0][j - 1] + self.gap_cost(&b[j - 1]);
        }
        for i in 1..=n {
            for j in 1..=m {
                let diag = table[i - 1][j - 1] + self.substitution_cost(&a[i - 1], &b[j - 1]);
                let up = table[i - 1][j] + self.gap_cost(&a[i - 1]);
                let left = table[i][j - 1] + self.gap_cost(&b[j - 1]);
                table[i][j] = diag.min(up).min(left);
            }
        }
        table
    }

    /// Quadratic-space alignment. Ties in the traceback go to deletion, then
    /// substitution, then insertion.
    pub fn align_direct(&self, a: &[T], b: &[T]) -> Alignment<T> {
        self.align_direct_at(a, b, 0)
    }

    /// Direct alignment of `b` where `b[0]` sits at `offset` in the caller's
    /// sequence.
    pub(crate) fn align_direct_at(&self, a: &[T], b: &[T], offset: usize) -> Alignment<T> {
        let table = self.cost_table(a, b);
        let (mut i, mut j) = (a.len(), b.len());
        let mut reversed = Alignment::empty();
        reversed.cost = table[i][j];

        while i > 0 || j > 0 {
            if i > 0 && table[i][j] == table[i - 1][j] + self.gap_cost(&a[i - 1]) {
                if a[i - 1] == self.wildcard {
                    reversed.push(self.wildcard.clone(), WILDCARD_SOURCE);
                }
                i -= 1;
            } else if i > 0
                && j > 0
                && table[i][j] == table[i - 1][j - 1] + self.substitution_cost(&a[i - 1], &b[j - 1])
            {
                reversed.push(b[j - 1].clone(), (j - 1 + offset) as i64);
                i -= 1;
                j -= 1;
            } else {
                if b[j - 1] != self.wildcard {
                    reversed.push(b[j - 1].clone(), (j - 1 + offset) as i64);
                }
                j -= 1;
            }
        }

        reversed.tokens.reverse();
        reversed.source_indices.reverse();
        reversed
    }
}
