use crate::alignment::{Aligner, Alignment};

fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

impl<T: Clone + PartialEq> Aligner<T> {
    /// Last row of the cost table in linear space. With `reversed` both
    /// sequences are read back to front, so entry `k` is the cost of aligning
    /// `a` against the last `k` tokens of `b`.
    fn last_row(&self, a: &[T], b: &[T], reversed: bool) -> Vec<u64> {
        let (n, m) = (a.len(), b.len());
        let at = |s: &[T], i: usize| -> usize {
            if reversed {
                s.len() - 1 - i
            } else {
                i
            }
        };

        let mut prev = vec![0u64; m + 1];
        for j in 1..=m {
            prev[j] = prev[j - 1] + self.gap_cost(&b[at(b, j - 1)]);
        }
        let mut cur = vec![0u64; m + 1];
        for i in 1..=n {
            let ai = &a[at(a, i - 1)];
            cur[0] = prev[0] + self.gap_cost(ai);
            for j in 1..=m {
                let bj = &b[at(b, j - 1)];
                let diag = prev[j - 1] + self.substitution_cost(ai, bj);
                let up = prev[j] + self.gap_cost(ai);
                let left = cur[j - 1] + self.gap_cost(bj);
                cur[j] = diag.min(up).min(left);
            }
            std::mem::swap(&mut prev, &mut cur);
        }
        prev
    }

    /// Cost of the optimal alignment, in linear space.
    pub fn alignment_cost(&self, a: &[T], b: &[T]) -> u64 {
        self.last_row(a, b, false)[b.len()]
    }

    /// Linear-space alignment. Returns the same alignment as `align_direct`.
    pub fn align_hirschberg(&self, a: &[T], b: &[T]) -> Alignment<T> {
        let max_depth = 2 * ceil_log2(a.len()) + 2;
        let mut out = Alignment::empty();
        self.hirschberg(a, b, 0, 0, max_depth, &mut out);
        out
    }

    fn hirschberg(
        &self,
        a: &[T],
        b: &[T],
        offset: usize,
        depth: usize,
        max_depth: usize,
        out: &mut Alignment<T>,
    ) {
        if a.len() <= 1 || b.len() <= 1 {
            out.append(self.align_direct_at(a, b, offset));
            return;
        }
        if depth >= max_depth {
            log::warn!(
                "alignment recursion reached depth {} ({} x {} tokens left), using the full table",
                depth,
                a.len(),
                b.len()
            );
            out.append(self.align_direct_at(a, b, offset));
            return;
        }

        let mid = a.len() / 2;
        let m = b.len();
        let forward = self.last_row(&a[..mid], b, false);
        let backward = self.last_row(&a[mid..], b, true);

        // Last column minimising the combined cost.
        let mut split = 0;
        let mut best = u64::MAX;
        for j in 0..=m {
            let total = forward[j] + backward[m - j];
            if total <= best {
                best = total;
                split = j;
            }
        }

        self.hirschberg(&a[..mid], &b[..split], offset, depth + 1, max_depth, out);
        self.hirschberg(&a[mid..], &b[split..], offset + split, depth + 1, max_depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentCost;

    #[test]
    fn ceil_log2_values() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(5), 3);
        assert_eq!(ceil_log2(8), 3);
    }

    #[test]
    fn linear_cost_matches_full_table() {
        let aligner = Aligner::new('x');
        for (a, b) in [("kitten", "sitting"), ("axbx", "ab"), ("", "xx"), ("abc", "")] {
            let a: Vec<char> = a.chars().collect();
            let b: Vec<char> = b.chars().collect();
            assert_eq!(aligner.alignment_cost(&a, &b), aligner.align_direct(&a, &b).cost);
        }
    }

    #[test]
    fn hirschberg_matches_direct_on_long_lines() {
        let aligner = Aligner::new("<*>");
        let a = ["GET", "/api", "<*>", "200", "in", "<*>", "ms", "from", "<*>"];
        let b = ["GET", "/api", "users", "404", "in", "12", "ms", "from", "10.0.0.1", "retry"];
        assert_eq!(aligner.align_hirschberg(&a, &b), aligner.align_direct(&a, &b));
    }

    #[test]
    fn largest_penalties_do_not_overflow() {
        let a: Vec<char> = "abcab".chars().collect();
        let b: Vec<char> = "defde".chars().collect();

        let aligner = Aligner::new('x').with_cost(AlignmentCost::new(u32::MAX).unwrap()).unwrap();
        let alignment = aligner.find_optimal_alignment(&a, &b);
        assert_eq!(alignment.cost, 5 * u64::from(u32::MAX));
        assert_eq!(alignment, aligner.align_direct(&a, &b));
        assert_eq!(aligner.alignment_cost(&a, &b), alignment.cost);

        let aligner = Aligner::new('x')
            .with_cost(AlignmentCost::new(u32::MAX / 2).unwrap())
            .unwrap()
            .with_substitution(|_, _| u32::MAX);
        assert_eq!(aligner.align_hirschberg(&a, &b), aligner.align_direct(&a, &b));
    }
}
