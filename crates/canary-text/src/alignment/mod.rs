//! Weighted alignment of token sequences with a free wildcard.
//!
//! Aligning `a` against `b` produces a new sequence built from `b`'s tokens:
//!
//! * a match or substitution emits `b[j]` (source `j`);
//! * deleting a wildcard of `a` emits the wildcard (source `-1`), deleting any
//!   other `a` token emits nothing;
//! * inserting a `b` token emits `b[j]` (source `j`) unless it is the wildcard.
//!
//! A wildcard of `a` lined up with a wildcard of `b` is a free deletion plus a
//! free insertion, and deletion wins ties, so it is reported as carried over
//! from `a` (source `-1`).
//!
//! Substituting equal tokens is free, unequal ones cost the base penalty (or a
//! caller-supplied cost). Inserting or deleting the wildcard is free, anything
//! else costs the base penalty.
//!
//! Two forms compute the alignment. The direct form keeps the full
//! `(len a + 1) x (len b + 1)` table. The Hirschberg form needs linear space
//! and returns the same alignment: the direct traceback prefers deletion, then
//! substitution, then insertion, and Hirschberg splits at the last optimal
//! column, so both settle on the same optimal path.

mod cost;
mod direct;
mod hirschberg;
mod pairwise;

pub use cost::AlignmentCost;

use crate::error::Result;

/// Source index emitted for wildcards taken from `a`.
pub const WILDCARD_SOURCE: i64 = -1;

/// Result of aligning `a` against `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<T> {
    pub tokens: Vec<T>,
    /// Index into `b` of each emitted token, `WILDCARD_SOURCE` for wildcards
    /// carried over from `a`.
    pub source_indices: Vec<i64>,
    /// Sum of the step costs, each of which fits in a `u32`.
    pub cost: u64,
}

impl<T> Alignment<T> {
    fn empty() -> Self {
        Alignment {
            tokens: Vec::new(),
            source_indices: Vec::new(),
            cost: 0,
        }
    }

    fn push(&mut self, token: T, source: i64) {
        self.tokens.push(token);
        self.source_indices.push(source);
    }

    fn append(&mut self, mut other: Alignment<T>) {
        self.tokens.append(&mut other.tokens);
        self.source_indices.append(&mut other.source_indices);
        self.cost += other.cost;
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

type SubstitutionFn<T> = dyn Fn(&T, &T) -> u32 + Send + Sync;

/// Aligns token sequences under a wildcard-aware cost model.
pub struct Aligner<T> {
    wildcard: T,
    cost: AlignmentCost,
    substitution: Option<Box<SubstitutionFn<T>>>,
}

impl<T: Clone + PartialEq> Aligner<T> {
    pub fn new(wildcard: T) -> Self {
        Aligner {
            wildcard,
            cost: AlignmentCost::default(),
            substitution: None,
        }
    }

    pub fn with_cost(mut self, cost: AlignmentCost) -> Result<Self> {
        cost.validate()?;
        self.cost = cost;
        Ok(self)
    }

    /// Replace the cost of substituting two unequal tokens. Equal tokens still
    /// substitute for free.
    pub fn with_substitution<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &T) -> u32 + Send + Sync + 'static,
    {
        self.substitution = Some(Box::new(f));
        self
    }

    pub fn wildcard(&self) -> &T {
        &self.wildcard
    }

    pub fn cost(&self) -> &AlignmentCost {
        &self.cost
    }

    fn substitution_cost(&self, a: &T, b: &T) -> u64 {
        if a == b {
            0
        } else if let Some(f) = &self.substitution {
            u64::from(f(a, b))
        } else {
            u64::from(self.cost.base_penalty)
        }
    }

    fn gap_cost(&self, token: &T) -> u64 {
        if *token == self.wildcard {
            0
        } else {
            u64::from(self.cost.base_penalty)
        }
    }

    /// Optimal alignment of `a` against `b` in linear space.
    pub fn find_optimal_alignment(&self, a: &[T], b: &[T]) -> Alignment<T> {
        self.align_hirschberg(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn text(alignment: &Alignment<char>) -> String {
        alignment.tokens.iter().collect()
    }

    #[test]
    fn wildcard_example() {
        let aligner = Aligner::new('x');
        let alignment = aligner.find_optimal_alignment(&chars("axxbcxefc"), &chars("bbxcbaxxb"));
        assert_eq!(text(&alignment), "bxxbcxbab");
        assert_eq!(alignment.source_indices, vec![0, -1, -1, 1, 3, -1, 4, 5, 8]);
        assert_eq!(alignment.cost, aligner.alignment_cost(&chars("axxbcxefc"), &chars("bbxcbaxxb")));
    }

    #[test]
    fn identical_sequences_cost_nothing() {
        let aligner = Aligner::new("<*>".to_string());
        let line: Vec<String> = ["user", "<*>", "logged", "in"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let alignment = aligner.find_optimal_alignment(&line, &line);
        assert_eq!(alignment.cost, 0);
        assert_eq!(alignment.tokens, line);
        assert_eq!(alignment.source_indices, vec![0, WILDCARD_SOURCE, 2, 3]);
        assert_eq!(alignment, aligner.align_direct(&line, &line));
    }

    #[test]
    fn custom_substitution_cost_is_used() {
        let aligner = Aligner::new('x').with_substitution(|_, _| 3);
        let alignment = aligner.align_direct(&chars("ab"), &chars("ac"));
        assert_eq!(alignment.cost, 3);
        assert_eq!(text(&alignment), "ac");
    }

    #[test]
    fn empty_inputs() {
        let aligner = Aligner::new('x');
        let alignment = aligner.find_optimal_alignment(&chars(""), &chars("abx"));
        assert_eq!(text(&alignment), "ab");
        assert_eq!(alignment.cost, 20);

        let alignment = aligner.find_optimal_alignment(&chars("axa"), &chars(""));
        assert_eq!(text(&alignment), "x");
        assert_eq!(alignment.source_indices, vec![WILDCARD_SOURCE]);
        assert_eq!(alignment.cost, 20);
    }
}
