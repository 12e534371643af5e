//! canary-text: text primitives for log anomaly detection.
//!
//! `alignment` aligns tokenised log lines against each other with a cost model
//! in which a designated wildcard token (a masked variable such as an id or a
//! timestamp) is free to insert or delete. `suffix_tree` counts substring
//! occurrences in a single text.
pub mod alignment;
pub mod error;
pub mod suffix_tree;

pub use alignment::{Aligner, Alignment, AlignmentCost};
pub use error::{Result, TextError};
pub use suffix_tree::SuffixTree;
