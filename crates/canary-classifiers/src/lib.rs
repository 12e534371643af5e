//! canary-classifiers: control-vs-test anomaly classification.
//!
//! A baseline (control) sample is fitted per label and test samples are judged
//! against it row by row. Each row receives a verdict (`1` normal, `-1`
//! anomaly) and each prediction a score, the share of normal rows.
//!
//! The crate provides the classifier trait and its variants (zero-deviation,
//! three-sigma, a frequency dispatcher between the two, density, isolation
//! forest, simple distance and a partitioning composite), the clustering passes
//! they build on, and a k-means cluster-count search.
pub mod clustering;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod math;
pub mod models;
pub mod preprocessing;
pub mod stats;

pub use error::{ClassifierError, Result};
