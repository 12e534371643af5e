use thiserror::Error;

/// Result alias used across the classifier crate.
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Failures raised by `fit`/`predict` and the clustering helpers.
///
/// Every variant that concerns a dataset carries its label so a caller juggling
/// many metrics can tell which one was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("no fitted state for label '{0}'")]
    UnknownLabel(String),

    #[error("empty {what} for label '{label}'")]
    EmptyInput { label: String, what: &'static str },

    #[error("shape mismatch for label '{label}': fitted with {expected} columns, got {actual}")]
    ShapeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("column {column} out of range for label '{label}' with {ncols} columns")]
    ColumnOutOfRange {
        label: String,
        column: usize,
        ncols: usize,
    },

    #[error("non-finite value in rows for label '{label}'")]
    NonFinite { label: String },

    #[error("invalid direction flag {0}, expected 0 (higher), 1 (lower) or 2 (both)")]
    InvalidDirection(u8),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("model not fitted")]
    NotFitted,
}
