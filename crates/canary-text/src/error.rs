use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("invalid alignment cost: base penalty {base_penalty}: {reason}")]
    InvalidCost {
        base_penalty: u32,
        reason: &'static str,
    },

    #[error("cannot compute pairwise costs of an empty corpus")]
    EmptyCorpus,
}
