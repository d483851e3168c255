use thiserror::Error;

/// A user action that does not have the shape the current stimulus expects.
///
/// Rejected locally: the round stays open and the score is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("answer {0:?} is not a number")]
    NotANumber(String),
    #[error("choice {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },
    #[error("{action} is not a valid response to {stimulus}")]
    WrongKind {
        action: &'static str,
        stimulus: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("benchmark thresholds must be strictly ascending, got {0:?}")]
    UnorderedThresholds([u64; 6]),
    #[error("max_rounds must be at least 1")]
    NoRounds,
    #[error("session needs a round limit, a time limit or a miss limit")]
    Unbounded,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
}
