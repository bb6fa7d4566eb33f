use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot sample {requested} distinct transitions from a buffer holding {available}")]
    InsufficientSamples { requested: usize, available: usize },

    #[error("shape mismatch in `{field}` at batch row {index}: expected length {expected}, got {found}")]
    ShapeMismatch {
        field: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("no transitions selected for the batch")]
    EmptyBatch,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse replay config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid replay config: `{0}` must be greater than zero")]
    Invalid(&'static str),
}
