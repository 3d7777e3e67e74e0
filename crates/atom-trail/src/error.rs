use thiserror::Error;

/// Errors from the ATOM trail store.
#[derive(Error, Debug)]
pub enum AtomError {
    #[error("trail I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trail serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("atom entry is missing required field: {0}")]
    MissingField(&'static str),

    #[error("trail sink unavailable: {0}")]
    Unavailable(String),
}
