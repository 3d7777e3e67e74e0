use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Gate failures and digest mismatches are not errors; they are ordinary
/// results with `passed = false` or `status = invalid`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}
