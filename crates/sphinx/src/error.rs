use thiserror::Error;

/// Errors building a gate request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SphinxError {
    #[error("validation request is missing required field: {0}")]
    MissingField(&'static str),
}
