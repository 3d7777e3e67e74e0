use thiserror::Error;

/// Errors decoding a bump payload.
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("invalid bump payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
