//! Wire shapes of the external calls.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// `wave_analyze` arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub content: String,
    /// Falls back to the configured threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// `sphinx_gate` arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRequest {
    pub content: String,
    #[serde(alias = "vulnerabilityDescription")]
    pub context: String,
    #[serde(default, alias = "targetBinary")]
    pub subject_ref: Option<String>,
    #[serde(default)]
    pub mitigations: Vec<String>,
}

/// `context_hash` arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextHashRequest {
    pub handoff: Value,
}

/// Decode `args` for `operation`, reporting malformed input as
/// [`EngineError::InvalidInput`].
pub(crate) fn parse_args<T: DeserializeOwned>(operation: &str, args: Value) -> Result<T, EngineError> {
    serde_json::from_value(args)
        .map_err(|e| EngineError::InvalidInput(format!("{}: {}", operation, e)))
}
