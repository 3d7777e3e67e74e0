use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BumpError;

/// A handoff declared by its sender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpPayload {
    pub session_id: String,
    /// Declared `sha256(canonical_json(handoff))`, 64 hex chars.
    pub context_hash: String,
    pub handoff: Value,
    pub integrity_proof: String,
}

impl BumpPayload {
    /// Decode a payload from its wire form. Every field is required.
    pub fn from_value(value: Value) -> Result<Self, BumpError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpStatus {
    Ok,
    Invalid,
}

impl std::fmt::Display for BumpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpChecks {
    pub hash_ok: bool,
}

/// Outcome of validating a [`BumpPayload`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpResult {
    pub status: BumpStatus,
    /// Every problem found, in check order.
    pub errors: Vec<String>,
    pub checks: BumpChecks,
}

impl BumpResult {
    pub fn is_ok(&self) -> bool {
        self.status == BumpStatus::Ok
    }
}
