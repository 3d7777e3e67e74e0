#![deny(unsafe_code)]
//! # coherence-engine
//!
//! The facade consumed by tool-invocation layers. It validates external
//! input, routes named operations to the WAVE analyzer, the SPHINX gates and
//! the bump validator, and wires all of them to one ATOM trail.
//!
//! ```ignore
//! let engine = CoherenceEngine::new(EngineConfig::from_env()?)?;
//! let report = engine
//!     .dispatch("wave_analyze", json!({"content": "fn main() {}"}))
//!     .await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod operation;
pub mod remote;
pub mod request;

pub use crate::config::{EngineConfig, RemoteApiConfig};
pub use engine::CoherenceEngine;
pub use error::EngineError;
pub use operation::{Operation, OperationInfo};
pub use remote::{CollaboratorStatus, GatedRemoteApi, NoopTransport, RemoteApi, RemoteCall, RemoteTransport};
pub use request::{ContextHashRequest, GateRequest, ScoreRequest};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
