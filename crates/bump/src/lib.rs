#![deny(unsafe_code)]
//! # coherence-bump
//!
//! Integrity check for handoff payloads passed between agents or sessions.
//! The sender declares `contextHash = sha256(canonical_json(handoff))`; the
//! validator recomputes the digest and itemises every problem it finds.

pub mod canonical;
pub mod error;
pub mod payload;
pub mod validator;

pub use canonical::{canonical_json, context_hash_for, is_sha256_hex, sha256_hex};
pub use error::BumpError;
pub use payload::{BumpChecks, BumpPayload, BumpResult, BumpStatus};
pub use validator::BumpValidator;
