#![deny(unsafe_code)]
//! # coherence-sphinx
//!
//! Five sequential validity gates over a [`ValidationRequest`]:
//!
//! 1. **Origin**: the context cites a recognised identifier or is descriptive.
//! 2. **Intent**: the content explains itself (comment ratio and intent marker).
//! 3. **Coherence**: the WAVE composite reaches the fixed floor.
//! 4. **Identity**: the content is structurally whole.
//! 5. **Passage**: declared mitigations are recognised and have a subject.
//!
//! The request passes only when every gate passes and the composite reaches
//! the floor. Each evaluation appends exactly one entry to the ATOM trail
//! after the verdict is known.

pub mod error;
pub mod evaluator;
pub mod gates;
pub mod request;
pub mod verdict;

pub use error::SphinxError;
pub use evaluator::SphinxGateEvaluator;
pub use gates::{
    GateCheck, COHERENCE_FLOOR, MIN_COMMENT_RATIO, MIN_CONSISTENCY, MIN_CONTEXT_CHARS,
    MITIGATION_ALLOW_LIST,
};
pub use request::{ValidationRequest, ValidationRequestBuilder};
pub use verdict::{Gate, GateVerdict, SphinxResult};
