#![deny(unsafe_code)]
//! # coherence-wave
//!
//! WAVE analysis: a closed-form coherence scorer over lexical and structural
//! features of a text/code string.
//!
//! Scoring is split into two passes:
//! - [`LexicalFeatures::extract`] tokenizes the input once and produces named
//!   counts (callable units, comment lines, declared identifiers, delimiter
//!   balance, intent/reference markers).
//! - [`metrics`] turns those counts into four independent sub-scores in
//!   `[0, 100]`: **semantic**, **structure**, **consistency**, **references**.
//!
//! [`WaveAnalyzer`] combines the sub-scores into a weighted composite and
//! lists every sub-metric below the caller's threshold as a [`Violation`].
//! The analyzer is pure: identical `(content, threshold)` always yields an
//! identical [`ScoreReport`].

pub mod analyzer;
pub mod error;
pub mod lexer;
pub mod metrics;
pub mod types;

pub use analyzer::WaveAnalyzer;
pub use error::WaveError;
pub use lexer::{CallableUnit, DelimiterBalance, DelimiterCount, LexicalFeatures};
pub use types::{
    LexicalSummary, Metric, ScoreReport, ScoreThreshold, ScoreWeights, ScoringMode, Severity,
    Violation,
};
