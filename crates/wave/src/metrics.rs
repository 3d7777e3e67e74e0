//! Pure sub-metric functions over [`LexicalFeatures`].
//!
//! Each function returns a score clamped to `[0, 100]` and reads nothing but
//! its feature input.

use crate::lexer::{CallableUnit, LexicalFeatures};

/// Target length of a callable unit, in non-blank lines.
pub const IDEAL_UNIT_LINES: usize = 20;

/// Multiplier applied when the input declares no callable units at all.
pub const UNDECOMPOSED_FACTOR: f64 = 0.5;

/// Identifiers need more than this many characters to count as well named.
pub const MIN_IDENTIFIER_LEN: usize = 2;

/// Comment ratio that earns a full semantic score.
pub const TARGET_COMMENT_RATIO: f64 = 0.10;

/// Reference score for the first distinct marker.
pub const REFERENCE_BASE: f64 = 60.0;

/// Reference score added per further distinct marker.
pub const REFERENCE_STEP: f64 = 20.0;

pub(crate) fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Score of one unit: full marks up to the ideal size, then a linear drop
/// that reaches zero at twice the ideal.
pub fn unit_length_score(line_count: usize) -> f64 {
    if line_count <= IDEAL_UNIT_LINES {
        return 100.0;
    }
    let excess = (line_count - IDEAL_UNIT_LINES) as f64 / IDEAL_UNIT_LINES as f64;
    clamp_score(100.0 - 100.0 * excess)
}

/// Decomposition quality.
pub fn structure_score(features: &LexicalFeatures) -> f64 {
    if features.nonblank_lines() == 0 {
        return 0.0;
    }
    if features.callable_units.is_empty() {
        return clamp_score(unit_length_score(features.nonblank_lines()) * UNDECOMPOSED_FACTOR);
    }
    let total: f64 = features
        .callable_units
        .iter()
        .map(|u: &CallableUnit| unit_length_score(u.line_count))
        .sum();
    clamp_score(total / features.callable_units.len() as f64)
}

pub fn is_well_named(identifier: &str) -> bool {
    identifier.chars().count() > MIN_IDENTIFIER_LEN
}

/// Naming quality: share of declared identifiers longer than
/// [`MIN_IDENTIFIER_LEN`]. Input without declarations scores 100.
pub fn consistency_score(features: &LexicalFeatures) -> f64 {
    if features.identifiers.is_empty() {
        return 100.0;
    }
    let good = features
        .identifiers
        .iter()
        .filter(|id| is_well_named(id))
        .count();
    clamp_score(100.0 * good as f64 / features.identifiers.len() as f64)
}

/// Comment-to-code ratio scaled so [`TARGET_COMMENT_RATIO`] scores 100.
pub fn semantic_score(features: &LexicalFeatures) -> f64 {
    clamp_score(100.0 * features.comment_ratio() / TARGET_COMMENT_RATIO)
}

/// Explicit cross-references and intent markers.
pub fn references_score(features: &LexicalFeatures) -> f64 {
    match features.reference_markers.len() {
        0 => 0.0,
        n => clamp_score(REFERENCE_BASE + REFERENCE_STEP * (n - 1) as f64),
    }
}
