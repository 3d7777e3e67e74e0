use tracing::debug;

use crate::error::WaveError;
use crate::lexer::LexicalFeatures;
use crate::metrics::{self, clamp_score, IDEAL_UNIT_LINES, MIN_IDENTIFIER_LEN, TARGET_COMMENT_RATIO};
use crate::types::{
    LexicalSummary, Metric, ScoreReport, ScoreThreshold, ScoreWeights, ScoringMode, Severity,
    Violation,
};

/// Note attached to every report so callers can tell which scorer ran.
pub const HEURISTIC_NOTE: &str =
    "heuristic scoring: built-in lexical analyzer, no external validator configured";

/// Combines the sub-metrics into a composite [`ScoreReport`].
///
/// Stateless apart from its weights; safe to share across requests.
#[derive(Clone, Debug, Default)]
pub struct WaveAnalyzer {
    weights: ScoreWeights,
}

impl WaveAnalyzer {
    /// Analyzer with equal weights.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Result<Self, WaveError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score `content` and list every sub-metric below `threshold`.
    pub fn analyze(&self, content: &str, threshold: ScoreThreshold) -> ScoreReport {
        let features = LexicalFeatures::extract(content);
        self.analyze_features(&features, threshold)
    }

    /// Score a feature pass that was already extracted.
    pub fn analyze_features(
        &self,
        features: &LexicalFeatures,
        threshold: ScoreThreshold,
    ) -> ScoreReport {
        let semantic = round2(metrics::semantic_score(features));
        let structure = round2(metrics::structure_score(features));
        let consistency = round2(metrics::consistency_score(features));
        let references = round2(metrics::references_score(features));

        let w = &self.weights;
        let weighted = w.semantic * semantic
            + w.structure * structure
            + w.consistency * consistency
            + w.references * references;
        let overall = round2(clamp_score(weighted / w.sum()));

        let mut report = ScoreReport {
            overall,
            semantic,
            structure,
            consistency,
            references,
            violations: Vec::new(),
            threshold: threshold.value(),
            mode: ScoringMode::Heuristic,
            notes: vec![HEURISTIC_NOTE.to_string()],
            features: summarize(features),
        };
        report.violations = violations(&report, features, threshold.value());

        debug!(
            overall = report.overall,
            semantic,
            structure,
            consistency,
            references,
            violations = report.violations.len(),
            "WAVE analysis complete"
        );

        report
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn summarize(features: &LexicalFeatures) -> LexicalSummary {
    LexicalSummary {
        total_lines: features.total_lines,
        code_lines: features.code_lines,
        comment_lines: features.comment_lines,
        blank_lines: features.blank_lines,
        callable_units: features.callable_units.len(),
        identifiers: features.identifiers.len(),
        short_identifiers: features
            .identifiers
            .iter()
            .filter(|id| !metrics::is_well_named(id))
            .count(),
        comment_ratio: features.comment_ratio(),
        delimiters_balanced: features.delimiters.is_balanced(),
        intent_markers: features.intent_markers.clone(),
        reference_markers: features.reference_markers.clone(),
    }
}

/// Violations ordered by severity (highest first), ties kept in
/// [`Metric::ALL`] order.
fn violations(report: &ScoreReport, features: &LexicalFeatures, threshold: f64) -> Vec<Violation> {
    let mut out: Vec<Violation> = Metric::ALL
        .iter()
        .filter(|m| report.metric(**m) < threshold)
        .map(|m| {
            let value = report.metric(*m);
            Violation {
                metric: *m,
                message: format!(
                    "{} score {:.1} is below threshold {:.1}: {}",
                    m,
                    value,
                    threshold,
                    detail(*m, features)
                ),
                severity: Severity::from_gap(threshold - value),
                value,
                threshold,
            }
        })
        .collect();
    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    out
}

fn detail(metric: Metric, features: &LexicalFeatures) -> String {
    match metric {
        Metric::Semantic => format!(
            "comment ratio {:.1}% (target {:.0}%)",
            features.comment_ratio() * 100.0,
            TARGET_COMMENT_RATIO * 100.0
        ),
        Metric::Structure => match features.callable_units.iter().map(|u| u.line_count).max() {
            Some(longest) => format!(
                "{} callable unit(s), longest {} lines (ideal {})",
                features.callable_units.len(),
                longest,
                IDEAL_UNIT_LINES
            ),
            None => "no callable units declared".to_string(),
        },
        Metric::Consistency => {
            let short = features
                .identifiers
                .iter()
                .filter(|id| !metrics::is_well_named(id))
                .count();
            format!(
                "{} of {} identifiers have {} characters or fewer",
                short,
                features.identifiers.len(),
                MIN_IDENTIFIER_LEN
            )
        }
        Metric::References => match features.reference_markers.len() {
            0 => "no intent or cross-reference markers".to_string(),
            n => format!("{} distinct reference marker(s)", n),
        },
    }
}
