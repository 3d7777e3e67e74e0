use serde::{Deserialize, Serialize};

use crate::error::WaveError;

/// A score threshold in `[0, 100]`.
///
/// Out-of-range values are rejected at construction, never clamped.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScoreThreshold(f64);

impl ScoreThreshold {
    /// Default threshold and the fixed coherence floor used by the gates.
    pub const DEFAULT: ScoreThreshold = ScoreThreshold(60.0);

    pub fn new(value: f64) -> Result<Self, WaveError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(WaveError::ThresholdOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ScoreThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for ScoreThreshold {
    type Error = WaveError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScoreThreshold> for f64 {
    fn from(t: ScoreThreshold) -> Self {
        t.0
    }
}

/// Weights of the four sub-metrics in the composite score.
///
/// Weights are normalised by their sum, so only their ratios matter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub structure: f64,
    pub consistency: f64,
    pub references: f64,
}

impl ScoreWeights {
    /// Check that every weight is finite and non-negative and that they do
    /// not all vanish.
    pub fn validate(&self) -> Result<(), WaveError> {
        let all = [self.semantic, self.structure, self.consistency, self.references];
        if let Some(bad) = all.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(WaveError::InvalidWeights(format!(
                "weight {} must be finite and non-negative",
                bad
            )));
        }
        if self.sum() <= 0.0 {
            return Err(WaveError::InvalidWeights("weights sum to zero".into()));
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.semantic + self.structure + self.consistency + self.references
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.25,
            structure: 0.25,
            consistency: 0.25,
            references: 0.25,
        }
    }
}

/// The four independent sub-metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Semantic,
    Structure,
    Consistency,
    References,
}

impl Metric {
    /// Fixed reporting order.
    pub const ALL: [Metric; 4] = [
        Metric::Semantic,
        Metric::Structure,
        Metric::Consistency,
        Metric::References,
    ];
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Structure => write!(f, "structure"),
            Self::Consistency => write!(f, "consistency"),
            Self::References => write!(f, "references"),
        }
    }
}

/// Severity of a violation, derived from how far a metric falls below the
/// threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Gap (threshold minus value) above which a violation is `High`.
    pub const HIGH_GAP: f64 = 30.0;
    /// Gap above which a violation is `Medium`.
    pub const MEDIUM_GAP: f64 = 15.0;

    pub fn from_gap(gap: f64) -> Self {
        if gap > Self::HIGH_GAP {
            Severity::High
        } else if gap > Self::MEDIUM_GAP {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A sub-metric that fell below the requested threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub metric: Metric,
    pub message: String,
    pub severity: Severity,
    pub value: f64,
    pub threshold: f64,
}

/// How the report was computed.
///
/// The engine ships only the built-in closed-form analyzer, so every report
/// says `heuristic`; callers can rely on this field instead of guessing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Heuristic,
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Named counts from the lexical pass, embedded in the report so failures
/// can be explained without re-running analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalSummary {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub callable_units: usize,
    pub identifiers: usize,
    pub short_identifiers: usize,
    /// Comment lines over non-blank lines, in `[0, 1]`.
    pub comment_ratio: f64,
    pub delimiters_balanced: bool,
    pub intent_markers: Vec<String>,
    pub reference_markers: Vec<String>,
}

/// Output of [`crate::WaveAnalyzer::analyze`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub overall: f64,
    pub semantic: f64,
    pub structure: f64,
    pub consistency: f64,
    pub references: f64,
    pub violations: Vec<Violation>,
    pub threshold: f64,
    pub mode: ScoringMode,
    pub notes: Vec<String>,
    pub features: LexicalSummary,
}

impl ScoreReport {
    /// Score of a single sub-metric.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Semantic => self.semantic,
            Metric::Structure => self.structure,
            Metric::Consistency => self.consistency,
            Metric::References => self.references,
        }
    }

    /// Whether the composite reaches the threshold the report was built with.
    pub fn meets_threshold(&self) -> bool {
        self.overall >= self.threshold
    }
}
