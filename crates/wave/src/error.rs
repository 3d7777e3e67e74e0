/// Errors from WAVE analysis configuration.
///
/// Scoring itself never fails; only out-of-range configuration is rejected.
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    #[error("threshold {0} is outside the range 0..=100")]
    ThresholdOutOfRange(f64),
    #[error("invalid score weights: {0}")]
    InvalidWeights(String),
}
