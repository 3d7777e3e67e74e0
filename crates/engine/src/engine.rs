use std::sync::Arc;

use coherence_atom::{AtomSink, AtomTrailRecorder, FileAtomSink, NullAtomSink};
use coherence_bump::{context_hash_for, BumpPayload, BumpResult, BumpValidator};
use coherence_sphinx::{SphinxGateEvaluator, SphinxResult, ValidationRequest};
use coherence_wave::{ScoreReport, ScoreThreshold, WaveAnalyzer};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::operation::{Operation, OperationInfo};
use crate::request::{parse_args, ContextHashRequest, GateRequest, ScoreRequest};
use crate::Result;

/// Entry point for all engine operations.
///
/// Holds no per-request state; share it behind an `Arc` across tasks.
#[derive(Clone, Debug)]
pub struct CoherenceEngine {
    config: EngineConfig,
    default_threshold: ScoreThreshold,
    analyzer: WaveAnalyzer,
    sphinx: SphinxGateEvaluator,
    bump: BumpValidator,
}

impl CoherenceEngine {
    /// Build an engine writing its trail under `config.atom_trail_dir`, or
    /// nowhere when auditing is off.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let sink: Arc<dyn AtomSink> = if config.audit_enabled {
            Arc::new(FileAtomSink::new(&config.atom_trail_dir))
        } else {
            Arc::new(NullAtomSink)
        };
        Self::with_sink(config, sink)
    }

    /// Build an engine around an injected trail store.
    pub fn with_sink(config: EngineConfig, sink: Arc<dyn AtomSink>) -> Result<Self> {
        config.validate()?;

        let default_threshold = config.threshold()?;
        let analyzer = WaveAnalyzer::with_weights(config.weights.clone())
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let recorder = AtomTrailRecorder::new(sink);

        info!(
            threshold = default_threshold.value(),
            audit = config.audit_enabled,
            atom_dir = %config.atom_trail_dir.display(),
            "Coherence engine ready"
        );

        Ok(Self {
            sphinx: SphinxGateEvaluator::new(analyzer.clone(), recorder.clone()),
            bump: BumpValidator::new(recorder),
            analyzer,
            default_threshold,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every operation [`Self::dispatch`] accepts.
    pub fn operations() -> Vec<OperationInfo> {
        Operation::ALL.iter().map(Operation::info).collect()
    }

    /// Score content. An explicit threshold outside `[0, 100]` is rejected.
    pub fn score(&self, request: &ScoreRequest) -> Result<ScoreReport> {
        let threshold = match request.threshold {
            Some(t) => ScoreThreshold::new(t).map_err(|e| EngineError::InvalidInput(e.to_string()))?,
            None => self.default_threshold,
        };
        Ok(self.analyzer.analyze(&request.content, threshold))
    }

    /// Run the SPHINX gates and record the verdict.
    pub async fn evaluate_gates(&self, request: GateRequest) -> Result<SphinxResult> {
        let mut builder = ValidationRequest::builder()
            .content(request.content)
            .context(request.context)
            .mitigations(request.mitigations);
        if let Some(subject) = request.subject_ref {
            builder = builder.subject_ref(subject);
        }
        let validation = builder
            .build()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        Ok(self.sphinx.evaluate(&validation).await)
    }

    /// Verify a bump payload and record the check.
    pub async fn validate_bump(&self, payload: &BumpPayload) -> BumpResult {
        self.bump.validate_and_record(payload).await
    }

    /// The digest a sender should declare for `handoff`.
    pub fn context_hash(&self, handoff: &Value) -> String {
        context_hash_for(handoff)
    }

    /// Run the operation called `name` with JSON arguments.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        let operation: Operation = name.parse()?;
        debug!(operation = %operation, "Dispatching operation");

        let output = match operation {
            Operation::WaveAnalyze => {
                let request: ScoreRequest = parse_args(name, args)?;
                serde_json::to_value(self.score(&request)?)?
            }
            Operation::SphinxGate => {
                let request: GateRequest = parse_args(name, args)?;
                serde_json::to_value(self.evaluate_gates(request).await?)?
            }
            Operation::BumpValidate => {
                let payload: BumpPayload = parse_args(name, args)?;
                serde_json::to_value(self.validate_bump(&payload).await)?
            }
            Operation::ContextHash => {
                let request: ContextHashRequest = parse_args(name, args)?;
                serde_json::json!({ "contextHash": self.context_hash(&request.handoff) })
            }
        };

        Ok(output)
    }
}
