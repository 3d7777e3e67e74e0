use coherence_atom::{AtomEntry, AtomOutcome, AtomTrailRecorder};
use coherence_wave::{LexicalFeatures, WaveAnalyzer};
use tracing::{info, warn};

use crate::gates::{self, GateCheck, COHERENCE_FLOOR};
use crate::request::ValidationRequest;
use crate::verdict::{Gate, GateVerdict, SphinxResult};

/// Decision label written to the ATOM trail for every evaluation.
pub const SPHINX_DECISION: &str = "sphinx gate evaluation";

/// Runs the five gates and records the verdict.
#[derive(Clone, Debug)]
pub struct SphinxGateEvaluator {
    analyzer: WaveAnalyzer,
    recorder: AtomTrailRecorder,
}

impl SphinxGateEvaluator {
    pub fn new(analyzer: WaveAnalyzer, recorder: AtomTrailRecorder) -> Self {
        Self { analyzer, recorder }
    }

    /// Evaluator with the default analyzer weights.
    pub fn with_recorder(recorder: AtomTrailRecorder) -> Self {
        Self::new(WaveAnalyzer::new(), recorder)
    }

    /// Evaluate the gates, then append one PASS/FAIL entry to the trail.
    ///
    /// The returned result is the same whether or not the append succeeds.
    pub async fn evaluate(&self, request: &ValidationRequest) -> SphinxResult {
        let result = self.judge(request);
        if let Some(entry) = self.trail_entry(request, &result) {
            self.recorder.record_entry(entry).await;
        }
        result
    }

    /// Evaluate the gates without touching the trail.
    pub fn judge(&self, request: &ValidationRequest) -> SphinxResult {
        let features = LexicalFeatures::extract(request.content());
        let score = self.analyzer.analyze_features(&features, COHERENCE_FLOOR);

        let checks: [GateCheck; 5] = [
            gates::check_origin(request.context()),
            gates::check_intent(&features),
            gates::check_coherence(&score),
            gates::check_identity(&features, &score),
            gates::check_passage(request),
        ];

        let mut verdicts = Vec::with_capacity(checks.len());
        let mut recommendations = Vec::new();
        for check in checks {
            recommendations.extend(check.recommendations);
            verdicts.push(check.verdict);
        }

        let failed_gate_names: Vec<String> = verdicts
            .iter()
            .filter(|v| !v.passed)
            .map(|v| v.gate.to_string())
            .collect();
        let passed = Self::aggregate(&verdicts, score.overall);

        info!(
            passed,
            overall = score.overall,
            failed = ?failed_gate_names,
            "SPHINX gates evaluated"
        );

        SphinxResult {
            gates: verdicts,
            passed,
            failed_gate_names,
            recommendations,
            score,
        }
    }

    /// The aggregate verdict: every gate has a passing verdict and the
    /// composite reaches the floor. A missing gate counts as a failure.
    pub fn aggregate(gates: &[GateVerdict], overall: f64) -> bool {
        let all_present = Gate::ALL
            .iter()
            .all(|gate| gates.iter().any(|v| v.gate == *gate));
        all_present && gates.iter().all(|v| v.passed) && overall >= COHERENCE_FLOOR.value()
    }

    fn trail_entry(&self, request: &ValidationRequest, result: &SphinxResult) -> Option<AtomEntry> {
        let rationale = if result.passed {
            format!("all gates passed; overall {:.2}", result.score.overall)
        } else {
            format!(
                "failed gates: {}; overall {:.2}",
                result.failed_gate_names.join(", "),
                result.score.overall
            )
        };

        let built = AtomEntry::builder()
            .decision(SPHINX_DECISION)
            .rationale(rationale)
            .outcome(AtomOutcome::from_verdict(result.passed))
            .subjects(request.subject_ref())
            .tags(["sphinx", "gate"])
            .build();

        match built {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Failed to build SPHINX trail entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use coherence_atom::{AtomError, AtomSink, MemoryAtomSink};

    use super::*;

    const DOCUMENTED: &str = r#"// @intent: compute the checksum of a buffer
// @see https://example.com/checksum
/// Rationale: wrapping add keeps the checksum total.
fn checksum(buffer: &[u8]) -> u32 {
    let mut total = 0u32;
    for byte in buffer {
        total = total.wrapping_add(*byte as u32);
    }
    total
}
"#;

    struct FailingSink;

    #[async_trait]
    impl AtomSink for FailingSink {
        async fn append(&self, _entry: &AtomEntry) -> Result<(), AtomError> {
            Err(AtomError::Unavailable("read-only filesystem".into()))
        }
    }

    fn request(content: &str) -> ValidationRequest {
        ValidationRequest::builder()
            .content(content)
            .context("CVE-2024-12345")
            .build()
            .unwrap()
    }

    fn evaluator() -> (SphinxGateEvaluator, Arc<MemoryAtomSink>) {
        let sink = Arc::new(MemoryAtomSink::new());
        let evaluator = SphinxGateEvaluator::with_recorder(AtomTrailRecorder::new(sink.clone()));
        (evaluator, sink)
    }

    #[tokio::test]
    async fn test_documented_code_passes_all_gates() {
        let (evaluator, sink) = evaluator();
        let result = evaluator.evaluate(&request(DOCUMENTED)).await;

        assert!(result.passed, "{:?}", result.recommendations);
        assert!(result.failed_gate_names.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.gates.len(), 5);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, AtomOutcome::Pass);
        assert_eq!(entries[0].decision, SPHINX_DECISION);
        assert!(entries[0].tags.contains("sphinx"));
    }

    #[tokio::test]
    async fn test_failed_evaluation_records_fail() {
        let (evaluator, sink) = evaluator();
        let req = ValidationRequest::builder()
            .content("hello world")
            .context("short")
            .mitigation("ASLR")
            .subject_ref("/usr/bin/target")
            .build()
            .unwrap();
        let result = evaluator.evaluate(&req).await;

        assert!(!result.passed);
        assert_eq!(
            result.failed_gate_names,
            vec!["origin", "intent", "coherence", "identity"]
        );

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, AtomOutcome::Fail);
        assert_eq!(entries[0].subjects, vec!["/usr/bin/target"]);
        assert!(entries[0].rationale.contains("origin, intent"));
    }

    #[tokio::test]
    async fn test_recommendations_follow_gate_order() {
        let (evaluator, _) = evaluator();
        let result = evaluator.evaluate(&request("hello world")).await;

        let intent = result
            .recommendations
            .iter()
            .position(|r| r.contains("comment ratio"))
            .unwrap();
        let coherence = result
            .recommendations
            .iter()
            .position(|r| r.contains("overall coherence"))
            .unwrap();
        let identity = result
            .recommendations
            .iter()
            .position(|r| r.contains("callable unit"))
            .unwrap();
        assert!(intent < coherence && coherence < identity);
    }

    #[tokio::test]
    async fn test_trail_failure_does_not_change_result() {
        let failing =
            SphinxGateEvaluator::with_recorder(AtomTrailRecorder::new(Arc::new(FailingSink)));
        let (working, _) = evaluator();

        for content in [DOCUMENTED, "hello world", ""] {
            let req = request(content);
            let a = failing.evaluate(&req).await;
            let b = working.evaluate(&req).await;
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_judge_matches_aggregate() {
        let (evaluator, sink) = evaluator();
        let result = evaluator.judge(&request(DOCUMENTED));
        assert_eq!(
            result.passed,
            SphinxGateEvaluator::aggregate(&result.gates, result.score.overall)
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_aggregate_is_and_of_every_gate_and_floor() {
        for mask in 0u32..(1 << Gate::ALL.len()) {
            let gates: Vec<GateVerdict> = Gate::ALL
                .iter()
                .enumerate()
                .map(|(bit, gate)| {
                    if mask & (1 << bit) != 0 {
                        GateVerdict::pass(*gate)
                    } else {
                        GateVerdict::fail(*gate, "failed")
                    }
                })
                .collect();
            let all_pass = mask == (1 << Gate::ALL.len()) - 1;

            for overall in [0.0, 59.99, 60.0, 60.01, 100.0] {
                let expected = all_pass && overall >= 60.0;
                assert_eq!(
                    SphinxGateEvaluator::aggregate(&gates, overall),
                    expected,
                    "mask={:05b} overall={}",
                    mask,
                    overall
                );
            }
        }
    }

    #[test]
    fn test_aggregate_is_fail_closed() {
        let all_pass: Vec<GateVerdict> = Gate::ALL.iter().map(|g| GateVerdict::pass(*g)).collect();
        for missing in 0..all_pass.len() {
            let mut partial = all_pass.clone();
            partial.remove(missing);
            assert!(!SphinxGateEvaluator::aggregate(&partial, 100.0));
        }
        assert!(!SphinxGateEvaluator::aggregate(&[], 100.0));
    }

    #[test]
    fn test_unbalanced_dereference_fails_identity() {
        let (evaluator, _) = evaluator();
        let content = "// @intent: bump the counter\nfn bump_counter(counter: &mut u32) {\n    *counter = (*counter + 1;\n}\n";
        let result = evaluator.judge(&request(content));

        let identity = result.verdict(Gate::Identity).unwrap();
        assert!(!identity.passed);
        assert!(identity.reason.as_deref().unwrap().contains("()"));
        assert!(!result.passed);
    }
}
