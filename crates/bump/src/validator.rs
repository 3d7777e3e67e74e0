use coherence_atom::{AtomEntry, AtomOutcome, AtomTrailRecorder};
use tracing::{info, warn};

use crate::canonical::{context_hash_for, is_sha256_hex};
use crate::payload::{BumpChecks, BumpPayload, BumpResult, BumpStatus};

/// Decision label written to the ATOM trail for every recorded validation.
pub const BUMP_DECISION: &str = "bump handoff validation";

/// Verifies declared handoff digests.
#[derive(Clone, Debug)]
pub struct BumpValidator {
    recorder: AtomTrailRecorder,
}

impl Default for BumpValidator {
    fn default() -> Self {
        Self::new(AtomTrailRecorder::disabled())
    }
}

impl BumpValidator {
    pub fn new(recorder: AtomTrailRecorder) -> Self {
        Self { recorder }
    }

    /// Check the payload and itemise every problem. Pure.
    pub fn validate(&self, payload: &BumpPayload) -> BumpResult {
        let mut errors = Vec::new();

        if payload.session_id.trim().is_empty() {
            errors.push("sessionId must not be empty".to_string());
        }
        if payload.integrity_proof.trim().is_empty() {
            errors.push("integrityProof must not be empty".to_string());
        }

        let declared = payload.context_hash.trim();
        let computed = context_hash_for(&payload.handoff);
        let hash_ok = if !is_sha256_hex(declared) {
            errors.push(format!(
                "contextHash must be 64 hexadecimal characters, got {} characters",
                declared.chars().count()
            ));
            false
        } else if declared.eq_ignore_ascii_case(&computed) {
            true
        } else {
            errors.push(format!(
                "contextHash mismatch: declared {}, computed {}",
                declared.to_ascii_lowercase(),
                computed
            ));
            false
        };

        let status = if errors.is_empty() && hash_ok {
            BumpStatus::Ok
        } else {
            BumpStatus::Invalid
        };

        BumpResult {
            status,
            errors,
            checks: BumpChecks { hash_ok },
        }
    }

    /// Validate, then append one VERIFY entry to the trail.
    pub async fn validate_and_record(&self, payload: &BumpPayload) -> BumpResult {
        let result = self.validate(payload);

        info!(
            session_id = %payload.session_id,
            status = %result.status,
            hash_ok = result.checks.hash_ok,
            errors = result.errors.len(),
            "Bump payload validated"
        );

        let rationale = if result.errors.is_empty() {
            result.status.to_string()
        } else {
            format!("{}: {}", result.status, result.errors.join("; "))
        };
        let built = AtomEntry::builder()
            .decision(BUMP_DECISION)
            .rationale(rationale)
            .outcome(AtomOutcome::Verify)
            .subject(payload.session_id.clone())
            .tag("bump")
            .build();

        match built {
            Ok(entry) => self.recorder.record_entry(entry).await,
            Err(e) => warn!(error = %e, "Failed to build bump trail entry"),
        }

        result
    }
}
