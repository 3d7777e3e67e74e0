use coherence_wave::ScoreReport;
use serde::{Deserialize, Serialize};

/// The five gates, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    Origin,
    Intent,
    Coherence,
    Identity,
    Passage,
}

impl Gate {
    pub const ALL: [Gate; 5] = [
        Gate::Origin,
        Gate::Intent,
        Gate::Coherence,
        Gate::Identity,
        Gate::Passage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Intent => "intent",
            Self::Coherence => "coherence",
            Self::Identity => "identity",
            Self::Passage => "passage",
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub gate: Gate,
    pub passed: bool,
    /// Why the gate failed; absent on pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GateVerdict {
    pub fn pass(gate: Gate) -> Self {
        Self {
            gate,
            passed: true,
            reason: None,
        }
    }

    pub fn fail(gate: Gate, reason: impl Into<String>) -> Self {
        Self {
            gate,
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Aggregate result of all five gates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SphinxResult {
    /// One verdict per gate, in [`Gate::ALL`] order.
    pub gates: Vec<GateVerdict>,
    pub passed: bool,
    pub failed_gate_names: Vec<String>,
    /// Remediation hints, grouped gate by gate in evaluation order.
    pub recommendations: Vec<String>,
    pub score: ScoreReport,
}

impl SphinxResult {
    pub fn verdict(&self, gate: Gate) -> Option<&GateVerdict> {
        self.gates.iter().find(|v| v.gate == gate)
    }
}
