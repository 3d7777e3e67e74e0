//! The individual gate checks. Each is a pure function of the request and
//! the feature pass, returning its verdict with remediation hints.

use coherence_wave::{LexicalFeatures, ScoreReport, ScoreThreshold};
use lazy_static::lazy_static;
use regex::Regex;

use crate::request::ValidationRequest;
use crate::verdict::{Gate, GateVerdict};

/// Context length (trimmed, in chars) that satisfies origin without an identifier.
pub const MIN_CONTEXT_CHARS: usize = 20;

/// Comment lines over non-blank lines required by the intent gate.
pub const MIN_COMMENT_RATIO: f64 = 0.10;

/// Fixed composite floor for the coherence gate and the aggregate verdict.
pub const COHERENCE_FLOOR: ScoreThreshold = ScoreThreshold::DEFAULT;

/// Consistency sub-score required by the identity gate.
pub const MIN_CONSISTENCY: f64 = 50.0;

/// Callable units required by the identity gate.
pub const MIN_CALLABLE_UNITS: usize = 1;

/// Mitigations the passage gate recognises (matched case-insensitively).
pub const MITIGATION_ALLOW_LIST: &[&str] = &[
    "ASLR",
    "DEP",
    "NX",
    "STACK_CANARY",
    "CFI",
    "PIE",
    "RELRO",
    "FORTIFY_SOURCE",
    "SANDBOX",
    "SECCOMP",
    "W^X",
];

lazy_static! {
    /// CVE-YYYY-NNNN+, CWE-N+, GHSA-xxxx-xxxx-xxxx, ATOM-<TAG>-<YYYYMMDD>-<SEQ>
    static ref ORIGIN_IDENTIFIER: Regex = Regex::new(
        r"(?i)\b(?:CVE-\d{4}-\d{4,}|CWE-\d+|GHSA(?:-[0-9a-z]{4}){3}|ATOM-[0-9a-z]+-\d{8}-\d+)\b"
    )
    .expect("origin identifier pattern is valid");
}

/// A gate verdict plus the remediation hints for a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateCheck {
    pub verdict: GateVerdict,
    pub recommendations: Vec<String>,
}

impl GateCheck {
    fn pass(gate: Gate) -> Self {
        Self {
            verdict: GateVerdict::pass(gate),
            recommendations: Vec::new(),
        }
    }

    fn fail(gate: Gate, reason: String, recommendations: Vec<String>) -> Self {
        Self {
            verdict: GateVerdict::fail(gate, reason),
            recommendations,
        }
    }
}

/// First recognised identifier in `context`, if any.
pub fn origin_identifier(context: &str) -> Option<&str> {
    ORIGIN_IDENTIFIER.find(context).map(|m| m.as_str())
}

/// Whether `mitigation` is on the allow-list.
pub fn is_recognised_mitigation(mitigation: &str) -> bool {
    let candidate = mitigation.trim();
    MITIGATION_ALLOW_LIST
        .iter()
        .any(|known| known.eq_ignore_ascii_case(candidate))
}

pub fn check_origin(context: &str) -> GateCheck {
    if origin_identifier(context).is_some() {
        return GateCheck::pass(Gate::Origin);
    }

    let chars = context.trim().chars().count();
    if chars >= MIN_CONTEXT_CHARS {
        return GateCheck::pass(Gate::Origin);
    }

    GateCheck::fail(
        Gate::Origin,
        format!(
            "context has no recognised identifier and only {} of {} characters",
            chars, MIN_CONTEXT_CHARS
        ),
        vec![format!(
            "Cite an identifier (CVE-YYYY-NNNN, CWE-N, GHSA-xxxx-xxxx-xxxx, ATOM-TAG-YYYYMMDD-SEQ) \
             or describe the origin in at least {} characters (context has {})",
            MIN_CONTEXT_CHARS, chars
        )],
    )
}

pub fn check_intent(features: &LexicalFeatures) -> GateCheck {
    let ratio = features.comment_ratio();
    let ratio_ok = ratio >= MIN_COMMENT_RATIO;
    let marker_ok = features.has_intent_marker();

    if ratio_ok && marker_ok {
        return GateCheck::pass(Gate::Intent);
    }

    let mut problems = Vec::new();
    let mut recommendations = Vec::new();
    if !ratio_ok {
        problems.push(format!(
            "comment ratio {:.1}% is below {:.0}%",
            ratio * 100.0,
            MIN_COMMENT_RATIO * 100.0
        ));
        recommendations.push(format!(
            "Raise the comment ratio to at least {:.0}% (currently {:.1}%, {} of {} non-blank lines)",
            MIN_COMMENT_RATIO * 100.0,
            ratio * 100.0,
            features.comment_lines,
            features.nonblank_lines()
        ));
    }
    if !marker_ok {
        problems.push("no intent marker".to_string());
        recommendations.push(
            "Add an intent comment such as `// @intent: <purpose>` (0 intent markers found)"
                .to_string(),
        );
    }

    GateCheck::fail(Gate::Intent, problems.join("; "), recommendations)
}

pub fn check_coherence(report: &ScoreReport) -> GateCheck {
    let floor = COHERENCE_FLOOR.value();
    if report.overall >= floor {
        return GateCheck::pass(Gate::Coherence);
    }

    let mut recommendations = vec![format!(
        "Raise the overall coherence score to at least {:.0} (currently {:.1})",
        floor, report.overall
    )];
    if let Some(worst) = report.violations.first() {
        recommendations.push(format!(
            "Start with the {} score ({:.1}, severity {})",
            worst.metric, worst.value, worst.severity
        ));
    }

    GateCheck::fail(
        Gate::Coherence,
        format!("overall score {:.1} is below {:.0}", report.overall, floor),
        recommendations,
    )
}

pub fn check_identity(features: &LexicalFeatures, report: &ScoreReport) -> GateCheck {
    let units = features.callable_units.len();
    let unbalanced = features.delimiters.unbalanced();

    let mut problems = Vec::new();
    let mut recommendations = Vec::new();

    if units < MIN_CALLABLE_UNITS {
        problems.push(format!("{} callable units", units));
        recommendations.push(format!(
            "Define at least {} named callable unit (found {})",
            MIN_CALLABLE_UNITS, units
        ));
    }
    if report.consistency < MIN_CONSISTENCY {
        problems.push(format!(
            "consistency {:.1} is below {:.0}",
            report.consistency, MIN_CONSISTENCY
        ));
        recommendations.push(format!(
            "Use descriptive identifiers longer than 2 characters (consistency {:.1}, {} of {} too short)",
            report.consistency,
            report.features.short_identifiers,
            report.features.identifiers
        ));
    }
    if !unbalanced.is_empty() {
        problems.push(format!("unbalanced delimiters: {}", unbalanced.join(", ")));
        recommendations.push(format!("Balance delimiters: {}", unbalanced.join(", ")));
    }

    if problems.is_empty() {
        GateCheck::pass(Gate::Identity)
    } else {
        GateCheck::fail(Gate::Identity, problems.join("; "), recommendations)
    }
}

pub fn check_passage(request: &ValidationRequest) -> GateCheck {
    let declared = request.declared_mitigations();
    if declared.is_empty() {
        return GateCheck::pass(Gate::Passage);
    }

    let recognised = declared.iter().any(|m| is_recognised_mitigation(m));
    let has_subject = request.subject_ref().is_some();
    if recognised && has_subject {
        return GateCheck::pass(Gate::Passage);
    }

    let listed = declared.iter().cloned().collect::<Vec<_>>().join(", ");
    let mut problems = Vec::new();
    let mut recommendations = Vec::new();

    if !recognised {
        problems.push(format!("no recognised mitigation among [{}]", listed));
        recommendations.push(format!(
            "Declare at least one recognised mitigation ({}); declared: {}",
            MITIGATION_ALLOW_LIST.join(", "),
            listed
        ));
    }
    if !has_subject {
        problems.push("no subject reference".to_string());
        recommendations.push(format!(
            "Name the binary or artifact the {} declared mitigation(s) apply to",
            declared.len()
        ));
    }

    GateCheck::fail(Gate::Passage, problems.join("; "), recommendations)
}
