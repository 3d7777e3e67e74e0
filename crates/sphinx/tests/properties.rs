//! Property tests: the aggregate verdict is the AND of the gates and the
//! coherence floor, and unbalanced delimiters always fail identity.

use coherence_atom::AtomTrailRecorder;
use coherence_sphinx::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "fn [a-z_]{3,10}\\(\\) \\{ \\}",
        "let [a-z]{1,8} = [0-9]{1,3};",
        "\\*[a-z]{1,8} = \\([a-z]{1,8} \\* 2\\);",
        "let [a-z]{1,8} = 1; /\\* [a-z]{0,8} \\( \\*/",
        "// [a-z ]{0,30}",
        "// @intent: [a-z ]{0,20}",
        Just(String::new()),
    ]
}

/// Sources whose delimiters are balanced line by line.
fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..30).prop_map(|lines| lines.join("\n"))
}

fn arb_context() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CVE-2024-12345".to_string()),
        Just("CWE-787".to_string()),
        "[a-z ]{0,40}",
    ]
}

fn arb_mitigations() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![Just("ASLR".to_string()), Just("nx".to_string()), "[a-z]{1,6}"],
        0..3,
    )
}

fn arb_request() -> impl Strategy<Value = ValidationRequest> {
    (
        arb_source(),
        arb_context(),
        arb_mitigations(),
        prop::option::of("/[a-z]{1,8}"),
    )
        .prop_map(|(content, context, mitigations, subject)| {
            let mut builder = ValidationRequest::builder()
                .content(content)
                .context(context)
                .mitigations(mitigations);
            if let Some(subject) = subject {
                builder = builder.subject_ref(subject);
            }
            builder.build().unwrap()
        })
}

fn evaluator() -> SphinxGateEvaluator {
    SphinxGateEvaluator::with_recorder(AtomTrailRecorder::disabled())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// `passed` holds exactly when every gate passes and overall >= 60.
    #[test]
    fn passed_is_and_of_gates(req in arb_request()) {
        let result = evaluator().judge(&req);
        let expected = result.gates.iter().all(|g| g.passed)
            && result.score.overall >= COHERENCE_FLOOR.value();
        prop_assert_eq!(result.passed, expected);
        prop_assert_eq!(result.gates.len(), 5);

        let order: Vec<Gate> = result.gates.iter().map(|g| g.gate).collect();
        prop_assert_eq!(order, Gate::ALL.to_vec());
    }

    /// Failed gate names list exactly the failing verdicts, in gate order,
    /// and every failure contributes at least one recommendation.
    #[test]
    fn failures_are_explained(req in arb_request()) {
        let result = evaluator().judge(&req);
        let failing: Vec<String> = result
            .gates
            .iter()
            .filter(|g| !g.passed)
            .map(|g| g.gate.to_string())
            .collect();
        prop_assert_eq!(&result.failed_gate_names, &failing);
        prop_assert!(result.recommendations.len() >= failing.len());
        for verdict in &result.gates {
            prop_assert_eq!(verdict.passed, verdict.reason.is_none());
        }
    }

    /// An extra unmatched opener always fails identity, and with it the
    /// aggregate verdict.
    #[test]
    fn unbalanced_delimiters_fail_identity(
        src in arb_source(),
        opener in prop_oneof![Just('('), Just('['), Just('{')],
        lead in prop_oneof![Just("let dangling"), Just("*dangling")],
    ) {
        let content = format!("fn padded_unit() {{ }}\n{}\n{} = {};", src, lead, opener);
        let req = ValidationRequest::builder()
            .content(content)
            .context("CVE-2024-12345")
            .build()
            .unwrap();
        let result = evaluator().judge(&req);

        let identity = result.verdict(Gate::Identity).unwrap();
        prop_assert!(!identity.passed);
        prop_assert!(!result.passed);
        prop_assert!(result.failed_gate_names.contains(&"identity".to_string()));
    }
}
