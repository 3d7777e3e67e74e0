//! ATOM entry types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AtomError;

/// Outcome of a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AtomOutcome {
    Pass,
    Fail,
    Verify,
    Init,
}

impl std::fmt::Display for AtomOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
            Self::Verify => write!(f, "VERIFY"),
            Self::Init => write!(f, "INIT"),
        }
    }
}

impl AtomOutcome {
    /// `Pass` when `passed`, otherwise `Fail`.
    pub fn from_verdict(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// A single provenance record.
///
/// Serialized as one JSON object per line; the timestamp is RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// Time the entry was built, immediately before it is appended
    pub timestamp: DateTime<Utc>,

    pub decision: String,

    pub rationale: String,

    pub outcome: AtomOutcome,

    /// Artifacts the decision is about, in caller order
    pub subjects: Vec<String>,

    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl AtomEntry {
    /// Create a new entry builder
    pub fn builder() -> AtomEntryBuilder {
        AtomEntryBuilder::new()
    }
}

/// Builder for ATOM entries
#[derive(Debug, Default)]
pub struct AtomEntryBuilder {
    decision: Option<String>,
    rationale: String,
    outcome: Option<AtomOutcome>,
    subjects: Vec<String>,
    tags: BTreeSet<String>,
}

impl AtomEntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn outcome(mut self, outcome: AtomOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    pub fn subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects.extend(subjects.into_iter().map(Into::into));
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Build the entry with a fresh id and timestamp.
    pub fn build(self) -> Result<AtomEntry, AtomError> {
        Ok(AtomEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            decision: self.decision.ok_or(AtomError::MissingField("decision"))?,
            rationale: self.rationale,
            outcome: self.outcome.ok_or(AtomError::MissingField("outcome"))?,
            subjects: self.subjects,
            tags: self.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&AtomOutcome::Verify).unwrap(), "\"VERIFY\"");
        let back: AtomOutcome = serde_json::from_str("\"INIT\"").unwrap();
        assert_eq!(back, AtomOutcome::Init);
        assert_eq!(AtomOutcome::from_verdict(true), AtomOutcome::Pass);
        assert_eq!(AtomOutcome::from_verdict(false).to_string(), "FAIL");
    }

    #[test]
    fn builder_requires_decision_and_outcome() {
        let missing_decision = AtomEntry::builder().outcome(AtomOutcome::Init).build();
        assert!(matches!(
            missing_decision,
            Err(AtomError::MissingField("decision"))
        ));

        let missing_outcome = AtomEntry::builder().decision("x").build();
        assert!(matches!(missing_outcome, Err(AtomError::MissingField("outcome"))));
    }

    #[test]
    fn builder_collects_subjects_in_order_and_tags_as_set() {
        let entry = AtomEntry::builder()
            .decision("sphinx gate evaluation")
            .rationale("all gates passed")
            .outcome(AtomOutcome::Pass)
            .subject("b.rs")
            .subjects(["a.rs"])
            .tags(["sphinx", "gate", "sphinx"])
            .build()
            .unwrap();

        assert_eq!(entry.subjects, vec!["b.rs", "a.rs"]);
        assert_eq!(entry.tags.len(), 2);
        assert_eq!(entry.tags.iter().next().map(String::as_str), Some("gate"));
    }

    #[test]
    fn entries_get_fresh_ids() {
        let build = || {
            AtomEntry::builder()
                .decision("init")
                .outcome(AtomOutcome::Init)
                .build()
                .unwrap()
        };
        assert_ne!(build().id, build().id);
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let entry = AtomEntry::builder()
            .decision("d")
            .outcome(AtomOutcome::Init)
            .build()
            .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["outcome"], "INIT");
    }
}
