use std::sync::Arc;

use tracing::{debug, warn};

use crate::entry::{AtomEntry, AtomOutcome};
use crate::sink::{AtomSink, NullAtomSink};

/// Write path for the provenance trail.
///
/// Cloning is cheap; clones share the same sink. A failing sink is logged
/// and ignored so recording never changes the outcome of the decision being
/// recorded.
#[derive(Clone)]
pub struct AtomTrailRecorder {
    sink: Arc<dyn AtomSink>,
}

impl AtomTrailRecorder {
    pub fn new(sink: Arc<dyn AtomSink>) -> Self {
        Self { sink }
    }

    /// Recorder that drops every entry.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullAtomSink))
    }

    /// Record a decision with no separate rationale.
    pub async fn record<I, S, T, U>(
        &self,
        decision: &str,
        subjects: I,
        tags: T,
        outcome: AtomOutcome,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = U>,
        U: Into<String>,
    {
        let built = AtomEntry::builder()
            .decision(decision)
            .outcome(outcome)
            .subjects(subjects)
            .tags(tags)
            .build();

        match built {
            Ok(entry) => self.record_entry(entry).await,
            Err(e) => warn!(error = %e, decision, "Failed to build atom entry"),
        }
    }

    /// Append a fully built entry.
    pub async fn record_entry(&self, entry: AtomEntry) {
        match self.sink.append(&entry).await {
            Ok(()) => debug!(
                entry_id = %entry.id,
                outcome = %entry.outcome,
                decision = %entry.decision,
                "Atom entry recorded"
            ),
            Err(e) => warn!(
                entry_id = %entry.id,
                outcome = %entry.outcome,
                error = %e,
                "Failed to append atom entry, continuing without it"
            ),
        }
    }
}

impl std::fmt::Debug for AtomTrailRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomTrailRecorder").finish_non_exhaustive()
    }
}
