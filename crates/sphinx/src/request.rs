use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::SphinxError;

/// Input to the gate evaluator. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    content: String,
    context: String,
    declared_mitigations: BTreeSet<String>,
    subject_ref: Option<String>,
}

impl ValidationRequest {
    pub fn builder() -> ValidationRequestBuilder {
        ValidationRequestBuilder::default()
    }

    /// Text or code under evaluation
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Free-text description of where the content comes from
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Declared mitigations, trimmed and deduplicated
    pub fn declared_mitigations(&self) -> &BTreeSet<String> {
        &self.declared_mitigations
    }

    pub fn subject_ref(&self) -> Option<&str> {
        self.subject_ref.as_deref()
    }
}

/// Builder for [`ValidationRequest`].
#[derive(Debug, Default)]
pub struct ValidationRequestBuilder {
    content: Option<String>,
    context: Option<String>,
    declared_mitigations: BTreeSet<String>,
    subject_ref: Option<String>,
}

impl ValidationRequestBuilder {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Declare one mitigation. Blank names are ignored.
    pub fn mitigation(mut self, mitigation: impl Into<String>) -> Self {
        let mitigation = mitigation.into();
        let trimmed = mitigation.trim();
        if !trimmed.is_empty() {
            self.declared_mitigations.insert(trimmed.to_string());
        }
        self
    }

    pub fn mitigations<I, S>(self, mitigations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        mitigations.into_iter().fold(self, |b, m| b.mitigation(m))
    }

    /// Artifact the mitigations apply to. Blank references count as absent.
    pub fn subject_ref(mut self, subject_ref: impl Into<String>) -> Self {
        let subject_ref = subject_ref.into();
        self.subject_ref = if subject_ref.trim().is_empty() {
            None
        } else {
            Some(subject_ref)
        };
        self
    }

    pub fn build(self) -> Result<ValidationRequest, SphinxError> {
        Ok(ValidationRequest {
            content: self.content.ok_or(SphinxError::MissingField("content"))?,
            context: self.context.ok_or(SphinxError::MissingField("context"))?,
            declared_mitigations: self.declared_mitigations,
            subject_ref: self.subject_ref,
        })
    }
}
