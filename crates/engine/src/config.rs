//! Engine configuration

use std::path::{Path, PathBuf};

use coherence_wave::{ScoreThreshold, ScoreWeights};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Directory holding `atom-trail.jsonl`.
pub const ENV_ATOM_DIR: &str = "COHERENCE_ATOM_DIR";
/// Default threshold for scoring calls that omit one.
pub const ENV_THRESHOLD: &str = "COHERENCE_THRESHOLD";
/// `true`/`false` switch for the ATOM trail.
pub const ENV_AUDIT: &str = "COHERENCE_AUDIT";
pub const ENV_API_URL: &str = "COHERENCE_API_URL";
pub const ENV_API_TOKEN: &str = "COHERENCE_API_TOKEN";

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Threshold applied when a scoring call does not name one
    #[serde(default = "default_threshold")]
    pub score_threshold: f64,

    /// Sub-metric weights of the composite score
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Directory of the ATOM trail
    #[serde(default = "default_atom_trail_dir")]
    pub atom_trail_dir: PathBuf,

    /// Write gate and bump decisions to the trail
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Remote collaborator endpoint
    #[serde(default)]
    pub remote: RemoteApiConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_threshold(),
            weights: ScoreWeights::default(),
            atom_trail_dir: default_atom_trail_dir(),
            audit_enabled: true,
            remote: RemoteApiConfig::default(),
        }
    }
}

/// Remote collaborator configuration. Both fields are needed before any
/// remote call is attempted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApiConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub token: Option<String>,
}

impl RemoteApiConfig {
    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }

    /// Environment variables still needed, in a fixed order.
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.endpoint) {
            missing.push(ENV_API_URL);
        }
        if blank(&self.token) {
            missing.push(ENV_API_TOKEN);
        }
        missing
    }
}

impl std::fmt::Debug for RemoteApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteApiConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// Default value helpers
fn default_threshold() -> f64 {
    ScoreThreshold::DEFAULT.value()
}

fn default_atom_trail_dir() -> PathBuf {
    PathBuf::from(".atom-trail")
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// Defaults overridden by `COHERENCE_*` environment variables.
    pub fn from_env() -> Result<Self, EngineError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults, an optional file, then the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let mut config: EngineConfig = builder.build()?.try_deserialize()?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value. Unset variables leave the field untouched.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_ATOM_DIR).filter(|v| !v.trim().is_empty()) {
            self.atom_trail_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_THRESHOLD) {
            self.score_threshold = raw.trim().parse().map_err(|_| {
                EngineError::Config(format!("{} must be a number, got {:?}", ENV_THRESHOLD, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_AUDIT) {
            self.audit_enabled = parse_switch(&raw).ok_or_else(|| {
                EngineError::Config(format!("{} must be true or false, got {:?}", ENV_AUDIT, raw))
            })?;
        }

        if let Some(url) = lookup(ENV_API_URL) {
            self.remote.endpoint = Some(url);
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.remote.token = Some(token);
        }

        Ok(())
    }

    /// Reject an out-of-range threshold, unusable weights, or an empty trail
    /// directory while auditing is on.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.threshold()?;
        self.weights
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        if self.audit_enabled && self.atom_trail_dir.as_os_str().is_empty() {
            return Err(EngineError::Config(
                "atom_trail_dir must be set when auditing is enabled".into(),
            ));
        }
        Ok(())
    }

    /// The configured default threshold.
    pub fn threshold(&self) -> Result<ScoreThreshold, EngineError> {
        ScoreThreshold::new(self.score_threshold).map_err(|e| EngineError::Config(e.to_string()))
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
