//! Remote collaborator adapter.
//!
//! The engine can forward results to a remote service (health, status and
//! deploy calls). The adapter is capability-gated: without an endpoint and a
//! token it reports [`CollaboratorStatus::Unavailable`] and never reaches
//! the transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RemoteApiConfig;
use crate::error::EngineError;

/// A call to the remote collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "lowercase")]
pub enum RemoteCall {
    Health,
    Status,
    Deploy { artifact: String },
}

/// Outcome of a collaborator call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CollaboratorStatus {
    Available { response: Value },
    Unavailable { reason: String },
    Failed { error: String },
}

impl CollaboratorStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Wire transport used once the adapter is configured.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn send(&self, endpoint: &str, token: &str, call: &RemoteCall) -> Result<Value, EngineError>;
}

/// Transport for builds without an HTTP client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

#[async_trait]
impl RemoteTransport for NoopTransport {
    async fn send(&self, _endpoint: &str, _token: &str, _call: &RemoteCall) -> Result<Value, EngineError> {
        Err(EngineError::Unavailable(
            "no remote transport is installed in this build".into(),
        ))
    }
}

/// Remote collaborator interface.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn health(&self) -> CollaboratorStatus;

    async fn status(&self) -> CollaboratorStatus;

    async fn deploy(&self, artifact: &str) -> CollaboratorStatus;
}

/// [`RemoteApi`] that only calls out when an endpoint and token are set.
#[derive(Clone)]
pub struct GatedRemoteApi {
    config: RemoteApiConfig,
    transport: Arc<dyn RemoteTransport>,
}

impl GatedRemoteApi {
    pub fn new(config: RemoteApiConfig) -> Self {
        Self::with_transport(config, Arc::new(NoopTransport))
    }

    pub fn with_transport(config: RemoteApiConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        Self { config, transport }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn call(&self, call: RemoteCall) -> CollaboratorStatus {
        let (endpoint, token) = match (&self.config.endpoint, &self.config.token) {
            (Some(endpoint), Some(token)) if self.config.is_configured() => (endpoint, token),
            _ => {
                let reason = format!(
                    "remote API not configured: set {}",
                    self.config.missing().join(" and ")
                );
                debug!(?call, %reason, "Skipping remote call");
                return CollaboratorStatus::Unavailable { reason };
            }
        };

        match self.transport.send(endpoint, token, &call).await {
            Ok(response) => CollaboratorStatus::Available { response },
            Err(EngineError::Unavailable(reason)) => CollaboratorStatus::Unavailable { reason },
            Err(e) => {
                warn!(?call, error = %e, "Remote call failed");
                CollaboratorStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl RemoteApi for GatedRemoteApi {
    async fn health(&self) -> CollaboratorStatus {
        self.call(RemoteCall::Health).await
    }

    async fn status(&self) -> CollaboratorStatus {
        self.call(RemoteCall::Status).await
    }

    async fn deploy(&self, artifact: &str) -> CollaboratorStatus {
        self.call(RemoteCall::Deploy {
            artifact: artifact.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteTransport for CountingTransport {
        async fn send(&self, endpoint: &str, _token: &str, call: &RemoteCall) -> Result<Value, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match call {
                RemoteCall::Deploy { artifact } if artifact == "broken" => {
                    Err(EngineError::InvalidInput("rejected".into()))
                }
                _ => Ok(json!({"endpoint": endpoint, "ok": true})),
            }
        }
    }

    fn configured() -> RemoteApiConfig {
        RemoteApiConfig {
            endpoint: Some("https://api.example.com".into()),
            token: Some("token".into()),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_never_calls_transport() {
        let transport = Arc::new(CountingTransport::default());
        let api = GatedRemoteApi::with_transport(RemoteApiConfig::default(), transport.clone());

        for status in [api.health().await, api.status().await, api.deploy("build-1").await] {
            match status {
                CollaboratorStatus::Unavailable { reason } => {
                    assert!(reason.contains("COHERENCE_API_URL"));
                    assert!(reason.contains("COHERENCE_API_TOKEN"));
                }
                other => panic!("expected unavailable, got {:?}", other),
            }
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_configured_uses_transport() {
        let transport = Arc::new(CountingTransport::default());
        let api = GatedRemoteApi::with_transport(configured(), transport.clone());

        let status = api.health().await;
        assert!(status.is_available());
        assert!(matches!(
            api.deploy("broken").await,
            CollaboratorStatus::Failed { .. }
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_noop_transport_reports_unavailable() {
        let api = GatedRemoteApi::new(configured());
        assert!(api.is_configured());
        assert!(matches!(
            api.status().await,
            CollaboratorStatus::Unavailable { .. }
        ));
    }

    #[test]
    fn test_status_wire_shape() {
        let status = CollaboratorStatus::Unavailable {
            reason: "offline".into(),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"status": "unavailable", "reason": "offline"})
        );
    }
}
