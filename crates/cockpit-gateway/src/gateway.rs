use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use cockpit_agents::{
    AgentRegistry, EvidenceEntry, EvidenceSink, JsonlEvidenceLog, NoopEvidence,
    RemoteGatewayClient,
};
use cockpit_common::{AgentId, InvocationError, InvocationRequest, InvocationResult, Result};
use cockpit_config::AppConfig;
use serde::Serialize;
use tracing::{info, warn};

use crate::backend::{AgentBackend, GatewayMode, LocalBackend, RemoteBackend};

const SERVICE_NAME: &str = "green-hill-cockpit";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub mode: GatewayMode,
}

/// Single entry point for agent invocation, bound to one backend for its
/// whole lifetime.
pub struct Gateway {
    backend: Arc<dyn AgentBackend>,
    evidence: Arc<dyn EvidenceSink>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            backend,
            evidence: Arc::new(NoopEvidence),
        }
    }

    /// Choose the mode from configuration: a non-blank remote base URL
    /// binds to the remote orchestrator, otherwise `registry` is used.
    pub fn from_config(config: &AppConfig, registry: AgentRegistry) -> Result<Self> {
        let backend: Arc<dyn AgentBackend> = if config.remote.is_configured() {
            let client = RemoteGatewayClient::new(&config.remote)?;
            info!("gateway mode: remote ({})", client.base_url());
            Arc::new(RemoteBackend::new(client))
        } else {
            info!("gateway mode: local ({} agents)", registry.len());
            Arc::new(LocalBackend::new(registry))
        };

        let mut gateway = Self::new(backend);
        if let Some(path) = &config.evidence_log {
            info!("evidence log: {}", path.display());
            gateway = gateway.with_evidence(Arc::new(JsonlEvidenceLog::new(path.clone())));
        }
        Ok(gateway)
    }

    pub fn with_evidence(mut self, evidence: Arc<dyn EvidenceSink>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn mode(&self) -> GatewayMode {
        self.backend.mode()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus { status: "ok" }
    }

    pub fn version(&self) -> VersionInfo {
        VersionInfo {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            mode: self.mode(),
        }
    }

    pub async fn list_agents(&self) -> std::result::Result<Vec<AgentId>, InvocationError> {
        self.backend.list_agents().await
    }

    pub async fn invoke(&self, agent_id: AgentId, request: InvocationRequest) -> InvocationResult {
        let started = Instant::now();
        let outcome = self.backend.invoke(&agent_id, &request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => info!(
                agent = %agent_id,
                mode = %self.mode(),
                elapsed_ms,
                "invocation succeeded"
            ),
            Err(err) => warn!(
                agent = %agent_id,
                mode = %self.mode(),
                kind = %err.kind,
                elapsed_ms,
                "invocation failed: {}",
                err.detail
            ),
        }

        self.record_evidence(&agent_id, &request, &outcome).await;
        InvocationResult::from_outcome(agent_id, outcome)
    }

    async fn record_evidence(
        &self,
        agent_id: &AgentId,
        request: &InvocationRequest,
        outcome: &std::result::Result<serde_json::Value, InvocationError>,
    ) {
        let entry = EvidenceEntry {
            timestamp: Utc::now(),
            agent: agent_id.to_string(),
            mode: self.mode().to_string(),
            status: if outcome.is_ok() { "ok" } else { "error" }.to_string(),
            input: request.input.clone(),
            detail: outcome.as_ref().err().map(|e| e.detail.clone()),
        };
        if let Err(e) = self.evidence.append(&entry).await {
            warn!("failed to append evidence for {agent_id}: {e}");
        }
    }
}
