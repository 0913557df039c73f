use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cockpit_agents::{AgentRegistry, RemoteGatewayClient};
use cockpit_common::{AgentId, InvocationError, InvocationRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinError;

/// Which backend the gateway was bound to at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Local,
    Remote,
}

impl GatewayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contract both modes satisfy. Errors are already in canonical form.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    fn mode(&self) -> GatewayMode;

    async fn list_agents(&self) -> Result<Vec<AgentId>, InvocationError>;

    async fn invoke(
        &self,
        agent_id: &AgentId,
        request: &InvocationRequest,
    ) -> Result<Value, InvocationError>;
}

/// Resolves agents in the in-process registry.
pub struct LocalBackend {
    registry: Arc<AgentRegistry>,
}

impl LocalBackend {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

#[async_trait]
impl AgentBackend for LocalBackend {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Local
    }

    async fn list_agents(&self) -> Result<Vec<AgentId>, InvocationError> {
        Ok(self.registry.keys())
    }

    async fn invoke(
        &self,
        agent_id: &AgentId,
        request: &InvocationRequest,
    ) -> Result<Value, InvocationError> {
        let unit = self
            .registry
            .lookup(agent_id.as_str())
            .ok_or_else(InvocationError::unknown_agent)?;

        // a panicking unit surfaces as InternalError, not a dropped connection
        let request = request.clone();
        let outcome = tokio::spawn(async move { unit.invoke(&request).await }).await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(InvocationError::internal(failure.to_string())),
            Err(join_err) => Err(InvocationError::internal(panic_message(join_err))),
        }
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "agent task was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "agent panicked".to_string()
    }
}

/// Forwards everything to the remote orchestration endpoint.
pub struct RemoteBackend {
    client: RemoteGatewayClient,
}

impl RemoteBackend {
    pub fn new(client: RemoteGatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentBackend for RemoteBackend {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Remote
    }

    async fn list_agents(&self) -> Result<Vec<AgentId>, InvocationError> {
        self.client
            .list_graphs()
            .await
            .map_err(|e| InvocationError::upstream_unavailable(e.to_string()))
    }

    async fn invoke(
        &self,
        agent_id: &AgentId,
        request: &InvocationRequest,
    ) -> Result<Value, InvocationError> {
        self.client
            .invoke(agent_id, request)
            .await
            .map(unwrap_envelope)
            .map_err(InvocationError::from)
    }
}

/// A remote that is itself a cockpit gateway answers
/// `{"status":"ok","data":X}`; only `X` is the result.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.get("status").and_then(Value::as_str) == Some("ok")
                && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
