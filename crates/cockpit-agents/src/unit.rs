use async_trait::async_trait;
use cockpit_common::InvocationRequest;
use serde_json::Value;
use thiserror::Error;

/// Failure raised by an agent unit. Only the message is ever surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AgentFailure(pub String);

impl AgentFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// An invocable unit of agent behaviour, resolved by name in local mode.
#[async_trait]
pub trait AgentUnit: Send + Sync {
    /// Run the agent against a normalized request and return its result
    /// payload verbatim.
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, AgentFailure>;
}
