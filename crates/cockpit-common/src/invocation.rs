use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::types::AgentId;

/// The four canonical failure kinds every invocation is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The agent is not present in the active namespace.
    UnknownAgent,
    /// The upstream could not be reached or did not answer in time.
    UpstreamUnavailable,
    /// The upstream answered with an application-level error.
    UpstreamError,
    /// A local agent unit failed.
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownAgent => "UnknownAgent",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::UpstreamError => "UpstreamError",
            Self::InternalError => "InternalError",
        }
    }

    /// HTTP status code surfaced to callers for this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownAgent => 404,
            Self::UpstreamUnavailable | Self::UpstreamError | Self::InternalError => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct InvocationError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl InvocationError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unknown_agent() -> Self {
        Self::new(ErrorKind::UnknownAgent, "unknown agent")
    }

    pub fn upstream_unavailable(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, detail)
    }

    pub fn upstream_error(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamError, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, detail)
    }
}

/// Outcome of a single `invoke` call.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success {
        agent: AgentId,
        data: Value,
    },
    Failure {
        agent: AgentId,
        kind: ErrorKind,
        detail: String,
    },
}

impl InvocationResult {
    pub fn from_outcome(agent: AgentId, outcome: Result<Value, InvocationError>) -> Self {
        match outcome {
            Ok(data) => Self::Success { agent, data },
            Err(err) => Self::Failure {
                agent,
                kind: err.kind,
                detail: err.detail,
            },
        }
    }

    pub fn agent(&self) -> &AgentId {
        match self {
            Self::Success { agent, .. } | Self::Failure { agent, .. } => agent,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure kind, or `None` on success.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_unknown_agent_maps_to_not_found() {
        assert_eq!(ErrorKind::UnknownAgent.http_status(), 404);
        assert_eq!(ErrorKind::UpstreamUnavailable.http_status(), 500);
        assert_eq!(ErrorKind::UpstreamError.http_status(), 500);
        assert_eq!(ErrorKind::InternalError.http_status(), 500);
    }

    #[test]
    fn kind_serializes_as_its_name() {
        assert_eq!(
            serde_json::to_value(ErrorKind::UpstreamUnavailable).unwrap(),
            json!("UpstreamUnavailable")
        );
    }

    #[test]
    fn from_outcome_keeps_data_untouched() {
        let data = json!({"answer": [1, 2, 3]});
        let result = InvocationResult::from_outcome("echo".into(), Ok(data.clone()));
        assert_eq!(
            result,
            InvocationResult::Success {
                agent: "echo".into(),
                data
            }
        );
        assert_eq!(result.kind(), None);
    }

    #[test]
    fn from_outcome_carries_kind_and_detail() {
        let result =
            InvocationResult::from_outcome("x".into(), Err(InvocationError::internal("boom")));
        assert!(!result.is_success());
        assert_eq!(result.kind(), Some(ErrorKind::InternalError));
        assert_eq!(result.agent(), &AgentId::from("x"));
    }
}
