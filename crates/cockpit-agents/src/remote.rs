use std::time::Duration;

use cockpit_common::{AgentId, Error, ErrorKind, InvocationError, InvocationRequest, Result};
use cockpit_config::RemoteEndpointConfig;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failure talking to the remote orchestration endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote answered with a non-2xx status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote could not be reached, or did not answer in time.
    #[error("{0}")]
    Transport(String),

    /// The remote answered 2xx with a body that is not JSON.
    #[error("{0}")]
    Decode(String),
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { status: 404, .. } => ErrorKind::UnknownAgent,
            Self::Status { .. } | Self::Decode(_) => ErrorKind::UpstreamError,
            Self::Transport(_) => ErrorKind::UpstreamUnavailable,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Status { status: 404, .. } => "unknown agent".to_string(),
            Self::Status { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("upstream returned status {status}")
                } else {
                    body.to_string()
                }
            }
            Self::Transport(msg) | Self::Decode(msg) => msg.clone(),
        }
    }
}

impl From<RemoteError> for InvocationError {
    fn from(err: RemoteError) -> Self {
        InvocationError::new(err.kind(), err.detail())
    }
}

/// Forwards invocations to a remote orchestration endpoint.
///
/// Every call is bounded by the configured timeout. There are no retries.
#[derive(Clone)]
pub struct RemoteGatewayClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemoteGatewayClient {
    pub fn new(config: &RemoteEndpointConfig) -> Result<Self> {
        let raw = config
            .base_url()
            .ok_or_else(|| Error::Config("remote base URL is not configured".to_string()))?;
        let base_url = Url::parse(raw)
            .map_err(|e| Error::Config(format!("invalid remote base URL '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "remote base URL '{raw}' cannot carry a path"
            )));
        }

        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key().map(str::to_string),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List graphs known to the remote.
    ///
    /// Accepts a bare array or `{"graphs": [...]}`; any other 2xx body
    /// yields an empty list.
    pub async fn list_graphs(&self) -> std::result::Result<Vec<AgentId>, RemoteError> {
        let url = self.endpoint(&["graphs"]);
        debug!("listing remote graphs at {url}");

        let resp = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.read_error(e))?;
        Ok(parse_graphs(&body))
    }

    /// Invoke `agent_id` on the remote, sending the canonical wire payload.
    pub async fn invoke(
        &self,
        agent_id: &AgentId,
        request: &InvocationRequest,
    ) -> std::result::Result<Value, RemoteError> {
        let url = self.endpoint(&["agents", agent_id.as_str(), "invoke"]);
        debug!("forwarding invocation of {agent_id} to {url}");

        let resp = self
            .authorized(self.http.post(url))
            .json(&request.to_payload())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.read_error(e))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| RemoteError::Decode(format!("failed to parse upstream response: {e}")))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Transport(format!("upstream timed out after {:?}", self.timeout))
        } else {
            RemoteError::Transport(format!("upstream unreachable: {err}"))
        }
    }

    fn read_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            self.transport_error(err)
        } else {
            RemoteError::Decode(format!("failed to read upstream response: {err}"))
        }
    }
}

fn parse_graphs(body: &str) -> Vec<AgentId> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };

    let entries = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("graphs") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries.iter().filter_map(graph_id).collect()
}

fn graph_id(entry: &Value) -> Option<AgentId> {
    match entry {
        Value::String(id) => Some(AgentId::new(id.clone())),
        Value::Object(map) => ["graph_id", "id", "name"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(AgentId::from),
        _ => None,
    }
}
