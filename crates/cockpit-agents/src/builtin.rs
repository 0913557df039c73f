use async_trait::async_trait;
use cockpit_common::InvocationRequest;
use serde_json::{Value, json};

use crate::unit::{AgentFailure, AgentUnit};

/// Replies with `"Echo: <input>"`.
pub struct EchoAgent;

#[async_trait]
impl AgentUnit for EchoAgent {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, AgentFailure> {
        Ok(Value::String(format!("Echo: {}", request.input_text())))
    }
}

/// Demo responder mirroring the shape of the hosted Green Hill graph.
pub struct GreenHillAgent;

#[async_trait]
impl AgentUnit for GreenHillAgent {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, AgentFailure> {
        let text = request.input_text();
        Ok(json!({
            "input": text,
            "output": format!("Green Hill Agent Response: {text}"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_renders_string_input_verbatim() {
        let out = EchoAgent
            .invoke(&InvocationRequest::new("hi"))
            .await
            .unwrap();
        assert_eq!(out, json!("Echo: hi"));
    }

    #[tokio::test]
    async fn echo_of_missing_input_is_empty() {
        let out = EchoAgent
            .invoke(&InvocationRequest::default())
            .await
            .unwrap();
        assert_eq!(out, json!("Echo: "));
    }

    #[tokio::test]
    async fn green_hill_wraps_input_and_output() {
        let out = GreenHillAgent
            .invoke(&InvocationRequest::new("EU-GMP"))
            .await
            .unwrap();
        assert_eq!(out["input"], "EU-GMP");
        assert_eq!(out["output"], "Green Hill Agent Response: EU-GMP");
    }
}
