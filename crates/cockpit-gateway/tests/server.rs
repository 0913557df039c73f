use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cockpit_agents::{AgentFailure, AgentRegistry, AgentUnit};
use cockpit_common::InvocationRequest;
use cockpit_config::AppConfig;
use cockpit_gateway::GatewayServer;
use serde_json::{Value, json};
use tokio::net::TcpListener;

struct UppercaseAgent;

#[async_trait]
impl AgentUnit for UppercaseAgent {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, AgentFailure> {
        Ok(Value::String(request.input_text().to_uppercase()))
    }
}

async fn start_server(server: GatewayServer) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });
    format!("http://127.0.0.1:{port}")
}

async fn wait_for_health(base: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("{base}/health")).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not come up at {base}");
}

#[tokio::test]
async fn custom_registry_is_served_in_local_mode() {
    let mut registry = AgentRegistry::new();
    registry.register("shout", Arc::new(UppercaseAgent));

    let base = start_server(GatewayServer::new(AppConfig::default()).with_registry(registry)).await;
    wait_for_health(&base).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/agents/shout/invoke"))
        .json(&json!({"input": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], "HELLO");

    let graphs: Value = client
        .get(format!("{base}/graphs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(graphs["graphs"], json!(["shout"]));

    // builtin agents are replaced, not merged
    let resp = client
        .post(format!("{base}/agents/echo/invoke"))
        .json(&json!({"input": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn default_server_exposes_builtin_agents() {
    let base = start_server(GatewayServer::new(AppConfig::default())).await;
    wait_for_health(&base).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/agents/echo/invoke"))
        .json(&json!({"input": "hi"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], "Echo: hi");
}
