use anyhow::{Context, Result, bail};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use url::Url;

/// Thin HTTP client for a running gateway, used by the query subcommands.
pub struct GatewayClient {
    http: Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid gateway URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("gateway URL '{base_url}' cannot carry a path");
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let url = self.endpoint(&segments);
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("gateway is not reachable at {}", self.base_url))?;
        read_body(resp, &url).await
    }

    pub async fn invoke(&self, agent: &str, payload: &Value) -> Result<Value> {
        let url = self.endpoint(&["agents", agent, "invoke"]);
        let resp = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("gateway is not reachable at {}", self.base_url))?;
        read_body(resp, &url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn read_body(resp: Response, url: &Url) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&text)
            .map(|body| detail_of(&body))
            .unwrap_or(text);
        bail!("{} {}: {}", status.as_u16(), url.path(), detail);
    }
    resp.json().await.context("gateway returned a non-JSON body")
}

fn detail_of(body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Build the request body from `--input` text or a raw `--json` payload.
pub fn build_payload(input: Option<String>, raw_json: Option<String>) -> Result<Value> {
    match (input, raw_json) {
        (_, Some(raw)) => serde_json::from_str(&raw).context("--json is not valid JSON"),
        (Some(text), None) => Ok(json!({ "input": text })),
        (None, None) => Ok(json!({})),
    }
}
