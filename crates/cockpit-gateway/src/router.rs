use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use cockpit_common::{AgentId, InvocationRequest, InvocationResult};
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::SharedState;

/// Build the main application router with all routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/graphs", get(graphs))
        .route("/agents/{agent_id}/invoke", post(invoke))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Empty `origins` allows any origin without credentials; otherwise exactly
/// the listed origins are allowed, with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.gateway.health())
}

async fn version(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.gateway.version())
}

/// GET /graphs — list agents in the active namespace.
async fn graphs(State(state): State<SharedState>) -> Response {
    let mode = state.gateway.mode();
    match state.gateway.list_agents().await {
        Ok(graphs) => Json(json!({
            "status": "ok",
            "mode": mode,
            "graphs": graphs,
        }))
        .into_response(),
        Err(err) => {
            warn!("listing agents failed: {err}");
            (
                status_code(err.kind.http_status()),
                Json(json!({
                    "status": "error",
                    "mode": mode,
                    "kind": err.kind,
                    "detail": err.detail,
                })),
            )
                .into_response()
        }
    }
}

/// POST /agents/{agent_id}/invoke — run an agent against the request body.
async fn invoke(
    State(state): State<SharedState>,
    Path(agent_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "agent": agent_id,
                    "detail": format!("invalid JSON body: {e}"),
                })),
            )
                .into_response();
        }
    };

    let request = InvocationRequest::normalize(payload);
    let mode = state.gateway.mode();

    match state.gateway.invoke(AgentId::new(agent_id), request).await {
        InvocationResult::Success { agent, data } => Json(json!({
            "status": "ok",
            "mode": mode,
            "agent": agent,
            "data": data,
        }))
        .into_response(),
        InvocationResult::Failure {
            agent,
            kind,
            detail,
        } => (
            status_code(kind.http_status()),
            Json(json!({
                "status": "error",
                "agent": agent,
                "kind": kind,
                "detail": detail,
            })),
        )
            .into_response(),
    }
}

fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
