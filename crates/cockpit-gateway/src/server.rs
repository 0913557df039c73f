use std::sync::Arc;

use cockpit_agents::AgentRegistry;
use cockpit_common::Result;
use cockpit_config::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// The main gateway server that binds to a port and serves the HTTP surface.
pub struct GatewayServer {
    config: AppConfig,
    registry: AgentRegistry,
}

impl GatewayServer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: AgentRegistry::with_builtin_agents(),
        }
    }

    /// Replace the local-mode registry. Ignored when a remote is configured.
    pub fn with_registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("cockpit gateway listening on {}", addr);
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until ctrl-c.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let state = Arc::new(AppState::new(self.config, self.registry)?);
        let app = build_router(state);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| cockpit_common::Error::Gateway(format!("server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down gateway");
}
