use std::sync::Arc;

use cockpit_agents::AgentRegistry;
use cockpit_common::Result;
use cockpit_config::AppConfig;

use crate::gateway::Gateway;

/// Shared application state accessible from all request handlers.
///
/// Built once before the listener starts and never mutated afterwards.
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(config: AppConfig, registry: AgentRegistry) -> Result<Self> {
        let gateway = Gateway::from_config(&config, registry)?;
        Ok(Self { config, gateway })
    }
}

pub type SharedState = Arc<AppState>;
