use std::collections::HashMap;
use std::sync::Arc;

use cockpit_common::AgentId;
use tracing::info;

use crate::builtin::{EchoAgent, GreenHillAgent};
use crate::unit::AgentUnit;

/// Fixed name-to-unit mapping used in local mode.
///
/// Built once at startup and read-only afterwards; lookups never fail.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Arc<dyn AgentUnit>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Registry preloaded with the `echo` and `green_hill` demo units.
    pub fn with_builtin_agents() -> Self {
        let mut registry = Self::new();
        registry.register("echo", Arc::new(EchoAgent));
        registry.register("green_hill", Arc::new(GreenHillAgent));
        registry
    }

    /// Register a unit, replacing any unit previously held under `id`.
    pub fn register(&mut self, id: impl Into<AgentId>, unit: Arc<dyn AgentUnit>) {
        let id = id.into();
        info!("registered agent: {}", id);
        self.agents.insert(id, unit);
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<dyn AgentUnit>> {
        self.agents.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Registered identifiers, sorted for stable output.
    pub fn keys(&self) -> Vec<AgentId> {
        let mut keys: Vec<AgentId> = self.agents.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
