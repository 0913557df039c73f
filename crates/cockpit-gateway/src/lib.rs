pub mod backend;
pub mod gateway;
pub mod router;
pub mod server;
pub mod state;

pub use backend::{AgentBackend, GatewayMode, LocalBackend, RemoteBackend};
pub use gateway::{Gateway, HealthStatus, VersionInfo};
pub use server::GatewayServer;
pub use state::{AppState, SharedState};
