pub mod builtin;
pub mod evidence;
pub mod registry;
pub mod remote;
pub mod unit;

pub use builtin::{EchoAgent, GreenHillAgent};
pub use evidence::{EvidenceEntry, EvidenceSink, JsonlEvidenceLog, NoopEvidence};
pub use registry::AgentRegistry;
pub use remote::{RemoteError, RemoteGatewayClient};
pub use unit::{AgentFailure, AgentUnit};
