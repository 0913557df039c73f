pub mod error;
pub mod invocation;
pub mod request;
pub mod types;

pub use error::{Error, Result};
pub use invocation::{ErrorKind, InvocationError, InvocationResult};
pub use request::InvocationRequest;
pub use types::AgentId;
