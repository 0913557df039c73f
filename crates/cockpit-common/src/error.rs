use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure errors: configuration, startup, and serving.
///
/// Per-call invocation outcomes are reported as [`crate::InvocationError`]
/// instead, so that callers only ever see the four canonical kinds.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
