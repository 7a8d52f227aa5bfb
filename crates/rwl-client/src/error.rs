use thiserror::Error;

/// Errors raised while building a client.
///
/// Failures of individual calls are [`rwl_core::ApiError`]s.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no RAPI host configured and no master node to fall back to")]
    MissingHost,

    #[error("unsupported URL scheme: {0}")]
    Scheme(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
