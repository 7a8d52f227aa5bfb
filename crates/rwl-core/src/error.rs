use thiserror::Error;

use rwl_model::Op;

use crate::pool::PoolError;

/// Failure of a single RAPI call.
///
/// Never escapes the proxy: it is logged and turned into an empty reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("operation {0} is not implemented by this client")]
    Unsupported(Op),

    #[error("RAPI error {code}: {message}")]
    Http { code: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn http(code: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            code,
            message: message.into(),
        }
    }
}

/// Conditions that stop the workload run itself.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("resource pool: {0}")]
    Pool(#[from] PoolError),

    #[error("instances still present after cleanup: {}", .0.join(", "))]
    InstancesRemain(Vec<String>),
}
