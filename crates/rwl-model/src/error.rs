use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown operation: {0}")]
    UnknownOp(String),

    #[error("unknown disk template: {0}")]
    UnknownDiskTemplate(String),

    #[error("unknown reboot kind: {0}")]
    UnknownRebootKind(String),

    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while loading the QA configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
