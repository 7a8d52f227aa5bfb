use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` on {host} failed ({status}): {stderr}")]
    Failed {
        host: String,
        command: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
        status: String,
        stderr: String,
    },

    #[error("no RAPI user '{user}' in {path}")]
    SecretNotFound { user: String, path: String },

    #[error("RAPI user '{user}' has a hashed password, a cleartext one is needed")]
    HashedSecret { user: String },

    #[error("no master node configured")]
    NoMaster,
}
