//! Logging setup for the workload.
//!
//! Every component logs through `tracing`; this crate only decides where the
//! events go (text, JSON lines or journald) and which of them are kept.
mod config;
mod error;
mod format;
mod init;
mod level;
mod timer;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timer::{LoggerRfc3339, LoggerTimeZone};

/// Installs the global tracing subscriber described by `cfg`.
///
/// With [`LoggerTimeZone::Local`] the local offset is detected here, so call
/// this before the async runtime starts extra threads.
///
/// # Examples
/// ```rust
/// use rwl_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => init::logger_text(cfg),
        LoggerFormat::Json => init::logger_json(cfg),
        LoggerFormat::Journald => init::logger_journald(cfg),
    }
}
