//! Prometheus recorder for the RAPI workload.
//!
//! [`PrometheusRecorder`] implements [`rwl_core::CallRecorder`] and keeps
//! per-operation counters of what the proxy and the job resolver saw.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use rwl_core::{CallRecorder, RecorderHandle};
//! use rwl_model::Op;
//! use rwl_prometheus::PrometheusRecorder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusRecorder::new()?;
//! let handle: RecorderHandle = Arc::new(metrics.clone());
//!
//! handle.record_forwarded(Op::GetVersion);
//! assert!(metrics.encode_text()?.contains("rwl_calls_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `rwl_calls_total{op, outcome}` - Counter
//! - `rwl_jobs_total{op, outcome}` - Counter

mod backend;
pub use backend::PrometheusRecorder;

pub use prometheus::{Encoder, Registry, TextEncoder};
