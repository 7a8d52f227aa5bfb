use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rwl_model::{JobId, Op};

use crate::recorder::RunSummary;

/// How a waited-for job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    /// Job finished successfully.
    Success,
    /// Job finished with an error, or its state could not be obtained.
    Failure,
    /// The wait was abandoned.
    Timeout,
}

impl JobOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failure => "failure",
            JobOutcome::Timeout => "timeout",
        }
    }
}

/// Sink for what the proxy and the resolver observe.
///
/// The workload never reads these events back; recorders exist so that runs
/// against different client versions can be compared afterwards. Handles are
/// injected into the proxy and the resolver as [`RecorderHandle`].
pub trait CallRecorder: Send + Sync + 'static {
    /// A call is about to be sent to the client.
    fn record_forwarded(&self, op: Op);
    /// The operation does not exist on the client; a mock answered instead.
    fn record_missing(&self, op: Op);
    /// The client returned an error for the call.
    fn record_rejected(&self, op: Op, message: &str);
    /// A value that is not a job id reached the resolver.
    fn record_immediate(&self, op: Op);
    /// The resolver finished waiting for `job`.
    fn record_job(&self, op: Op, job: JobId, outcome: JobOutcome);

    /// Totals of the run so far, if this recorder keeps any.
    fn summary(&self) -> Option<RunSummary> {
        None
    }
}

/// Shared handle to a call recorder.
pub type RecorderHandle = Arc<dyn CallRecorder>;
