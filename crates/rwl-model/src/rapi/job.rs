use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::JobId;

/// Server-side job state as reported by `GET /2/jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Waiting,
    Canceling,
    Running,
    Success,
    Error,
    Canceled,
    /// State name this client does not know about.
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Returns `true` once the job will not change anymore.
    pub fn is_finalized(self) -> bool {
        matches!(self, JobState::Success | JobState::Error | JobState::Canceled)
    }
}

/// Structured job status.
///
/// Only the fields the workload interprets are typed; the rest of the status
/// object is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobState>,
    /// Per-opcode results, in submission order.
    #[serde(default)]
    pub opresult: Vec<Value>,
    #[serde(default)]
    pub opstatus: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobStatus {
    /// Result payload of the first opcode of the job, `null` if none was recorded.
    pub fn first_result(&self) -> Value {
        self.opresult.first().cloned().unwrap_or(Value::Null)
    }

    /// Returns `true` if the job reached a terminal state.
    pub fn is_finalized(&self) -> bool {
        self.status.is_some_and(JobState::is_finalized)
    }
}
