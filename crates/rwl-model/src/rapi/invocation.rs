use serde_json::Value;

use crate::JobId;

/// Outcome of a successful client call.
///
/// Operations that start server-side work return [`Invocation::Queued`]; the
/// caller has to wait for the job to learn the actual result. Everything else
/// is [`Invocation::Immediate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Terminal value, usable directly.
    Immediate(Value),
    /// Asynchronous job queued on the server.
    Queued(JobId),
}

impl Invocation {
    /// Classifies a raw response body of a job-producing operation.
    ///
    /// Integer-like values (see [`JobId::from_value`]) are job ids, anything
    /// else is kept as a terminal value.
    pub fn from_value(value: Value) -> Self {
        match JobId::from_value(&value) {
            Some(job) => Invocation::Queued(job),
            None => Invocation::Immediate(value),
        }
    }

    /// Returns the job id, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Invocation::Queued(job) => Some(*job),
            Invocation::Immediate(_) => None,
        }
    }
}

impl From<JobId> for Invocation {
    fn from(job: JobId) -> Self {
        Invocation::Queued(job)
    }
}
