use std::fmt;

use serde::{Deserialize, Serialize};

use crate::recorder::{CallEvent, JobOutcome};

/// Totals of one workload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub forwarded: usize,
    pub missing: usize,
    pub rejected: usize,
    pub immediate: usize,
    pub jobs_succeeded: usize,
    pub jobs_failed: usize,
    pub jobs_timed_out: usize,
}

impl RunSummary {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a CallEvent>) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                CallEvent::Forwarded { .. } => summary.forwarded += 1,
                CallEvent::Missing { .. } => summary.missing += 1,
                CallEvent::Rejected { .. } => summary.rejected += 1,
                CallEvent::Immediate { .. } => summary.immediate += 1,
                CallEvent::Job { outcome, .. } => match outcome {
                    JobOutcome::Success => summary.jobs_succeeded += 1,
                    JobOutcome::Failure => summary.jobs_failed += 1,
                    JobOutcome::Timeout => summary.jobs_timed_out += 1,
                },
            }
        }
        summary
    }

    /// Returns `true` if nothing went wrong during the run.
    pub fn is_clean(&self) -> bool {
        self.missing == 0 && self.rejected == 0 && self.jobs_failed == 0 && self.jobs_timed_out == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "forwarded={} missing={} rejected={} immediate={} jobs_ok={} jobs_failed={} jobs_timed_out={}",
            self.forwarded,
            self.missing,
            self.rejected,
            self.immediate,
            self.jobs_succeeded,
            self.jobs_failed,
            self.jobs_timed_out
        )
    }
}
