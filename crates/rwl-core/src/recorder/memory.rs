use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};

use rwl_model::{JobId, Op};

use crate::recorder::{
    RunSummary,
    backend::{CallRecorder, JobOutcome},
};

/// One entry of the call trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CallEvent {
    Forwarded { op: Op },
    Missing { op: Op },
    Rejected { op: Op, message: String },
    Immediate { op: Op },
    Job { op: Op, job: JobId, outcome: JobOutcome },
}

impl CallEvent {
    pub fn op(&self) -> Op {
        match self {
            CallEvent::Forwarded { op }
            | CallEvent::Missing { op }
            | CallEvent::Rejected { op, .. }
            | CallEvent::Immediate { op }
            | CallEvent::Job { op, .. } => *op,
        }
    }
}

/// Keeps the whole call trace in memory.
///
/// The trace can be written out as JSON lines at the end of a run; two such
/// files from runs against different client versions diff line by line.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<CallEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CallEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: CallEvent) {
        self.lock().push(event);
    }

    /// Snapshot of the trace.
    pub fn events(&self) -> Vec<CallEvent> {
        self.lock().clone()
    }

    /// Number of forwarded calls of `op`.
    pub fn forwarded(&self, op: Op) -> usize {
        self.lock()
            .iter()
            .filter(|e| matches!(e, CallEvent::Forwarded { op: o } if *o == op))
            .count()
    }

    /// Writes the trace to `path`, one JSON object per line.
    pub fn write_jsonl(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for event in self.lock().iter() {
            serde_json::to_writer(&mut out, event)?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }
}

impl CallRecorder for MemoryRecorder {
    fn record_forwarded(&self, op: Op) {
        self.push(CallEvent::Forwarded { op });
    }

    fn record_missing(&self, op: Op) {
        self.push(CallEvent::Missing { op });
    }

    fn record_rejected(&self, op: Op, message: &str) {
        self.push(CallEvent::Rejected {
            op,
            message: message.to_string(),
        });
    }

    fn record_immediate(&self, op: Op) {
        self.push(CallEvent::Immediate { op });
    }

    fn record_job(&self, op: Op, job: JobId, outcome: JobOutcome) {
        self.push(CallEvent::Job { op, job, outcome });
    }

    fn summary(&self) -> Option<RunSummary> {
        Some(RunSummary::from_events(self.lock().iter()))
    }
}
