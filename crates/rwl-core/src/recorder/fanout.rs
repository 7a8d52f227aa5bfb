use rwl_model::{JobId, Op};

use crate::recorder::{
    RunSummary,
    backend::{CallRecorder, JobOutcome, RecorderHandle},
};

/// Forwards every event to several recorders.
///
/// The summary is the one of the first recorder that keeps one.
#[derive(Clone, Default)]
pub struct FanOutRecorder {
    targets: Vec<RecorderHandle>,
}

impl FanOutRecorder {
    pub fn new(targets: Vec<RecorderHandle>) -> Self {
        Self { targets }
    }

    pub fn with(mut self, target: RecorderHandle) -> Self {
        self.targets.push(target);
        self
    }
}

impl CallRecorder for FanOutRecorder {
    fn record_forwarded(&self, op: Op) {
        self.targets.iter().for_each(|t| t.record_forwarded(op));
    }

    fn record_missing(&self, op: Op) {
        self.targets.iter().for_each(|t| t.record_missing(op));
    }

    fn record_rejected(&self, op: Op, message: &str) {
        self.targets
            .iter()
            .for_each(|t| t.record_rejected(op, message));
    }

    fn record_immediate(&self, op: Op) {
        self.targets.iter().for_each(|t| t.record_immediate(op));
    }

    fn record_job(&self, op: Op, job: JobId, outcome: JobOutcome) {
        self.targets
            .iter()
            .for_each(|t| t.record_job(op, job, outcome));
    }

    fn summary(&self) -> Option<RunSummary> {
        self.targets.iter().find_map(|t| t.summary())
    }
}
