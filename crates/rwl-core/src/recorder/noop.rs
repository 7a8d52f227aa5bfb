use rwl_model::{JobId, Op};

use crate::recorder::backend::{CallRecorder, JobOutcome};

/// Recorder that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl CallRecorder for NoopRecorder {
    #[inline(always)]
    fn record_forwarded(&self, _: Op) {}

    #[inline(always)]
    fn record_missing(&self, _: Op) {}

    #[inline(always)]
    fn record_rejected(&self, _: Op, _: &str) {}

    #[inline(always)]
    fn record_immediate(&self, _: Op) {}

    #[inline(always)]
    fn record_job(&self, _: Op, _: JobId, _: JobOutcome) {}
}
