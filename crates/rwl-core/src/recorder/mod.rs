//! Call recording.
//!
//! The proxy and the resolver report what happened to every call to a
//! [`CallRecorder`]. Backends (in-memory trace, prometheus, ...) implement the
//! trait and are injected as a [`RecorderHandle`].
mod backend;
pub use backend::{CallRecorder, JobOutcome, RecorderHandle};

mod fanout;
pub use fanout::FanOutRecorder;

mod memory;
pub use memory::{CallEvent, MemoryRecorder};

mod noop;
pub use noop::NoopRecorder;

mod summary;
pub use summary::RunSummary;

use std::sync::Arc;

/// Create a no-op recorder handle.
#[inline]
pub fn noop_recorder() -> RecorderHandle {
    Arc::new(NoopRecorder)
}
