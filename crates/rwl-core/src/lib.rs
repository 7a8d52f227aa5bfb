//! Version-tolerant RAPI workload.
//!
//! The workload talks to the cluster only through a [`Rapi`] proxy. The proxy
//! absorbs missing operations and rejected calls so that one fixed call
//! sequence can run unmodified against any client version, and the
//! [`JobResolver`] turns queued jobs into plain results.
pub mod capability;
pub mod client;
pub mod error;
pub mod pool;
pub mod proxy;
pub mod recorder;
pub mod reply;
pub mod resolver;
pub mod scenario;
pub mod workload;

pub use capability::{Binding, Bindings, Capabilities};
pub use client::{ApiResult, RapiClient};
pub use error::{ApiError, WorkloadError};
pub use pool::{InstanceLease, NodeLease, PoolError, ResourcePool};
pub use proxy::{Forwarding, Rapi, VersionGated};
pub use recorder::{
    CallEvent, CallRecorder, FanOutRecorder, JobOutcome, MemoryRecorder, NoopRecorder,
    RecorderHandle, RunSummary, noop_recorder,
};
pub use reply::{CallFailure, Reply};
pub use resolver::{JobResolver, WaitPolicy};
pub use scenario::{LifecycleTargets, TagScope};
pub use workload::Workload;

pub mod prelude {
    pub use crate::client::{ApiResult, RapiClient};
    pub use crate::error::{ApiError, WorkloadError};
    pub use crate::proxy::{Rapi, VersionGated};
    pub use crate::recorder::{CallRecorder, RecorderHandle};
    pub use crate::resolver::{JobResolver, WaitPolicy};
    pub use crate::workload::Workload;
}
