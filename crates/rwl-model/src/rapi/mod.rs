//! Wire-level shapes of the RAPI v2 resources the workload touches.
mod invocation;
pub use invocation::Invocation;

mod job;
pub use job::{JobState, JobStatus};

mod instance;
pub use instance::{
    CreateInstanceSpec, CreationMode, DiskSize, DiskSpec, DiskTemplate, GrowDiskSpec,
    ModifyInstanceSpec, NicSpec, ReinstallSpec, RecreateDisksSpec, RenameOptions,
};

mod power;
pub use power::{PowerOptions, RebootKind, RebootOptions};
