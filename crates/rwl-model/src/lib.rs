mod domain;
pub use domain::{DryRun, JobId, Op, Tags};

mod error;
pub use error::{ConfigError, ModelError, ModelResult};

mod rapi;
pub use rapi::{
    CreateInstanceSpec, CreationMode, DiskSize, DiskSpec, DiskTemplate, GrowDiskSpec, Invocation,
    JobState, JobStatus, ModifyInstanceSpec, NicSpec, PowerOptions, RebootKind, RebootOptions,
    RecreateDisksSpec, ReinstallSpec, RenameOptions,
};

mod config;
pub use config::{InstanceConfig, NodeConfig, QaConfig, RapiConfig, WorkloadSettings, read_json};

mod strategy;
pub use strategy::PollStrategy;
