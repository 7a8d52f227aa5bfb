//! Fixed call sequences run by the workload.
//!
//! Scenarios never fail. Every outcome, including the odd one, is visible in
//! the logs and in the call recorder only.
mod instance;
pub use instance::{INSTANCE_OS, LifecycleTargets, run_instance_lifecycle};

mod probe;
pub use probe::run_probes;

mod tags;
pub use tags::{TAGS, TagScope, run_tags};
