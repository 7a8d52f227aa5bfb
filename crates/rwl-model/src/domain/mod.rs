mod op;
pub use op::Op;

mod job_id;
pub use job_id::JobId;

mod dry_run;
pub use dry_run::DryRun;

/// Tag labels attached to the cluster, a node or an instance.
///
/// Order is irrelevant to the server; the workload keeps the order it sent.
pub type Tags = Vec<String>;
