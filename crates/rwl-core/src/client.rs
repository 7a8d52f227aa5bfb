//! Client side of the RAPI.
//!
//! [`RapiClient`] lists every operation the workload knows about. A concrete
//! client overrides the operations its version provides and advertises them
//! through [`RapiClient::capabilities`]; the rest keep the default body,
//! which reports [`ApiError::Unsupported`].
use async_trait::async_trait;
use serde_json::Value;

use rwl_model::{
    CreateInstanceSpec, DryRun, GrowDiskSpec, Invocation, JobId, JobStatus, ModifyInstanceSpec, Op,
    PowerOptions, RebootOptions, RecreateDisksSpec, ReinstallSpec, RenameOptions, Tags,
};

use crate::{capability::Capabilities, error::ApiError};

pub type ApiResult<T> = Result<T, ApiError>;

#[inline]
fn unsupported<T>(op: Op) -> ApiResult<T> {
    Err(ApiError::Unsupported(op))
}

/// A versioned RAPI client.
///
/// Operations that may start a server-side job return [`Invocation`]; the
/// client decides per response whether it got a job id or a plain value.
#[async_trait]
pub trait RapiClient: Send + Sync {
    /// Operations this client provides. Defaults to all of them.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    // Cluster.

    async fn get_version(&self) -> ApiResult<Value> {
        unsupported(Op::GetVersion)
    }

    async fn get_features(&self) -> ApiResult<Value> {
        unsupported(Op::GetFeatures)
    }

    async fn get_operating_systems(&self) -> ApiResult<Value> {
        unsupported(Op::GetOperatingSystems)
    }

    async fn get_info(&self) -> ApiResult<Value> {
        unsupported(Op::GetInfo)
    }

    async fn redistribute_config(&self) -> ApiResult<Invocation> {
        unsupported(Op::RedistributeConfig)
    }

    async fn get_cluster_tags(&self) -> ApiResult<Tags> {
        unsupported(Op::GetClusterTags)
    }

    async fn add_cluster_tags(&self, _tags: &[String], _dry_run: DryRun) -> ApiResult<Invocation> {
        unsupported(Op::AddClusterTags)
    }

    async fn delete_cluster_tags(
        &self,
        _tags: &[String],
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::DeleteClusterTags)
    }

    // Instances.

    async fn get_instances(&self, _bulk: bool) -> ApiResult<Value> {
        unsupported(Op::GetInstances)
    }

    async fn get_instance(&self, _name: &str) -> ApiResult<Value> {
        unsupported(Op::GetInstance)
    }

    async fn get_instance_info(&self, _name: &str, _static_only: bool) -> ApiResult<Invocation> {
        unsupported(Op::GetInstanceInfo)
    }

    async fn create_instance(
        &self,
        _spec: &CreateInstanceSpec,
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::CreateInstance)
    }

    async fn delete_instance(&self, _name: &str, _dry_run: DryRun) -> ApiResult<Invocation> {
        unsupported(Op::DeleteInstance)
    }

    async fn get_instance_tags(&self, _name: &str) -> ApiResult<Tags> {
        unsupported(Op::GetInstanceTags)
    }

    async fn add_instance_tags(
        &self,
        _name: &str,
        _tags: &[String],
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::AddInstanceTags)
    }

    async fn delete_instance_tags(
        &self,
        _name: &str,
        _tags: &[String],
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::DeleteInstanceTags)
    }

    async fn grow_instance_disk(&self, _name: &str, _spec: &GrowDiskSpec) -> ApiResult<Invocation> {
        unsupported(Op::GrowInstanceDisk)
    }

    async fn reboot_instance(&self, _name: &str, _opts: &RebootOptions) -> ApiResult<Invocation> {
        unsupported(Op::RebootInstance)
    }

    async fn shutdown_instance(&self, _name: &str, _opts: &PowerOptions) -> ApiResult<Invocation> {
        unsupported(Op::ShutdownInstance)
    }

    async fn startup_instance(&self, _name: &str, _opts: &PowerOptions) -> ApiResult<Invocation> {
        unsupported(Op::StartupInstance)
    }

    async fn modify_instance(
        &self,
        _name: &str,
        _spec: &ModifyInstanceSpec,
    ) -> ApiResult<Invocation> {
        unsupported(Op::ModifyInstance)
    }

    async fn rename_instance(
        &self,
        _name: &str,
        _new_name: &str,
        _opts: RenameOptions,
    ) -> ApiResult<Invocation> {
        unsupported(Op::RenameInstance)
    }

    async fn deactivate_instance_disks(&self, _name: &str) -> ApiResult<Invocation> {
        unsupported(Op::DeactivateInstanceDisks)
    }

    async fn activate_instance_disks(&self, _name: &str) -> ApiResult<Invocation> {
        unsupported(Op::ActivateInstanceDisks)
    }

    async fn recreate_instance_disks(
        &self,
        _name: &str,
        _spec: &RecreateDisksSpec,
    ) -> ApiResult<Invocation> {
        unsupported(Op::RecreateInstanceDisks)
    }

    async fn get_instance_console(&self, _name: &str) -> ApiResult<Value> {
        unsupported(Op::GetInstanceConsole)
    }

    async fn reinstall_instance(&self, _name: &str, _spec: &ReinstallSpec) -> ApiResult<Invocation> {
        unsupported(Op::ReinstallInstance)
    }

    // Jobs.

    async fn get_jobs(&self, _bulk: bool) -> ApiResult<Value> {
        unsupported(Op::GetJobs)
    }

    async fn get_job_status(&self, _job: JobId) -> ApiResult<JobStatus> {
        unsupported(Op::GetJobStatus)
    }

    /// Blocks until `job` is finalized; `true` if it succeeded.
    async fn wait_for_job_completion(&self, _job: JobId) -> ApiResult<bool> {
        unsupported(Op::WaitForJobCompletion)
    }

    // Nodes, networks and groups.

    async fn get_nodes(&self, _bulk: bool) -> ApiResult<Value> {
        unsupported(Op::GetNodes)
    }

    async fn get_node_tags(&self, _name: &str) -> ApiResult<Tags> {
        unsupported(Op::GetNodeTags)
    }

    async fn add_node_tags(
        &self,
        _name: &str,
        _tags: &[String],
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::AddNodeTags)
    }

    async fn delete_node_tags(
        &self,
        _name: &str,
        _tags: &[String],
        _dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        unsupported(Op::DeleteNodeTags)
    }

    async fn get_networks(&self, _bulk: bool) -> ApiResult<Value> {
        unsupported(Op::GetNetworks)
    }

    async fn get_groups(&self, _bulk: bool) -> ApiResult<Value> {
        unsupported(Op::GetGroups)
    }
}
