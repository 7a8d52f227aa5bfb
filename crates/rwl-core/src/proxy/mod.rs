//! Version-tolerant call proxy.
//!
//! Scenarios only see the [`Rapi`] trait. Its methods mirror
//! [`RapiClient`](crate::RapiClient) but never fail: a refused call becomes
//! [`Reply::Rejected`], an operation the client lacks becomes
//! [`Reply::Missing`]. Every call is logged by operation name before it is
//! sent, which gives a trace that can be compared across client versions.
use async_trait::async_trait;
use serde_json::Value;

use rwl_model::{
    CreateInstanceSpec, DryRun, GrowDiskSpec, Invocation, JobId, JobStatus, ModifyInstanceSpec,
    PowerOptions, RebootOptions, RecreateDisksSpec, ReinstallSpec, RenameOptions, Tags,
};

use crate::reply::Reply;

/// The RAPI as seen by the workload scenarios.
#[async_trait]
pub trait Rapi: Send + Sync {
    async fn get_version(&self) -> Reply<Value>;
    async fn get_features(&self) -> Reply<Value>;
    async fn get_operating_systems(&self) -> Reply<Value>;
    async fn get_info(&self) -> Reply<Value>;
    async fn redistribute_config(&self) -> Reply<Invocation>;
    async fn get_cluster_tags(&self) -> Reply<Tags>;
    async fn add_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> Reply<Invocation>;
    async fn delete_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> Reply<Invocation>;

    async fn get_instances(&self, bulk: bool) -> Reply<Value>;
    async fn get_instance(&self, name: &str) -> Reply<Value>;
    async fn get_instance_info(&self, name: &str, static_only: bool) -> Reply<Invocation>;
    async fn create_instance(&self, spec: &CreateInstanceSpec, dry_run: DryRun)
    -> Reply<Invocation>;
    async fn delete_instance(&self, name: &str, dry_run: DryRun) -> Reply<Invocation>;
    async fn get_instance_tags(&self, name: &str) -> Reply<Tags>;
    async fn add_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> Reply<Invocation>;
    async fn delete_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> Reply<Invocation>;
    async fn grow_instance_disk(&self, name: &str, spec: &GrowDiskSpec) -> Reply<Invocation>;
    async fn reboot_instance(&self, name: &str, opts: &RebootOptions) -> Reply<Invocation>;
    async fn shutdown_instance(&self, name: &str, opts: &PowerOptions) -> Reply<Invocation>;
    async fn startup_instance(&self, name: &str, opts: &PowerOptions) -> Reply<Invocation>;
    async fn modify_instance(&self, name: &str, spec: &ModifyInstanceSpec) -> Reply<Invocation>;
    async fn rename_instance(
        &self,
        name: &str,
        new_name: &str,
        opts: RenameOptions,
    ) -> Reply<Invocation>;
    async fn deactivate_instance_disks(&self, name: &str) -> Reply<Invocation>;
    async fn activate_instance_disks(&self, name: &str) -> Reply<Invocation>;
    async fn recreate_instance_disks(
        &self,
        name: &str,
        spec: &RecreateDisksSpec,
    ) -> Reply<Invocation>;
    async fn get_instance_console(&self, name: &str) -> Reply<Value>;
    async fn reinstall_instance(&self, name: &str, spec: &ReinstallSpec) -> Reply<Invocation>;

    async fn get_jobs(&self, bulk: bool) -> Reply<Value>;
    async fn get_job_status(&self, job: JobId) -> Reply<JobStatus>;
    async fn wait_for_job_completion(&self, job: JobId) -> Reply<bool>;

    async fn get_nodes(&self, bulk: bool) -> Reply<Value>;
    async fn get_node_tags(&self, name: &str) -> Reply<Tags>;
    async fn add_node_tags(&self, name: &str, tags: &[String], dry_run: DryRun)
    -> Reply<Invocation>;
    async fn delete_node_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> Reply<Invocation>;
    async fn get_networks(&self, bulk: bool) -> Reply<Value>;
    async fn get_groups(&self, bulk: bool) -> Reply<Value>;
}

/// Implements [`Rapi`] for an adapter `$ty<C>`.
///
/// The adapter provides `fn client(&self) -> &C` and an async
/// `$via(op, call)` that decides what to do with the pending client call.
macro_rules! rapi_adapter {
    ($ty:ident, $via:ident) => {
        #[async_trait::async_trait]
        impl<C: $crate::client::RapiClient> $crate::proxy::Rapi for $ty<C> {
            async fn get_version(&self) -> Reply<Value> {
                self.$via(Op::GetVersion, self.client().get_version()).await
            }

            async fn get_features(&self) -> Reply<Value> {
                self.$via(Op::GetFeatures, self.client().get_features()).await
            }

            async fn get_operating_systems(&self) -> Reply<Value> {
                self.$via(Op::GetOperatingSystems, self.client().get_operating_systems())
                    .await
            }

            async fn get_info(&self) -> Reply<Value> {
                self.$via(Op::GetInfo, self.client().get_info()).await
            }

            async fn redistribute_config(&self) -> Reply<Invocation> {
                self.$via(Op::RedistributeConfig, self.client().redistribute_config())
                    .await
            }

            async fn get_cluster_tags(&self) -> Reply<Tags> {
                self.$via(Op::GetClusterTags, self.client().get_cluster_tags())
                    .await
            }

            async fn add_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> Reply<Invocation> {
                self.$via(
                    Op::AddClusterTags,
                    self.client().add_cluster_tags(tags, dry_run),
                )
                .await
            }

            async fn delete_cluster_tags(
                &self,
                tags: &[String],
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::DeleteClusterTags,
                    self.client().delete_cluster_tags(tags, dry_run),
                )
                .await
            }

            async fn get_instances(&self, bulk: bool) -> Reply<Value> {
                self.$via(Op::GetInstances, self.client().get_instances(bulk))
                    .await
            }

            async fn get_instance(&self, name: &str) -> Reply<Value> {
                self.$via(Op::GetInstance, self.client().get_instance(name))
                    .await
            }

            async fn get_instance_info(&self, name: &str, static_only: bool) -> Reply<Invocation> {
                self.$via(
                    Op::GetInstanceInfo,
                    self.client().get_instance_info(name, static_only),
                )
                .await
            }

            async fn create_instance(
                &self,
                spec: &CreateInstanceSpec,
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::CreateInstance,
                    self.client().create_instance(spec, dry_run),
                )
                .await
            }

            async fn delete_instance(&self, name: &str, dry_run: DryRun) -> Reply<Invocation> {
                self.$via(
                    Op::DeleteInstance,
                    self.client().delete_instance(name, dry_run),
                )
                .await
            }

            async fn get_instance_tags(&self, name: &str) -> Reply<Tags> {
                self.$via(Op::GetInstanceTags, self.client().get_instance_tags(name))
                    .await
            }

            async fn add_instance_tags(
                &self,
                name: &str,
                tags: &[String],
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::AddInstanceTags,
                    self.client().add_instance_tags(name, tags, dry_run),
                )
                .await
            }

            async fn delete_instance_tags(
                &self,
                name: &str,
                tags: &[String],
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::DeleteInstanceTags,
                    self.client().delete_instance_tags(name, tags, dry_run),
                )
                .await
            }

            async fn grow_instance_disk(&self, name: &str, spec: &GrowDiskSpec) -> Reply<Invocation> {
                self.$via(
                    Op::GrowInstanceDisk,
                    self.client().grow_instance_disk(name, spec),
                )
                .await
            }

            async fn reboot_instance(&self, name: &str, opts: &RebootOptions) -> Reply<Invocation> {
                self.$via(Op::RebootInstance, self.client().reboot_instance(name, opts))
                    .await
            }

            async fn shutdown_instance(&self, name: &str, opts: &PowerOptions) -> Reply<Invocation> {
                self.$via(
                    Op::ShutdownInstance,
                    self.client().shutdown_instance(name, opts),
                )
                .await
            }

            async fn startup_instance(&self, name: &str, opts: &PowerOptions) -> Reply<Invocation> {
                self.$via(
                    Op::StartupInstance,
                    self.client().startup_instance(name, opts),
                )
                .await
            }

            async fn modify_instance(
                &self,
                name: &str,
                spec: &ModifyInstanceSpec,
            ) -> Reply<Invocation> {
                self.$via(Op::ModifyInstance, self.client().modify_instance(name, spec))
                    .await
            }

            async fn rename_instance(
                &self,
                name: &str,
                new_name: &str,
                opts: RenameOptions,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::RenameInstance,
                    self.client().rename_instance(name, new_name, opts),
                )
                .await
            }

            async fn deactivate_instance_disks(&self, name: &str) -> Reply<Invocation> {
                self.$via(
                    Op::DeactivateInstanceDisks,
                    self.client().deactivate_instance_disks(name),
                )
                .await
            }

            async fn activate_instance_disks(&self, name: &str) -> Reply<Invocation> {
                self.$via(
                    Op::ActivateInstanceDisks,
                    self.client().activate_instance_disks(name),
                )
                .await
            }

            async fn recreate_instance_disks(
                &self,
                name: &str,
                spec: &RecreateDisksSpec,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::RecreateInstanceDisks,
                    self.client().recreate_instance_disks(name, spec),
                )
                .await
            }

            async fn get_instance_console(&self, name: &str) -> Reply<Value> {
                self.$via(
                    Op::GetInstanceConsole,
                    self.client().get_instance_console(name),
                )
                .await
            }

            async fn reinstall_instance(&self, name: &str, spec: &ReinstallSpec) -> Reply<Invocation> {
                self.$via(
                    Op::ReinstallInstance,
                    self.client().reinstall_instance(name, spec),
                )
                .await
            }

            async fn get_jobs(&self, bulk: bool) -> Reply<Value> {
                self.$via(Op::GetJobs, self.client().get_jobs(bulk)).await
            }

            async fn get_job_status(&self, job: JobId) -> Reply<JobStatus> {
                self.$via(Op::GetJobStatus, self.client().get_job_status(job))
                    .await
            }

            async fn wait_for_job_completion(&self, job: JobId) -> Reply<bool> {
                self.$via(
                    Op::WaitForJobCompletion,
                    self.client().wait_for_job_completion(job),
                )
                .await
            }

            async fn get_nodes(&self, bulk: bool) -> Reply<Value> {
                self.$via(Op::GetNodes, self.client().get_nodes(bulk)).await
            }

            async fn get_node_tags(&self, name: &str) -> Reply<Tags> {
                self.$via(Op::GetNodeTags, self.client().get_node_tags(name))
                    .await
            }

            async fn add_node_tags(
                &self,
                name: &str,
                tags: &[String],
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::AddNodeTags,
                    self.client().add_node_tags(name, tags, dry_run),
                )
                .await
            }

            async fn delete_node_tags(
                &self,
                name: &str,
                tags: &[String],
                dry_run: DryRun,
            ) -> Reply<Invocation> {
                self.$via(
                    Op::DeleteNodeTags,
                    self.client().delete_node_tags(name, tags, dry_run),
                )
                .await
            }

            async fn get_networks(&self, bulk: bool) -> Reply<Value> {
                self.$via(Op::GetNetworks, self.client().get_networks(bulk))
                    .await
            }

            async fn get_groups(&self, bulk: bool) -> Reply<Value> {
                self.$via(Op::GetGroups, self.client().get_groups(bulk))
                    .await
            }
        }
    };
}

mod forwarding;
pub use forwarding::Forwarding;

mod gated;
pub use gated::VersionGated;
