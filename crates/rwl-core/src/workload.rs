//! The workload run.
use serde_json::Value;
use tracing::{info, instrument, warn};

use rwl_model::{DryRun, Op};

use crate::{
    error::WorkloadError,
    pool::ResourcePool,
    proxy::Rapi,
    recorder::{RecorderHandle, RunSummary},
    resolver::{JobResolver, WaitPolicy},
    scenario::{LifecycleTargets, TagScope, run_instance_lifecycle, run_probes, run_tags},
};

/// Drives every scenario against one cluster, in a fixed order.
///
/// Call failures are absorbed by the proxy; the run only stops when it
/// cannot get resources from the pool or when the cluster cannot be cleared
/// of instances, before or after the instance scenario.
pub struct Workload<'a> {
    rapi: &'a dyn Rapi,
    pool: ResourcePool,
    policy: WaitPolicy,
    recorder: RecorderHandle,
}

impl<'a> Workload<'a> {
    pub fn new(rapi: &'a dyn Rapi, pool: ResourcePool, recorder: RecorderHandle) -> Self {
        Self {
            rapi,
            pool,
            policy: WaitPolicy::default(),
            recorder,
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the whole workload and returns the totals kept by the recorder.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<RunSummary, WorkloadError> {
        let resolver = JobResolver::new(self.rapi, self.policy, self.recorder.clone());

        run_probes(self.rapi).await;

        resolver
            .finish(Op::RedistributeConfig, self.rapi.redistribute_config())
            .await;

        run_tags(&resolver, TagScope::Cluster).await;

        let node = self.pool.acquire_node()?;
        run_tags(&resolver, TagScope::Node(node.primary())).await;
        node.release();

        self.clear_instances(&resolver).await?;

        let nodes = self.pool.acquire_nodes(2)?;
        let instance = self.pool.acquire_instance()?;
        let alternate = self.pool.acquire_instance()?;
        let targets = LifecycleTargets {
            instance: instance.name(),
            alternate: alternate.name(),
            node_one: nodes[0].primary(),
            node_two: nodes[1].primary(),
        };
        run_instance_lifecycle(&resolver, targets).await;
        alternate.release();
        instance.release();
        drop(nodes);

        // A step absorbed by the proxy may have stranded an instance.
        self.clear_instances(&resolver).await?;

        let summary = self.recorder.summary().unwrap_or_default();
        info!(%summary, "workload finished");
        Ok(summary)
    }

    /// Deletes every instance on the cluster and checks none is left.
    async fn clear_instances(&self, resolver: &JobResolver<'_>) -> Result<(), WorkloadError> {
        for name in self.list_instances().await {
            resolver
                .finish(
                    Op::DeleteInstance,
                    self.rapi.delete_instance(&name, DryRun::disabled()),
                )
                .await;
        }

        let remaining = self.list_instances().await;
        if remaining.is_empty() {
            Ok(())
        } else {
            warn!(?remaining, "instances left after cleanup");
            Err(WorkloadError::InstancesRemain(remaining))
        }
    }

    async fn list_instances(&self) -> Vec<String> {
        self.rapi
            .get_instances(false)
            .await
            .into_value()
            .map(|listing| instance_names(&listing))
            .unwrap_or_default()
    }
}

/// Instance names from a listing: plain names, or objects carrying an `id`
/// or `name` field.
pub(crate) fn instance_names(listing: &Value) -> Vec<String> {
    let Some(items) = listing.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name.clone()),
            Value::Object(obj) => obj
                .get("id")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}
