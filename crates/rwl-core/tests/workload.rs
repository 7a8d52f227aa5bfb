use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};

use rwl_core::{
    ApiError, ApiResult, CallEvent, Capabilities, JobResolver, MemoryRecorder, RapiClient,
    ResourcePool, VersionGated, WaitPolicy, Workload, WorkloadError,
    recorder::CallRecorder,
    scenario::{TagScope, run_probes, run_tags},
};
use rwl_model::{
    CreateInstanceSpec, DiskTemplate, DryRun, InstanceConfig, Invocation, JobId, JobStatus,
    NodeConfig, Op, PowerOptions, RebootOptions, Tags,
};

#[derive(Default)]
struct Cluster {
    instances: BTreeSet<String>,
    tags: BTreeMap<String, BTreeSet<String>>,
    jobs: BTreeMap<u64, (bool, Value)>,
    next_job: u64,
    calls: Vec<(Op, Vec<String>, bool)>,
}

impl Cluster {
    fn queue(&mut self, success: bool, result: Value) -> Invocation {
        self.next_job += 1;
        self.jobs.insert(self.next_job, (success, result));
        Invocation::Queued(JobId::new(self.next_job))
    }
}

/// In-memory cluster answering the RAPI the way a real master would, with
/// every mutation turned into an already finished job.
struct FakeCluster {
    caps: Capabilities,
    refuse_deletes: bool,
    /// Renames away from this name fail with a server error.
    broken_rename: Option<String>,
    state: Mutex<Cluster>,
}

impl FakeCluster {
    fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            refuse_deletes: false,
            broken_rename: None,
            state: Mutex::new(Cluster::default()),
        }
    }

    fn with_instance(self, name: &str) -> Self {
        self.lock().instances.insert(name.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Cluster> {
        self.state.lock().unwrap()
    }

    fn calls_of(&self, op: Op) -> Vec<(Vec<String>, bool)> {
        self.lock()
            .calls
            .iter()
            .filter(|(o, _, _)| *o == op)
            .map(|(_, tags, dry)| (tags.clone(), *dry))
            .collect()
    }

    fn get_tags(&self, op: Op, key: &str) -> ApiResult<Tags> {
        let mut state = self.lock();
        state.calls.push((op, Vec::new(), false));
        Ok(state
            .tags
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn change_tags(
        &self,
        op: Op,
        key: &str,
        tags: &[String],
        dry_run: DryRun,
        add: bool,
    ) -> ApiResult<Invocation> {
        let mut state = self.lock();
        state.calls.push((op, tags.to_vec(), dry_run.is_enabled()));
        if !dry_run.is_enabled() {
            let set = state.tags.entry(key.to_string()).or_default();
            for tag in tags {
                if add {
                    set.insert(tag.clone());
                } else {
                    set.remove(tag);
                }
            }
        }
        Ok(state.queue(true, Value::Null))
    }

    fn job(&self, op: Op) -> ApiResult<Invocation> {
        let mut state = self.lock();
        state.calls.push((op, Vec::new(), false));
        Ok(state.queue(true, Value::Null))
    }
}

#[async_trait]
impl RapiClient for FakeCluster {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    async fn get_version(&self) -> ApiResult<Value> {
        self.lock().calls.push((Op::GetVersion, Vec::new(), false));
        Ok(json!(2))
    }

    async fn redistribute_config(&self) -> ApiResult<Invocation> {
        self.job(Op::RedistributeConfig)
    }

    async fn get_cluster_tags(&self) -> ApiResult<Tags> {
        self.get_tags(Op::GetClusterTags, "cluster")
    }

    async fn add_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> ApiResult<Invocation> {
        self.change_tags(Op::AddClusterTags, "cluster", tags, dry_run, true)
    }

    async fn delete_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> ApiResult<Invocation> {
        self.change_tags(Op::DeleteClusterTags, "cluster", tags, dry_run, false)
    }

    async fn get_instances(&self, bulk: bool) -> ApiResult<Value> {
        let mut state = self.lock();
        state.calls.push((Op::GetInstances, Vec::new(), bulk));
        let names: Vec<Value> = state
            .instances
            .iter()
            .map(|name| {
                if bulk {
                    json!({"name": name})
                } else {
                    json!(name)
                }
            })
            .collect();
        Ok(Value::Array(names))
    }

    async fn create_instance(
        &self,
        spec: &CreateInstanceSpec,
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let mut state = self.lock();
        state
            .calls
            .push((Op::CreateInstance, Vec::new(), dry_run.is_enabled()));
        if state.instances.contains(&spec.name) {
            return Err(ApiError::http(409, format!("instance {} exists", spec.name)));
        }
        if !dry_run.is_enabled() {
            state.instances.insert(spec.name.clone());
        }
        Ok(state.queue(true, json!([spec.name.clone()])))
    }

    async fn delete_instance(&self, name: &str, dry_run: DryRun) -> ApiResult<Invocation> {
        let mut state = self.lock();
        state
            .calls
            .push((Op::DeleteInstance, vec![name.to_string()], dry_run.is_enabled()));
        if self.refuse_deletes {
            return Ok(state.queue(false, json!("OpPrereqError")));
        }
        if !dry_run.is_enabled() {
            state.instances.remove(name);
            state.tags.remove(&format!("instance/{name}"));
        }
        Ok(state.queue(true, Value::Null))
    }

    async fn get_instance_tags(&self, name: &str) -> ApiResult<Tags> {
        self.get_tags(Op::GetInstanceTags, &format!("instance/{name}"))
    }

    async fn add_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        self.change_tags(Op::AddInstanceTags, &format!("instance/{name}"), tags, dry_run, true)
    }

    async fn delete_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        self.change_tags(
            Op::DeleteInstanceTags,
            &format!("instance/{name}"),
            tags,
            dry_run,
            false,
        )
    }

    async fn reboot_instance(&self, _name: &str, _opts: &RebootOptions) -> ApiResult<Invocation> {
        self.job(Op::RebootInstance)
    }

    async fn shutdown_instance(&self, _name: &str, _opts: &PowerOptions) -> ApiResult<Invocation> {
        self.job(Op::ShutdownInstance)
    }

    async fn startup_instance(&self, _name: &str, _opts: &PowerOptions) -> ApiResult<Invocation> {
        self.job(Op::StartupInstance)
    }

    async fn rename_instance(
        &self,
        name: &str,
        new_name: &str,
        _opts: rwl_model::RenameOptions,
    ) -> ApiResult<Invocation> {
        let mut state = self.lock();
        state.calls.push((Op::RenameInstance, Vec::new(), false));
        if self.broken_rename.as_deref() == Some(name) {
            return Err(ApiError::http(500, "rename failed"));
        }
        if state.instances.remove(name) {
            state.instances.insert(new_name.to_string());
        }
        Ok(state.queue(true, Value::Null))
    }

    async fn get_job_status(&self, job: JobId) -> ApiResult<JobStatus> {
        let state = self.lock();
        let (success, result) = state
            .jobs
            .get(&job.get())
            .cloned()
            .ok_or_else(|| ApiError::http(404, "no such job"))?;
        let status = if success { "success" } else { "error" };
        serde_json::from_value(json!({"id": job, "status": status, "opresult": [result]}))
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn wait_for_job_completion(&self, job: JobId) -> ApiResult<bool> {
        let state = self.lock();
        state
            .jobs
            .get(&job.get())
            .map(|(success, _)| *success)
            .ok_or_else(|| ApiError::http(404, "no such job"))
    }

    async fn get_node_tags(&self, name: &str) -> ApiResult<Tags> {
        self.get_tags(Op::GetNodeTags, &format!("node/{name}"))
    }

    async fn add_node_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        self.change_tags(Op::AddNodeTags, &format!("node/{name}"), tags, dry_run, true)
    }

    async fn delete_node_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        self.change_tags(Op::DeleteNodeTags, &format!("node/{name}"), tags, dry_run, false)
    }
}

fn pool(nodes: &[&str], instances: &[&str]) -> ResourcePool {
    ResourcePool::new(
        nodes.iter().map(|n| NodeConfig {
            primary: n.to_string(),
            secondary: None,
        }),
        instances.iter().map(|i| InstanceConfig {
            name: i.to_string(),
        }),
    )
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn probe_against_old_client_mocks_everything_else() {
    let rec = Arc::new(MemoryRecorder::new());
    let client = FakeCluster::new(Capabilities::only([Op::GetVersion, Op::GetInstances]));
    let proxy = VersionGated::new(client, rec.clone());

    run_probes(&proxy).await;

    let cluster = proxy.client().lock();
    let calls = &cluster.calls;
    let version: Vec<_> = calls.iter().filter(|(op, _, _)| *op == Op::GetVersion).collect();
    let listings: Vec<bool> = calls
        .iter()
        .filter(|(op, _, _)| *op == Op::GetInstances)
        .map(|(_, _, bulk)| *bulk)
        .collect();
    assert_eq!(version.len(), 1);
    assert_eq!(listings, vec![false, true]);
    assert_eq!(calls.len(), 3);
    drop(cluster);

    let summary = rec.summary().unwrap();
    assert_eq!(summary.forwarded, 3);
    assert_eq!(summary.missing, 12);
    assert_eq!(summary.rejected, 0);
}

#[tokio::test]
async fn queued_creation_resolves_to_job_result() {
    struct Creator;

    #[async_trait]
    impl RapiClient for Creator {
        async fn create_instance(
            &self,
            _spec: &CreateInstanceSpec,
            _dry_run: DryRun,
        ) -> ApiResult<Invocation> {
            Ok(Invocation::from_value(json!("42")))
        }

        async fn wait_for_job_completion(&self, job: JobId) -> ApiResult<bool> {
            Ok(job == JobId::new(42))
        }

        async fn get_job_status(&self, _job: JobId) -> ApiResult<JobStatus> {
            serde_json::from_value(json!({"opresult": ["created-ok"]}))
                .map_err(|e| ApiError::Decode(e.to_string()))
        }
    }

    let proxy = VersionGated::new(Creator, rwl_core::noop_recorder());
    let resolver = JobResolver::new(&proxy, WaitPolicy::default(), rwl_core::noop_recorder());
    let spec = CreateInstanceSpec::create("inst1", DiskTemplate::Plain, vec![], vec![]);

    let result = resolver
        .finish(
            Op::CreateInstance,
            resolver.rapi().create_instance(&spec, DryRun::disabled()),
        )
        .await;
    assert_eq!(result, Some(json!("created-ok")));
}

#[tokio::test]
async fn tag_cycle_restores_empty_set() {
    let proxy = VersionGated::new(
        FakeCluster::new(Capabilities::all()),
        rwl_core::noop_recorder(),
    );
    let resolver = JobResolver::new(&proxy, WaitPolicy::default(), rwl_core::noop_recorder());

    run_tags(&resolver, TagScope::Node("node1")).await;

    let cluster = proxy.client();
    assert_eq!(cluster.get_tags(Op::GetNodeTags, "node/node1").unwrap(), Tags::new());
    assert_eq!(
        cluster.calls_of(Op::AddNodeTags),
        vec![
            (tags(&["tag1", "tag2", "tag3"]), true),
            (tags(&["tag1", "tag2", "tag3"]), false),
        ]
    );
    assert_eq!(
        cluster.calls_of(Op::DeleteNodeTags),
        vec![
            (tags(&["tag1"]), true),
            (tags(&["tag1"]), false),
            (tags(&["tag2", "tag3"]), false),
        ]
    );
    // The check above issued one more read.
    assert_eq!(cluster.calls_of(Op::GetNodeTags).len(), 5);
}

#[tokio::test]
async fn full_workload_leaves_cluster_clean() {
    let rec = Arc::new(MemoryRecorder::new());
    let client = FakeCluster::new(Capabilities::all()).with_instance("leftover.example.com");
    let proxy = VersionGated::new(client, rec.clone());
    let workload = Workload::new(
        &proxy,
        pool(&["node1", "node2"], &["inst1", "inst2"]),
        rec.clone(),
    )
    .with_policy(WaitPolicy::bounded(Duration::from_secs(5)));

    let summary = workload.run().await.unwrap();

    let cluster = proxy.client().lock();
    assert!(cluster.instances.is_empty(), "left: {:?}", cluster.instances);
    assert!(cluster.tags.values().all(BTreeSet::is_empty));
    assert_eq!(summary.jobs_failed, 0);
    assert_eq!(summary.jobs_timed_out, 0);
    // Methods the fake does not implement are absorbed as missing.
    assert!(summary.missing > 0);

    let deletes: Vec<&Vec<String>> = cluster
        .calls
        .iter()
        .filter(|(op, _, dry)| *op == Op::DeleteInstance && !dry)
        .map(|(_, names, _)| names)
        .collect();
    assert_eq!(deletes[0], &vec!["leftover.example.com".to_string()]);
    assert_eq!(deletes.last().unwrap(), &&vec!["inst1".to_string()]);
    drop(cluster);

    // The instance was renamed to the alternate name and back.
    assert!(rec.events().iter().any(|e| matches!(
        e,
        CallEvent::Forwarded {
            op: Op::RenameInstance
        }
    )));
}

#[tokio::test]
async fn leftover_instances_abort_the_run() {
    let mut client = FakeCluster::new(Capabilities::all()).with_instance("stuck.example.com");
    client.refuse_deletes = true;
    let proxy = VersionGated::new(client, rwl_core::noop_recorder());
    let workload = Workload::new(
        &proxy,
        pool(&["node1", "node2"], &["inst1", "inst2"]),
        rwl_core::noop_recorder(),
    );

    match workload.run().await {
        Err(WorkloadError::InstancesRemain(names)) => {
            assert_eq!(names, vec!["stuck.example.com".to_string()]);
        }
        other => panic!("expected leftover instances, got {other:?}"),
    }
    assert!(proxy.client().calls_of(Op::CreateInstance).is_empty());
}

#[tokio::test]
async fn too_few_nodes_is_a_pool_error() {
    let proxy = VersionGated::new(
        FakeCluster::new(Capabilities::all()),
        rwl_core::noop_recorder(),
    );
    let workload = Workload::new(&proxy, pool(&["node1"], &["inst1", "inst2"]), rwl_core::noop_recorder());

    assert!(matches!(workload.run().await, Err(WorkloadError::Pool(_))));
}

#[tokio::test]
async fn instance_stranded_by_failed_rename_is_removed() {
    let mut client = FakeCluster::new(Capabilities::all());
    client.broken_rename = Some("inst2".to_string());
    let proxy = VersionGated::new(client, rwl_core::noop_recorder());
    let workload = Workload::new(
        &proxy,
        pool(&["node1", "node2"], &["inst1", "inst2"]),
        rwl_core::noop_recorder(),
    );

    workload.run().await.unwrap();

    let cluster = proxy.client();
    assert!(cluster.lock().instances.is_empty());
    let last_delete = cluster
        .calls_of(Op::DeleteInstance)
        .into_iter()
        .filter(|(_, dry)| !dry)
        .last()
        .map(|(names, _)| names);
    assert_eq!(last_delete, Some(vec!["inst2".to_string()]));
}

#[tokio::test]
async fn instance_left_by_the_scenario_aborts_the_run() {
    let mut client = FakeCluster::new(Capabilities::all());
    client.refuse_deletes = true;
    let proxy = VersionGated::new(client, rwl_core::noop_recorder());
    let pool = pool(&["node1", "node2"], &["inst1", "inst2"]);
    let workload = Workload::new(&proxy, pool.clone(), rwl_core::noop_recorder());

    match workload.run().await {
        Err(WorkloadError::InstancesRemain(names)) => {
            assert_eq!(names, vec!["inst1".to_string()]);
        }
        other => panic!("expected leftover instances, got {other:?}"),
    }
    assert_eq!(pool.free_instances(), 2);
}
