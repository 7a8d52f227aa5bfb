//! Turns possibly-queued calls into plain results.
use std::{future::Future, time::Duration};

use serde_json::Value;
use tracing::{info, warn};

use rwl_model::{Invocation, JobId, Op, WorkloadSettings};

use crate::{
    proxy::Rapi,
    recorder::{JobOutcome, RecorderHandle},
    reply::Reply,
};

/// How long the resolver waits for a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// `None` waits until the job is finalized, however long it takes.
    pub job_timeout: Option<Duration>,
}

impl WaitPolicy {
    pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    pub fn bounded(timeout: Duration) -> Self {
        Self {
            job_timeout: Some(timeout),
        }
    }

    pub fn unbounded() -> Self {
        Self { job_timeout: None }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::bounded(Self::DEFAULT_JOB_TIMEOUT)
    }
}

impl From<&WorkloadSettings> for WaitPolicy {
    fn from(settings: &WorkloadSettings) -> Self {
        Self {
            job_timeout: settings.job_timeout(),
        }
    }
}

/// Resolves calls that may return a job id.
///
/// [`JobResolver::finish`] never fails: whatever goes wrong is logged,
/// reported to the recorder, and turned into `None`.
pub struct JobResolver<'a> {
    rapi: &'a dyn Rapi,
    policy: WaitPolicy,
    recorder: RecorderHandle,
}

impl<'a> JobResolver<'a> {
    pub fn new(rapi: &'a dyn Rapi, policy: WaitPolicy, recorder: RecorderHandle) -> Self {
        Self {
            rapi,
            policy,
            recorder,
        }
    }

    /// The proxy calls are made through.
    pub fn rapi(&self) -> &'a dyn Rapi {
        self.rapi
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Runs `call` and, if it queued a job, waits for the job's result.
    ///
    /// - a terminal value is returned as is;
    /// - a job is waited for, then its status is fetched once; the first
    ///   opcode result is returned if the job succeeded;
    /// - missing or rejected calls, failed jobs and timed out waits give `None`.
    pub async fn finish<F>(&self, op: Op, call: F) -> Option<Value>
    where
        F: Future<Output = Reply<Invocation>>,
    {
        let job = match call.await {
            Reply::Value(Invocation::Queued(job)) => job,
            Reply::Value(Invocation::Immediate(value)) => {
                if !is_empty(&value) {
                    info!(op = %op, value = %value, "finish called with an operation not producing a job id");
                    self.recorder.record_immediate(op);
                }
                return Some(value);
            }
            Reply::Missing(_) | Reply::Rejected(_) => return None,
        };

        let outcome = self.wait(job).await;
        let result = self
            .rapi
            .get_job_status(job)
            .await
            .into_value()
            .map(|status| status.first_result())
            .unwrap_or(Value::Null);
        self.recorder.record_job(op, job, outcome);

        match outcome {
            JobOutcome::Success => Some(result),
            JobOutcome::Failure => {
                warn!(op = %op, job = %job, result = %result, "error encountered while performing operation");
                None
            }
            JobOutcome::Timeout => {
                warn!(op = %op, job = %job, result = %result, "gave up waiting for job");
                None
            }
        }
    }

    async fn wait(&self, job: JobId) -> JobOutcome {
        let wait = self.rapi.wait_for_job_completion(job);
        let reply = match self.policy.job_timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!(job = %job, timeout_ms = limit.as_millis() as u64, "job did not finish in time");
                    return JobOutcome::Timeout;
                }
            },
            None => wait.await,
        };
        match reply.into_value() {
            Some(true) => JobOutcome::Success,
            _ => JobOutcome::Failure,
        }
    }
}

/// Values the workload treats as "nothing came back".
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use serde_json::json;

    use rwl_model::{CreateInstanceSpec, DiskTemplate, DryRun, JobStatus};

    use super::*;
    use crate::{
        ApiError,
        client::{ApiResult, RapiClient},
        proxy::Forwarding,
        recorder::{CallEvent, MemoryRecorder, noop_recorder},
    };

    /// Answers `CreateInstance` with a fixed raw value and counts job calls.
    struct Scripted {
        create: Value,
        succeed: bool,
        hang: bool,
        status: JobStatus,
        waits: AtomicUsize,
        statuses: AtomicUsize,
        waited_for: Mutex<Vec<JobId>>,
    }

    impl Scripted {
        fn new(create: Value) -> Self {
            Self {
                create,
                succeed: true,
                hang: false,
                status: serde_json::from_value(json!({"opresult": ["created-ok"]})).unwrap(),
                waits: AtomicUsize::new(0),
                statuses: AtomicUsize::new(0),
                waited_for: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RapiClient for Scripted {
        async fn create_instance(
            &self,
            _spec: &CreateInstanceSpec,
            _dry_run: DryRun,
        ) -> ApiResult<Invocation> {
            if self.create == json!("reject") {
                return Err(ApiError::http(500, "internal"));
            }
            Ok(Invocation::from_value(self.create.clone()))
        }

        async fn wait_for_job_completion(&self, job: JobId) -> ApiResult<bool> {
            self.waits.fetch_add(1, Ordering::SeqCst);
            self.waited_for.lock().unwrap().push(job);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(self.succeed)
        }

        async fn get_job_status(&self, _job: JobId) -> ApiResult<JobStatus> {
            self.statuses.fetch_add(1, Ordering::SeqCst);
            Ok(self.status.clone())
        }
    }

    fn spec() -> CreateInstanceSpec {
        CreateInstanceSpec::create("inst1", DiskTemplate::Plain, vec![], vec![])
    }

    async fn run(client: &Forwarding<Scripted>, policy: WaitPolicy) -> Option<Value> {
        let resolver = JobResolver::new(client, policy, noop_recorder());
        let rapi = resolver.rapi();
        resolver
            .finish(
                Op::CreateInstance,
                rapi.create_instance(&spec(), DryRun::disabled()),
            )
            .await
    }

    #[tokio::test]
    async fn string_job_id_resolves_to_first_result() {
        let proxy = Forwarding::new(Scripted::new(json!("42")), noop_recorder());

        assert_eq!(run(&proxy, WaitPolicy::default()).await, Some(json!("created-ok")));
        assert_eq!(proxy.client().waits.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.client().statuses.load(Ordering::SeqCst), 1);
        assert_eq!(*proxy.client().waited_for.lock().unwrap(), vec![JobId::new(42)]);
    }

    #[tokio::test]
    async fn integer_job_id_is_waited_for_once() {
        let proxy = Forwarding::new(Scripted::new(json!(7)), noop_recorder());

        assert!(run(&proxy, WaitPolicy::unbounded()).await.is_some());
        assert_eq!(proxy.client().waits.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.client().statuses.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn terminal_values_are_returned_unchanged() {
        for value in [json!("12a"), json!({"name": "inst1"}), json!(-1), json!(null), json!(1.5)] {
            let proxy = Forwarding::new(Scripted::new(value.clone()), noop_recorder());
            assert_eq!(run(&proxy, WaitPolicy::default()).await, Some(value));
            assert_eq!(proxy.client().waits.load(Ordering::SeqCst), 0);
            assert_eq!(proxy.client().statuses.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn failed_job_yields_none() {
        let mut client = Scripted::new(json!("5"));
        client.succeed = false;
        let proxy = Forwarding::new(client, noop_recorder());

        assert_eq!(run(&proxy, WaitPolicy::default()).await, None);
        assert_eq!(proxy.client().statuses.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_call_is_not_waited_for() {
        let proxy = Forwarding::new(Scripted::new(json!("reject")), noop_recorder());

        assert_eq!(run(&proxy, WaitPolicy::default()).await, None);
        assert_eq!(proxy.client().waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wait_is_bounded() {
        let mut client = Scripted::new(json!("9"));
        client.hang = true;
        let rec = Arc::new(MemoryRecorder::new());
        let proxy = Forwarding::new(client, rec.clone());

        let resolver = JobResolver::new(
            &proxy,
            WaitPolicy::bounded(Duration::from_millis(20)),
            rec.clone(),
        );
        let result = resolver
            .finish(
                Op::CreateInstance,
                proxy.create_instance(&spec(), DryRun::disabled()),
            )
            .await;

        assert_eq!(result, None);
        assert_eq!(proxy.client().waits.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.client().statuses.load(Ordering::SeqCst), 1);
        assert!(rec.events().contains(&CallEvent::Job {
            op: Op::CreateInstance,
            job: JobId::new(9),
            outcome: JobOutcome::Timeout,
        }));
    }

    #[test]
    fn policy_from_settings() {
        let settings = WorkloadSettings::default();
        assert_eq!(WaitPolicy::from(&settings), WaitPolicy::default());

        let unbounded = WorkloadSettings {
            job_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(WaitPolicy::from(&unbounded), WaitPolicy::unbounded());
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(!is_empty(&json!("x")));
        assert!(!is_empty(&json!({"a": 1})));
    }
}
