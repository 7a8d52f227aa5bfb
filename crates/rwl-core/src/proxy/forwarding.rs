use std::future::Future;

use serde_json::Value;
use tracing::{info, warn};

use rwl_model::{
    CreateInstanceSpec, DryRun, GrowDiskSpec, Invocation, JobId, JobStatus, ModifyInstanceSpec, Op,
    PowerOptions, RebootOptions, RecreateDisksSpec, ReinstallSpec, RenameOptions, Tags,
};

use crate::{
    client::{ApiResult, RapiClient},
    error::ApiError,
    recorder::RecorderHandle,
    reply::{CallFailure, Reply},
};

/// Sends every call to the client and absorbs its errors.
///
/// A call failing with [`ApiError::Unsupported`] is treated as a missing
/// operation; any other error is logged and turned into
/// [`Reply::Rejected`].
pub struct Forwarding<C> {
    client: C,
    recorder: RecorderHandle,
}

impl<C: RapiClient> Forwarding<C> {
    pub fn new(client: C, recorder: RecorderHandle) -> Self {
        Self { client, recorder }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn recorder(&self) -> &RecorderHandle {
        &self.recorder
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    pub(crate) async fn forward<T, F>(&self, op: Op, call: F) -> Reply<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        info!(op = %op, "using method");
        self.recorder.record_forwarded(op);

        match call.await {
            Ok(value) => Reply::Value(value),
            Err(ApiError::Unsupported(_)) => self.mock(op),
            Err(err) => {
                let message = err.to_string();
                warn!(op = %op, error = %message, "RAPI error while performing operation");
                self.recorder.record_rejected(op, &message);
                Reply::Rejected(CallFailure { op, message })
            }
        }
    }

    /// Answers in place of an operation the client does not have.
    pub(crate) fn mock<T>(&self, op: Op) -> Reply<T> {
        warn!(op = %op, "missing operation; supplying mock");
        self.recorder.record_missing(op);
        Reply::Missing(op)
    }
}

rapi_adapter!(Forwarding, forward);

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        proxy::Rapi,
        recorder::{CallEvent, CallRecorder, MemoryRecorder},
    };

    #[derive(Default)]
    struct Flaky {
        creates: AtomicUsize,
    }

    #[async_trait]
    impl RapiClient for Flaky {
        async fn get_info(&self) -> ApiResult<Value> {
            Ok(json!({"name": "cluster"}))
        }

        async fn create_instance(
            &self,
            _spec: &CreateInstanceSpec,
            _dry_run: DryRun,
        ) -> ApiResult<Invocation> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::http(400, "instance already exists"))
        }
    }

    fn spec() -> CreateInstanceSpec {
        CreateInstanceSpec::create("inst1", rwl_model::DiskTemplate::Plain, vec![], vec![])
    }

    #[tokio::test]
    async fn passes_values_through() {
        let proxy = Forwarding::new(Flaky::default(), crate::recorder::noop_recorder());
        assert_eq!(proxy.get_info().await, Reply::Value(json!({"name": "cluster"})));
    }

    #[tokio::test]
    async fn api_errors_become_rejected() {
        let rec = Arc::new(MemoryRecorder::new());
        let proxy = Forwarding::new(Flaky::default(), rec.clone());

        let reply = proxy.create_instance(&spec(), DryRun::disabled()).await;
        match reply {
            Reply::Rejected(failure) => {
                assert_eq!(failure.op, Op::CreateInstance);
                assert!(failure.message.contains("instance already exists"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(proxy.client().creates.load(Ordering::SeqCst), 1);
        assert_eq!(
            rec.events(),
            vec![
                CallEvent::Forwarded { op: Op::CreateInstance },
                CallEvent::Rejected {
                    op: Op::CreateInstance,
                    message: "RAPI error 400: instance already exists".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_at_call_time_is_missing() {
        let rec = Arc::new(MemoryRecorder::new());
        let proxy = Forwarding::new(Flaky::default(), rec.clone());

        assert_eq!(proxy.get_networks(true).await, Reply::Missing(Op::GetNetworks));
        assert_eq!(rec.summary().unwrap().missing, 1);
    }
}
