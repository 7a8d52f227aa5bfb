use std::future::Future;

use serde_json::Value;
use tracing::debug;

use rwl_model::{
    CreateInstanceSpec, DryRun, GrowDiskSpec, Invocation, JobId, JobStatus, ModifyInstanceSpec, Op,
    PowerOptions, RebootOptions, RecreateDisksSpec, ReinstallSpec, RenameOptions, Tags,
};

use crate::{
    capability::{Binding, Bindings},
    client::{ApiResult, RapiClient},
    proxy::Forwarding,
    recorder::RecorderHandle,
    reply::Reply,
};

/// Proxy that only forwards operations the client declares.
///
/// The binding of every operation is resolved once, from
/// [`RapiClient::capabilities`], when the proxy is built. Calls to a mocked
/// operation never reach the client: the pending call is dropped unpolled
/// and [`Reply::Missing`] is returned.
pub struct VersionGated<C> {
    inner: Forwarding<C>,
    bindings: Bindings,
}

impl<C: RapiClient> VersionGated<C> {
    pub fn new(client: C, recorder: RecorderHandle) -> Self {
        let bindings = Bindings::resolve(&client.capabilities());
        for op in bindings.mocked() {
            debug!(op = %op, "operation not provided by client, calls will be mocked");
        }
        Self {
            inner: Forwarding::new(client, recorder),
            bindings,
        }
    }

    pub fn client(&self) -> &C {
        self.inner.client()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    async fn gate<T, F>(&self, op: Op, call: F) -> Reply<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        match self.bindings.get(op) {
            Binding::Forward => self.inner.forward(op, call).await,
            Binding::Mock => self.inner.mock(op),
        }
    }
}

rapi_adapter!(VersionGated, gate);
