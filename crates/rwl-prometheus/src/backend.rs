use std::sync::Arc;

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder, proto::MetricFamily};

use rwl_core::{CallRecorder, JobOutcome};
use rwl_model::{JobId, Op};

/// Prometheus recorder for workload runs.
///
/// ## Metrics
/// - `rwl_calls_total{op, outcome}` - Calls seen by the proxy and the resolver
/// - `rwl_jobs_total{op, outcome}` - Jobs the resolver waited for
///
/// ## Label cardinality
/// All labels are bounded:
/// - `op`: one of the RAPI operation names
/// - call `outcome`: "forwarded", "missing", "rejected", "immediate"
/// - job `outcome`: "success", "failure", "timeout"
#[derive(Clone)]
pub struct PrometheusRecorder {
    calls: CounterVec,
    jobs: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusRecorder {
    /// Create a new recorder registering into `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let calls = CounterVec::new(
            Opts::new("calls_total", "RAPI calls by operation and outcome").namespace("rwl"),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(calls.clone()))?;

        let jobs = CounterVec::new(
            Opts::new("jobs_total", "Jobs waited for by operation and outcome").namespace("rwl"),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(jobs.clone()))?;

        Ok(Self {
            calls,
            jobs,
            registry,
        })
    }

    /// Create a new recorder with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render the gathered metrics in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn call(&self, op: Op, outcome: &str) {
        self.calls.with_label_values(&[op.name(), outcome]).inc();
    }
}

impl CallRecorder for PrometheusRecorder {
    fn record_forwarded(&self, op: Op) {
        self.call(op, "forwarded");
    }

    fn record_missing(&self, op: Op) {
        self.call(op, "missing");
    }

    fn record_rejected(&self, op: Op, _message: &str) {
        self.call(op, "rejected");
    }

    fn record_immediate(&self, op: Op) {
        self.call(op, "immediate");
    }

    fn record_job(&self, op: Op, _job: JobId, outcome: JobOutcome) {
        self.jobs
            .with_label_values(&[op.name(), outcome.as_label()])
            .inc();
    }
}
