use std::{path::Path, process::ExitCode, sync::Arc};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use rwl_client::HttpRapiClient;
use rwl_core::{
    FanOutRecorder, MemoryRecorder, RecorderHandle, ResourcePool, VersionGated, WaitPolicy,
    Workload,
};
use rwl_exec::{ClusterBootstrap, SshBootstrap, SshRunner, lookup_rapi_secret};
use rwl_model::{ConfigError, QaConfig, read_json};
use rwl_observe::{LoggerConfig, init_logger};
use rwl_prometheus::PrometheusRecorder;

/// The QA configuration file plus the logger section.
#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(flatten)]
    qa: QaConfig,
    #[serde(default)]
    logger: LoggerConfig,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg: FileConfig = read_json(path)?;
        cfg.qa.validate()?;
        Ok(cfg)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().collect();
    let [_, path] = args.as_slice() else {
        eprintln!("Usage: rwl-workload <qa-config.json>");
        return Ok(ExitCode::from(2));
    };

    // 1) configuration + logger
    let FileConfig { qa: cfg, logger } = FileConfig::load(Path::new(path))?;
    init_logger(&logger)?;
    info!(cluster = %cfg.name, nodes = cfg.nodes.len(), "configuration loaded");

    // 2) join every node
    let bootstrap = SshBootstrap::new(SshRunner::new(), &cfg)?;
    bootstrap
        .add_all_nodes()
        .await
        .context("failed to add nodes")?;

    // 3) client
    let password = match cfg.rapi.password.clone() {
        Some(password) => password,
        None => {
            let master = cfg.master().context("no master node")?;
            lookup_rapi_secret(bootstrap.runner(), &master.primary, &cfg.rapi.username).await?
        }
    };
    let client = HttpRapiClient::from_config(&cfg, Some(password))?;
    info!(endpoint = client.base(), "RAPI client ready");

    // 4) recorders
    let trace = Arc::new(MemoryRecorder::new());
    let metrics = PrometheusRecorder::new()?;
    let recorder: RecorderHandle = Arc::new(
        FanOutRecorder::default()
            .with(trace.clone())
            .with(Arc::new(metrics.clone())),
    );

    // 5) workload
    let proxy = VersionGated::new(client, recorder.clone());
    let workload = Workload::new(&proxy, ResourcePool::from_config(&cfg), recorder)
        .with_policy(WaitPolicy::from(&cfg.workload));
    let outcome = workload.run().await;

    if let Err(e) = &outcome {
        error!(error = %e, "workload aborted");
    }
    if let Some(trace_path) = &cfg.trace_path {
        match trace.write_jsonl(trace_path) {
            Ok(()) => info!(path = %trace_path.display(), "call trace written"),
            Err(e) => warn!(path = %trace_path.display(), error = %e, "failed to write call trace"),
        }
    }
    match metrics.encode_text() {
        Ok(text) => debug!(metrics = %text, "run metrics"),
        Err(e) => warn!(error = %e, "failed to encode metrics"),
    }

    // 6) back to a master-only cluster
    bootstrap
        .remove_all_nodes()
        .await
        .context("failed to remove nodes")?;

    outcome?;
    Ok(ExitCode::SUCCESS)
}
