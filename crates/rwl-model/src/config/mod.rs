//! QA configuration file.
//!
//! The workload reads the same JSON file the cluster QA uses. Only the keys
//! below are interpreted, everything else in the file is ignored.
use std::{collections::HashSet, fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Op, PollStrategy, error::ConfigError};

/// Cluster node as listed in the QA configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Primary hostname.
    pub primary: String,
    /// Secondary (replication) address, if the cluster uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

/// Instance name slot usable by the workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
}

/// RAPI endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RapiConfig {
    pub scheme: String,
    /// Endpoint host; the master node when unset.
    pub host: Option<String>,
    pub port: u16,
    pub username: String,
    /// Looked up on the master when unset.
    pub password: Option<String>,
    /// Clusters use a self-signed certificate by default.
    pub verify_tls: bool,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Operations the client should pretend not to have, to emulate an
    /// older client version.
    pub disabled_ops: Vec<Op>,
}

impl Default for RapiConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: None,
            port: 5080,
            username: "ganeti-qa".to_string(),
            password: None,
            verify_tls: false,
            timeout_ms: 60_000,
            disabled_ops: Vec::new(),
        }
    }
}

/// Knobs of the workload run itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadSettings {
    /// Upper bound for waiting on one job; `0` waits forever.
    pub job_timeout_ms: u64,
    /// Job status polling schedule.
    pub poll: PollStrategy,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            job_timeout_ms: 30 * 60 * 1_000,
            poll: PollStrategy::default(),
        }
    }
}

impl WorkloadSettings {
    pub fn job_timeout(&self) -> Option<Duration> {
        (self.job_timeout_ms > 0).then(|| Duration::from_millis(self.job_timeout_ms))
    }
}

/// Reads and parses a JSON configuration file without validating it.
///
/// Callers embedding [`QaConfig`] in a larger document (flattened) parse
/// through here and call [`QaConfig::validate`] themselves.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parsed QA configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaConfig {
    /// Cluster name.
    pub name: String,
    /// Cluster nodes; the first one is the master.
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
    #[serde(default)]
    pub rapi: RapiConfig,
    #[serde(default)]
    pub workload: WorkloadSettings,
    /// Where to write the JSON-lines call trace of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_path: Option<PathBuf>,
}

impl QaConfig {
    /// Reads, parses and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: QaConfig = read_json(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the invariants the workload relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::Invalid("at least one node is required".into()));
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.primary.trim().is_empty() {
                return Err(ConfigError::Invalid("node with empty primary name".into()));
            }
            if !seen.insert(node.primary.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate node: {}",
                    node.primary
                )));
            }
        }
        let mut seen = HashSet::new();
        for inst in &self.instances {
            if inst.name.trim().is_empty() {
                return Err(ConfigError::Invalid("instance with empty name".into()));
            }
            if !seen.insert(inst.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate instance: {}",
                    inst.name
                )));
            }
        }
        self.workload
            .poll
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The master node; always present after validation.
    pub fn master(&self) -> Option<&NodeConfig> {
        self.nodes.first()
    }

    /// RAPI host, defaulting to the master.
    pub fn rapi_host(&self) -> Option<&str> {
        self.rapi
            .host
            .as_deref()
            .or_else(|| self.master().map(|n| n.primary.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn sample() -> &'static str {
        r#"{
            "name": "cluster.example.com",
            "os": "debian-image",
            "nodes": [
                {"primary": "node1.example.com", "secondary": "192.0.2.1"},
                {"primary": "node2.example.com"}
            ],
            "instances": [
                {"name": "inst1.example.com"},
                {"name": "inst2.example.com", "nic.mac/0": "aa:00:00:00:00:01"}
            ],
            "rapi": {"disabled_ops": ["GetNetworks"]}
        }"#
    }

    #[test]
    fn parses_sample_and_ignores_unknown_keys() {
        let cfg: QaConfig = serde_json::from_str(sample()).unwrap();
        cfg.validate().unwrap();

        assert_eq!(cfg.master().unwrap().primary, "node1.example.com");
        assert_eq!(cfg.nodes[0].secondary.as_deref(), Some("192.0.2.1"));
        assert_eq!(cfg.instances.len(), 2);
        assert_eq!(cfg.rapi.disabled_ops, vec![Op::GetNetworks]);
        assert_eq!(cfg.rapi.port, 5080);
        assert_eq!(cfg.rapi.username, "ganeti-qa");
        assert_eq!(cfg.rapi_host(), Some("node1.example.com"));
    }

    #[test]
    fn default_job_timeout_is_bounded() {
        let settings = WorkloadSettings::default();
        assert_eq!(settings.job_timeout(), Some(Duration::from_secs(1800)));

        let unbounded = WorkloadSettings {
            job_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(unbounded.job_timeout(), None);
    }

    #[test]
    fn rejects_empty_and_duplicate_nodes() {
        let empty: QaConfig = serde_json::from_str(r#"{"name": "c", "nodes": []}"#).unwrap();
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));

        let dup: QaConfig = serde_json::from_str(
            r#"{"name": "c", "nodes": [{"primary": "a"}, {"primary": "a"}]}"#,
        )
        .unwrap();
        assert!(matches!(dup.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_duplicate_instances() {
        let dup: QaConfig = serde_json::from_str(
            r#"{"name": "c", "nodes": [{"primary": "a"}],
                "instances": [{"name": "i"}, {"name": "i"}]}"#,
        )
        .unwrap();
        assert!(dup.validate().is_err());
    }

    #[test]
    fn explicit_rapi_host_wins() {
        let cfg: QaConfig = serde_json::from_str(
            r#"{"name": "c", "nodes": [{"primary": "a"}], "rapi": {"host": "rapi.local"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.rapi_host(), Some("rapi.local"));
    }

    #[test]
    fn load_reports_path_on_errors() {
        let missing = std::env::temp_dir().join("rwl-model-missing-config.json");
        let _ = fs::remove_file(&missing);
        match QaConfig::load(&missing) {
            Err(ConfigError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected read error, got {other:?}"),
        }

        let broken = std::env::temp_dir().join(format!("rwl-model-broken-{}.json", std::process::id()));
        fs::File::create(&broken)
            .unwrap()
            .write_all(b"{not json")
            .unwrap();
        assert!(matches!(QaConfig::load(&broken), Err(ConfigError::Parse { .. })));
        let _ = fs::remove_file(&broken);
    }

    #[test]
    fn load_valid_file() {
        let path = std::env::temp_dir().join(format!("rwl-model-valid-{}.json", std::process::id()));
        fs::write(&path, sample()).unwrap();
        let cfg = QaConfig::load(&path).unwrap();
        assert_eq!(cfg.name, "cluster.example.com");
        let _ = fs::remove_file(&path);
    }
}
