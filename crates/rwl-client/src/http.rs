use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, trace};

use rwl_core::{ApiError, ApiResult, Capabilities, RapiClient};
use rwl_model::{
    CreateInstanceSpec, DryRun, GrowDiskSpec, Invocation, JobId, JobState, JobStatus,
    ModifyInstanceSpec, PollStrategy, PowerOptions, QaConfig, RapiConfig, RebootOptions,
    RecreateDisksSpec, ReinstallSpec, RenameOptions, Tags,
};

use crate::{error::ClientError, query::Query};

/// Version of the instance creation request body.
const CREATE_REQUEST_VERSION: u32 = 1;

/// Base URL of the RAPI endpoint described by `cfg`.
pub fn base_url(cfg: &QaConfig) -> Result<String, ClientError> {
    let scheme = cfg.rapi.scheme.as_str();
    if scheme != "http" && scheme != "https" {
        return Err(ClientError::Scheme(scheme.to_string()));
    }
    let host = cfg.rapi_host().ok_or(ClientError::MissingHost)?;
    Ok(format!("{scheme}://{host}:{}", cfg.rapi.port))
}

/// Error body returned by the server with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    explain: Option<String>,
}

fn http_error(code: u16, body: &[u8]) -> ApiError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = match (parsed.message, parsed.explain) {
        (Some(message), Some(explain)) if explain != message => format!("{message}: {explain}"),
        (Some(message), _) => message,
        (None, Some(explain)) => explain,
        (None, None) => String::from_utf8_lossy(body).trim().to_string(),
    };
    ApiError::Http { code, message }
}

fn encode<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Reduces a non-bulk listing to the `id` of every entry.
fn ids_only(listing: Value) -> Value {
    match listing {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut obj) => match obj.remove("id") {
                        Some(id) => id,
                        None => Value::Object(obj),
                    },
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

/// RAPI client over HTTP(S) with basic authentication.
pub struct HttpRapiClient {
    http: Client,
    base: String,
    username: String,
    password: Option<String>,
    caps: Capabilities,
    poll: PollStrategy,
}

impl HttpRapiClient {
    /// Client for the endpoint at `base` (`scheme://host:port`).
    ///
    /// Operations listed in `rapi.disabled_ops` are left out of the
    /// capability manifest.
    pub fn new(
        base: impl Into<String>,
        rapi: &RapiConfig,
        password: Option<String>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(rapi.timeout_ms))
            .danger_accept_invalid_certs(!rapi.verify_tls)
            .build()?;

        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
            username: rapi.username.clone(),
            password,
            caps: Capabilities::all().without(rapi.disabled_ops.iter().copied()),
            poll: PollStrategy::default(),
        })
    }

    /// Client for the endpoint of a QA configuration.
    pub fn from_config(cfg: &QaConfig, password: Option<String>) -> Result<Self, ClientError> {
        Ok(Self::new(base_url(cfg)?, &cfg.rapi, password)?.with_poll(cfg.workload.poll.clone()))
    }

    pub fn with_poll(mut self, poll: PollStrategy) -> Self {
        self.poll = poll;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base, path);
        trace!(%method, %url, query = ?query.pairs(), "RAPI request");

        let mut req = self.http.request(method, &url).query(query.pairs());
        if let Some(password) = &self.password {
            req = req.basic_auth(&self.username, Some(password));
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &bytes));
        }
        let raw: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(raw).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get(&self, path: &str, query: Query) -> ApiResult<Value> {
        self.call(Method::GET, path, query, None).await
    }

    /// A request whose answer may be a job id.
    async fn submit(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> ApiResult<Invocation> {
        let raw: Value = self.call(method, path, query, body).await?;
        Ok(Invocation::from_value(raw))
    }

    async fn listing(&self, path: &str, bulk: bool) -> ApiResult<Value> {
        let listing = self.get(path, Query::new().bulk(bulk)).await?;
        Ok(if bulk { listing } else { ids_only(listing) })
    }

    async fn tags_of(&self, path: &str) -> ApiResult<Tags> {
        self.call(Method::GET, path, Query::new(), None).await
    }

    async fn change_tags(
        &self,
        method: Method,
        path: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        self.submit(method, path, Query::new().tags(tags).dry_run(dry_run), None)
            .await
    }
}

fn instance(name: &str) -> String {
    format!("/2/instances/{name}")
}

#[async_trait]
impl RapiClient for HttpRapiClient {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    async fn get_version(&self) -> ApiResult<Value> {
        self.get("/version", Query::new()).await
    }

    async fn get_features(&self) -> ApiResult<Value> {
        self.get("/2/features", Query::new()).await
    }

    async fn get_operating_systems(&self) -> ApiResult<Value> {
        self.get("/2/os", Query::new()).await
    }

    async fn get_info(&self) -> ApiResult<Value> {
        self.get("/2/info", Query::new()).await
    }

    async fn redistribute_config(&self) -> ApiResult<Invocation> {
        self.submit(Method::PUT, "/2/redistribute-config", Query::new(), None)
            .await
    }

    async fn get_cluster_tags(&self) -> ApiResult<Tags> {
        self.tags_of("/2/tags").await
    }

    async fn add_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> ApiResult<Invocation> {
        self.change_tags(Method::PUT, "/2/tags", tags, dry_run).await
    }

    async fn delete_cluster_tags(&self, tags: &[String], dry_run: DryRun) -> ApiResult<Invocation> {
        self.change_tags(Method::DELETE, "/2/tags", tags, dry_run)
            .await
    }

    async fn get_instances(&self, bulk: bool) -> ApiResult<Value> {
        self.listing("/2/instances", bulk).await
    }

    async fn get_instance(&self, name: &str) -> ApiResult<Value> {
        self.get(&instance(name), Query::new()).await
    }

    async fn get_instance_info(&self, name: &str, static_only: bool) -> ApiResult<Invocation> {
        let path = format!("{}/info", instance(name));
        self.submit(
            Method::GET,
            &path,
            Query::new().flag("static", static_only),
            None,
        )
        .await
    }

    async fn create_instance(
        &self,
        spec: &CreateInstanceSpec,
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let mut body = encode(spec)?;
        if let Value::Object(obj) = &mut body {
            obj.insert("__version__".to_string(), json!(CREATE_REQUEST_VERSION));
        }
        self.submit(
            Method::POST,
            "/2/instances",
            Query::new().dry_run(dry_run),
            Some(body),
        )
        .await
    }

    async fn delete_instance(&self, name: &str, dry_run: DryRun) -> ApiResult<Invocation> {
        self.submit(
            Method::DELETE,
            &instance(name),
            Query::new().dry_run(dry_run),
            None,
        )
        .await
    }

    async fn get_instance_tags(&self, name: &str) -> ApiResult<Tags> {
        self.tags_of(&format!("{}/tags", instance(name))).await
    }

    async fn add_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let path = format!("{}/tags", instance(name));
        self.change_tags(Method::PUT, &path, tags, dry_run).await
    }

    async fn delete_instance_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let path = format!("{}/tags", instance(name));
        self.change_tags(Method::DELETE, &path, tags, dry_run).await
    }

    async fn grow_instance_disk(&self, name: &str, spec: &GrowDiskSpec) -> ApiResult<Invocation> {
        let path = format!("{}/disk/{}/grow", instance(name), spec.disk);
        self.submit(Method::POST, &path, Query::new(), Some(encode(spec)?))
            .await
    }

    async fn reboot_instance(&self, name: &str, opts: &RebootOptions) -> ApiResult<Invocation> {
        let path = format!("{}/reboot", instance(name));
        let query = Query::new()
            .param("type", opts.kind.as_str())
            .flag("ignore_secondaries", opts.ignore_secondaries)
            .dry_run(opts.dry_run)
            .opt("reason", opts.reason.as_deref());
        self.submit(Method::POST, &path, query, None).await
    }

    async fn shutdown_instance(&self, name: &str, opts: &PowerOptions) -> ApiResult<Invocation> {
        let path = format!("{}/shutdown", instance(name));
        self.submit(Method::PUT, &path, power_query(opts), None)
            .await
    }

    async fn startup_instance(&self, name: &str, opts: &PowerOptions) -> ApiResult<Invocation> {
        let path = format!("{}/startup", instance(name));
        self.submit(Method::PUT, &path, power_query(opts), None)
            .await
    }

    async fn modify_instance(
        &self,
        name: &str,
        spec: &ModifyInstanceSpec,
    ) -> ApiResult<Invocation> {
        let path = format!("{}/modify", instance(name));
        self.submit(Method::PUT, &path, Query::new(), Some(encode(spec)?))
            .await
    }

    async fn rename_instance(
        &self,
        name: &str,
        new_name: &str,
        opts: RenameOptions,
    ) -> ApiResult<Invocation> {
        let path = format!("{}/rename", instance(name));
        let mut body = json!({ "new_name": new_name });
        if let Value::Object(obj) = &mut body {
            if let Some(ip_check) = opts.ip_check {
                obj.insert("ip_check".to_string(), json!(ip_check));
            }
            if let Some(name_check) = opts.name_check {
                obj.insert("name_check".to_string(), json!(name_check));
            }
        }
        self.submit(Method::PUT, &path, Query::new(), Some(body))
            .await
    }

    async fn deactivate_instance_disks(&self, name: &str) -> ApiResult<Invocation> {
        let path = format!("{}/deactivate-disks", instance(name));
        self.submit(Method::PUT, &path, Query::new(), None).await
    }

    async fn activate_instance_disks(&self, name: &str) -> ApiResult<Invocation> {
        let path = format!("{}/activate-disks", instance(name));
        self.submit(Method::PUT, &path, Query::new(), None).await
    }

    async fn recreate_instance_disks(
        &self,
        name: &str,
        spec: &RecreateDisksSpec,
    ) -> ApiResult<Invocation> {
        let path = format!("{}/recreate-disks", instance(name));
        self.submit(Method::POST, &path, Query::new(), Some(encode(spec)?))
            .await
    }

    async fn get_instance_console(&self, name: &str) -> ApiResult<Value> {
        self.get(&format!("{}/console", instance(name)), Query::new())
            .await
    }

    async fn reinstall_instance(&self, name: &str, spec: &ReinstallSpec) -> ApiResult<Invocation> {
        let path = format!("{}/reinstall", instance(name));
        let mut body = json!({ "start": !spec.no_startup });
        if let Value::Object(obj) = &mut body {
            if let Some(os) = &spec.os {
                obj.insert("os".to_string(), json!(os));
            }
            if let Some(osparams) = &spec.osparams {
                obj.insert("osparams".to_string(), Value::Object(osparams.clone()));
            }
        }
        self.submit(Method::POST, &path, Query::new(), Some(body))
            .await
    }

    async fn get_jobs(&self, bulk: bool) -> ApiResult<Value> {
        self.listing("/2/jobs", bulk).await
    }

    async fn get_job_status(&self, job: JobId) -> ApiResult<JobStatus> {
        self.call(Method::GET, &format!("/2/jobs/{job}"), Query::new(), None)
            .await
    }

    async fn wait_for_job_completion(&self, job: JobId) -> ApiResult<bool> {
        let mut attempt = 0u32;
        loop {
            let status = self.get_job_status(job).await?;
            if let Some(state) = status.status.filter(|s| s.is_finalized()) {
                debug!(job = %job, ?state, "job finalized");
                return Ok(state == JobState::Success);
            }
            tokio::time::sleep(self.poll.delay(attempt)).await;
            attempt = attempt.saturating_add(1);
        }
    }

    async fn get_nodes(&self, bulk: bool) -> ApiResult<Value> {
        self.listing("/2/nodes", bulk).await
    }

    async fn get_node_tags(&self, name: &str) -> ApiResult<Tags> {
        self.tags_of(&format!("/2/nodes/{name}/tags")).await
    }

    async fn add_node_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let path = format!("/2/nodes/{name}/tags");
        self.change_tags(Method::PUT, &path, tags, dry_run).await
    }

    async fn delete_node_tags(
        &self,
        name: &str,
        tags: &[String],
        dry_run: DryRun,
    ) -> ApiResult<Invocation> {
        let path = format!("/2/nodes/{name}/tags");
        self.change_tags(Method::DELETE, &path, tags, dry_run).await
    }

    async fn get_networks(&self, bulk: bool) -> ApiResult<Value> {
        self.listing("/2/networks", bulk).await
    }

    async fn get_groups(&self, bulk: bool) -> ApiResult<Value> {
        self.listing("/2/groups", bulk).await
    }
}

fn power_query(opts: &PowerOptions) -> Query {
    Query::new()
        .dry_run(opts.dry_run)
        .flag("no_remember", opts.no_remember)
        .opt("reason", opts.reason.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_server_fields() {
        let body = br#"{"code": 400, "message": "Bad Request", "explain": "Instance exists"}"#;
        assert_eq!(
            http_error(400, body),
            ApiError::http(400, "Bad Request: Instance exists")
        );
        assert_eq!(
            http_error(404, br#"{"message": "Not Found"}"#),
            ApiError::http(404, "Not Found")
        );
        assert_eq!(
            http_error(502, b"bad gateway\n"),
            ApiError::http(502, "bad gateway")
        );
    }

    #[test]
    fn listing_keeps_ids() {
        let listing = json!([
            {"id": "inst1", "uri": "/2/instances/inst1"},
            {"id": 4, "uri": "/2/jobs/4"},
            "plain",
        ]);
        assert_eq!(ids_only(listing), json!(["inst1", 4, "plain"]));
    }

    #[test]
    fn base_url_defaults_to_master() {
        let cfg: QaConfig =
            serde_json::from_value(json!({"name": "c", "nodes": [{"primary": "node1"}]})).unwrap();
        assert_eq!(base_url(&cfg).unwrap(), "https://node1:5080");

        let ftp: QaConfig = serde_json::from_value(
            json!({"name": "c", "nodes": [{"primary": "node1"}], "rapi": {"scheme": "ftp"}}),
        )
        .unwrap();
        assert!(matches!(base_url(&ftp), Err(ClientError::Scheme(_))));
    }

    #[test]
    fn disabled_ops_are_not_advertised() {
        let rapi = RapiConfig {
            disabled_ops: vec![rwl_model::Op::GetNetworks],
            ..Default::default()
        };
        let client = HttpRapiClient::new("http://127.0.0.1:1/", &rapi, None).unwrap();
        assert_eq!(client.base(), "http://127.0.0.1:1");
        assert!(!client.capabilities().supports(rwl_model::Op::GetNetworks));
        assert!(client.capabilities().supports(rwl_model::Op::GetGroups));
    }
}
