use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};

/// Instance creation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationMode {
    #[default]
    Create,
    Import,
    RemoteImport,
}

/// Disk layout of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskTemplate {
    Diskless,
    Plain,
    Drbd,
    File,
    SharedFile,
    Blockdev,
    Rbd,
}

impl DiskTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            DiskTemplate::Diskless => "diskless",
            DiskTemplate::Plain => "plain",
            DiskTemplate::Drbd => "drbd",
            DiskTemplate::File => "file",
            DiskTemplate::SharedFile => "sharedfile",
            DiskTemplate::Blockdev => "blockdev",
            DiskTemplate::Rbd => "rbd",
        }
    }
}

impl fmt::Display for DiskTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskTemplate {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diskless" => Ok(DiskTemplate::Diskless),
            "plain" => Ok(DiskTemplate::Plain),
            "drbd" => Ok(DiskTemplate::Drbd),
            "file" => Ok(DiskTemplate::File),
            "sharedfile" => Ok(DiskTemplate::SharedFile),
            "blockdev" => Ok(DiskTemplate::Blockdev),
            "rbd" => Ok(DiskTemplate::Rbd),
            other => Err(ModelError::UnknownDiskTemplate(other.to_string())),
        }
    }
}

/// Disk size as sent to the server.
///
/// The server accepts a number of mebibytes as well as a string, either
/// numeric (`"1000"`) or with a unit suffix (`"1gb"`). The workload sends all
/// three encodings on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiskSize {
    Mebibytes(u64),
    Text(String),
}

impl From<u64> for DiskSize {
    fn from(mib: u64) -> Self {
        DiskSize::Mebibytes(mib)
    }
}

impl From<&str> for DiskSize {
    fn from(s: &str) -> Self {
        DiskSize::Text(s.to_string())
    }
}

/// One disk of a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSpec {
    pub size: DiskSize,
}

impl DiskSpec {
    pub fn new(size: impl Into<DiskSize>) -> Self {
        Self { size: size.into() }
    }
}

/// One network interface of a new instance. An empty spec asks for cluster defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

/// Body of `POST /2/instances` (request version 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInstanceSpec {
    pub mode: CreationMode,
    pub name: String,
    pub disk_template: DiskTemplate,
    pub disks: Vec<DiskSpec>,
    pub nics: Vec<NicSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snode: Option<String>,
}

impl CreateInstanceSpec {
    /// Plain `create` request for `name` with the given disks and nics.
    pub fn create(
        name: impl Into<String>,
        disk_template: DiskTemplate,
        disks: Vec<DiskSpec>,
        nics: Vec<NicSpec>,
    ) -> Self {
        Self {
            mode: CreationMode::Create,
            name: name.into(),
            disk_template,
            disks,
            nics,
            os: None,
            pnode: None,
            snode: None,
        }
    }

    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    pub fn with_pnode(mut self, node: impl Into<String>) -> Self {
        self.pnode = Some(node.into());
        self
    }
}

/// Body of `POST /2/instances/{name}/disk/{idx}/grow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowDiskSpec {
    #[serde(skip)]
    pub disk: u32,
    /// Amount to add, in mebibytes.
    pub amount: u64,
    pub wait_for_sync: bool,
}

/// Body of `PUT /2/instances/{name}/modify`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyInstanceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_template: Option<DiskTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_node: Option<String>,
}

impl ModifyInstanceSpec {
    /// Convert to `template`, mirroring onto `remote_node` when it is given.
    pub fn convert_to(template: DiskTemplate, remote_node: Option<String>) -> Self {
        Self {
            disk_template: Some(template),
            remote_node,
        }
    }
}

/// Checks performed by `PUT /2/instances/{name}/rename`.
///
/// An unset check is left out of the request so the server default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenameOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_check: Option<bool>,
}

impl RenameOptions {
    /// Both checks explicitly enabled.
    pub fn checked() -> Self {
        Self {
            ip_check: Some(true),
            name_check: Some(true),
        }
    }
}

/// Body of `POST /2/instances/{name}/recreate-disks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecreateDisksSpec {
    pub disks: Vec<u32>,
    pub nodes: Vec<String>,
}

/// Body of `POST /2/instances/{name}/reinstall`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReinstallSpec {
    /// `None` keeps the instance's current OS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    pub no_startup: bool,
    /// Sent whenever set, even when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osparams: Option<Map<String, Value>>,
}
