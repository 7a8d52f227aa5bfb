use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;

/// RAPI client operation.
///
/// Every call the workload issues is identified by one of these variants.
/// [`Op::name`] returns the client method name, which is what ends up in logs
/// and call traces so that runs against different versions can be diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    GetVersion,
    GetFeatures,
    GetOperatingSystems,
    GetInfo,
    RedistributeConfig,
    GetClusterTags,
    AddClusterTags,
    DeleteClusterTags,
    GetInstances,
    GetInstance,
    GetInstanceInfo,
    CreateInstance,
    DeleteInstance,
    GetInstanceTags,
    AddInstanceTags,
    DeleteInstanceTags,
    GrowInstanceDisk,
    RebootInstance,
    ShutdownInstance,
    StartupInstance,
    ModifyInstance,
    RenameInstance,
    DeactivateInstanceDisks,
    ActivateInstanceDisks,
    RecreateInstanceDisks,
    GetInstanceConsole,
    ReinstallInstance,
    GetJobs,
    GetJobStatus,
    WaitForJobCompletion,
    GetNodes,
    GetNodeTags,
    AddNodeTags,
    DeleteNodeTags,
    GetNetworks,
    GetGroups,
}

impl Op {
    /// All operations in declaration order.
    pub const ALL: [Op; 36] = [
        Op::GetVersion,
        Op::GetFeatures,
        Op::GetOperatingSystems,
        Op::GetInfo,
        Op::RedistributeConfig,
        Op::GetClusterTags,
        Op::AddClusterTags,
        Op::DeleteClusterTags,
        Op::GetInstances,
        Op::GetInstance,
        Op::GetInstanceInfo,
        Op::CreateInstance,
        Op::DeleteInstance,
        Op::GetInstanceTags,
        Op::AddInstanceTags,
        Op::DeleteInstanceTags,
        Op::GrowInstanceDisk,
        Op::RebootInstance,
        Op::ShutdownInstance,
        Op::StartupInstance,
        Op::ModifyInstance,
        Op::RenameInstance,
        Op::DeactivateInstanceDisks,
        Op::ActivateInstanceDisks,
        Op::RecreateInstanceDisks,
        Op::GetInstanceConsole,
        Op::ReinstallInstance,
        Op::GetJobs,
        Op::GetJobStatus,
        Op::WaitForJobCompletion,
        Op::GetNodes,
        Op::GetNodeTags,
        Op::AddNodeTags,
        Op::DeleteNodeTags,
        Op::GetNetworks,
        Op::GetGroups,
    ];

    /// Number of operations.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..Op::COUNT`, usable for per-operation tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Client method name.
    pub fn name(self) -> &'static str {
        match self {
            Op::GetVersion => "GetVersion",
            Op::GetFeatures => "GetFeatures",
            Op::GetOperatingSystems => "GetOperatingSystems",
            Op::GetInfo => "GetInfo",
            Op::RedistributeConfig => "RedistributeConfig",
            Op::GetClusterTags => "GetClusterTags",
            Op::AddClusterTags => "AddClusterTags",
            Op::DeleteClusterTags => "DeleteClusterTags",
            Op::GetInstances => "GetInstances",
            Op::GetInstance => "GetInstance",
            Op::GetInstanceInfo => "GetInstanceInfo",
            Op::CreateInstance => "CreateInstance",
            Op::DeleteInstance => "DeleteInstance",
            Op::GetInstanceTags => "GetInstanceTags",
            Op::AddInstanceTags => "AddInstanceTags",
            Op::DeleteInstanceTags => "DeleteInstanceTags",
            Op::GrowInstanceDisk => "GrowInstanceDisk",
            Op::RebootInstance => "RebootInstance",
            Op::ShutdownInstance => "ShutdownInstance",
            Op::StartupInstance => "StartupInstance",
            Op::ModifyInstance => "ModifyInstance",
            Op::RenameInstance => "RenameInstance",
            Op::DeactivateInstanceDisks => "DeactivateInstanceDisks",
            Op::ActivateInstanceDisks => "ActivateInstanceDisks",
            Op::RecreateInstanceDisks => "RecreateInstanceDisks",
            Op::GetInstanceConsole => "GetInstanceConsole",
            Op::ReinstallInstance => "ReinstallInstance",
            Op::GetJobs => "GetJobs",
            Op::GetJobStatus => "GetJobStatus",
            Op::WaitForJobCompletion => "WaitForJobCompletion",
            Op::GetNodes => "GetNodes",
            Op::GetNodeTags => "GetNodeTags",
            Op::AddNodeTags => "AddNodeTags",
            Op::DeleteNodeTags => "DeleteNodeTags",
            Op::GetNetworks => "GetNetworks",
            Op::GetGroups => "GetGroups",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownOp(s.to_string()))
    }
}

impl Serialize for Op {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
