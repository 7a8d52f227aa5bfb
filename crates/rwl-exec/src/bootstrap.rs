use async_trait::async_trait;
use tracing::info;

use rwl_model::{NodeConfig, QaConfig};

use crate::{ExecError, remote::CommandRunner};

/// Brings the configured nodes into the cluster and takes them out again.
///
/// A fresh QA cluster only has its master; the workload needs every node.
#[async_trait]
pub trait ClusterBootstrap: Send + Sync {
    async fn add_all_nodes(&self) -> Result<(), ExecError>;
    async fn remove_all_nodes(&self) -> Result<(), ExecError>;
}

/// Runs `gnt-node` on the master for every other configured node.
pub struct SshBootstrap<R> {
    runner: R,
    master: NodeConfig,
    others: Vec<NodeConfig>,
}

impl<R: CommandRunner> SshBootstrap<R> {
    pub fn new(runner: R, cfg: &QaConfig) -> Result<Self, ExecError> {
        let (master, others) = cfg.nodes.split_first().ok_or(ExecError::NoMaster)?;
        Ok(Self {
            runner,
            master: master.clone(),
            others: others.to_vec(),
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn add_command(node: &NodeConfig) -> Vec<String> {
        let mut cmd = vec![
            "gnt-node".to_string(),
            "add".to_string(),
            "--no-ssh-key-check".to_string(),
        ];
        if let Some(secondary) = &node.secondary {
            cmd.push("-s".to_string());
            cmd.push(secondary.clone());
        }
        cmd.push(node.primary.clone());
        cmd
    }

    fn remove_command(node: &NodeConfig) -> Vec<String> {
        vec![
            "gnt-node".to_string(),
            "remove".to_string(),
            node.primary.clone(),
        ]
    }
}

#[async_trait]
impl<R: CommandRunner> ClusterBootstrap for SshBootstrap<R> {
    async fn add_all_nodes(&self) -> Result<(), ExecError> {
        for node in &self.others {
            info!(node = %node.primary, "adding node");
            self.runner
                .run(&self.master.primary, &Self::add_command(node))
                .await?;
        }
        Ok(())
    }

    async fn remove_all_nodes(&self) -> Result<(), ExecError> {
        for node in &self.others {
            info!(node = %node.primary, "removing node");
            self.runner
                .run(&self.master.primary, &Self::remove_command(node))
                .await?;
        }
        Ok(())
    }
}
