//! Node and instance-name leases drawn from the QA configuration.
//!
//! Nodes can be shared, so node leases only count uses and the pool hands out
//! the least used nodes first. Instance names are exclusive: a name is either
//! free or held by exactly one [`InstanceLease`]. Leases go back to the pool
//! when released or dropped.
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use rwl_model::{InstanceConfig, NodeConfig, QaConfig};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("no nodes configured")]
    NoNodes,

    #[error("asked for {wanted} distinct nodes, only {available} configured")]
    NotEnoughNodes { wanted: usize, available: usize },

    #[error("no free instance name left")]
    NoFreeInstance,
}

#[derive(Debug)]
struct NodeSlot {
    node: NodeConfig,
    uses: usize,
}

#[derive(Debug)]
struct InstanceSlot {
    name: String,
    taken: bool,
}

#[derive(Debug, Default)]
struct PoolState {
    nodes: Vec<NodeSlot>,
    instances: Vec<InstanceSlot>,
}

impl PoolState {
    /// Node indices, least used first; ties keep configuration order.
    fn by_use(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| self.nodes[i].uses);
        order
    }
}

/// Shared pool of cluster resources.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    state: Arc<Mutex<PoolState>>,
}

impl ResourcePool {
    pub fn new(
        nodes: impl IntoIterator<Item = NodeConfig>,
        instances: impl IntoIterator<Item = InstanceConfig>,
    ) -> Self {
        let state = PoolState {
            nodes: nodes
                .into_iter()
                .map(|node| NodeSlot { node, uses: 0 })
                .collect(),
            instances: instances
                .into_iter()
                .map(|inst| InstanceSlot {
                    name: inst.name,
                    taken: false,
                })
                .collect(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn from_config(cfg: &QaConfig) -> Self {
        Self::new(cfg.nodes.iter().cloned(), cfg.instances.iter().cloned())
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Leases the least used node.
    pub fn acquire_node(&self) -> Result<NodeLease, PoolError> {
        let mut state = self.lock();
        let index = *state.by_use().first().ok_or(PoolError::NoNodes)?;
        Ok(self.lease_node(&mut state, index))
    }

    /// Leases `count` distinct nodes, least used first.
    pub fn acquire_nodes(&self, count: usize) -> Result<Vec<NodeLease>, PoolError> {
        let mut state = self.lock();
        let available = state.nodes.len();
        if available == 0 {
            return Err(PoolError::NoNodes);
        }
        if count > available {
            return Err(PoolError::NotEnoughNodes {
                wanted: count,
                available,
            });
        }
        let order = state.by_use();
        Ok(order
            .into_iter()
            .take(count)
            .map(|index| self.lease_node(&mut state, index))
            .collect())
    }

    /// Leases the first free instance name.
    pub fn acquire_instance(&self) -> Result<InstanceLease, PoolError> {
        let mut state = self.lock();
        let (index, slot) = state
            .instances
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.taken)
            .ok_or(PoolError::NoFreeInstance)?;
        slot.taken = true;
        Ok(InstanceLease {
            pool: self.clone(),
            index,
            name: slot.name.clone(),
        })
    }

    /// Current number of leases on node `primary`.
    pub fn node_uses(&self, primary: &str) -> Option<usize> {
        self.lock()
            .nodes
            .iter()
            .find(|slot| slot.node.primary == primary)
            .map(|slot| slot.uses)
    }

    pub fn free_instances(&self) -> usize {
        self.lock().instances.iter().filter(|s| !s.taken).count()
    }

    fn lease_node(&self, state: &mut PoolState, index: usize) -> NodeLease {
        let slot = &mut state.nodes[index];
        slot.uses += 1;
        NodeLease {
            pool: self.clone(),
            index,
            node: slot.node.clone(),
        }
    }
}

/// A node lease; returned to the pool on drop.
#[derive(Debug)]
pub struct NodeLease {
    pool: ResourcePool,
    index: usize,
    node: NodeConfig,
}

impl NodeLease {
    pub fn primary(&self) -> &str {
        &self.node.primary
    }

    pub fn secondary(&self) -> Option<&str> {
        self.node.secondary.as_deref()
    }

    pub fn release(self) {}
}

impl Drop for NodeLease {
    fn drop(&mut self) {
        let mut state = self.pool.lock();
        if let Some(slot) = state.nodes.get_mut(self.index) {
            slot.uses = slot.uses.saturating_sub(1);
        }
    }
}

/// An exclusive instance-name lease; returned to the pool on drop.
#[derive(Debug)]
pub struct InstanceLease {
    pool: ResourcePool,
    index: usize,
    name: String,
}

impl InstanceLease {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release(self) {}
}

impl Drop for InstanceLease {
    fn drop(&mut self) {
        let mut state = self.pool.lock();
        if let Some(slot) = state.instances.get_mut(self.index) {
            slot.taken = false;
        }
    }
}
