use std::{collections::BTreeSet, fmt};

use tracing::{debug, instrument, warn};

use rwl_model::{DryRun, Invocation, Op, Tags};

use crate::{proxy::Rapi, reply::Reply, resolver::JobResolver};

/// Tags added and removed by the scenario.
pub const TAGS: [&str; 3] = ["tag1", "tag2", "tag3"];

/// Entity whose tags are exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope<'a> {
    Cluster,
    Node(&'a str),
    Instance(&'a str),
}

impl TagScope<'_> {
    pub fn add_op(&self) -> Op {
        match self {
            TagScope::Cluster => Op::AddClusterTags,
            TagScope::Node(_) => Op::AddNodeTags,
            TagScope::Instance(_) => Op::AddInstanceTags,
        }
    }

    pub fn delete_op(&self) -> Op {
        match self {
            TagScope::Cluster => Op::DeleteClusterTags,
            TagScope::Node(_) => Op::DeleteNodeTags,
            TagScope::Instance(_) => Op::DeleteInstanceTags,
        }
    }

    async fn get(&self, rapi: &dyn Rapi) -> Reply<Tags> {
        match *self {
            TagScope::Cluster => rapi.get_cluster_tags().await,
            TagScope::Node(node) => rapi.get_node_tags(node).await,
            TagScope::Instance(inst) => rapi.get_instance_tags(inst).await,
        }
    }

    async fn add(&self, rapi: &dyn Rapi, tags: &[String], dry_run: DryRun) -> Reply<Invocation> {
        match *self {
            TagScope::Cluster => rapi.add_cluster_tags(tags, dry_run).await,
            TagScope::Node(node) => rapi.add_node_tags(node, tags, dry_run).await,
            TagScope::Instance(inst) => rapi.add_instance_tags(inst, tags, dry_run).await,
        }
    }

    async fn delete(&self, rapi: &dyn Rapi, tags: &[String], dry_run: DryRun) -> Reply<Invocation> {
        match *self {
            TagScope::Cluster => rapi.delete_cluster_tags(tags, dry_run).await,
            TagScope::Node(node) => rapi.delete_node_tags(node, tags, dry_run).await,
            TagScope::Instance(inst) => rapi.delete_instance_tags(inst, tags, dry_run).await,
        }
    }
}

impl fmt::Display for TagScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagScope::Cluster => f.write_str("cluster"),
            TagScope::Node(node) => write!(f, "node {node}"),
            TagScope::Instance(inst) => write!(f, "instance {inst}"),
        }
    }
}

/// Add/delete cycle over [`TAGS`], leaving the tag set as it was found.
///
/// Tag reads are compared with what the previous steps should have produced;
/// a mismatch is logged, never raised.
#[instrument(level = "info", skip_all, fields(scope = %scope))]
pub async fn run_tags(resolver: &JobResolver<'_>, scope: TagScope<'_>) {
    let rapi = resolver.rapi();
    let tags: Vec<String> = TAGS.iter().map(|t| t.to_string()).collect();
    let (first, rest) = tags.split_at(1);

    let mut expected = read(rapi, scope, "baseline", None).await;

    resolver
        .finish(scope.add_op(), scope.add(rapi, &tags, DryRun::enabled()))
        .await;
    resolver
        .finish(scope.add_op(), scope.add(rapi, &tags, DryRun::disabled()))
        .await;
    if let Some(set) = expected.as_mut() {
        set.extend(tags.iter().cloned());
    }
    read(rapi, scope, "after add", expected.as_ref()).await;

    resolver
        .finish(scope.delete_op(), scope.delete(rapi, first, DryRun::enabled()))
        .await;
    resolver
        .finish(scope.delete_op(), scope.delete(rapi, first, DryRun::disabled()))
        .await;
    if let Some(set) = expected.as_mut() {
        set.remove(&first[0]);
    }
    read(rapi, scope, "after first delete", expected.as_ref()).await;

    resolver
        .finish(scope.delete_op(), scope.delete(rapi, rest, DryRun::disabled()))
        .await;
    if let Some(set) = expected.as_mut() {
        rest.iter().for_each(|t| {
            set.remove(t);
        });
    }
    read(rapi, scope, "after delete", expected.as_ref()).await;
}

/// Reads the tags of `scope` and checks them against `expected`.
async fn read(
    rapi: &dyn Rapi,
    scope: TagScope<'_>,
    step: &str,
    expected: Option<&BTreeSet<String>>,
) -> Option<BTreeSet<String>> {
    let found: BTreeSet<String> = scope.get(rapi).await.into_value()?.into_iter().collect();
    match expected {
        Some(want) if *want != found => {
            warn!(scope = %scope, step, ?want, ?found, "tag drift");
        }
        _ => debug!(scope = %scope, step, ?found, "tags"),
    }
    Some(found)
}
