use tracing::instrument;

use crate::proxy::Rapi;

/// Information-only calls; nothing here changes cluster state.
#[instrument(level = "info", skip_all)]
pub async fn run_probes(rapi: &dyn Rapi) {
    rapi.get_version().await;
    rapi.get_features().await;
    rapi.get_operating_systems().await;
    rapi.get_info().await;
    rapi.get_cluster_tags().await;
    rapi.get_instances(false).await;
    rapi.get_instances(true).await;
    rapi.get_jobs(false).await;
    rapi.get_jobs(true).await;
    rapi.get_nodes(false).await;
    rapi.get_nodes(true).await;
    rapi.get_networks(false).await;
    rapi.get_networks(true).await;
    rapi.get_groups(false).await;
    rapi.get_groups(true).await;
}
