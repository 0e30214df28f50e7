//! Resource fetching for a scope

use chrono::Utc;
use tracing::debug;

use crate::client::ClusterSource;
use crate::convert::{deployment_record, namespace_name, pod_record, service_record};
use crate::error::Result;
use kubegraph_types::{ResourceRecord, Scope, ScopeResources};

pub async fn fetch_namespaces(source: &dyn ClusterSource) -> Result<Vec<String>> {
    let namespaces = source.list_namespaces().await?;
    debug!(count = namespaces.len(), "Fetched namespaces");
    Ok(namespaces.into_iter().map(namespace_name).collect())
}

pub async fn fetch_pods(source: &dyn ClusterSource, scope: &Scope) -> Result<Vec<ResourceRecord>> {
    let now = Utc::now();
    let pods = source.list_pods(scope).await?;
    debug!(scope = %scope, count = pods.len(), "Fetched pods");
    Ok(pods.into_iter().map(|pod| pod_record(pod, now)).collect())
}

pub async fn fetch_services(
    source: &dyn ClusterSource,
    scope: &Scope,
) -> Result<Vec<ResourceRecord>> {
    let services = source.list_services(scope).await?;
    debug!(scope = %scope, count = services.len(), "Fetched services");
    Ok(services.into_iter().map(service_record).collect())
}

pub async fn fetch_deployments(
    source: &dyn ClusterSource,
    scope: &Scope,
) -> Result<Vec<ResourceRecord>> {
    let deployments = source.list_deployments(scope).await?;
    debug!(scope = %scope, count = deployments.len(), "Fetched deployments");
    Ok(deployments.into_iter().map(deployment_record).collect())
}

/// Fetch pods, services and deployments for a scope concurrently
///
/// Fails as a unit: the first error from any kind aborts the whole fetch.
pub async fn fetch_scope(source: &dyn ClusterSource, scope: &Scope) -> Result<ScopeResources> {
    let (pods, services, deployments) = futures::try_join!(
        fetch_pods(source, scope),
        fetch_services(source, scope),
        fetch_deployments(source, scope),
    )?;

    Ok(ScopeResources {
        pods,
        services,
        deployments,
    })
}
