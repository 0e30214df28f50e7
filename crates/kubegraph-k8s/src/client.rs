//! Kubernetes client for kubegraph

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::api::{ListParams, LogParams, PatchParams};
use kube::config::KubeConfigOptions;
use kube::{Api, Config, Resource};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ClusterError, Result};
use crate::patch::MetadataPatch;
use kubegraph_types::Scope;

/// Read and patch operations kubegraph needs from the cluster
///
/// Handlers only ever see this trait, so tests can swap in an in-memory cluster.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    async fn list_pods(&self, scope: &Scope) -> Result<Vec<Pod>>;

    async fn list_services(&self, scope: &Scope) -> Result<Vec<Service>>;

    async fn list_deployments(&self, scope: &Scope) -> Result<Vec<Deployment>>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;

    /// Read (without following) the pod's log for the last `since_seconds`
    async fn pod_logs(&self, namespace: &str, name: &str, since_seconds: i64) -> Result<String>;

    /// Apply a strategic merge patch to the pod's metadata
    async fn patch_pod_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<Pod>;
}

/// Network timeouts applied to every API call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(30),
        }
    }
}

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    /// Create a client from ambient credentials
    ///
    /// Tries the in-cluster service account first and falls back to the local kubeconfig.
    pub async fn connect(timeouts: ClientTimeouts) -> Result<Self> {
        let mut config = Self::load_config().await?;

        config.connect_timeout = Some(timeouts.connect);
        config.read_timeout = Some(timeouts.read);

        info!(
            cluster_url = %config.cluster_url,
            namespace = %config.default_namespace,
            "Connecting to Kubernetes API"
        );

        let client = kube::Client::try_from(config)?;
        Ok(Self { client })
    }

    async fn load_config() -> Result<Config> {
        match Config::incluster() {
            Ok(config) => {
                info!("Using in-cluster configuration");
                Ok(config)
            }
            Err(err) => {
                debug!(error = %err, "In-cluster configuration unavailable, using kubeconfig");
                let config = Config::from_kubeconfig(&KubeConfigOptions::default()).await?;
                info!("Using local kubeconfig");
                Ok(config)
            }
        }
    }

    /// Namespaced API for a single namespace, cluster-wide API for all
    fn scoped_api<K>(&self, scope: &Scope) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match scope {
            Scope::All => Api::all(self.client.clone()),
            Scope::Namespace(namespace) => Api::namespaced(self.client.clone(), namespace),
        }
    }
}

#[async_trait]
impl ClusterSource for KubeClient {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_pods(&self, scope: &Scope) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = self.scoped_api(scope);
        let list = pods.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_services(&self, scope: &Scope) -> Result<Vec<Service>> {
        let services: Api<Service> = self.scoped_api(scope);
        let list = services.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_deployments(&self, scope: &Scope) -> Result<Vec<Deployment>> {
        let deployments: Api<Deployment> = self.scoped_api(scope);
        let list = deployments.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods.get(name)
            .await
            .map_err(ClusterError::for_object("Pod", namespace, name))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        deployments
            .get(name)
            .await
            .map_err(ClusterError::for_object("Deployment", namespace, name))
    }

    async fn pod_logs(&self, namespace: &str, name: &str, since_seconds: i64) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            follow: false,
            since_seconds: Some(since_seconds),
            ..Default::default()
        };

        pods.logs(name, &params)
            .await
            .map_err(ClusterError::for_object("Pod", namespace, name))
    }

    async fn patch_pod_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);

        pods.patch(name, &PatchParams::default(), &patch.to_patch())
            .await
            .map_err(ClusterError::for_object("Pod", namespace, name))
    }
}
