use thiserror::Error;

/// Errors raised while talking to the cluster
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    #[error("Kubernetes API request failed: {0}")]
    Api(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

impl ClusterError {
    /// Map an API error for a single named object, turning 404 into `NotFound`
    pub(crate) fn for_object(
        kind: &'static str,
        namespace: &str,
        name: &str,
    ) -> impl FnOnce(kube::Error) -> Self {
        move |err| match err {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            other => Self::Api(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T, E = ClusterError> = std::result::Result<T, E>;
