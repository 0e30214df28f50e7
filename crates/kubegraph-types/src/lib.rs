//! Shared types for kubegraph
//!
//! This crate contains the data model used across the kubegraph crates:
//! request scopes, normalized resource records and the derived graph.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Label map as carried by Kubernetes object metadata
pub type Labels = BTreeMap<String, String>;

// ============================================================================
// Scope
// ============================================================================

/// Namespace scope of a single request
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Every namespace in the cluster
    #[default]
    All,
    /// A single namespace
    Namespace(String),
}

impl Scope {
    /// Query value selecting every namespace
    pub const ALL: &'static str = "all";

    /// Parse a `namespace` query parameter. Missing, empty and `all` select every namespace.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(Self::ALL) => Self::All,
            Some(ns) => Self::Namespace(ns.to_string()),
        }
    }

    /// The namespace name, if this scope is a single namespace
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Namespace(ns) => Some(ns),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Namespace(ns) => f.write_str(ns),
        }
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Resource Records
// ============================================================================

/// The three workload kinds kubegraph understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    Pod,
    Service,
    Deployment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Service => "Service",
            Self::Deployment => "Deployment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata header shared by every resource record
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceMeta {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
    pub creation_time: Option<DateTime<Utc>>,
}

impl ResourceMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: Labels::new(),
            creation_time: None,
        }
    }

    pub fn with_labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }
}

/// A normalized pod, service or deployment
///
/// Serializes as a single flat object: the header fields, a `kind`
/// discriminator and the kind-specific fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceRecord {
    #[serde(flatten)]
    pub meta: ResourceMeta,
    #[serde(flatten)]
    pub details: ResourceDetails,
}

impl ResourceRecord {
    pub fn new(meta: ResourceMeta, details: impl Into<ResourceDetails>) -> Self {
        Self {
            meta,
            details: details.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn namespace(&self) -> &str {
        &self.meta.namespace
    }

    pub fn labels(&self) -> &Labels {
        &self.meta.labels
    }

    pub fn kind(&self) -> ResourceKind {
        self.details.kind()
    }
}

/// Kind-specific payload of a resource record
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ResourceDetails {
    Pod(PodDetails),
    Service(ServiceDetails),
    Deployment(DeploymentDetails),
}

impl ResourceDetails {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pod(_) => ResourceKind::Pod,
            Self::Service(_) => ResourceKind::Service,
            Self::Deployment(_) => ResourceKind::Deployment,
        }
    }
}

impl From<PodDetails> for ResourceDetails {
    fn from(details: PodDetails) -> Self {
        Self::Pod(details)
    }
}

impl From<ServiceDetails> for ResourceDetails {
    fn from(details: ServiceDetails) -> Self {
        Self::Service(details)
    }
}

impl From<DeploymentDetails> for ResourceDetails {
    fn from(details: DeploymentDetails) -> Self {
        Self::Deployment(details)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Default)]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    Unknown,
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Pod summary fields
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct PodDetails {
    pub status: PodStatus,
    pub node: Option<String>,
    /// Sum of restart counts over all containers
    pub restarts: i32,
    pub start_time: Option<DateTime<Utc>>,
    /// Whole hours since start, e.g. "5h", or "N/A" when not started
    pub age: String,
    pub pod_ip: Option<String>,
    pub containers: Vec<String>,
}

/// Target of a service port: either a number or a named container port
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PortTarget {
    Number(i32),
    Name(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<PortTarget>,
    pub protocol: Option<String>,
}

/// Service summary fields
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct ServiceDetails {
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub cluster_ip: Option<String>,
    pub ports: Vec<ServicePort>,
    /// The service's declared pod selector. Informational only.
    pub selector: Labels,
}

/// Deployment summary fields
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeploymentDetails {
    pub desired_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub strategy: String,
    pub images: Vec<String>,
    /// The deployment's `matchLabels`. Informational only.
    pub selector: Labels,
}

impl Default for DeploymentDetails {
    fn default() -> Self {
        Self {
            desired_replicas: 0,
            ready_replicas: 0,
            available_replicas: 0,
            strategy: "RollingUpdate".to_string(),
            images: Vec::new(),
            selector: Labels::new(),
        }
    }
}

impl DeploymentDetails {
    /// Format replica status as "ready/desired"
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.ready_replicas, self.desired_replicas)
    }
}

/// Pods, services and deployments fetched for one scope
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeResources {
    pub pods: Vec<ResourceRecord>,
    pub services: Vec<ResourceRecord>,
    pub deployments: Vec<ResourceRecord>,
}

impl ScopeResources {
    /// Total number of fetched resources
    pub fn len(&self) -> usize {
        self.pods.len() + self.services.len() + self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Graph Types
// ============================================================================

/// Relation carried by a graph edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Service to pod
    RoutesTo,
    /// Deployment to pod
    Creates,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub relation: Relation,
}

/// Dependency graph for one scope
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceGraph {
    pub namespace: Scope,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ResourceGraph {
    pub fn empty(scope: Scope) -> Self {
        Self {
            namespace: scope,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}
