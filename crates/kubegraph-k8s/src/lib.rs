//! Kubernetes client for kubegraph
//!
//! This crate provides the cluster collaborator used by the server: the
//! `ClusterSource` trait and its kube-backed implementation, normalization of
//! k8s objects into resource records, scoped fetching and metadata patches.

mod client;
mod convert;
mod error;
mod fetch;
mod patch;

pub use client::{ClientTimeouts, ClusterSource, KubeClient};
pub use convert::{deployment_record, format_age, namespace_name, pod_record, service_record};
pub use error::{ClusterError, Result};
pub use fetch::{fetch_deployments, fetch_namespaces, fetch_pods, fetch_scope, fetch_services};
pub use patch::{MetadataPatch, PATCHABLE_FIELDS};

// Re-export types that are used in our public API
pub use kubegraph_types::{ResourceRecord, Scope, ScopeResources};
