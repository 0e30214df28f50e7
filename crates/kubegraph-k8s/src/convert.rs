//! Normalization of Kubernetes objects into resource records

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use kubegraph_types::{
    DeploymentDetails, PodDetails, PodStatus, PortTarget, ResourceMeta, ResourceRecord,
    ServiceDetails, ServicePort,
};

fn record_meta(meta: ObjectMeta) -> ResourceMeta {
    ResourceMeta {
        name: meta.name.unwrap_or_default(),
        namespace: meta.namespace.unwrap_or_default(),
        labels: meta.labels.unwrap_or_default(),
        creation_time: meta.creation_timestamp.map(|t| t.0),
    }
}

/// Age in whole hours, e.g. "5h"; "N/A" when the start time is unknown
pub fn format_age(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match start {
        Some(start) => format!("{}h", (now - start).num_hours()),
        None => "N/A".to_string(),
    }
}

pub fn namespace_name(namespace: Namespace) -> String {
    namespace.metadata.name.unwrap_or_default()
}

/// Convert a k8s Pod to a record, computing its age relative to `now`
pub fn pod_record(pod: Pod, now: DateTime<Utc>) -> ResourceRecord {
    let mut details = PodDetails::default();

    if let Some(spec) = pod.spec {
        details.node = spec.node_name;
        details.containers = spec.containers.into_iter().map(|c| c.name).collect();
    }

    if let Some(status) = pod.status {
        details.pod_ip = status.pod_ip;
        details.start_time = status.start_time.map(|t| t.0);
        details.status = status
            .phase
            .as_deref()
            .map(PodStatus::from)
            .unwrap_or(PodStatus::Unknown);
        details.restarts = status
            .container_statuses
            .unwrap_or_default()
            .iter()
            .map(|cs| cs.restart_count)
            .sum();
    }

    details.age = format_age(details.start_time, now);

    ResourceRecord::new(record_meta(pod.metadata), details)
}

pub fn service_record(service: Service) -> ResourceRecord {
    let mut details = ServiceDetails::default();

    if let Some(spec) = service.spec {
        details.service_type = spec.type_;
        details.cluster_ip = spec.cluster_ip;
        details.selector = spec.selector.unwrap_or_default();
        details.ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| ServicePort {
                name: p.name,
                port: p.port,
                target_port: p.target_port.map(|target| match target {
                    IntOrString::Int(port) => PortTarget::Number(port),
                    IntOrString::String(name) => PortTarget::Name(name),
                }),
                protocol: p.protocol,
            })
            .collect();
    }

    ResourceRecord::new(record_meta(service.metadata), details)
}

pub fn deployment_record(deploy: Deployment) -> ResourceRecord {
    let mut details = DeploymentDetails::default();

    if let Some(spec) = deploy.spec {
        details.desired_replicas = spec.replicas.unwrap_or(0);
        details.selector = spec.selector.match_labels.unwrap_or_default();

        if let Some(strategy) = spec.strategy.and_then(|s| s.type_) {
            details.strategy = strategy;
        }

        if let Some(pod_spec) = spec.template.spec {
            details.images = pod_spec
                .containers
                .into_iter()
                .filter_map(|c| c.image)
                .collect();
        }
    }

    if let Some(status) = deploy.status {
        details.available_replicas = status.available_replicas.unwrap_or(0);
        details.ready_replicas = status.ready_replicas.unwrap_or(0);
    }

    ResourceRecord::new(record_meta(deploy.metadata), details)
}
