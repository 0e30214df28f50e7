use axum::Json;
use axum::extract::{Path, Query, State};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use kubegraph_graph::build_graph;
use kubegraph_k8s::{
    ClusterError, MetadataPatch, PATCHABLE_FIELDS, ResourceRecord, Scope, fetch_deployments,
    fetch_namespaces, fetch_pods, fetch_scope, fetch_services,
};
use kubegraph_types::ResourceGraph;

use super::AppState;
use super::error::ApiError;

/// Namespace used by the pod endpoints when the request does not name one
const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub namespace: Option<String>,
}

impl ScopeQuery {
    fn scope(&self) -> Scope {
        Scope::parse(self.namespace.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub pod_name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodMetadataRequest {
    pub pod_name: Option<String>,
    pub namespace: Option<String>,
    pub metadata: Option<Value>,
}

/// Empty list on failure; list endpoints favor availability over completeness
fn or_empty<T>(
    result: Result<Vec<T>, ClusterError>,
    kind: &'static str,
    scope: &Scope,
) -> Json<Vec<T>> {
    match result {
        Ok(items) => Json(items),
        Err(err) => {
            error!(
                kind,
                scope = %scope,
                error = %err,
                "Failed to list resources, returning empty list"
            );
            Json(Vec::new())
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn namespaces(State(state): State<AppState>) -> Json<Vec<String>> {
    or_empty(
        fetch_namespaces(state.cluster.as_ref()).await,
        "namespaces",
        &Scope::All,
    )
}

pub async fn list_pods(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<Vec<ResourceRecord>> {
    let scope = query.scope();
    or_empty(
        fetch_pods(state.cluster.as_ref(), &scope).await,
        "pods",
        &scope,
    )
}

pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<Vec<ResourceRecord>> {
    let scope = query.scope();
    or_empty(
        fetch_services(state.cluster.as_ref(), &scope).await,
        "services",
        &scope,
    )
}

pub async fn list_deployments(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<Vec<ResourceRecord>> {
    let scope = query.scope();
    or_empty(
        fetch_deployments(state.cluster.as_ref(), &scope).await,
        "deployments",
        &scope,
    )
}

pub async fn get_pod(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Pod>, ApiError> {
    let pod = state.cluster.get_pod(&namespace, &name).await?;
    Ok(Json(pod))
}

pub async fn get_deployment(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<Deployment>, ApiError> {
    let deployment = state.cluster.get_deployment(&namespace, &name).await?;
    Ok(Json(deployment))
}

pub async fn pod_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(pod_name) = query.pod_name.filter(|name| !name.is_empty()) else {
        return Err(ApiError::BadRequest("Missing podName parameter".to_string()));
    };
    let namespace = query
        .namespace
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    info!(pod = %pod_name, namespace = %namespace, "Fetching pod logs");

    let logs = state
        .cluster
        .pod_logs(&namespace, &pod_name, state.log_since_seconds)
        .await?;

    Ok(Json(json!({ "logs": logs })))
}

pub async fn patch_pod_metadata(
    State(state): State<AppState>,
    Json(request): Json<PodMetadataRequest>,
) -> Result<Json<Value>, ApiError> {
    let missing = || ApiError::BadRequest("Missing podName or metadata".to_string());

    let pod_name = request
        .pod_name
        .filter(|name| !name.is_empty())
        .ok_or_else(missing)?;
    let Some(Value::Object(metadata)) = request.metadata else {
        return Err(missing());
    };
    let namespace = request
        .namespace
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let patch = MetadataPatch::filter(metadata).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "No patchable metadata fields; allowed fields are {}",
            PATCHABLE_FIELDS.join(", ")
        ))
    })?;

    info!(
        pod = %pod_name,
        namespace = %namespace,
        fields = ?patch.fields().keys().collect::<Vec<_>>(),
        "Patching pod metadata"
    );

    state
        .cluster
        .patch_pod_metadata(&namespace, &pod_name, &patch)
        .await?;

    Ok(Json(json!({ "status": "success" })))
}

/// Dependency graph for a scope; any fetch failure aborts the request
pub async fn graph(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ResourceGraph>, ApiError> {
    let scope = query.scope();

    let resources = fetch_scope(state.cluster.as_ref(), &scope)
        .await
        .map_err(|err| ApiError::Upstream(format!("Failed to build graph for {scope}: {err}")))?;

    Ok(Json(build_graph(&scope, &resources)))
}
