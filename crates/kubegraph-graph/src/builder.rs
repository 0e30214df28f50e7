use kubegraph_types::{
    GraphEdge, GraphNode, Relation, ResourceGraph, ResourceKind, ResourceRecord, Scope,
    ScopeResources,
};
use tracing::debug;

use crate::selector::selector_matches;

/// Node identity of a resource within a scope
///
/// Bare name for a single namespace, `namespace/name` across all namespaces.
pub fn node_identity(scope: &Scope, record: &ResourceRecord) -> String {
    match scope {
        Scope::Namespace(_) => record.name().to_string(),
        Scope::All => format!("{}/{}", record.namespace(), record.name()),
    }
}

/// Build the dependency graph for one scope
///
/// Nodes are grouped by kind (pods, then services, then deployments) and keep
/// the fetched order within each group. A service or deployment is linked to
/// every pod whose labels contain all of the owner's own labels; an owner with
/// no labels therefore links to every pod. Duplicate identities and parallel
/// edges are kept as-is.
pub fn build_graph(scope: &Scope, resources: &ScopeResources) -> ResourceGraph {
    let mut assembler = GraphAssembler::new(scope, &resources.pods, resources.len());

    assembler.link_owners(&resources.services, ResourceKind::Service, Relation::RoutesTo);
    assembler.link_owners(
        &resources.deployments,
        ResourceKind::Deployment,
        Relation::Creates,
    );

    let graph = assembler.finish();
    debug!(
        scope = %scope,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "Built resource graph"
    );
    graph
}

/// Accumulates nodes and edges for a single graph computation
struct GraphAssembler<'a> {
    scope: &'a Scope,
    pods: &'a [ResourceRecord],
    /// Identities of `pods`, index-aligned
    pod_ids: Vec<String>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl<'a> GraphAssembler<'a> {
    fn new(scope: &'a Scope, pods: &'a [ResourceRecord], capacity: usize) -> Self {
        let pod_ids: Vec<String> = pods.iter().map(|pod| node_identity(scope, pod)).collect();

        let mut nodes = Vec::with_capacity(capacity);
        nodes.extend(pod_ids.iter().map(|id| GraphNode {
            id: id.clone(),
            kind: ResourceKind::Pod,
        }));

        Self {
            scope,
            pods,
            pod_ids,
            nodes,
            edges: Vec::new(),
        }
    }

    /// Emit a node per owner and an edge to each pod its labels select
    fn link_owners(&mut self, owners: &[ResourceRecord], kind: ResourceKind, relation: Relation) {
        for owner in owners {
            let id = node_identity(self.scope, owner);
            let selector = owner.labels();

            if selector.is_empty() {
                debug!(
                    kind = %kind,
                    id = %id,
                    "Owner has no labels, selecting every pod in scope"
                );
            }

            for (pod, pod_id) in self.pods.iter().zip(&self.pod_ids) {
                if selector_matches(selector, pod.labels()) {
                    self.edges.push(GraphEdge {
                        from: id.clone(),
                        to: pod_id.clone(),
                        relation,
                    });
                }
            }

            self.nodes.push(GraphNode { id, kind });
        }
    }

    fn finish(self) -> ResourceGraph {
        ResourceGraph {
            namespace: self.scope.clone(),
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubegraph_types::{DeploymentDetails, PodDetails, ResourceMeta, ServiceDetails};
    use std::collections::HashSet;

    fn pod(namespace: &str, name: &str, labels: &[(&str, &str)]) -> ResourceRecord {
        ResourceRecord::new(
            ResourceMeta::new(name, namespace).with_labels(labels.iter().copied()),
            PodDetails::default(),
        )
    }

    fn service(namespace: &str, name: &str, labels: &[(&str, &str)]) -> ResourceRecord {
        ResourceRecord::new(
            ResourceMeta::new(name, namespace).with_labels(labels.iter().copied()),
            ServiceDetails::default(),
        )
    }

    fn deployment(namespace: &str, name: &str, labels: &[(&str, &str)]) -> ResourceRecord {
        ResourceRecord::new(
            ResourceMeta::new(name, namespace).with_labels(labels.iter().copied()),
            DeploymentDetails::default(),
        )
    }

    fn edge(from: &str, to: &str, relation: Relation) -> GraphEdge {
        GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            relation,
        }
    }

    fn default_scope() -> Scope {
        Scope::Namespace("default".to_string())
    }

    #[test]
    fn test_web_scenario() {
        let resources = ScopeResources {
            pods: vec![pod("default", "web-abc123", &[("app", "web")])],
            services: vec![service("default", "web-svc", &[("app", "web")])],
            deployments: vec![deployment("default", "web", &[("app", "web")])],
        };

        let graph = build_graph(&default_scope(), &resources);

        assert_eq!(graph.namespace, default_scope());
        assert_eq!(
            graph.nodes,
            vec![
                GraphNode {
                    id: "web-abc123".to_string(),
                    kind: ResourceKind::Pod,
                },
                GraphNode {
                    id: "web-svc".to_string(),
                    kind: ResourceKind::Service,
                },
                GraphNode {
                    id: "web".to_string(),
                    kind: ResourceKind::Deployment,
                },
            ]
        );
        assert_eq!(
            graph.edges,
            vec![
                edge("web-svc", "web-abc123", Relation::RoutesTo),
                edge("web", "web-abc123", Relation::Creates),
            ]
        );
    }

    #[test]
    fn test_identity_per_scope() {
        let record = pod("default", "nginx-1", &[]);
        assert_eq!(node_identity(&default_scope(), &record), "nginx-1");
        assert_eq!(node_identity(&Scope::All, &record), "default/nginx-1");
    }

    #[test]
    fn test_all_scope_qualifies_every_identity() {
        let resources = ScopeResources {
            pods: vec![
                pod("default", "api-1", &[("app", "api")]),
                pod("staging", "api-1", &[("app", "api")]),
            ],
            services: vec![service("staging", "api", &[("app", "api")])],
            deployments: vec![],
        };

        let graph = build_graph(&Scope::All, &resources);

        assert!(graph.nodes.iter().all(|n| n.id.contains('/')));
        assert!(graph.edges.iter().all(|e| e.from.contains('/') && e.to.contains('/')));
        // Matching is by labels only, so the service reaches both namespaces
        assert_eq!(
            graph.edges,
            vec![
                edge("staging/api", "default/api-1", Relation::RoutesTo),
                edge("staging/api", "staging/api-1", Relation::RoutesTo),
            ]
        );
    }

    #[test]
    fn test_node_count_matches_resource_count() {
        let resources = ScopeResources {
            pods: vec![
                pod("default", "a", &[("app", "a")]),
                pod("default", "b", &[("app", "b")]),
                pod("default", "c", &[]),
            ],
            services: vec![
                service("default", "a", &[("app", "a")]),
                service("default", "b", &[("app", "b")]),
            ],
            deployments: vec![deployment("default", "a", &[("app", "a")])],
        };

        let graph = build_graph(&default_scope(), &resources);
        assert_eq!(graph.nodes.len(), resources.len());
    }

    #[test]
    fn test_edge_iff_labels_superset() {
        let resources = ScopeResources {
            pods: vec![
                pod("default", "web-1", &[("app", "web"), ("tier", "frontend")]),
                pod("default", "web-2", &[("app", "web")]),
                pod("default", "db-1", &[("app", "db")]),
            ],
            services: vec![
                service("default", "web", &[("app", "web")]),
                service("default", "frontend", &[("app", "web"), ("tier", "frontend")]),
            ],
            deployments: vec![],
        };

        let graph = build_graph(&default_scope(), &resources);
        let edges: HashSet<_> = graph.edges.into_iter().collect();

        let expected: HashSet<_> = [
            edge("web", "web-1", Relation::RoutesTo),
            edge("web", "web-2", Relation::RoutesTo),
            edge("frontend", "web-1", Relation::RoutesTo),
        ]
        .into_iter()
        .collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_empty_labels_select_every_pod() {
        let resources = ScopeResources {
            pods: vec![
                pod("default", "a", &[("app", "a")]),
                pod("default", "b", &[]),
            ],
            services: vec![service("default", "catch-all", &[])],
            deployments: vec![deployment("default", "orphan", &[])],
        };

        let graph = build_graph(&default_scope(), &resources);
        assert_eq!(
            graph.edges,
            vec![
                edge("catch-all", "a", Relation::RoutesTo),
                edge("catch-all", "b", Relation::RoutesTo),
                edge("orphan", "a", Relation::Creates),
                edge("orphan", "b", Relation::Creates),
            ]
        );
    }

    #[test]
    fn test_duplicates_are_not_merged() {
        let resources = ScopeResources {
            pods: vec![pod("default", "web", &[("app", "web")])],
            services: vec![
                service("default", "web", &[("app", "web")]),
                service("default", "web", &[("app", "web")]),
            ],
            deployments: vec![deployment("default", "web", &[("app", "web")])],
        };

        let graph = build_graph(&default_scope(), &resources);
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(
            graph
                .edges
                .iter()
                .filter(|e| e.relation == Relation::RoutesTo)
                .count(),
            2
        );
    }

    #[test]
    fn test_every_edge_endpoint_is_a_node() {
        let resources = ScopeResources {
            pods: vec![
                pod("default", "web-1", &[("app", "web")]),
                pod("kube-system", "dns-1", &[("k8s-app", "kube-dns")]),
            ],
            services: vec![service("kube-system", "kube-dns", &[("k8s-app", "kube-dns")])],
            deployments: vec![deployment("default", "web", &[("app", "web")])],
        };

        let graph = build_graph(&Scope::All, &resources);
        let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert!(!graph.edges.is_empty());
        for e in &graph.edges {
            assert!(ids.contains(e.from.as_str()));
            assert!(ids.contains(e.to.as_str()));
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let resources = ScopeResources {
            pods: vec![pod("default", "web-1", &[("app", "web")])],
            services: vec![service("default", "web", &[("app", "web")])],
            deployments: vec![deployment("default", "web", &[("app", "web")])],
        };

        let first = build_graph(&Scope::All, &resources);
        let mut reordered = resources.clone();
        reordered.pods.reverse();
        let second = build_graph(&Scope::All, &reordered);

        let as_sets = |g: &ResourceGraph| {
            (
                g.nodes.iter().cloned().collect::<HashSet<_>>(),
                g.edges.iter().cloned().collect::<HashSet<_>>(),
            )
        };
        assert_eq!(as_sets(&first), as_sets(&second));
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&default_scope(), &ScopeResources::default());
        assert_eq!(graph, ResourceGraph::empty(default_scope()));
    }
}
