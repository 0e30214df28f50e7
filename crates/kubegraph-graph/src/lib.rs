//! Resource dependency graph for kubegraph
//!
//! Derives `routes_to` (service to pod) and `creates` (deployment to pod)
//! edges from independently fetched resource collections by label matching.

mod builder;
mod selector;

pub use builder::{build_graph, node_identity};
pub use selector::selector_matches;

// Re-export types used in our public API
pub use kubegraph_types::{
    GraphEdge, GraphNode, Relation, ResourceGraph, ResourceKind, Scope, ScopeResources,
};
