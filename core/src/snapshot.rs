//! Snapshot serialization: full graph state to/from JSON.
//!
//! A snapshot captures every node and edge in creation order, keyed by
//! business key rather than by internal id. Restoring replays the records
//! through the normal creation paths, so a restored graph is subject to the
//! same constraints as a freshly ingested one and ends up with the same ids.

use crate::{
    error::{GraphError, GraphResult},
    graph::GraphStore,
    model::{EdgeAttrs, NodeAttrs},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub key: String,
    pub attrs: NodeAttrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub from_key: String,
    pub to_key: String,
    pub attrs: EdgeAttrs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GraphStore {
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes()
            .map(|n| NodeSnapshot { key: n.key.clone(), attrs: n.attrs.clone() })
            .collect();
        let edges = self
            .edges()
            .map(|e| EdgeSnapshot {
                from_key: self.key_of(e.from),
                to_key: self.key_of(e.to),
                attrs: e.attrs.clone(),
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }

    /// Rebuild a graph from a snapshot. Constraints are applied first.
    pub fn restore(snapshot: &GraphSnapshot) -> GraphResult<GraphStore> {
        let mut graph = GraphStore::new();
        graph.apply_constraints();

        for node in &snapshot.nodes {
            graph.create_node(&node.key, node.attrs.clone())?;
        }
        for edge in &snapshot.edges {
            graph
                .create_edge(&edge.from_key, &edge.to_key, edge.attrs.clone())
                .map_err(|e| match e {
                    GraphError::DanglingReference { entity, key } => GraphError::IntegrityError {
                        invariant: "snapshot edges reference snapshot nodes",
                        entity: format!("{entity} {key}"),
                    },
                    other => other,
                })?;
        }

        log::debug!(
            "restored graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}
