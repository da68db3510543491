//! Bounded neighborhood around one client, for display.
//!
//! A path is Client -OWNS-> Account followed by `min_hops..=max_hops`
//! transfer edges walked in either direction, each edge used at most once
//! per path. Paths are enumerated in insertion order and the walk stops at
//! `max_paths`. The client, its owned accounts and the bank of every
//! included account are always part of the result.
//!
//! Pure read: takes `&GraphStore`, so it cannot overlap a detection pass.

use crate::{
    config::SubgraphConfig,
    error::{GraphError, GraphResult},
    graph::GraphStore,
    model::{Edge, Node, NodeAttrs},
    types::{ClientStatus, Direction, EdgeId, EdgeKind, NodeId, NodeKind},
};
use serde::Serialize;
use std::collections::HashSet;

const CLIENT_CRITICAL_COLOR: &str = "#FF6B6B";
const CLIENT_WARNING_COLOR: &str = "#FFA94D";
const CLIENT_DEFAULT_COLOR: &str = "#4AD395";
const ACCOUNT_COLOR: &str = "#FFD166";
const BANK_COLOR: &str = "#118AB2";
const EDGE_COLOR: &str = "#cccccc";
const SUSPICIOUS_EDGE_COLOR: &str = "#F7A7A6";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationHint {
    pub category: &'static str,
    pub label: String,
    pub color: &'static str,
    pub size: u32,
}

impl PresentationHint {
    pub fn for_node(node: &Node) -> Self {
        match &node.attrs {
            NodeAttrs::Client(c) => Self {
                category: NodeKind::Client.label(),
                label: c.name.clone(),
                color: match c.status {
                    Some(ClientStatus::Critical) => CLIENT_CRITICAL_COLOR,
                    Some(ClientStatus::Warning) => CLIENT_WARNING_COLOR,
                    _ => CLIENT_DEFAULT_COLOR,
                },
                size: 30,
            },
            NodeAttrs::Account(_) => Self {
                category: NodeKind::Account.label(),
                label: format!("{}...", node.key.chars().take(8).collect::<String>()),
                color: ACCOUNT_COLOR,
                size: 25,
            },
            NodeAttrs::Bank(_) => Self {
                category: NodeKind::Bank.label(),
                label: node.key.clone(),
                color: BANK_COLOR,
                size: 25,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub key: String,
    pub hint: PresentationHint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphEdge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    pub label: &'static str,
    pub color: &'static str,
    pub is_suspicious: bool,
}

impl SubgraphEdge {
    fn from_edge(edge: &Edge) -> Self {
        let is_suspicious = edge.attrs.as_transfer().is_some_and(|t| t.is_suspicious);
        Self {
            id: edge.id,
            kind: edge.kind(),
            source: edge.from,
            target: edge.to,
            label: edge.kind().label(),
            color: if is_suspicious { SUSPICIOUS_EDGE_COLOR } else { EDGE_COLOR },
            is_suspicious,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subgraph {
    pub client_id: String,
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
    pub paths: usize,
    pub truncated: bool,
}

impl Subgraph {
    pub fn contains(&self, kind: NodeKind, key: &str) -> bool {
        self.nodes.iter().any(|n| n.kind == kind && n.key == key)
    }
}

/// Insertion-ordered, de-duplicated node and edge sets.
#[derive(Default)]
struct Collector {
    nodes: Vec<NodeId>,
    seen_nodes: HashSet<NodeId>,
    edges: Vec<EdgeId>,
    seen_edges: HashSet<EdgeId>,
}

impl Collector {
    fn node(&mut self, id: NodeId) {
        if self.seen_nodes.insert(id) {
            self.nodes.push(id);
        }
    }

    fn edge(&mut self, id: EdgeId) {
        if self.seen_edges.insert(id) {
            self.edges.push(id);
        }
    }
}

pub struct SubgraphExtractor<'g> {
    graph: &'g GraphStore,
    config: SubgraphConfig,
}

impl<'g> SubgraphExtractor<'g> {
    pub fn new(graph: &'g GraphStore, config: SubgraphConfig) -> Self {
        Self { graph, config }
    }

    pub fn extract(&self, client_id: &str) -> GraphResult<Subgraph> {
        let client = self
            .graph
            .lookup(NodeKind::Client, client_id)
            .ok_or_else(|| GraphError::UnknownReference {
                entity: NodeKind::Client.label(),
                key: client_id.to_string(),
            })?;

        let mut out = Collector::default();
        out.node(client);
        let mut paths = 0usize;
        let mut truncated = false;

        for owns in self.graph.edges_of(client, EdgeKind::Owns, Direction::Outgoing) {
            out.node(owns.to);
            out.edge(owns.id);
            if truncated {
                continue;
            }
            let mut trail = Vec::with_capacity(self.config.max_hops);
            truncated = !self.walk(owns.to, &mut trail, &mut out, &mut paths);
        }

        // Banks of every included account.
        let accounts: Vec<NodeId> = out
            .nodes
            .iter()
            .copied()
            .filter(|&id| self.graph.node(id).is_some_and(|n| n.kind() == NodeKind::Account))
            .collect();
        for account in accounts {
            for domicile in self.graph.edges_of(account, EdgeKind::DomiciledAt, Direction::Outgoing) {
                out.node(domicile.to);
                out.edge(domicile.id);
            }
        }

        let nodes = out
            .nodes
            .iter()
            .filter_map(|&id| self.graph.node(id))
            .map(|n| SubgraphNode {
                id: n.id,
                kind: n.kind(),
                key: n.key.clone(),
                hint: PresentationHint::for_node(n),
            })
            .collect();
        let edges = out
            .edges
            .iter()
            .filter_map(|&id| self.graph.edge(id))
            .map(SubgraphEdge::from_edge)
            .collect();

        log::debug!("subgraph for {client_id}: {paths} path(s), truncated={truncated}");
        Ok(Subgraph {
            client_id: client_id.to_string(),
            nodes,
            edges,
            paths,
            truncated,
        })
    }

    /// Extend the transfer trail from `at`. Returns false once the path cap is hit.
    fn walk(&self, at: NodeId, trail: &mut Vec<EdgeId>, out: &mut Collector, paths: &mut usize) -> bool {
        if trail.len() >= self.config.max_hops {
            return true;
        }
        for edge in self.graph.edges_of(at, EdgeKind::TransfersTo, Direction::Both) {
            if trail.contains(&edge.id) {
                continue;
            }
            trail.push(edge.id);
            let next = edge.other(at);

            if trail.len() >= self.config.min_hops {
                if *paths >= self.config.max_paths {
                    trail.pop();
                    return false;
                }
                *paths += 1;
                for &id in trail.iter() {
                    out.edge(id);
                    if let Some(e) = self.graph.edge(id) {
                        out.node(e.from);
                        out.node(e.to);
                    }
                }
            }

            let keep_going = self.walk(next, trail, out, paths);
            trail.pop();
            if !keep_going {
                return false;
            }
        }
        true
    }
}
