//! In-memory property graph: node/edge tables plus adjacency indexes.
//!
//! RULE: every mutation goes through a method on GraphStore, which updates
//! the tables and the indexes together. No caller ever sees an edge that is
//! in the edge table but missing from an adjacency list.
//!
//! Node keys are identity: a (kind, key) pair is unique by construction.
//! Transfer ids are attributes; their uniqueness is a declared constraint
//! that must be applied before a load (see `apply_constraints`).

use crate::{
    error::{GraphError, GraphResult},
    model::{ClientAttrs, Edge, EdgeAttrs, Node, NodeAttrs, TransferAttrs},
    types::{Direction, EdgeId, EdgeKind, NodeId, NodeKind},
};
use std::collections::{BTreeSet, HashMap};

/// Declarative uniqueness requirements, mirroring the ids the ingestion
/// batches promise to keep unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniqueConstraint {
    ClientId,
    AccountIban,
    TransferId,
}

impl UniqueConstraint {
    pub const ALL: [UniqueConstraint; 3] = [Self::ClientId, Self::AccountIban, Self::TransferId];
}

#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashMap<NodeKind, HashMap<String, NodeId>>,
    transfer_index: HashMap<String, EdgeId>,
    by_kind: HashMap<NodeKind, Vec<NodeId>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    constraints: BTreeSet<UniqueConstraint>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Schema ─────────────────────────────────────────────────

    /// Establish every uniqueness constraint. Idempotent.
    /// Returns how many constraints were newly created.
    pub fn apply_constraints(&mut self) -> usize {
        let before = self.constraints.len();
        self.constraints.extend(UniqueConstraint::ALL);
        self.constraints.len() - before
    }

    pub fn constraints_applied(&self) -> bool {
        UniqueConstraint::ALL.iter().all(|c| self.constraints.contains(c))
    }

    /// Remove every node and edge. Constraints survive a clear.
    pub fn clear(&mut self) {
        let removed = (self.nodes.len(), self.edges.len());
        self.nodes.clear();
        self.edges.clear();
        self.node_index.clear();
        self.transfer_index.clear();
        self.by_kind.clear();
        self.outgoing.clear();
        self.incoming.clear();
        log::info!("graph cleared: {} nodes, {} edges removed", removed.0, removed.1);
    }

    // ── Creation ───────────────────────────────────────────────

    pub fn create_node(&mut self, key: &str, attrs: NodeAttrs) -> GraphResult<NodeId> {
        let kind = attrs.kind();
        if self.lookup(kind, key).is_some() {
            return Err(GraphError::ConstraintViolation {
                entity: kind.label(),
                key: key.to_string(),
            });
        }
        Ok(self.insert_node(key, attrs))
    }

    /// Return the existing node for (kind, key), or create it.
    /// The bool is true when the node was created by this call.
    pub fn get_or_create_node(&mut self, key: &str, attrs: NodeAttrs) -> (NodeId, bool) {
        match self.lookup(attrs.kind(), key) {
            Some(id) => (id, false),
            None => (self.insert_node(key, attrs), true),
        }
    }

    fn insert_node(&mut self, key: &str, attrs: NodeAttrs) -> NodeId {
        let id = self.nodes.len();
        let kind = attrs.kind();
        self.nodes.push(Node { id, key: key.to_string(), attrs });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.by_kind.entry(kind).or_default().push(id);
        self.node_index.entry(kind).or_default().insert(key.to_string(), id);
        id
    }

    pub fn create_edge(&mut self, from_key: &str, to_key: &str, attrs: EdgeAttrs) -> GraphResult<EdgeId> {
        let kind = attrs.kind();
        let (from_kind, to_kind) = kind.endpoints();
        let from = self.lookup(from_kind, from_key).ok_or_else(|| GraphError::DanglingReference {
            entity: from_kind.label(),
            key: from_key.to_string(),
        })?;
        let to = self.lookup(to_kind, to_key).ok_or_else(|| GraphError::DanglingReference {
            entity: to_kind.label(),
            key: to_key.to_string(),
        })?;

        match &attrs {
            EdgeAttrs::Transfer(t) => {
                if from == to {
                    return Err(GraphError::SelfLoop { key: from_key.to_string() });
                }
                if self.constraints.contains(&UniqueConstraint::TransferId)
                    && self.transfer_index.contains_key(&t.id)
                {
                    return Err(GraphError::ConstraintViolation {
                        entity: "Transfer",
                        key: t.id.clone(),
                    });
                }
            }
            // An account has exactly one owner and exactly one bank.
            EdgeAttrs::Owns => {
                if self.edges_of(to, EdgeKind::Owns, Direction::Incoming).next().is_some() {
                    return Err(GraphError::ConstraintViolation {
                        entity: kind.label(),
                        key: to_key.to_string(),
                    });
                }
            }
            EdgeAttrs::DomiciledAt => {
                if self.edges_of(from, EdgeKind::DomiciledAt, Direction::Outgoing).next().is_some() {
                    return Err(GraphError::ConstraintViolation {
                        entity: kind.label(),
                        key: from_key.to_string(),
                    });
                }
            }
        }

        let id = self.edges.len();
        if let EdgeAttrs::Transfer(t) = &attrs {
            self.transfer_index.insert(t.id.clone(), id);
        }
        self.edges.push(Edge { id, from, to, attrs });
        self.outgoing[from].push(id);
        self.incoming[to].push(id);
        Ok(id)
    }

    // ── Lookup ─────────────────────────────────────────────────

    pub fn lookup(&self, kind: NodeKind, key: &str) -> Option<NodeId> {
        self.node_index.get(&kind).and_then(|keys| keys.get(key)).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn node_by_key(&self, kind: NodeKind, key: &str) -> Option<&Node> {
        self.lookup(kind, key).and_then(|id| self.node(id))
    }

    /// Key of node `id`, or an empty string for an unknown id.
    pub fn key_of(&self, id: NodeId) -> String {
        self.node(id).map(|n| n.key.clone()).unwrap_or_default()
    }

    pub fn transfer(&self, transfer_id: &str) -> Option<&Edge> {
        self.transfer_index.get(transfer_id).and_then(|&id| self.edge(id))
    }

    pub fn client(&self, id: NodeId) -> Option<&ClientAttrs> {
        self.node(id).and_then(|n| n.attrs.as_client())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&id| &self.nodes[id])
    }

    /// All nodes of `kind` whose attributes satisfy `predicate`, in insertion order.
    pub fn scan<'a, P>(&'a self, kind: NodeKind, predicate: P) -> impl Iterator<Item = &'a Node> + 'a
    where
        P: Fn(&Node) -> bool + 'a,
    {
        self.nodes_of_kind(kind).filter(move |n| predicate(n))
    }

    /// Transfer edges with their payload, in insertion order.
    pub fn transfers(&self) -> impl Iterator<Item = (&Edge, &TransferAttrs)> {
        self.edges
            .iter()
            .filter_map(|e| e.attrs.as_transfer().map(|t| (e, t)))
    }

    /// Edges of `kind` touching `node` in the given direction. O(degree).
    pub fn edges_of(&self, node: NodeId, kind: EdgeKind, direction: Direction) -> impl Iterator<Item = &Edge> {
        let empty: &[EdgeId] = &[];
        let out = match direction {
            Direction::Outgoing | Direction::Both => self.outgoing.get(node).map(Vec::as_slice).unwrap_or(empty),
            Direction::Incoming => empty,
        };
        let inc = match direction {
            Direction::Incoming | Direction::Both => self.incoming.get(node).map(Vec::as_slice).unwrap_or(empty),
            Direction::Outgoing => empty,
        };
        out.iter()
            .chain(inc.iter())
            .map(move |&e| &self.edges[e])
            .filter(move |e| e.kind() == kind)
    }

    /// Adjacent nodes across edges of `kind`, in edge insertion order.
    /// A neighbor reached by several edges appears once per edge.
    pub fn neighbors(&self, node: NodeId, kind: EdgeKind, direction: Direction) -> Vec<NodeId> {
        self.edges_of(node, kind, direction).map(|e| e.other(node)).collect()
    }

    /// The single client owning `account`.
    pub fn owner_of(&self, account: NodeId) -> GraphResult<NodeId> {
        self.single_neighbor(account, EdgeKind::Owns, Direction::Incoming, "account has exactly one owning client")
    }

    /// The single bank domiciling `account`.
    pub fn bank_of(&self, account: NodeId) -> GraphResult<NodeId> {
        self.single_neighbor(account, EdgeKind::DomiciledAt, Direction::Outgoing, "account has exactly one domiciling bank")
    }

    fn single_neighbor(
        &self,
        node: NodeId,
        kind: EdgeKind,
        direction: Direction,
        invariant: &'static str,
    ) -> GraphResult<NodeId> {
        let mut found = self.edges_of(node, kind, direction).map(|e| e.other(node));
        match (found.next(), found.next()) {
            (Some(id), None) => Ok(id),
            _ => Err(GraphError::IntegrityError {
                invariant,
                entity: self.key_of(node),
            }),
        }
    }

    // ── Mutation ───────────────────────────────────────────────

    /// Apply an in-place change to a client's attributes.
    pub(crate) fn update_client<R>(&mut self, id: NodeId, f: impl FnOnce(&mut ClientAttrs) -> R) -> GraphResult<R> {
        let node = self.nodes.get_mut(id).ok_or_else(|| GraphError::DanglingReference {
            entity: NodeKind::Client.label(),
            key: format!("#{id}"),
        })?;
        match &mut node.attrs {
            NodeAttrs::Client(c) => Ok(f(c)),
            other => Err(GraphError::KindMismatch {
                expected: NodeKind::Client.label(),
                actual: other.kind().label(),
            }),
        }
    }

    /// Apply an in-place change to a transfer's attributes.
    pub(crate) fn update_transfer<R>(&mut self, id: EdgeId, f: impl FnOnce(&mut TransferAttrs) -> R) -> GraphResult<R> {
        let edge = self.edges.get_mut(id).ok_or_else(|| GraphError::DanglingReference {
            entity: "Transfer",
            key: format!("#{id}"),
        })?;
        match &mut edge.attrs {
            EdgeAttrs::Transfer(t) => Ok(f(t)),
            other => Err(GraphError::KindMismatch {
                expected: EdgeKind::TransfersTo.label(),
                actual: other.kind().label(),
            }),
        }
    }

    // ── Counts ─────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers().count()
    }
}
