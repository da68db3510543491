//! Bounded simple-cycle enumeration over the account transfer graph.
//!
//! The transfer edges are first frozen into a compact adjacency where
//! parallel transfers between the same pair of accounts collapse into one
//! successor entry; only edge existence matters for cycle membership.
//!
//! Each account is then used as a candidate start. A search from `start`
//! only walks through accounts with a larger index than `start`, so every
//! cycle is found from its smallest member and from nowhere else. Paths
//! never revisit a node, and are cut as soon as they hold `max_len` nodes
//! (a closing edge would then be edge number `max_len`).
//!
//! Searches share nothing but the frozen adjacency. They run on the rayon
//! pool and their hit sets are merged by union afterwards.

use crate::{
    graph::GraphStore,
    types::{NodeId, NodeKind},
};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Distinct cycles, each as the sorted set of its participant accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub cycles: Vec<Vec<NodeId>>,
    pub members: BTreeSet<NodeId>,
}

impl CycleReport {
    pub fn contains(&self, account: NodeId) -> bool {
        self.members.contains(&account)
    }
}

/// Account-to-account successors, de-duplicated and sorted.
struct TransferAdjacency {
    accounts: Vec<NodeId>,
    successors: Vec<Vec<usize>>,
}

impl TransferAdjacency {
    fn freeze(graph: &GraphStore) -> Self {
        let accounts: Vec<NodeId> = graph.nodes_of_kind(NodeKind::Account).map(|n| n.id).collect();
        let local: HashMap<NodeId, usize> = accounts.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut successors = vec![Vec::new(); accounts.len()];
        for (edge, _) in graph.transfers() {
            if let (Some(&from), Some(&to)) = (local.get(&edge.from), local.get(&edge.to)) {
                successors[from].push(to);
            }
        }
        for list in &mut successors {
            list.sort_unstable();
            list.dedup();
        }
        Self { accounts, successors }
    }
}

pub struct CycleDetector {
    min_len: usize,
    max_len: usize,
    parallel: bool,
}

impl CycleDetector {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len, parallel: true }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn detect(&self, graph: &GraphStore) -> CycleReport {
        let adjacency = TransferAdjacency::freeze(graph);
        let n = adjacency.accounts.len();

        let hits: BTreeSet<Vec<usize>> = if self.parallel {
            (0..n)
                .into_par_iter()
                .map(|start| self.search_from(&adjacency, start))
                .reduce(BTreeSet::new, |mut a, b| {
                    a.extend(b);
                    a
                })
        } else {
            (0..n).fold(BTreeSet::new(), |mut acc, start| {
                acc.extend(self.search_from(&adjacency, start));
                acc
            })
        };

        let cycles: Vec<Vec<NodeId>> = hits
            .into_iter()
            .map(|set| set.into_iter().map(|i| adjacency.accounts[i]).collect())
            .collect();
        let members = cycles.iter().flatten().copied().collect();

        log::debug!(
            "cycle search over {n} account(s), window {}..={}: {} distinct cycle(s)",
            self.min_len,
            self.max_len,
            cycles.len()
        );
        CycleReport { cycles, members }
    }

    fn search_from(&self, adjacency: &TransferAdjacency, start: usize) -> BTreeSet<Vec<usize>> {
        let mut hits = BTreeSet::new();
        let mut path = Vec::with_capacity(self.max_len);
        path.push(start);
        self.extend(adjacency, start, &mut path, &mut hits);
        hits
    }

    fn extend(
        &self,
        adjacency: &TransferAdjacency,
        start: usize,
        path: &mut Vec<usize>,
        hits: &mut BTreeSet<Vec<usize>>,
    ) {
        let Some(&current) = path.last() else { return };

        for &next in &adjacency.successors[current] {
            if next == start {
                if path.len() >= self.min_len {
                    let mut members = path.clone();
                    members.sort_unstable();
                    hits.insert(members);
                }
                continue;
            }
            if next < start || path.len() >= self.max_len || path.contains(&next) {
                continue;
            }
            path.push(next);
            self.extend(adjacency, start, path, hits);
            path.pop();
        }
    }
}
