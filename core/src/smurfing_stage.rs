//! Smurfing rule: many small outgoing transfers from one account.
//!
//! Evaluated per (client, owned account) pair, so a client with two
//! qualifying accounts receives the points twice.

use crate::{
    error::GraphResult,
    event::DetectionEvent,
    graph::GraphStore,
    stage::{DetectionStage, Mutation, StagePlan},
    types::{Direction, EdgeKind, NodeKind, RiskFlag},
};

pub struct SmurfingStage {
    amount_ceiling: f64,
    min_count: usize,
    points: u32,
}

impl SmurfingStage {
    pub fn new(amount_ceiling: f64, min_count: usize, points: u32) -> Self {
        Self { amount_ceiling, min_count, points }
    }
}

impl DetectionStage for SmurfingStage {
    fn name(&self) -> &'static str {
        "smurfing"
    }

    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan> {
        let mut plan = StagePlan::new();

        for account in graph.nodes_of_kind(NodeKind::Account) {
            let owner = graph.owner_of(account.id)?;
            let small = graph
                .edges_of(account.id, EdgeKind::TransfersTo, Direction::Outgoing)
                .filter_map(|e| e.attrs.as_transfer())
                .filter(|t| t.amount < self.amount_ceiling)
                .count();

            if small > self.min_count {
                plan.push(Mutation::AddRisk {
                    client: owner,
                    points: self.points,
                    flag: RiskFlag::PotentialSmurfing,
                });
                plan.emit(DetectionEvent::ClientFlagged {
                    client_id: graph.key_of(owner),
                    flag: RiskFlag::PotentialSmurfing,
                    points: self.points,
                    account: account.key.clone(),
                });
                log::debug!("smurfing: account {} sent {small} small transfer(s)", account.key);
            }
        }

        log::info!("smurfing: {} account(s) over the small-transfer count", plan.mutations.len());
        Ok(plan)
    }
}
