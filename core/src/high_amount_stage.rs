//! High-amount rule.
//!
//! Every transfer at or above the threshold is marked suspicious and the
//! client owning its source account gains points. Points accumulate per
//! qualifying transfer; the HIGH_AMOUNT flag is appended once per client.

use crate::{
    error::GraphResult,
    event::DetectionEvent,
    graph::GraphStore,
    stage::{DetectionStage, Mutation, StagePlan},
    types::{RiskFlag, SuspicionReason},
};

pub struct HighAmountStage {
    threshold: f64,
    points: u32,
}

impl HighAmountStage {
    pub fn new(threshold: f64, points: u32) -> Self {
        Self { threshold, points }
    }
}

impl DetectionStage for HighAmountStage {
    fn name(&self) -> &'static str {
        "high_amount"
    }

    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan> {
        let mut plan = StagePlan::new();
        let mut flagged = 0usize;

        for (edge, transfer) in graph.transfers() {
            if transfer.amount < self.threshold {
                continue;
            }
            let owner = graph.owner_of(edge.from)?;
            flagged += 1;
            plan.push(Mutation::FlagTransfer {
                edge: edge.id,
                reason: SuspicionReason::HighAmount,
            });
            plan.push(Mutation::AddRisk {
                client: owner,
                points: self.points,
                flag: RiskFlag::HighAmount,
            });
            plan.emit(DetectionEvent::TransferFlagged {
                transfer_id: transfer.id.clone(),
                reason: SuspicionReason::HighAmount,
                amount: transfer.amount,
            });
            plan.emit(DetectionEvent::ClientFlagged {
                client_id: graph.key_of(owner),
                flag: RiskFlag::HighAmount,
                points: self.points,
                account: graph.key_of(edge.from),
            });
        }

        log::info!(
            "high_amount: {} transfer(s) at or above {:.2}",
            flagged,
            self.threshold
        );
        Ok(plan)
    }
}
