//! Laundering-cycle rule: funds returning to their origin through 3–5 hops.
//!
//! Points are granted once per participating account, however many cycles
//! that account sits on.

use crate::{
    cycle_detector::CycleDetector,
    error::GraphResult,
    event::DetectionEvent,
    graph::GraphStore,
    stage::{DetectionStage, Mutation, StagePlan},
    types::RiskFlag,
};

pub struct LaunderingCycleStage {
    detector: CycleDetector,
    points: u32,
}

impl LaunderingCycleStage {
    pub fn new(detector: CycleDetector, points: u32) -> Self {
        Self { detector, points }
    }
}

impl DetectionStage for LaunderingCycleStage {
    fn name(&self) -> &'static str {
        "laundering_cycle"
    }

    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan> {
        let mut plan = StagePlan::new();
        let report = self.detector.detect(graph);

        for cycle in &report.cycles {
            plan.emit(DetectionEvent::CycleFound {
                accounts: cycle.iter().map(|&id| graph.key_of(id)).collect(),
            });
        }

        for &account in &report.members {
            let owner = graph.owner_of(account)?;
            plan.push(Mutation::AddRisk {
                client: owner,
                points: self.points,
                flag: RiskFlag::LaunderingCycle,
            });
            plan.emit(DetectionEvent::ClientFlagged {
                client_id: graph.key_of(owner),
                flag: RiskFlag::LaunderingCycle,
                points: self.points,
                account: graph.key_of(account),
            });
        }

        log::info!(
            "laundering_cycle: {} cycle(s), {} participating account(s)",
            report.cycles.len(),
            report.members.len()
        );
        Ok(plan)
    }
}
