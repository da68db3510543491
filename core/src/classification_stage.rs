//! Classification: turns each positive risk score into a status.
//! Clients scoring zero keep whatever status they already had.

use crate::{
    error::GraphResult,
    event::DetectionEvent,
    graph::GraphStore,
    stage::{DetectionStage, Mutation, StagePlan},
    types::{ClientStatus, NodeKind},
};

pub struct ClassificationStage {
    critical_cutoff: u32,
    warning_cutoff: u32,
}

impl ClassificationStage {
    pub fn new(critical_cutoff: u32, warning_cutoff: u32) -> Self {
        Self { critical_cutoff, warning_cutoff }
    }

    pub fn classify(&self, score: u32) -> ClientStatus {
        if score >= self.critical_cutoff {
            ClientStatus::Critical
        } else if score >= self.warning_cutoff {
            ClientStatus::Warning
        } else {
            ClientStatus::Safe
        }
    }
}

impl DetectionStage for ClassificationStage {
    fn name(&self) -> &'static str {
        "classification"
    }

    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan> {
        let mut plan = StagePlan::new();

        for node in graph.nodes_of_kind(NodeKind::Client) {
            let Some(client) = node.attrs.as_client() else { continue };
            if client.risk_score == 0 {
                continue;
            }
            let status = self.classify(client.risk_score);
            plan.push(Mutation::Classify { client: node.id, status });
            plan.emit(DetectionEvent::ClientClassified {
                client_id: node.key.clone(),
                score: client.risk_score,
                status,
            });
        }

        log::info!("classification: {} client(s) with a positive score", plan.mutations.len());
        Ok(plan)
    }
}
