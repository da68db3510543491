//! Reset stage: clears every accumulator so the run starts from scratch.
//!
//! Status is left alone: classification only rewrites clients whose new
//! score is positive.

use crate::{
    error::GraphResult,
    graph::GraphStore,
    stage::{DetectionStage, Mutation, StagePlan},
    types::NodeKind,
};

pub struct ResetStage;

impl DetectionStage for ResetStage {
    fn name(&self) -> &'static str {
        "reset"
    }

    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan> {
        let mut plan = StagePlan::new();
        for client in graph.nodes_of_kind(NodeKind::Client) {
            plan.push(Mutation::ResetClient(client.id));
        }
        for (edge, _) in graph.transfers() {
            plan.push(Mutation::ResetTransfer(edge.id));
        }
        Ok(plan)
    }
}
