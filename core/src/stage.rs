//! Detection stage trait and the mutation plan every stage produces.
//!
//! RULE: a stage never writes to the graph. It reads the graph, performs
//! every integrity check it needs, and returns a StagePlan. The engine
//! applies the plan only once planning succeeded, so a stage is either
//! fully applied or not applied at all.

use crate::{
    error::GraphResult,
    event::DetectionEvent,
    graph::GraphStore,
    types::{ClientStatus, EdgeId, NodeId, RiskFlag, SuspicionReason},
};

/// One write against a client or transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// risk_score = 0, flags = [].
    ResetClient(NodeId),
    /// is_suspicious = false, reason = None.
    ResetTransfer(EdgeId),
    FlagTransfer { edge: EdgeId, reason: SuspicionReason },
    /// Additive points; the flag is appended at most once per client.
    AddRisk { client: NodeId, points: u32, flag: RiskFlag },
    Classify { client: NodeId, status: ClientStatus },
}

#[derive(Debug, Default)]
pub struct StagePlan {
    pub mutations: Vec<Mutation>,
    pub events: Vec<DetectionEvent>,
}

impl StagePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn emit(&mut self, event: DetectionEvent) {
        self.events.push(event);
    }
}

/// The contract every detection stage must fulfill.
pub trait DetectionStage: Send + Sync {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Read the graph as left by the previous stage and plan this stage's writes.
    fn plan(&self, graph: &GraphStore) -> GraphResult<StagePlan>;
}
