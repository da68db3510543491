//! The detection engine: recomputes every risk field from scratch.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Reset            (scores, flags, suspicion)
//!   2. High amount
//!   3. Smurfing
//!   4. Laundering cycle
//!   5. Classification
//!
//! RULES:
//!   - Stages execute in registration order, one at a time.
//!   - Each stage plans against the graph as left by the previous stage.
//!   - Stages never write to the graph; the engine applies their plans.
//!   - A failed or aborted run reports exactly which stages completed.

use crate::{
    abort::AbortSignal,
    classification_stage::ClassificationStage,
    config::DetectionConfig,
    cycle_detector::CycleDetector,
    error::{GraphError, GraphResult},
    event::{DetectionEvent, EventLogEntry},
    graph::GraphStore,
    high_amount_stage::HighAmountStage,
    laundering_cycle_stage::LaunderingCycleStage,
    reset_stage::ResetStage,
    smurfing_stage::SmurfingStage,
    stage::{DetectionStage, Mutation},
    types::{NodeKind, RunId},
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub run_id: RunId,
    pub completed_stages: Vec<&'static str>,
    pub events: Vec<DetectionEvent>,
    pub suspicious_transfers: usize,
    pub cycles: usize,
    pub flagged_clients: usize,
}

impl DetectionReport {
    /// Event log rows for this run. Each stage event is attributed to the
    /// stage whose `StageCompleted` follows it; run bookends go to "engine".
    pub fn log_entries(&self) -> GraphResult<Vec<EventLogEntry>> {
        let mut stage = "engine".to_string();
        let mut entries = Vec::with_capacity(self.events.len());
        for (seq, event) in self.events.iter().enumerate().rev() {
            match event {
                DetectionEvent::StageCompleted { stage: name, .. } => stage = name.clone(),
                DetectionEvent::RunStarted { .. } | DetectionEvent::RunCompleted { .. } => {
                    stage = "engine".to_string()
                }
                _ => {}
            }
            entries.push(EventLogEntry {
                id: None,
                run_id: self.run_id.clone(),
                seq: seq as u64,
                stage: stage.clone(),
                event_type: event.type_name().to_string(),
                payload: serde_json::to_string(event)?,
            });
        }
        entries.reverse();
        Ok(entries)
    }
}

pub struct DetectionEngine {
    stages: Vec<Box<dyn DetectionStage>>,
    abort: AbortSignal,
}

impl DetectionEngine {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            abort: AbortSignal::new(),
        }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: &DetectionConfig) -> GraphResult<Self> {
        config.validate()?;
        let mut engine = DetectionEngine::new();

        // EXECUTION ORDER: fixed, never reordered.
        engine.register(Box::new(ResetStage));
        engine.register(Box::new(HighAmountStage::new(
            config.high_amount_threshold,
            config.high_amount_points,
        )));
        engine.register(Box::new(SmurfingStage::new(
            config.smurfing_amount_ceiling,
            config.smurfing_min_count,
            config.smurfing_points,
        )));
        engine.register(Box::new(LaunderingCycleStage::new(
            CycleDetector::new(config.cycle_min_len, config.cycle_max_len)
                .with_parallel(config.parallel_cycle_search),
            config.cycle_points,
        )));
        engine.register(Box::new(ClassificationStage::new(
            config.critical_cutoff,
            config.warning_cutoff,
        )));
        Ok(engine)
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn DetectionStage>) {
        self.stages.push(stage);
    }

    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Run every stage in order against `graph`.
    pub fn run(&self, graph: &mut GraphStore) -> GraphResult<DetectionReport> {
        let run_id = Uuid::new_v4().to_string();
        let mut events = vec![DetectionEvent::RunStarted {
            run_id: run_id.clone(),
            clients: graph.count_of(NodeKind::Client),
            transfers: graph.transfer_count(),
        }];
        let mut completed: Vec<&'static str> = Vec::new();

        for stage in &self.stages {
            let name = stage.name();
            if self.abort.is_aborted() {
                log::warn!("detection {run_id}: aborted before stage '{name}'");
                return Err(GraphError::DetectionAborted { next: name, completed });
            }

            let applied = stage
                .plan(graph)
                .and_then(|plan| {
                    let mutations = apply_plan(graph, &plan.mutations)?;
                    Ok((plan, mutations))
                });
            let (plan, mutations) = match applied {
                Ok(done) => done,
                Err(e) => {
                    log::error!("detection {run_id}: stage '{name}' failed: {e}");
                    return Err(GraphError::StageFailed {
                        stage: name,
                        completed,
                        source: Box::new(e),
                    });
                }
            };

            events.extend(plan.events);
            events.push(DetectionEvent::StageCompleted {
                stage: name.to_string(),
                mutations,
            });
            completed.push(name);
            log::debug!("detection {run_id}: stage '{name}' applied {mutations} mutation(s)");
        }

        let suspicious_transfers = graph.transfers().filter(|(_, t)| t.is_suspicious).count();
        let cycles = events
            .iter()
            .filter(|e| matches!(e, DetectionEvent::CycleFound { .. }))
            .count();
        let flagged_clients = graph
            .scan(NodeKind::Client, |n| n.attrs.as_client().is_some_and(|c| c.risk_score > 0))
            .count();

        events.push(DetectionEvent::RunCompleted {
            run_id: run_id.clone(),
            flagged_clients,
        });
        log::info!(
            "detection {run_id} complete: {suspicious_transfers} suspicious transfer(s), \
             {cycles} cycle(s), {flagged_clients} flagged client(s)"
        );

        Ok(DetectionReport {
            run_id,
            completed_stages: completed,
            events,
            suspicious_transfers,
            cycles,
            flagged_clients,
        })
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The single write path for risk and suspicion fields.
fn apply_plan(graph: &mut GraphStore, mutations: &[Mutation]) -> GraphResult<usize> {
    for mutation in mutations {
        match *mutation {
            Mutation::ResetClient(id) => graph.update_client(id, |c| {
                c.risk_score = 0;
                c.flags.clear();
            })?,
            Mutation::ResetTransfer(id) => graph.update_transfer(id, |t| {
                t.is_suspicious = false;
                t.reason = None;
            })?,
            Mutation::FlagTransfer { edge, reason } => graph.update_transfer(edge, |t| {
                t.is_suspicious = true;
                t.reason = Some(reason);
            })?,
            Mutation::AddRisk { client, points, flag } => graph.update_client(client, |c| {
                c.risk_score = c.risk_score.saturating_add(points);
                c.add_flag(flag);
            })?,
            Mutation::Classify { client, status } => graph.update_client(client, |c| {
                c.status = Some(status);
            })?,
        }
    }
    Ok(mutations.len())
}
