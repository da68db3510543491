//! AmlGraph: the single entry point the runner and the tests drive.
//!
//! Owns the graph store, the configuration and the abort signal shared by
//! ingestion and detection. Writers (`load`, `run_detection`, `clean`) take
//! `&mut self`; every query takes `&self`.

use crate::{
    abort::AbortSignal,
    config::AppConfig,
    engine::{DetectionEngine, DetectionReport},
    error::GraphResult,
    graph::GraphStore,
    ingest::{IngestReport, Ingestor, RecordBatches},
    query::{self, ClientView, FlaggedClient, DEFAULT_FLAGGED_LIMIT},
    store::SnapshotStore,
    subgraph::{Subgraph, SubgraphExtractor},
};

pub struct AmlGraph {
    graph: GraphStore,
    config: AppConfig,
    abort: AbortSignal,
}

impl AmlGraph {
    pub fn new(config: AppConfig) -> GraphResult<Self> {
        config.validate()?;
        Ok(Self {
            graph: GraphStore::new(),
            config,
            abort: AbortSignal::new(),
        })
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A handle that can cancel an in-flight load or detection run.
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    // ── Ingestion ──────────────────────────────────────────────

    pub fn clean(&mut self) {
        self.ingestor().clean();
    }

    pub fn apply_constraints(&mut self) {
        self.ingestor().apply_constraints();
    }

    pub fn load(&mut self, batches: &RecordBatches) -> GraphResult<IngestReport> {
        self.ingestor().load(batches)
    }

    fn ingestor(&mut self) -> Ingestor<'_> {
        Ingestor::new(&mut self.graph, self.config.ingest.clone()).with_abort(self.abort.clone())
    }

    // ── Detection ──────────────────────────────────────────────

    pub fn run_detection(&mut self) -> GraphResult<DetectionReport> {
        let engine = DetectionEngine::build(&self.config.detection)?.with_abort(self.abort.clone());
        engine.run(&mut self.graph)
    }

    // ── Queries ────────────────────────────────────────────────

    /// Highest-risk clients first. `None` uses the sidebar default of 20.
    pub fn list_flagged_clients(&self, limit: Option<usize>) -> Vec<FlaggedClient> {
        query::list_flagged_clients(&self.graph, limit.unwrap_or(DEFAULT_FLAGGED_LIMIT))
    }

    pub fn get_client(&self, client_id: &str) -> Option<ClientView> {
        query::get_client(&self.graph, client_id)
    }

    pub fn get_subgraph(&self, client_id: &str) -> GraphResult<Subgraph> {
        SubgraphExtractor::new(&self.graph, self.config.subgraph.clone()).extract(client_id)
    }

    // ── Persistence ────────────────────────────────────────────

    /// Record a finished detection run: run row, graph snapshot, event log.
    /// All or nothing.
    pub fn persist_run(&self, store: &SnapshotStore, report: &DetectionReport, seed: u64) -> GraphResult<()> {
        let entries = report.log_entries()?;
        store.save_run(&report.run_id, seed, env!("CARGO_PKG_VERSION"), &self.graph, &entries)
    }

    /// Rebuild from the graph saved under `run_id`, if present.
    pub fn from_snapshot(config: AppConfig, store: &SnapshotStore, run_id: &str) -> GraphResult<Option<Self>> {
        let Some(graph) = store.load_graph(run_id)? else {
            return Ok(None);
        };
        let mut aml = Self::new(config)?;
        aml.graph = graph;
        Ok(Some(aml))
    }
}
