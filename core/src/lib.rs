//! amlgraph-core: in-memory AML graph, ingestion, rule engine and query surface.
//!
//! MODULE MAP:
//!   graph / model / types     property graph and its payloads
//!   ingest                    chunked batch loading
//!   engine + *_stage          five-stage detection pass
//!   cycle_detector            bounded simple-cycle search
//!   subgraph / query          read-only views
//!   store / snapshot          SQLite persistence
//!   generator                 deterministic synthetic batches
//!   aml_graph                 facade over all of the above

pub mod abort;
pub mod aml_graph;
pub mod classification_stage;
pub mod config;
pub mod cycle_detector;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod graph;
pub mod high_amount_stage;
pub mod ingest;
pub mod laundering_cycle_stage;
pub mod model;
pub mod name_generator;
pub mod query;
pub mod reset_stage;
pub mod rng;
pub mod smurfing_stage;
pub mod snapshot;
pub mod stage;
pub mod store;
pub mod subgraph;
pub mod types;

pub use aml_graph::AmlGraph;
pub use error::{GraphError, GraphResult};
