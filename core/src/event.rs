//! Detection events: the audit trail of one detection run.
//!
//! RULE: stages never log findings only to the console. Every mutation a
//! stage plans is accompanied by an event, so a run can be replayed from
//! its event log and compared against another.

use crate::types::{ClientStatus, RiskFlag, RunId, SuspicionReason};
use serde::{Deserialize, Serialize};

/// Every event emitted during a detection run.
/// Variants are added, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionEvent {
    RunStarted {
        run_id: RunId,
        clients: usize,
        transfers: usize,
    },
    StageCompleted {
        stage: String,
        mutations: usize,
    },
    TransferFlagged {
        transfer_id: String,
        reason: SuspicionReason,
        amount: f64,
    },
    ClientFlagged {
        client_id: String,
        flag: RiskFlag,
        points: u32,
        /// Account whose activity triggered the points.
        account: String,
    },
    CycleFound {
        accounts: Vec<String>,
    },
    ClientClassified {
        client_id: String,
        score: u32,
        status: ClientStatus,
    },
    RunCompleted {
        run_id: RunId,
        flagged_clients: usize,
    },
}

impl DetectionEvent {
    /// Stable name for the `event_type` column of the event log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. }       => "run_started",
            Self::StageCompleted { .. }   => "stage_completed",
            Self::TransferFlagged { .. }  => "transfer_flagged",
            Self::ClientFlagged { .. }    => "client_flagged",
            Self::CycleFound { .. }       => "cycle_found",
            Self::ClientClassified { .. } => "client_classified",
            Self::RunCompleted { .. }     => "run_completed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub stage: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized DetectionEvent
}
