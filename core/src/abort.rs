//! Cooperative cancellation for ingestion and detection runs.
//!
//! The flag is only consulted between chunks and between stages, so an
//! aborted run always stops on a boundary where the graph is consistent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm after an aborted run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
