use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Constraint violation: {entity} '{key}' already exists")]
    ConstraintViolation { entity: &'static str, key: String },

    #[error("Dangling reference: {entity} '{key}' does not exist")]
    DanglingReference { entity: &'static str, key: String },

    #[error("Self-loop rejected: account '{key}' cannot transfer to itself")]
    SelfLoop { key: String },

    #[error("Unknown reference: {entity} '{key}'")]
    UnknownReference { entity: &'static str, key: String },

    #[error("Missing owner: account '{account}' references client '{client}', which was never loaded")]
    MissingOwner { account: String, client: String },

    #[error("Integrity error: {invariant} (violated by '{entity}')")]
    IntegrityError { invariant: &'static str, entity: String },

    #[error("Uniqueness constraints must be applied before loading")]
    ConstraintsNotApplied,

    #[error("Kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: &'static str, actual: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ingestion aborted during {batch} after {chunks_applied} chunk(s)")]
    IngestAborted { batch: &'static str, chunks_applied: usize },

    #[error("Detection aborted before stage '{next}' (completed: {completed:?})")]
    DetectionAborted { next: &'static str, completed: Vec<&'static str> },

    #[error("Detection stage '{stage}' failed (completed: {completed:?}): {source}")]
    StageFailed {
        stage: &'static str,
        completed: Vec<&'static str>,
        #[source]
        source: Box<GraphError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphError {
    /// Per-record ingestion failures: the record is skipped and counted,
    /// the batch continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation { .. }
                | Self::DanglingReference { .. }
                | Self::SelfLoop { .. }
                | Self::UnknownReference { .. }
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
