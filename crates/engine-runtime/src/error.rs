use connectors::error::{SourceError, StoreError};
use thiserror::Error;

/// Top-level errors for the migration engine.
///
/// Disabled or unresolvable stores are not errors; they surface as
/// dedicated run outcomes. Anything here fails the run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The legacy read path failed mid-run.
    #[error("Legacy source error: {0}")]
    Source(#[from] SourceError),

    /// An existence probe or a save failed against the target store.
    #[error("Event store error: {0}")]
    Store(#[from] StoreError),

    /// The awaited end-of-page write was cancelled or panicked.
    #[error("Save task failed: {0}")]
    Barrier(#[from] tokio::task::JoinError),
}
