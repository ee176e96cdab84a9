use thiserror::Error;

/// Errors raised by the legacy read path.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Legacy query failed at offset {offset}: {message}")]
    Query { offset: usize, message: String },

    #[error("Legacy source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the target event store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Existence probe failed for event '{event_id}': {message}")]
    Probe { event_id: String, message: String },

    #[error("Failed to persist event '{event_id}': {message}")]
    Save { event_id: String, message: String },

    #[error("Event store unavailable: {0}")]
    Unavailable(String),
}
