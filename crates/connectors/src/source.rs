use crate::error::SourceError;
use async_trait::async_trait;
use model::{event::Event, pagination::cursor::EventQuery};

/// Read side of the legacy event stream.
#[async_trait]
pub trait LegacyEventSource: Send + Sync {
    /// Execute one query window and return its events in stream order,
    /// bounded by the query limit.
    async fn search(&self, query: &EventQuery) -> Result<Vec<Event>, SourceError>;
}
