use crate::error::StoreError;
use async_trait::async_trait;
use model::event::Event;
use tokio::task::JoinHandle;

/// Handle to one in-flight asynchronous save. Resolves once the write is
/// durable, or with the store-level error that sank it.
pub type SaveHandle = JoinHandle<Result<Event, StoreError>>;

/// Write side of the new event store.
///
/// The store owns its internal locking; callers may have up to a page of
/// saves in flight and must tolerate other concurrent writers.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Whether a record with this identifier has already been persisted.
    async fn exists(&self, event_id: &str) -> Result<bool, StoreError>;

    /// Queue a durable write and return immediately. Completion order
    /// across queued saves is unspecified; awaiting the handle is the only
    /// completion guarantee.
    fn save_async(&self, event: Event) -> Result<SaveHandle, StoreError>;
}
