use crate::source::ConfigSource;
use std::sync::Arc;

/// Feature toggle for the new event store.
pub const STORE_ENABLED_KEY: &str = "eventstore.enabled";
/// Identifier of the store implementation to copy into.
pub const STORE_ID_KEY: &str = "eventstore.store";

/// The slice of configuration the migration engine reads: whether the new
/// store is switched on, and which registered implementation to target.
#[derive(Clone)]
pub struct EventStoreConfig {
    source: Arc<dyn ConfigSource>,
}

impl EventStoreConfig {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        EventStoreConfig { source }
    }

    /// Whether the new store feature is switched on. Absent means enabled.
    pub fn store_enabled(&self) -> bool {
        self.source.property(STORE_ENABLED_KEY).unwrap_or(true)
    }

    /// Identifier of the configured store implementation. A blank value
    /// counts as unset.
    pub fn store_id(&self) -> Option<String> {
        self.source
            .raw(STORE_ID_KEY)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}
