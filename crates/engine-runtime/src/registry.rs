use connectors::store::EventStore;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

/// Raised when nothing is registered under the configured store id.
#[derive(Debug, Error)]
#[error("No event store is registered under '{0}'")]
pub struct UnknownStore(pub String);

/// Maps configured store identifiers to implementations.
///
/// The engine never looks stores up ambiently; every store reachable by a
/// run is registered here by the embedding application.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, Arc<dyn EventStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        StoreRegistry::default()
    }

    pub fn with_store(mut self, id: impl Into<String>, store: Arc<dyn EventStore>) -> Self {
        self.register(id, store);
        self
    }

    pub fn register(&mut self, id: impl Into<String>, store: Arc<dyn EventStore>) {
        self.stores.insert(id.into(), store);
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<dyn EventStore>, UnknownStore> {
        self.stores
            .get(id)
            .cloned()
            .ok_or_else(|| UnknownStore(id.to_string()))
    }
}
