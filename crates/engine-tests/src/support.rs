use chrono::{DateTime, Duration, TimeZone, Utc};
use connectors::memory::{source::MemoryEventSource, store::MemoryEventStore};
use engine_config::{
    event_store::{EventStoreConfig, STORE_ID_KEY},
    source::MapConfigSource,
};
use engine_runtime::{
    job::{MigrationJob, MigrationJobParams},
    registry::StoreRegistry,
};
use model::event::Event;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Store id every test engine registers its target store under.
pub const STORE_ID: &str = "primary";

pub fn stream_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Build `count` legacy events, one minute apart, ids `ev-0000` onwards.
pub fn legacy_events(count: usize) -> Vec<Event> {
    let start = stream_start();
    (0..count)
        .map(|i| {
            Event::new(format!("ev-{i:04}"), start + Duration::minutes(i as i64))
                .with_field("application", json!("wiki"))
                .with_field("stream", json!("activity"))
        })
        .collect()
}

/// A job wired against in-memory collaborators, plus handles on both ends
/// for assertions.
pub struct TestEngine {
    pub job: MigrationJob,
    pub source: Arc<MemoryEventSource>,
    pub store: MemoryEventStore,
}

/// Engine with the store registered and configured under [`STORE_ID`].
pub fn engine(legacy: Vec<Event>) -> TestEngine {
    engine_with_config(legacy, MapConfigSource::new().with(STORE_ID_KEY, STORE_ID))
}

pub fn engine_with_config(legacy: Vec<Event>, config: MapConfigSource) -> TestEngine {
    let source = Arc::new(MemoryEventSource::new(legacy));
    let store = MemoryEventStore::new();

    let job = MigrationJob::new(MigrationJobParams {
        config: EventStoreConfig::new(Arc::new(config)),
        registry: StoreRegistry::new().with_store(STORE_ID, Arc::new(store.clone())),
        legacy: source.clone(),
        cancel: CancellationToken::new(),
    });

    TestEngine { job, source, store }
}

/// Let queued save tasks drain. The job only awaits the last save of each
/// page, so writes from earlier in a page may still be in flight when `run`
/// returns.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}
