/// Example wiring the migration job against in-memory collaborators:
/// 250 legacy events copied into an empty target store, verbose logging on.
use chrono::{Duration, TimeZone, Utc};
use connectors::memory::{source::MemoryEventSource, store::MemoryEventStore};
use engine_config::{
    event_store::{EventStoreConfig, STORE_ID_KEY},
    source::MapConfigSource,
};
use engine_runtime::{
    job::{MigrationJob, MigrationJobParams},
    registry::StoreRegistry,
};
use model::request::MigrationRequest;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let legacy_events = (0..250)
        .map(|i| {
            model::event::Event::new(format!("legacy-{i:04}"), start + Duration::minutes(i))
                .with_field("application", json!("wiki"))
        })
        .collect();

    let store = MemoryEventStore::new();
    let job = MigrationJob::new(MigrationJobParams {
        config: EventStoreConfig::new(Arc::new(
            MapConfigSource::new().with(STORE_ID_KEY, "primary"),
        )),
        registry: StoreRegistry::new().with_store("primary", Arc::new(store.clone())),
        legacy: Arc::new(MemoryEventSource::new(legacy_events)),
        cancel: CancellationToken::new(),
    });

    let outcome = job
        .run(&MigrationRequest::all().verbose(true))
        .await
        .expect("migration run");

    // Only the last save of the final page was awaited; let the rest land.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let status = job.status();
    let status = status.lock().await;
    println!(
        "outcome={outcome} pages={} seen={} saved={} store_size={}",
        status.pages_fetched,
        status.events_seen,
        status.events_saved,
        store.len()
    );
}
