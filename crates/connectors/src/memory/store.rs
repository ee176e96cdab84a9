use crate::{
    error::StoreError,
    store::{EventStore, SaveHandle},
};
use async_trait::async_trait;
use model::event::Event;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tracing::debug;

/// Map-backed event store.
///
/// Saves are dispatched as tokio tasks so the submit-now/await-later
/// contract behaves like a real asynchronous store; an optional write delay
/// and failure switches let tests stretch completion order and exercise the
/// error paths.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    events: Mutex<HashMap<String, Event>>,
    submitted: Mutex<Vec<String>>,
    probes: AtomicUsize,
    fail_probes: AtomicBool,
    fail_submits: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        MemoryEventStore::default()
    }

    /// Delay applied inside each save task before the write lands.
    pub fn with_write_delay(self, delay: Duration) -> Self {
        *self.inner.write_delay.lock().expect("delay lock poisoned") = Some(delay);
        self
    }

    /// Pre-populate the store, bypassing the asynchronous write path.
    pub fn seed(&self, events: impl IntoIterator<Item = Event>) {
        let mut map = self.inner.events.lock().expect("store lock poisoned");
        for event in events {
            map.insert(event.id().to_string(), event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.inner
            .events
            .lock()
            .expect("store lock poisoned")
            .contains_key(event_id)
    }

    /// Identifiers in the order they were submitted for saving.
    pub fn submitted_ids(&self) -> Vec<String> {
        self.inner
            .submitted
            .lock()
            .expect("submission log poisoned")
            .clone()
    }

    pub fn probe_count(&self) -> usize {
        self.inner.probes.load(Ordering::SeqCst)
    }

    /// Make every existence probe fail.
    pub fn fail_probes(&self) {
        self.inner.fail_probes.store(true, Ordering::SeqCst);
    }

    /// Make every save fail at submission time.
    pub fn fail_submits(&self) {
        self.inner.fail_submits.store(true, Ordering::SeqCst);
    }

    /// Make every queued write fail when it completes.
    pub fn fail_writes(&self) {
        self.inner.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn exists(&self, event_id: &str) -> Result<bool, StoreError> {
        self.inner.probes.fetch_add(1, Ordering::SeqCst);

        if self.inner.fail_probes.load(Ordering::SeqCst) {
            return Err(StoreError::Probe {
                event_id: event_id.to_string(),
                message: "injected probe failure".into(),
            });
        }

        Ok(self.contains(event_id))
    }

    fn save_async(&self, event: Event) -> Result<SaveHandle, StoreError> {
        if self.inner.fail_submits.load(Ordering::SeqCst) {
            return Err(StoreError::Save {
                event_id: event.id().to_string(),
                message: "injected submission failure".into(),
            });
        }

        self.inner
            .submitted
            .lock()
            .expect("submission log poisoned")
            .push(event.id().to_string());

        let inner = self.inner.clone();
        Ok(tokio::spawn(async move {
            let delay = *inner.write_delay.lock().expect("delay lock poisoned");
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if inner.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Save {
                    event_id: event.id().to_string(),
                    message: "injected write failure".into(),
                });
            }

            inner
                .events
                .lock()
                .expect("store lock poisoned")
                .insert(event.id().to_string(), event.clone());
            debug!(event_id = event.id(), "Event persisted");

            Ok(event)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn save_lands_after_awaiting_the_handle() {
        let store = MemoryEventStore::new();
        let event = Event::new("ev-1", Utc::now());

        let handle = store.save_async(event.clone()).unwrap();
        let saved = handle.await.unwrap().unwrap();

        assert_eq!(saved, event);
        assert!(store.contains("ev-1"));
        assert!(store.exists("ev-1").await.unwrap());
        assert_eq!(store.submitted_ids(), vec!["ev-1".to_string()]);
    }

    #[tokio::test]
    async fn seeded_events_are_visible_to_probes() {
        let store = MemoryEventStore::new();
        store.seed([Event::new("ev-1", Utc::now())]);

        assert!(store.exists("ev-1").await.unwrap());
        assert!(!store.exists("ev-2").await.unwrap());
        assert_eq!(store.probe_count(), 2);
        assert!(store.submitted_ids().is_empty());
    }

    #[tokio::test]
    async fn submission_failure_is_raised_before_spawning() {
        let store = MemoryEventStore::new();
        store.fail_submits();

        assert!(store.save_async(Event::new("ev-1", Utc::now())).is_err());
        assert!(store.submitted_ids().is_empty());
    }

    #[tokio::test]
    async fn delayed_write_lands_only_once_awaited() {
        let store = MemoryEventStore::new().with_write_delay(Duration::from_millis(50));

        let handle = store.save_async(Event::new("ev-1", Utc::now())).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!store.contains("ev-1"));

        handle.await.unwrap().unwrap();
        assert!(store.contains("ev-1"));
    }

    #[tokio::test]
    async fn write_failure_surfaces_through_the_handle() {
        let store = MemoryEventStore::new();
        store.fail_writes();

        let handle = store.save_async(Event::new("ev-1", Utc::now())).unwrap();
        assert!(handle.await.unwrap().is_err());
        assert!(!store.contains("ev-1"));
    }
}
