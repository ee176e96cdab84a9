use crate::{error::SourceError, source::LegacyEventSource};
use async_trait::async_trait;
use model::{event::Event, pagination::cursor::EventQuery};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

/// Vec-backed legacy source for tests and demos.
///
/// Applies the filter, offset and limit the way the real read path does,
/// and records every offset it was queried at so callers can assert on the
/// pagination behaviour of the driving loop.
pub struct MemoryEventSource {
    events: Vec<Event>,
    offsets_seen: Mutex<Vec<usize>>,
    fail_next: AtomicBool,
}

impl MemoryEventSource {
    /// Build a source over the given events, sorted into stream order.
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(b.id())));
        MemoryEventSource {
            events,
            offsets_seen: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Offsets of every search executed so far, in call order.
    pub fn observed_offsets(&self) -> Vec<usize> {
        self.offsets_seen.lock().expect("offset log poisoned").clone()
    }

    pub fn search_calls(&self) -> usize {
        self.offsets_seen.lock().expect("offset log poisoned").len()
    }

    /// Make the next search fail with an unavailability error.
    pub fn fail_next_search(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LegacyEventSource for MemoryEventSource {
    async fn search(&self, query: &EventQuery) -> Result<Vec<Event>, SourceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SourceError::Unavailable("injected search failure".into()));
        }

        self.offsets_seen
            .lock()
            .expect("offset log poisoned")
            .push(query.offset());

        let page = self
            .events
            .iter()
            .filter(|event| query.filter().is_none_or(|f| f.matches(event)))
            .skip(query.offset())
            .take(query.limit())
            .cloned()
            .collect();

        Ok(page)
    }
}
