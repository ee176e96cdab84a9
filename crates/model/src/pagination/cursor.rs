use crate::event::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Predicate restricting which legacy events a query returns.
///
/// Carried as structured data so source implementations bind it as a query
/// parameter instead of splicing it into query text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventFilter {
    /// Events with a timestamp at or after the given instant.
    Since(DateTime<Utc>),
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            EventFilter::Since(since) => event.date() >= *since,
        }
    }
}

/// Offset-based window into the legacy source's result set.
///
/// The filter and limit are fixed at construction; only the offset moves,
/// and only the orchestrator moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    filter: Option<EventFilter>,
    limit: usize,
    offset: usize,
}

impl EventQuery {
    pub fn new(filter: Option<EventFilter>, limit: usize) -> Self {
        EventQuery {
            filter,
            limit,
            offset: 0,
        }
    }

    pub fn filter(&self) -> Option<&EventFilter> {
        self.filter.as_ref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the window start forward. Called once per non-empty page.
    pub fn advance(&mut self, by: usize) {
        self.offset += by;
    }
}
