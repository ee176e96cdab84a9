use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of one migration invocation, supplied by the embedding
/// scheduler. Built once, immutable for the lifetime of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationRequest {
    /// Lower bound on event timestamps; `None` copies the whole stream.
    pub since: Option<DateTime<Utc>>,
    /// Emit per-page progress notices.
    pub verbose: bool,
}

impl MigrationRequest {
    /// Request covering the entire legacy stream.
    pub fn all() -> Self {
        MigrationRequest::default()
    }

    /// Request restricted to events at or after `since`.
    pub fn from_date(since: DateTime<Utc>) -> Self {
        MigrationRequest {
            since: Some(since),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
