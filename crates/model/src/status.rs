use serde::Serialize;
use std::fmt;

/// Progress counters for one migration run.
///
/// Mutated only by the job that owns it; everyone else reads through the
/// shared handle the job exposes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStatus {
    pub pages_fetched: u64,
    pub events_seen: u64,
    pub events_saved: u64,
    /// Offset of the page most recently processed.
    pub offset: usize,
}

/// How a run ended when no error was raised.
///
/// Disabled and misconfigured stores are valid idle outcomes, distinct from
/// both a completed copy and a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The loop ran to exhaustion; the status counters say how much moved.
    Completed,
    /// The target store feature is switched off; no I/O was attempted.
    SkippedDisabled,
    /// No store implementation matched the configured identifier.
    SkippedMisconfigured,
    /// Cooperative cancellation was honoured between two pages.
    Cancelled,
}

impl MigrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationOutcome::Completed => "completed",
            MigrationOutcome::SkippedDisabled => "skipped-disabled",
            MigrationOutcome::SkippedMisconfigured => "skipped-misconfigured",
            MigrationOutcome::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
