use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::DispatchOutcome;

/// What happened to one value of a control sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DispatchRecord {
    /// The value that was sent (or attempted).
    pub value: f64,
    /// How the hub, or the local credential gate, answered.
    pub outcome: DispatchOutcome,
    /// When the dispatch finished.
    pub at: DateTime<Utc>,
}

impl DispatchRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(value: f64, outcome: DispatchOutcome) -> Self {
        Self { value, outcome, at: Utc::now() }
    }
}

/// Summary of one sequencer run.
///
/// A run reports completion of the attempt, not dispatch success: callers
/// that care about individual values inspect [`SequenceReport::records`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SequenceReport {
    /// Entity the sequence targeted.
    pub entity_id: String,
    /// One entry per attempted dispatch, in order.
    pub records: Vec<DispatchRecord>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished or was cancelled.
    pub finished_at: DateTime<Utc>,
    /// Whether the run was stopped by its cancellation token.
    pub cancelled: bool,
}

impl SequenceReport {
    /// Creates a report for a run that has not finished.
    #[must_use]
    pub fn start(entity_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            entity_id: entity_id.into(),
            records: Vec::new(),
            started_at: now,
            finished_at: now,
            cancelled: false,
        }
    }

    /// Seals the report.
    #[must_use]
    pub fn finish(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self.finished_at = Utc::now();
        self
    }

    /// `true` when every selected value was attempted.
    #[must_use]
    pub fn completed(&self) -> bool {
        !self.cancelled
    }

    /// Number of values the hub accepted.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_accepted()).count()
    }
}
