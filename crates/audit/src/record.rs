use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backline_core::DecisionId;
use backline_policy::Decision;
use backline_review::ReviewItem;

/// A record ready to be appended (not yet assigned a sequence number).
///
/// The log assigns sequence numbers during append, mirroring the
/// uncommitted/stored split of an event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub decision: Decision,
    /// Snapshot of the review item, present for resolution records.
    pub review: Option<ReviewItem>,
    /// Free-form annotation (e.g. "monitored", an execution failure).
    pub note: Option<String>,
}

impl AuditDraft {
    /// Draft for a decision flowing through the automatic path.
    pub fn decision(decision: Decision) -> Self {
        Self {
            decision,
            review: None,
            note: None,
        }
    }

    /// Draft for a human resolution, snapshotting the resolved item.
    pub fn resolution(item: ReviewItem) -> Self {
        Self {
            decision: item.decision.clone(),
            review: Some(item),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Immutable log entry capturing a decision or resolution for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonically increasing position in the log.
    pub sequence_number: u64,
    pub decision_id: DecisionId,
    pub decision: Decision,
    pub review: Option<ReviewItem>,
    pub note: Option<String>,
    pub written_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Whether this record captures a human resolution.
    pub fn is_resolution(&self) -> bool {
        self.review
            .as_ref()
            .map_or(false, |item| item.status.is_terminal())
    }
}
