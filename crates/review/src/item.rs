use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use backline_core::ReviewItemId;
use backline_events::InboundEvent;
use backline_policy::Decision;

/// Review item lifecycle status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for a reviewer.
    Pending,
    /// Reviewer confirmed the decision as-is.
    Approved,
    /// Reviewer declined; no action executes.
    Rejected,
    /// Reviewer approved with changed parameters.
    Modified,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

/// A reviewer's verdict on a pending item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Approve,
    Reject,
    /// Approve with a replacement restock quantity. Only valid for restock
    /// decisions.
    Modify { restock_quantity: u32 },
}

impl Resolution {
    pub fn resolved_status(&self) -> ReviewStatus {
        match self {
            Resolution::Approve => ReviewStatus::Approved,
            Resolution::Reject => ReviewStatus::Rejected,
            Resolution::Modify { .. } => ReviewStatus::Modified,
        }
    }
}

/// The queued, human-resolvable representation of an escalated decision.
///
/// The originating event is snapshotted alongside the decision so an
/// approval can execute later without consulting any other store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: ReviewItemId,
    pub decision: Decision,
    pub event: InboundEvent,
    pub status: ReviewStatus,
    pub reviewer: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
    /// Replacement restock quantity, present only after a `Modify`.
    pub modified_quantity: Option<u32>,
    pub enqueued_at: DateTime<Utc>,
}

impl ReviewItem {
    /// Create a fresh pending item for an escalated decision.
    pub fn pending(decision: Decision, event: InboundEvent, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            id: ReviewItemId::new(),
            decision,
            event,
            status: ReviewStatus::Pending,
            reviewer: None,
            resolved_at: None,
            resolution_note: None,
            modified_quantity: None,
            enqueued_at,
        }
    }

    /// Time a resolved item spent waiting, if resolved.
    pub fn resolution_latency(&self) -> Option<Duration> {
        self.resolved_at.map(|at| at - self.enqueued_at)
    }

    /// The restock quantity to execute on approval: the modified value if
    /// the reviewer changed it, otherwise `computed` from the original event.
    pub fn effective_restock_quantity(&self, computed: u32) -> u32 {
        self.modified_quantity.unwrap_or(computed)
    }
}
