//! Review queue storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use backline_core::{DecisionId, ReviewItemId, SubjectId};
use backline_events::InboundEvent;
use backline_policy::{Decision, DecisionKind, Outcome};

use crate::item::{Resolution, ReviewItem, ReviewStatus};

/// Review queue operation error.
#[derive(Debug, Clone, Error)]
pub enum ReviewQueueError {
    /// A pending item already exists for this subject (idempotent
    /// escalation: callers treat this as a no-op, not a failure).
    #[error("pending review already exists for {subject} (item {existing})")]
    Duplicate {
        subject: SubjectId,
        existing: ReviewItemId,
    },

    #[error("review item not found: {0}")]
    NotFound(ReviewItemId),

    #[error("review item {0} already resolved to {1:?}")]
    AlreadyResolved(ReviewItemId, ReviewStatus),

    /// Only escalated decisions enter the queue.
    #[error("decision {0} is not escalated")]
    NotEscalated(DecisionId),

    /// The event handed in is not the decision's originating event.
    #[error("event subject {event} does not match decision subject {decision}")]
    SubjectMismatch {
        decision: SubjectId,
        event: SubjectId,
    },

    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Aggregate queue statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub modified: usize,
    /// Mean wait of resolved items, in milliseconds. `None` until the first
    /// resolution.
    pub average_resolution_latency_ms: Option<i64>,
}

/// Review queue abstraction.
///
/// `enqueue` is internal to the pipeline; `list`/`resolve`/`stats` are the
/// operations an external reviewer tool invokes.
pub trait ReviewQueue: Send + Sync {
    /// Park an escalated decision, snapshotting its originating event.
    fn enqueue(
        &self,
        decision: Decision,
        event: InboundEvent,
    ) -> Result<ReviewItem, ReviewQueueError>;

    /// Fetch a single item.
    fn get(&self, id: ReviewItemId) -> Result<Option<ReviewItem>, ReviewQueueError>;

    /// List items, optionally filtered by status, in enqueue order.
    fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<ReviewItem>, ReviewQueueError>;

    /// Apply a reviewer's verdict to a pending item.
    ///
    /// One-way: a terminal item cannot be resolved again.
    fn resolve(
        &self,
        id: ReviewItemId,
        resolution: Resolution,
        reviewer: &str,
        note: Option<String>,
    ) -> Result<ReviewItem, ReviewQueueError>;

    /// Aggregate statistics over all stored items. Pure read.
    fn stats(&self) -> Result<ReviewStats, ReviewQueueError>;
}

impl<Q> ReviewQueue for Arc<Q>
where
    Q: ReviewQueue + ?Sized,
{
    fn enqueue(
        &self,
        decision: Decision,
        event: InboundEvent,
    ) -> Result<ReviewItem, ReviewQueueError> {
        (**self).enqueue(decision, event)
    }

    fn get(&self, id: ReviewItemId) -> Result<Option<ReviewItem>, ReviewQueueError> {
        (**self).get(id)
    }

    fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<ReviewItem>, ReviewQueueError> {
        (**self).list(status)
    }

    fn resolve(
        &self,
        id: ReviewItemId,
        resolution: Resolution,
        reviewer: &str,
        note: Option<String>,
    ) -> Result<ReviewItem, ReviewQueueError> {
        (**self).resolve(id, resolution, reviewer, note)
    }

    fn stats(&self) -> Result<ReviewStats, ReviewQueueError> {
        (**self).stats()
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    items: HashMap<ReviewItemId, ReviewItem>,
    /// Pending item per subject, for duplicate-escalation detection.
    pending_by_subject: HashMap<SubjectId, ReviewItemId>,
    /// Insertion order for FIFO listing.
    order: Vec<ReviewItemId>,
}

/// In-memory review queue.
///
/// Single lock around the whole state so every mutation (item + indexes) is
/// atomic at item granularity.
#[derive(Debug, Default)]
pub struct InMemoryReviewQueue {
    inner: RwLock<QueueInner>,
}

impl InMemoryReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ReviewQueue for InMemoryReviewQueue {
    fn enqueue(
        &self,
        decision: Decision,
        event: InboundEvent,
    ) -> Result<ReviewItem, ReviewQueueError> {
        if decision.outcome != Outcome::Escalated {
            return Err(ReviewQueueError::NotEscalated(decision.id));
        }
        if event.subject() != decision.subject {
            return Err(ReviewQueueError::SubjectMismatch {
                decision: decision.subject,
                event: event.subject(),
            });
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ReviewQueueError::Storage("lock poisoned".to_string()))?;

        if let Some(existing) = inner.pending_by_subject.get(&decision.subject) {
            return Err(ReviewQueueError::Duplicate {
                subject: decision.subject.clone(),
                existing: *existing,
            });
        }

        let item = ReviewItem::pending(decision, event, Utc::now());
        inner
            .pending_by_subject
            .insert(item.decision.subject.clone(), item.id);
        inner.order.push(item.id);
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn get(&self, id: ReviewItemId) -> Result<Option<ReviewItem>, ReviewQueueError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ReviewQueueError::Storage("lock poisoned".to_string()))?;
        Ok(inner.items.get(&id).cloned())
    }

    fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<ReviewItem>, ReviewQueueError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ReviewQueueError::Storage("lock poisoned".to_string()))?;

        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|item| status.map_or(true, |s| item.status == s))
            .cloned()
            .collect())
    }

    fn resolve(
        &self,
        id: ReviewItemId,
        resolution: Resolution,
        reviewer: &str,
        note: Option<String>,
    ) -> Result<ReviewItem, ReviewQueueError> {
        if reviewer.trim().is_empty() {
            return Err(ReviewQueueError::InvalidResolution(
                "reviewer cannot be empty".to_string(),
            ));
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ReviewQueueError::Storage("lock poisoned".to_string()))?;

        let item = inner
            .items
            .get(&id)
            .ok_or(ReviewQueueError::NotFound(id))?;

        if item.status.is_terminal() {
            return Err(ReviewQueueError::AlreadyResolved(id, item.status));
        }

        if matches!(resolution, Resolution::Modify { .. })
            && item.decision.kind != DecisionKind::Restock
        {
            return Err(ReviewQueueError::InvalidResolution(
                "only restock decisions can be modified".to_string(),
            ));
        }

        let subject = item.decision.subject.clone();

        // Checks passed; now mutate.
        let item = inner
            .items
            .get_mut(&id)
            .ok_or(ReviewQueueError::NotFound(id))?;
        item.status = resolution.resolved_status();
        item.reviewer = Some(reviewer.to_string());
        item.resolved_at = Some(Utc::now());
        item.resolution_note = note;
        if let Resolution::Modify { restock_quantity } = resolution {
            item.modified_quantity = Some(restock_quantity);
        }
        let resolved = item.clone();

        inner.pending_by_subject.remove(&subject);
        Ok(resolved)
    }

    fn stats(&self) -> Result<ReviewStats, ReviewQueueError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ReviewQueueError::Storage("lock poisoned".to_string()))?;

        let mut stats = ReviewStats::default();
        let mut latency_total_ms: i64 = 0;
        let mut resolved_count: i64 = 0;

        for item in inner.items.values() {
            match item.status {
                ReviewStatus::Pending => stats.pending += 1,
                ReviewStatus::Approved => stats.approved += 1,
                ReviewStatus::Rejected => stats.rejected += 1,
                ReviewStatus::Modified => stats.modified += 1,
            }
            if let Some(latency) = item.resolution_latency() {
                latency_total_ms += latency.num_milliseconds();
                resolved_count += 1;
            }
        }

        if resolved_count > 0 {
            stats.average_resolution_latency_ms = Some(latency_total_ms / resolved_count);
        }
        Ok(stats)
    }
}
