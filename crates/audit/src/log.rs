use std::sync::{Arc, RwLock};

use chrono::Utc;
use thiserror::Error;

use crate::record::{AuditDraft, AuditRecord};

/// Audit log operation error.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Append-only audit log.
///
/// Implementations must assign monotonically increasing sequence numbers
/// (no gaps, no duplicates) and never mutate or drop a written record.
pub trait AuditLog: Send + Sync {
    /// Append one record; returns it with its assigned sequence number.
    fn append(&self, draft: AuditDraft) -> Result<AuditRecord, AuditLogError>;

    /// The full log, in sequence order.
    fn replay(&self) -> Result<Vec<AuditRecord>, AuditLogError>;
}

impl<L> AuditLog for Arc<L>
where
    L: AuditLog + ?Sized,
{
    fn append(&self, draft: AuditDraft) -> Result<AuditRecord, AuditLogError> {
        (**self).append(draft)
    }

    fn replay(&self) -> Result<Vec<AuditRecord>, AuditLogError> {
        (**self).replay()
    }
}

/// In-memory append-only audit log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, draft: AuditDraft) -> Result<AuditRecord, AuditLogError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AuditLogError::Storage("lock poisoned".to_string()))?;

        let record = AuditRecord {
            sequence_number: records.len() as u64 + 1,
            decision_id: draft.decision.id,
            decision: draft.decision,
            review: draft.review,
            note: draft.note,
            written_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    fn replay(&self) -> Result<Vec<AuditRecord>, AuditLogError> {
        let records = self
            .records
            .read()
            .map_err(|_| AuditLogError::Storage("lock poisoned".to_string()))?;
        Ok(records.clone())
    }
}
