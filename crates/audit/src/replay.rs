//! Log replay: reconstruct decision and review state from the audit trail.
//!
//! The log is the source of truth for "what happened": replaying it must
//! yield every decision ever made and the final status of every review
//! item, without consulting the live stores.

use std::collections::HashMap;

use backline_core::{DecisionId, ReviewItemId};
use backline_policy::Decision;
use backline_review::ReviewStatus;

use crate::record::AuditRecord;

/// Reconstructed state after replaying the full log.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    /// Every decision that ever produced a record.
    pub decisions: HashMap<DecisionId, Decision>,
    /// Final status of every review item seen in the log.
    pub review_statuses: HashMap<ReviewItemId, ReviewStatus>,
}

/// Fold the log, in sequence order, into final state. Later records win.
pub fn replay(records: &[AuditRecord]) -> Replay {
    let mut state = Replay::default();

    let mut ordered: Vec<&AuditRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.sequence_number);

    for record in ordered {
        state
            .decisions
            .insert(record.decision_id, record.decision.clone());
        if let Some(item) = &record.review {
            state.review_statuses.insert(item.id, item.status);
        }
    }

    state
}
