use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backline_core::{DecisionId, PolicyConfig};
use backline_events::InboundEvent;
use backline_policy::{Decision, DecisionKind};
use backline_review::{ReviewItem, ReviewStatus};

use crate::reply::{ChatReply, ReplyComposer};
use crate::restock::{restock_quantity, RestockRequest};

/// Action execution failure.
///
/// Raised only when a result cannot be produced at all; chat degradation is
/// handled inside reply composition and never surfaces here.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The decision and the event passed alongside it do not belong together.
    #[error("decision {decision_id} does not match the supplied event: {detail}")]
    Mismatch {
        decision_id: DecisionId,
        detail: String,
    },

    /// An escalated restock reached the executor without a resolution.
    #[error("decision {0} is escalated and cannot execute without approval")]
    NotExecutable(DecisionId),

    /// A resolution-path execution was attempted on an item that is not an
    /// approved or modified restock.
    #[error("review item is not an executable restock resolution: {0}")]
    NotApproved(String),
}

/// The artifact produced by executing a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    Restock(RestockRequest),
    Reply(ChatReply),
}

/// Executes approved decisions and resolved review items.
pub struct ActionExecutor {
    config: PolicyConfig,
    composer: ReplyComposer,
}

impl ActionExecutor {
    pub fn new(config: PolicyConfig, composer: ReplyComposer) -> Self {
        Self { config, composer }
    }

    /// Execute a decision on the automatic path.
    ///
    /// Restocks require an outcome that executes immediately; chat replies
    /// are composed for every outcome (an escalated query still gets the
    /// "forwarded to support" reply).
    pub fn execute(
        &self,
        decision: &Decision,
        event: &InboundEvent,
    ) -> Result<ActionResult, ExecutionError> {
        if event.subject() != decision.subject {
            return Err(ExecutionError::Mismatch {
                decision_id: decision.id,
                detail: format!(
                    "subject {} vs event {}",
                    decision.subject,
                    event.subject()
                ),
            });
        }

        match (decision.kind, event) {
            (DecisionKind::Restock, InboundEvent::Return(e)) => {
                if !decision.outcome.executes_immediately() {
                    return Err(ExecutionError::NotExecutable(decision.id));
                }
                Ok(ActionResult::Restock(RestockRequest {
                    product_id: e.product_id.clone(),
                    restock_quantity: restock_quantity(
                        e.return_quantity,
                        self.config.replenishment_factor,
                    ),
                    decision_id: decision.id,
                    created_at: Utc::now(),
                }))
            }
            (DecisionKind::ChatReply, InboundEvent::Query(e)) => {
                Ok(ActionResult::Reply(self.composer.compose(decision, e)))
            }
            (kind, event) => Err(ExecutionError::Mismatch {
                decision_id: decision.id,
                detail: format!("kind {kind:?} with event {}", event.subject()),
            }),
        }
    }

    /// Execute the restock for an approved or modified review item.
    ///
    /// The reviewer's replacement quantity, when present, wins over the
    /// computed one.
    pub fn execute_resolution(&self, item: &ReviewItem) -> Result<ActionResult, ExecutionError> {
        if !matches!(item.status, ReviewStatus::Approved | ReviewStatus::Modified) {
            return Err(ExecutionError::NotApproved(format!(
                "status is {:?}",
                item.status
            )));
        }
        if item.decision.kind != DecisionKind::Restock {
            return Err(ExecutionError::NotApproved(
                "only restock resolutions execute".to_string(),
            ));
        }

        let InboundEvent::Return(event) = &item.event else {
            return Err(ExecutionError::Mismatch {
                decision_id: item.decision.id,
                detail: "restock decision without a return event".to_string(),
            });
        };

        let computed = restock_quantity(event.return_quantity, self.config.replenishment_factor);
        Ok(ActionResult::Restock(RestockRequest {
            product_id: event.product_id.clone(),
            restock_quantity: item.effective_restock_quantity(computed),
            decision_id: item.decision.id,
            created_at: Utc::now(),
        }))
    }
}
