use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use backline_actions::{ActionExecutor, ActionResult, ChatReply, ExecutionError};
use backline_audit::{AuditDraft, AuditLog, AuditLogError};
use backline_core::ReviewItemId;
use backline_events::{Event, InboundEvent};
use backline_policy::{Decision, DecisionKind, DecisionPolicy, Outcome, ScoreContext, Scorer};
use backline_review::{Resolution, ReviewItem, ReviewQueue, ReviewQueueError, ReviewStatus};

use crate::history::ReturnHistorySource;

/// Pipeline failure for a single event or resolution.
///
/// All of these are recoverable at the event boundary: one bad event never
/// halts processing of subsequent events.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Queue(#[from] ReviewQueueError),

    #[error(transparent)]
    Audit(#[from] AuditLogError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// What the pipeline did with one event.
#[derive(Debug, Clone)]
pub enum Processed {
    /// The action executed immediately (auto-approved or monitored).
    Executed {
        decision: Decision,
        action: ActionResult,
    },
    /// The decision was parked for human review. Queries still carry the
    /// degraded "forwarded to support" reply; restocks wait silently.
    Escalated {
        decision: Decision,
        review: ReviewItem,
        reply: Option<ChatReply>,
    },
}

/// What a human resolution led to.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub item: ReviewItem,
    /// Present when an approved/modified restock executed.
    pub action: Option<ActionResult>,
}

/// The decision-and-escalation pipeline.
///
/// Single logical owner of the review queue and audit log handles; events
/// are processed one at a time, so no two mutations of shared state overlap.
pub struct Engine {
    scorer: Arc<dyn Scorer>,
    policy: DecisionPolicy,
    executor: ActionExecutor,
    history: Arc<dyn ReturnHistorySource>,
    queue: Arc<dyn ReviewQueue>,
    audit: Arc<dyn AuditLog>,
}

impl Engine {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        policy: DecisionPolicy,
        executor: ActionExecutor,
        history: Arc<dyn ReturnHistorySource>,
        queue: Arc<dyn ReviewQueue>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            scorer,
            policy,
            executor,
            history,
            queue,
            audit,
        }
    }

    /// Run one event through score → decide → execute-or-escalate → audit.
    pub fn process(&self, event: InboundEvent) -> Result<Processed, EngineError> {
        let ctx = self.context_for(&event);
        let score = self.scorer.score(&event, &ctx);
        let decision = self.policy.decision_for(&event, score);

        info!(
            decision_id = %decision.id,
            subject = %decision.subject,
            event_type = event.event_type(),
            confidence = decision.confidence.value(),
            outcome = ?decision.outcome,
            "decision made"
        );

        match decision.outcome {
            Outcome::AutoApproved | Outcome::Monitored => self.execute(decision, &event),
            Outcome::Escalated => self.escalate(decision, event),
        }
    }

    /// Run a batch, isolating failures per event.
    pub fn process_all(&self, events: Vec<InboundEvent>) -> Vec<Result<Processed, EngineError>> {
        events
            .into_iter()
            .map(|event| {
                let result = self.process(event);
                if let Err(err) = &result {
                    error!(error = %err, "event failed; continuing with the batch");
                }
                result
            })
            .collect()
    }

    /// Apply a reviewer's verdict and run the follow-up action.
    ///
    /// Approve/Modify on a restock item re-enters the executor with the
    /// (possibly modified) quantity; Reject executes nothing. Exactly one
    /// audit record is written per resolution, success or not.
    pub fn resolve(
        &self,
        id: ReviewItemId,
        resolution: Resolution,
        reviewer: &str,
        note: Option<String>,
    ) -> Result<Resolved, EngineError> {
        let item = self.queue.resolve(id, resolution, reviewer, note)?;

        info!(
            review_id = %item.id,
            decision_id = %item.decision.id,
            status = ?item.status,
            reviewer,
            "review resolved"
        );

        let action = if matches!(item.status, ReviewStatus::Approved | ReviewStatus::Modified)
            && item.decision.kind == DecisionKind::Restock
        {
            match self.executor.execute_resolution(&item) {
                Ok(action) => Some(action),
                Err(err) => {
                    self.audit.append(
                        AuditDraft::resolution(item.clone())
                            .with_note(format!("execution failed: {err}")),
                    )?;
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        self.audit.append(AuditDraft::resolution(item.clone()))?;
        Ok(Resolved { item, action })
    }

    fn context_for(&self, event: &InboundEvent) -> ScoreContext {
        match event {
            InboundEvent::Return(e) => ScoreContext {
                historical_average_return: self.history.average_return_quantity(&e.product_id),
            },
            InboundEvent::Query(_) => ScoreContext::default(),
        }
    }

    fn execute(&self, decision: Decision, event: &InboundEvent) -> Result<Processed, EngineError> {
        match self.executor.execute(&decision, event) {
            Ok(action) => {
                let mut draft = AuditDraft::decision(decision.clone());
                if decision.outcome == Outcome::Monitored {
                    warn!(
                        decision_id = %decision.id,
                        subject = %decision.subject,
                        "monitored execution, flagged for audit sampling"
                    );
                    draft = draft.with_note("monitored");
                }
                self.audit.append(draft)?;
                Ok(Processed::Executed { decision, action })
            }
            Err(err) => {
                // Fatal for this event, but the decision still gets its
                // audit record capturing the failure.
                self.audit.append(
                    AuditDraft::decision(decision).with_note(format!("execution failed: {err}")),
                )?;
                Err(err.into())
            }
        }
    }

    fn escalate(&self, decision: Decision, event: InboundEvent) -> Result<Processed, EngineError> {
        // Queries get their degraded reply before parking: the customer
        // hears back even though a human will follow up.
        let reply = match &event {
            InboundEvent::Query(_) => match self.executor.execute(&decision, &event)? {
                ActionResult::Reply(reply) => Some(reply),
                ActionResult::Restock(_) => None,
            },
            InboundEvent::Return(_) => None,
        };

        let review = match self.queue.enqueue(decision.clone(), event) {
            Ok(item) => item,
            Err(ReviewQueueError::Duplicate { subject, existing }) => {
                // Idempotent escalation: surface the already-pending item.
                info!(%subject, existing = %existing, "subject already pending review");
                self.queue
                    .get(existing)?
                    .ok_or(ReviewQueueError::NotFound(existing))?
            }
            Err(err) => return Err(err.into()),
        };

        self.audit.append(AuditDraft {
            decision: decision.clone(),
            review: Some(review.clone()),
            note: None,
        })?;

        Ok(Processed::Escalated {
            decision,
            review,
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backline_actions::ReplyComposer;
    use backline_actions::InMemoryDirectory;
    use backline_audit::InMemoryAuditLog;
    use backline_core::{PolicyConfig, ProductId};
    use backline_events::ReturnEvent;
    use backline_policy::RuleScorer;
    use backline_review::{InMemoryReviewQueue, ReviewStatus};
    use chrono::Utc;

    fn engine_with(history: crate::history::InMemoryReturnHistory) -> (Engine, Arc<InMemoryReviewQueue>, Arc<InMemoryAuditLog>) {
        let config = PolicyConfig::default();
        let queue = InMemoryReviewQueue::arc();
        let audit = InMemoryAuditLog::arc();
        let directory = InMemoryDirectory::new().with_order(101, "Shipped");
        let engine = Engine::new(
            Arc::new(RuleScorer::new(config.clone())),
            DecisionPolicy::new(config.clone()).unwrap(),
            ActionExecutor::new(config, ReplyComposer::new(Arc::new(directory))),
            Arc::new(history),
            queue.clone(),
            audit.clone(),
        );
        (engine, queue, audit)
    }

    fn return_event(product: &str, quantity: u32) -> InboundEvent {
        InboundEvent::Return(ReturnEvent {
            product_id: ProductId::new(product).unwrap(),
            return_quantity: quantity,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn every_decision_produces_an_audit_record() {
        let (engine, _, audit) = engine_with(crate::history::InMemoryReturnHistory::new());

        engine.process(return_event("A101", 6)).unwrap();
        engine.process(return_event("B202", 25)).unwrap();

        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn duplicate_escalation_is_a_no_op_that_still_audits() {
        let (engine, queue, audit) = engine_with(crate::history::InMemoryReturnHistory::new());

        let first = engine.process(return_event("B202", 25)).unwrap();
        let second = engine.process(return_event("B202", 30)).unwrap();

        let (first_review, second_review) = match (first, second) {
            (
                Processed::Escalated { review: a, .. },
                Processed::Escalated { review: b, .. },
            ) => (a, b),
            other => panic!("expected two escalations, got {other:?}"),
        };

        // Same pending item both times, one item in the queue, two audit
        // records (one per decision).
        assert_eq!(first_review.id, second_review.id);
        assert_eq!(queue.list(None).unwrap().len(), 1);
        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn resolution_appends_exactly_one_more_record() {
        let (engine, _, audit) = engine_with(crate::history::InMemoryReturnHistory::new());

        let processed = engine.process(return_event("B202", 25)).unwrap();
        let review = match processed {
            Processed::Escalated { review, .. } => review,
            other => panic!("expected escalation, got {other:?}"),
        };
        assert_eq!(audit.len(), 1);

        let resolved = engine
            .resolve(review.id, Resolution::Approve, "sam", Some("go ahead".into()))
            .unwrap();
        assert_eq!(resolved.item.status, ReviewStatus::Approved);
        assert!(resolved.action.is_some());
        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn rejected_resolution_executes_nothing() {
        let (engine, _, audit) = engine_with(crate::history::InMemoryReturnHistory::new());

        let processed = engine.process(return_event("B202", 25)).unwrap();
        let review = match processed {
            Processed::Escalated { review, .. } => review,
            other => panic!("expected escalation, got {other:?}"),
        };

        let resolved = engine
            .resolve(review.id, Resolution::Reject, "sam", None)
            .unwrap();
        assert!(resolved.action.is_none());
        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn monitored_executions_are_annotated() {
        // History pushes the quantity above the band: 0.9 - 0.3 = 0.6 lands
        // in the monitored band.
        let history = crate::history::InMemoryReturnHistory::new()
            .with_average(ProductId::new("E505").unwrap(), 3.0);
        let (engine, _, audit) = engine_with(history);

        let processed = engine.process(return_event("E505", 12)).unwrap();
        assert!(matches!(
            processed,
            Processed::Executed {
                ref decision,
                ..
            } if decision.outcome == Outcome::Monitored
        ));

        let records = audit.replay().unwrap();
        assert_eq!(records[0].note.as_deref(), Some("monitored"));
    }
}
