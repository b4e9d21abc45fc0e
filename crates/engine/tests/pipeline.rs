//! Black-box tests of the full decision loop: events in, actions and
//! review items out, audit trail complete and replayable.

use std::sync::Arc;

use chrono::Utc;

use backline_actions::{ActionExecutor, ActionResult, InMemoryDirectory, ReplyComposer};
use backline_audit::{replay, AuditLog, InMemoryAuditLog};
use backline_core::{PolicyConfig, ProductId, QueryId};
use backline_engine::{Engine, EngineError, InMemoryReturnHistory, Processed};
use backline_events::{InboundEvent, QueryEvent, ReturnEvent};
use backline_policy::{DecisionPolicy, Outcome, ReasonCode, RuleScorer};
use backline_review::{
    InMemoryReviewQueue, Resolution, ReviewQueue, ReviewQueueError, ReviewStatus,
};

struct Harness {
    engine: Engine,
    queue: Arc<InMemoryReviewQueue>,
    audit: Arc<InMemoryAuditLog>,
}

fn harness(config: PolicyConfig) -> Harness {
    let queue = InMemoryReviewQueue::arc();
    let audit = InMemoryAuditLog::arc();

    let directory = InMemoryDirectory::new()
        .with_order(101, "Shipped")
        .with_order(102, "Delivered");

    let history = InMemoryReturnHistory::new()
        .with_average(ProductId::new("A101").unwrap(), 5.0)
        .with_average(ProductId::new("B202").unwrap(), 10.0);

    let engine = Engine::new(
        Arc::new(RuleScorer::new(config.clone())),
        DecisionPolicy::new(config.clone()).unwrap(),
        ActionExecutor::new(config, ReplyComposer::new(Arc::new(directory))),
        Arc::new(history),
        queue.clone(),
        audit.clone(),
    );

    Harness {
        engine,
        queue,
        audit,
    }
}

fn return_event(product: &str, quantity: u32) -> InboundEvent {
    InboundEvent::Return(ReturnEvent {
        product_id: ProductId::new(product).unwrap(),
        return_quantity: quantity,
        occurred_at: Utc::now(),
    })
}

fn query_event(id: &str, text: &str) -> InboundEvent {
    InboundEvent::Query(QueryEvent {
        query_id: QueryId::new(id).unwrap(),
        text: text.to_owned(),
        occurred_at: Utc::now(),
    })
}

#[test]
fn in_band_return_auto_approves_and_creates_a_restock_request() {
    let h = harness(PolicyConfig {
        replenishment_factor: 1.5,
        ..PolicyConfig::default()
    });

    let processed = h.engine.process(return_event("A101", 6)).unwrap();
    match processed {
        Processed::Executed { decision, action } => {
            assert_eq!(decision.outcome, Outcome::AutoApproved);
            match action {
                ActionResult::Restock(req) => {
                    assert_eq!(req.product_id.as_str(), "A101");
                    assert_eq!(req.restock_quantity, 9); // 6 × 1.5
                    assert_eq!(req.decision_id, decision.id);
                }
                other => panic!("expected restock request, got {other:?}"),
            }
        }
        other => panic!("expected execution, got {other:?}"),
    }

    // Nothing pending, one audit record.
    assert!(h.queue.list(Some(ReviewStatus::Pending)).unwrap().is_empty());
    assert_eq!(h.audit.len(), 1);
}

#[test]
fn ceiling_breach_escalates_despite_history() {
    let h = harness(PolicyConfig::default());

    let processed = h.engine.process(return_event("B202", 25)).unwrap();
    match processed {
        Processed::Escalated {
            decision, review, ..
        } => {
            assert_eq!(decision.outcome, Outcome::Escalated);
            assert!(decision
                .rationale
                .contains(&ReasonCode::QuantityAboveCeiling));
            assert_eq!(review.status, ReviewStatus::Pending);
        }
        other => panic!("expected escalation, got {other:?}"),
    }

    assert_eq!(h.queue.stats().unwrap().pending, 1);
}

#[test]
fn order_status_query_auto_approves_with_the_order_status() {
    let h = harness(PolicyConfig::default());

    let processed = h
        .engine
        .process(query_event("q-1", "Where is my order #101?"))
        .unwrap();
    match processed {
        Processed::Executed { decision, action } => {
            assert_eq!(decision.outcome, Outcome::AutoApproved);
            match action {
                ActionResult::Reply(reply) => {
                    assert!(reply.text.contains("#101"));
                    assert!(reply.text.contains("Shipped"));
                }
                other => panic!("expected reply, got {other:?}"),
            }
        }
        other => panic!("expected execution, got {other:?}"),
    }
}

#[test]
fn urgent_query_escalates_with_the_fallback_reply() {
    let h = harness(PolicyConfig::default());

    let processed = h
        .engine
        .process(query_event("q-2", "This is urgent! My order is missing!"))
        .unwrap();
    match processed {
        Processed::Escalated {
            decision,
            review,
            reply,
        } => {
            assert_eq!(decision.confidence.value(), 0.0);
            assert_eq!(decision.rationale, vec![ReasonCode::KeywordOverride]);
            assert_eq!(review.status, ReviewStatus::Pending);

            let reply = reply.expect("escalated query carries an interim reply");
            assert!(reply.text.contains("forwarded to our support team"));
            assert!(reply.text.contains(&reply.reference_id));
        }
        other => panic!("expected escalation, got {other:?}"),
    }
}

#[test]
fn approving_an_escalated_restock_executes_it_once() {
    let h = harness(PolicyConfig::default());

    let processed = h.engine.process(return_event("B202", 25)).unwrap();
    let review = match processed {
        Processed::Escalated { review, .. } => review,
        other => panic!("expected escalation, got {other:?}"),
    };
    assert_eq!(h.audit.len(), 1);

    let resolved = h
        .engine
        .resolve(
            review.id,
            Resolution::Approve,
            "sam",
            Some("confirmed with supplier".to_string()),
        )
        .unwrap();

    assert_eq!(resolved.item.status, ReviewStatus::Approved);
    assert_eq!(
        resolved.item.resolution_note.as_deref(),
        Some("confirmed with supplier")
    );
    match resolved.action.expect("approved restock executes") {
        ActionResult::Restock(req) => {
            assert_eq!(req.product_id.as_str(), "B202");
            assert_eq!(req.restock_quantity, 25);
        }
        other => panic!("expected restock request, got {other:?}"),
    }
    assert_eq!(h.audit.len(), 2);

    // One-way: a second resolve fails and changes nothing.
    let err = h
        .engine
        .resolve(review.id, Resolution::Reject, "alex", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Queue(ReviewQueueError::AlreadyResolved(_, ReviewStatus::Approved))
    ));
    assert_eq!(h.audit.len(), 2);
}

#[test]
fn modified_resolution_restocks_the_reviewer_quantity() {
    let h = harness(PolicyConfig::default());

    let review = match h.engine.process(return_event("B202", 25)).unwrap() {
        Processed::Escalated { review, .. } => review,
        other => panic!("expected escalation, got {other:?}"),
    };

    let resolved = h
        .engine
        .resolve(
            review.id,
            Resolution::Modify {
                restock_quantity: 12,
            },
            "sam",
            None,
        )
        .unwrap();

    match resolved.action.expect("modified restock executes") {
        ActionResult::Restock(req) => assert_eq!(req.restock_quantity, 12),
        other => panic!("expected restock request, got {other:?}"),
    }
}

#[test]
fn one_bad_event_does_not_halt_the_batch() {
    let h = harness(PolicyConfig::default());

    // Duplicate escalations of the same subject are the benign failure mode
    // here; both process calls succeed, the queue holds one item.
    let results = h.engine.process_all(vec![
        return_event("B202", 25),
        return_event("B202", 30),
        return_event("A101", 6),
    ]);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(h.queue.stats().unwrap().pending, 1);
}

#[test]
fn audit_log_replays_into_final_review_state() {
    let h = harness(PolicyConfig::default());

    h.engine.process(return_event("A101", 6)).unwrap();
    let review = match h.engine.process(return_event("B202", 25)).unwrap() {
        Processed::Escalated { review, .. } => review,
        other => panic!("expected escalation, got {other:?}"),
    };
    let urgent = match h
        .engine
        .process(query_event("q-2", "This is an emergency!"))
        .unwrap()
    {
        Processed::Escalated { review, .. } => review,
        other => panic!("expected escalation, got {other:?}"),
    };

    h.engine
        .resolve(review.id, Resolution::Reject, "sam", None)
        .unwrap();

    // Audit count ≥ decision count: 3 decisions + 1 resolution.
    let records = h.audit.replay().unwrap();
    assert_eq!(records.len(), 4);

    let state = replay(&records);
    assert_eq!(state.decisions.len(), 3);
    assert_eq!(state.review_statuses[&review.id], ReviewStatus::Rejected);
    assert_eq!(state.review_statuses[&urgent.id], ReviewStatus::Pending);

    // The replayed statuses agree with the live queue.
    for (id, status) in &state.review_statuses {
        let stored = h.queue.get(*id).unwrap().unwrap();
        assert_eq!(stored.status, *status);
    }
}
