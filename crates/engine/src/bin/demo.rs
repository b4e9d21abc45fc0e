//! End-to-end walkthrough of the decision loop against sample data.
//!
//! Raw rows go through the source adapter, the resulting events run the
//! pipeline, and the escalated restock is resolved the way a reviewer tool
//! would.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use backline_actions::{ActionExecutor, InMemoryDirectory, ReplyComposer};
use backline_audit::{replay, AuditLog, InMemoryAuditLog};
use backline_core::{PolicyConfig, ProductId};
use backline_engine::{Engine, InMemoryReturnHistory, Processed};
use backline_events::{
    normalize_queries, normalize_returns, InboundEvent, RawQueryRow, RawReturnRow,
};
use backline_policy::{DecisionPolicy, RuleScorer};
use backline_review::{InMemoryReviewQueue, Resolution, ReviewQueue, ReviewStatus};

fn main() -> Result<()> {
    backline_observability::init();

    let config = PolicyConfig::default();
    let queue = InMemoryReviewQueue::arc();
    let audit = InMemoryAuditLog::arc();

    let directory = InMemoryDirectory::new()
        .with_order(101, "Shipped")
        .with_order(102, "Delivered")
        .with_restock(ProductId::new("A101")?, 6);

    let engine = Engine::new(
        Arc::new(RuleScorer::new(config.clone())),
        DecisionPolicy::new(config.clone())?,
        ActionExecutor::new(config, ReplyComposer::new(Arc::new(directory))),
        Arc::new(InMemoryReturnHistory::new().with_average(ProductId::new("A101")?, 5.0)),
        queue.clone(),
        audit.clone(),
    );

    // Raw rows as the data source would hand them over.
    let now = Utc::now();
    let return_rows = vec![
        RawReturnRow {
            product_id: Some("A101".to_string()),
            return_quantity: Some(4),
            occurred_at: Some(now),
        },
        RawReturnRow {
            product_id: Some("A101".to_string()),
            return_quantity: Some(2),
            occurred_at: Some(now),
        },
        RawReturnRow {
            product_id: Some("B202".to_string()),
            return_quantity: Some(25),
            occurred_at: Some(now),
        },
    ];
    let query_rows = vec![
        RawQueryRow {
            query_id: Some("q-1".to_string()),
            text: Some("Where is my order #101?".to_string()),
            occurred_at: Some(now),
        },
        RawQueryRow {
            query_id: Some("q-2".to_string()),
            text: Some("This is urgent! My order is missing!".to_string()),
            occurred_at: Some(now),
        },
    ];

    let events: Vec<InboundEvent> = normalize_returns(&return_rows)?
        .into_iter()
        .map(InboundEvent::Return)
        .chain(
            normalize_queries(&query_rows)?
                .into_iter()
                .map(InboundEvent::Query),
        )
        .collect();

    for result in engine.process_all(events) {
        match result? {
            Processed::Executed { decision, action } => {
                println!("executed {}: {action:?}", decision.subject)
            }
            Processed::Escalated {
                decision, reply, ..
            } => {
                println!("escalated {}", decision.subject);
                if let Some(reply) = reply {
                    println!("  interim reply: {}", reply.text);
                }
            }
        }
    }

    // A reviewer approves the parked restock.
    let pending_items = queue.list(Some(ReviewStatus::Pending))?;
    if let Some(pending) = pending_items.first() {
        let resolved = engine.resolve(
            pending.id,
            Resolution::Approve,
            "reviewer",
            Some("verified with the warehouse".to_string()),
        )?;
        println!("resolved {} -> {:?}", resolved.item.id, resolved.action);
    }

    let state = replay(&audit.replay()?);
    println!(
        "audit log replays {} decisions, {} review items; queue stats: {:?}",
        state.decisions.len(),
        state.review_statuses.len(),
        queue.stats()?
    );

    Ok(())
}
