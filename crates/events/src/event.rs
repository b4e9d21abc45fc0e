use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backline_core::{ProductId, QueryId, SubjectId};

/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - designed to be **append-only**
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "returns.observed").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// A customer return observed for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnEvent {
    pub product_id: ProductId,
    pub return_quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// A natural-language order/restock question from a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEvent {
    pub query_id: QueryId,
    pub text: String,
    pub occurred_at: DateTime<Utc>,
}

/// Any event entering the decision pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundEvent {
    Return(ReturnEvent),
    Query(QueryEvent),
}

impl InboundEvent {
    /// The subject this event (and the decision made from it) is about.
    pub fn subject(&self) -> SubjectId {
        match self {
            InboundEvent::Return(e) => SubjectId::Product(e.product_id.clone()),
            InboundEvent::Query(e) => SubjectId::Query(e.query_id.clone()),
        }
    }
}

impl Event for InboundEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InboundEvent::Return(_) => "returns.observed",
            InboundEvent::Query(_) => "query.received",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InboundEvent::Return(e) => e.occurred_at,
            InboundEvent::Query(e) => e.occurred_at,
        }
    }
}
