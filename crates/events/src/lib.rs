//! `backline-events` — typed inbound events and the source adapter.
//!
//! This crate contains the event model for the decision pipeline,
//! implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage). Raw rows from the tabular data source are validated here,
//! before any decision is created.

pub mod adapter;
pub mod event;

pub use adapter::{normalize_queries, normalize_returns, RawQueryRow, RawReturnRow};
pub use event::{Event, InboundEvent, QueryEvent, ReturnEvent};
