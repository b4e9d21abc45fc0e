//! `backline-engine` — the decision pipeline.
//!
//! Wires the components together: events are validated, scored, thresholded,
//! then either executed immediately or parked for human review, and every
//! step lands in the audit log. Resolutions from the review surface feed
//! back through the executor and the log.

pub mod engine;
pub mod history;

pub use engine::{Engine, EngineError, Processed, Resolved};
pub use history::{InMemoryReturnHistory, ReturnHistorySource};
