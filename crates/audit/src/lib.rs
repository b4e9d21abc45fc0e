//! `backline-audit` — append-only decision audit log.
//!
//! Every decision (automatic or human) lands here exactly once, and every
//! human resolution lands once more. Records are never mutated or deleted,
//! and the full log replays into the final state of all decisions and
//! review items.

pub mod log;
pub mod record;
pub mod replay;

pub use log::{AuditLog, AuditLogError, InMemoryAuditLog};
pub use record::{AuditDraft, AuditRecord};
pub use replay::{replay, Replay};
