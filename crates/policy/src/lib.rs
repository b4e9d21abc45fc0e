//! `backline-policy` — confidence scoring and the decision policy.
//!
//! This crate is the **decision core**: a pure, deterministic mapping from
//! an inbound event plus context to a confidence score with a rationale,
//! and the thresholding of that score into an outcome. It must not read or
//! write the review queue or the audit log.

pub mod decision;
pub mod intent;
pub mod reason;
pub mod score;
pub mod scorer;

pub use decision::{Decision, DecisionKind, DecisionPolicy, Outcome};
pub use intent::QueryIntent;
pub use reason::ReasonCode;
pub use score::{Confidence, Score, ScoreContext, Scorer};
pub use scorer::RuleScorer;
