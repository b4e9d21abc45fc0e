use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backline_core::{DecisionId, DomainResult, PolicyConfig, SubjectId};
use backline_events::InboundEvent;

use crate::reason::ReasonCode;
use crate::score::{Confidence, Score};

/// What kind of action a decision is about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Restock,
    ChatReply,
}

/// Terminal outcome of the decision policy.
///
/// - `AutoApproved`: execute immediately.
/// - `Monitored`: execute immediately, flagged for later audit sampling.
/// - `Escalated`: route to a human reviewer; nothing executes until
///   resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AutoApproved,
    Monitored,
    Escalated,
}

impl Outcome {
    /// Whether the action executes without waiting for a human.
    pub fn executes_immediately(&self) -> bool {
        matches!(self, Outcome::AutoApproved | Outcome::Monitored)
    }
}

/// A scored, thresholded decision about a single inbound event.
///
/// Created once per event; the outcome is set exactly once and is terminal.
/// A later human resolution is recorded as a separate review item, never by
/// mutating the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub subject: SubjectId,
    pub kind: DecisionKind,
    pub confidence: Confidence,
    pub rationale: Vec<ReasonCode>,
    pub outcome: Outcome,
    pub created_at: DateTime<Utc>,
}

/// Thresholds confidence into an outcome, with hard overrides winning.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    /// Build a policy from validated configuration.
    pub fn new(config: PolicyConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Map a score to an outcome.
    ///
    /// Hard overrides always win, even when the numeric confidence is high:
    /// a ceiling breach escalates at confidence 0.95 just the same.
    pub fn decide(&self, score: &Score) -> Outcome {
        if score.has_hard_override() {
            return Outcome::Escalated;
        }

        let confidence = score.confidence.value();
        if confidence >= self.config.high_threshold {
            Outcome::AutoApproved
        } else if confidence >= self.config.medium_threshold {
            Outcome::Monitored
        } else {
            Outcome::Escalated
        }
    }

    /// Assemble the full decision record for an event and its score.
    pub fn decision_for(&self, event: &InboundEvent, score: Score) -> Decision {
        let outcome = self.decide(&score);
        let kind = match event {
            InboundEvent::Return(_) => DecisionKind::Restock,
            InboundEvent::Query(_) => DecisionKind::ChatReply,
        };
        Decision {
            id: DecisionId::new(),
            subject: event.subject(),
            kind,
            confidence: score.confidence,
            rationale: score.rationale,
            outcome,
            created_at: Utc::now(),
        }
    }
}
