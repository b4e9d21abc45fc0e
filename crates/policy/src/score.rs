use serde::{Deserialize, Serialize};

use backline_events::InboundEvent;

use crate::reason::ReasonCode;

/// Normalized confidence in \[0, 1\] that an automatic decision is correct.
///
/// The constructor clamps, so the invariant holds by construction rather
/// than by convention.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const FULL: Confidence = Confidence(1.0);

    /// Clamp into \[0, 1\]; non-finite input collapses to 0.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Scoring output: a confidence plus the ordered rationale behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub confidence: Confidence,
    pub rationale: Vec<ReasonCode>,
}

impl Score {
    pub fn new(confidence: Confidence, rationale: Vec<ReasonCode>) -> Self {
        Self {
            confidence,
            rationale,
        }
    }

    /// Whether any rationale entry forces escalation on its own.
    pub fn has_hard_override(&self) -> bool {
        self.rationale.iter().any(ReasonCode::is_hard_override)
    }
}

/// Per-event context the scorer consumes.
///
/// Historical data is read by the caller (the pipeline) and handed in;
/// the scorer itself performs no reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreContext {
    /// Mean return quantity previously observed for the event's product,
    /// if any history exists.
    pub historical_average_return: Option<f64>,
}

/// Capability interface for confidence scoring.
///
/// Implementations must be deterministic given identical inputs (no
/// randomness, no hidden mutable state) and free of side effects, so that
/// audits are reproducible. A rule-based scorer and a future learned model
/// are interchangeable behind this trait.
pub trait Scorer: Send + Sync {
    fn score(&self, event: &InboundEvent, ctx: &ScoreContext) -> Score;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_clamps_out_of_range_values() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::new(0.55).value(), 0.55);
    }

    #[test]
    fn hard_override_detection() {
        let soft = Score::new(Confidence::new(0.5), vec![ReasonCode::NoReturnHistory]);
        assert!(!soft.has_hard_override());

        let hard = Score::new(
            Confidence::new(0.95),
            vec![
                ReasonCode::ReturnVolumeAboveHistory,
                ReasonCode::QuantityAboveCeiling,
            ],
        );
        assert!(hard.has_hard_override());
    }
}
