use backline_core::PolicyConfig;
use backline_events::{InboundEvent, QueryEvent, ReturnEvent};

use crate::intent::QueryIntent;
use crate::reason::ReasonCode;
use crate::score::{Confidence, Score, ScoreContext, Scorer};

/// Base confidence for a return event before penalties apply.
const RETURN_BASE: f64 = 0.9;
/// Base confidence for a query matching a known intent pattern.
const INTENT_BASE: f64 = 0.9;
/// Base confidence for a query matching no known intent.
const UNKNOWN_INTENT_BASE: f64 = 0.5;

/// Deterministic rule-based confidence scorer.
///
/// Model:
/// - Returns start at a high base and are penalized when the quantity sits
///   above the historical band, when the product has no history at all, and
///   when the quantity breaks the absolute ceiling.
/// - Queries score on intent recognition; any configured escalation keyword
///   collapses confidence to zero outright.
///
/// Every penalty appends a [`ReasonCode`], so the resulting rationale
/// explains the number.
#[derive(Debug, Clone)]
pub struct RuleScorer {
    config: PolicyConfig,
    /// Multiple of the historical average that bounds the "normal" band.
    history_multiplier: f64,
    /// Penalty for a quantity above the historical band (doubled when the
    /// band is exceeded twice over).
    volume_penalty: f64,
    /// Penalty for a product with no return history.
    no_history_penalty: f64,
    /// Penalty for breaking the absolute quantity ceiling (the ceiling also
    /// hard-escalates, independent of the score).
    ceiling_penalty: f64,
}

impl RuleScorer {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            history_multiplier: 3.0,
            volume_penalty: 0.3,
            no_history_penalty: 0.2,
            ceiling_penalty: 0.3,
        }
    }

    pub fn with_history_multiplier(mut self, multiplier: f64) -> Self {
        self.history_multiplier = multiplier;
        self
    }

    pub fn with_volume_penalty(mut self, penalty: f64) -> Self {
        self.volume_penalty = penalty;
        self
    }

    pub fn with_no_history_penalty(mut self, penalty: f64) -> Self {
        self.no_history_penalty = penalty;
        self
    }

    fn score_return(&self, event: &ReturnEvent, ctx: &ScoreContext) -> Score {
        let mut confidence = RETURN_BASE;
        let mut rationale = Vec::new();
        let quantity = f64::from(event.return_quantity);

        match ctx.historical_average_return {
            Some(average) => {
                let band = self.history_multiplier * average;
                if quantity > band {
                    // Twice over the band doubles the penalty.
                    let mut penalty = self.volume_penalty;
                    if band > 0.0 && quantity > 2.0 * band {
                        penalty *= 2.0;
                    }
                    confidence -= penalty;
                    rationale.push(ReasonCode::ReturnVolumeAboveHistory);
                }
            }
            None => {
                confidence -= self.no_history_penalty;
                rationale.push(ReasonCode::NoReturnHistory);
            }
        }

        if event.return_quantity > self.config.quantity_ceiling {
            confidence -= self.ceiling_penalty;
            rationale.push(ReasonCode::QuantityAboveCeiling);
        }

        Score::new(Confidence::new(confidence), rationale)
    }

    fn score_query(&self, event: &QueryEvent) -> Score {
        if self.config.contains_escalation_keyword(&event.text) {
            // Keyword override trumps every other signal.
            return Score::new(Confidence::ZERO, vec![ReasonCode::KeywordOverride]);
        }

        if QueryIntent::parse(&event.text).is_known() {
            Score::new(Confidence::new(INTENT_BASE), Vec::new())
        } else {
            Score::new(
                Confidence::new(UNKNOWN_INTENT_BASE),
                vec![ReasonCode::UnrecognizedIntent],
            )
        }
    }
}

impl Scorer for RuleScorer {
    fn score(&self, event: &InboundEvent, ctx: &ScoreContext) -> Score {
        match event {
            InboundEvent::Return(e) => self.score_return(e, ctx),
            InboundEvent::Query(e) => self.score_query(e),
        }
    }
}
