use serde::{Deserialize, Serialize};

/// Reason code appended to a decision's rationale.
///
/// The rationale is an ordered sequence: the scorer appends one code per
/// signal it acted on, so audits can reconstruct how a confidence value
/// came to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Returned quantity sits above the historical band for this product.
    ReturnVolumeAboveHistory,
    /// No return history exists for this product.
    NoReturnHistory,
    /// Returned quantity exceeds the absolute ceiling (hard override).
    QuantityAboveCeiling,
    /// The query contained an escalation keyword (hard override).
    KeywordOverride,
    /// The query text matched no known intent pattern.
    UnrecognizedIntent,
}

impl ReasonCode {
    /// Hard overrides force escalation regardless of the numeric score.
    pub fn is_hard_override(&self) -> bool {
        matches!(
            self,
            ReasonCode::QuantityAboveCeiling | ReasonCode::KeywordOverride
        )
    }

    /// Stable label for logs and audit snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ReturnVolumeAboveHistory => "return_volume_above_history",
            ReasonCode::NoReturnHistory => "no_return_history",
            ReasonCode::QuantityAboveCeiling => "quantity_above_ceiling",
            ReasonCode::KeywordOverride => "keyword_override",
            ReasonCode::UnrecognizedIntent => "unrecognized_intent",
        }
    }
}

impl core::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
