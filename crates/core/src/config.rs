//! Policy configuration.
//!
//! Thresholds and override rules are explicit values passed into
//! scorer/policy construction, never process-wide mutable state. This keeps
//! decisions reproducible under varied thresholds in tests.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Tunable decision-policy configuration.
///
/// All fields have defaults; all are overridable without code change
/// (the struct deserializes from JSON/TOML as-is).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Confidence at or above which a decision auto-approves.
    pub high_threshold: f64,

    /// Confidence at or above which a decision executes under monitoring.
    /// Below this band the decision escalates to a human.
    pub medium_threshold: f64,

    /// Absolute return-quantity ceiling. Above it, escalation is forced
    /// regardless of score.
    pub quantity_ceiling: u32,

    /// Keywords in a query that force escalation (matched case-insensitively).
    pub escalation_keywords: BTreeSet<String>,

    /// Multiplier applied to the returned quantity when computing a restock
    /// request.
    pub replenishment_factor: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
            quantity_ceiling: 20,
            escalation_keywords: ["urgent", "complaint", "emergency"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            replenishment_factor: 1.0,
        }
    }
}

impl PolicyConfig {
    /// Check internal consistency of the configured values.
    pub fn validate(&self) -> DomainResult<()> {
        for (name, value) in [
            ("high_threshold", self.high_threshold),
            ("medium_threshold", self.medium_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(DomainError::validation(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.medium_threshold > self.high_threshold {
            return Err(DomainError::validation(format!(
                "medium_threshold ({}) must not exceed high_threshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }
        if !(self.replenishment_factor.is_finite() && self.replenishment_factor > 0.0) {
            return Err(DomainError::validation(
                "replenishment_factor must be a finite positive number".to_string(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive check for a configured escalation keyword.
    pub fn contains_escalation_keyword(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.escalation_keywords
            .iter()
            .any(|kw| lowered.contains(&kw.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PolicyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.high_threshold, 0.7);
        assert_eq!(config.medium_threshold, 0.4);
        assert_eq!(config.quantity_ceiling, 20);
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = PolicyConfig {
            high_threshold: 0.3,
            medium_threshold: 0.6,
            ..PolicyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let config = PolicyConfig::default();
        assert!(config.contains_escalation_keyword("This is URGENT, please help"));
        assert!(!config.contains_escalation_keyword("where is my order #101?"));
    }

    #[test]
    fn overrides_deserialize_over_defaults() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{"quantity_ceiling": 50, "high_threshold": 0.9}"#).unwrap();
        assert_eq!(config.quantity_ceiling, 50);
        assert_eq!(config.high_threshold, 0.9);
        // Untouched fields keep their defaults.
        assert_eq!(config.medium_threshold, 0.4);
    }
}
