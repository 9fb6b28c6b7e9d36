//! Valuation policy — the knobs the engine revisions historically disagreed on.

use serde::{Deserialize, Serialize};
use streamrate_core::config::PricingConfig;
use streamrate_core::{PricingError, PricingResult};

/// Sponsored time may never exceed this share of total stream length.
pub const SPONSORED_TIME_CAP: f64 = 0.30;

/// Linear scaling applied to the geometric mean's excess over 1.0 when
/// blending premium factors into a single multiplier.
pub const PREMIUM_DAMPING: f64 = 1.5;

/// How the raw view count is reduced to a priceable audience figure.
///
/// The two models produce the same number (`views * avg_view / stream` is
/// `views / (stream / avg_view)` rearranged); the variant records what that
/// number *means*, which downstream display and persistence care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceModel {
    /// Estimated unique people: total views divided by the number of times
    /// an average viewer "cycles" through the stream.
    UniqueCycles,
    /// Estimated audience present at any single instant.
    Concurrent,
}

/// Explicit engine parameterization. One pairing ships as the default;
/// the alternates stay reachable behind the same interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub audience_model: AudienceModel,
    /// Fixed spot length in minutes (0.5 = 30-second spots).
    pub placement_duration_minutes: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            audience_model: AudienceModel::UniqueCycles,
            placement_duration_minutes: 0.5,
        }
    }
}

impl PricingPolicy {
    /// The 2-minute long-form spot variant.
    pub fn long_form() -> Self {
        Self {
            placement_duration_minutes: 2.0,
            ..Self::default()
        }
    }

    /// Resolve a policy from application configuration.
    pub fn from_config(cfg: &PricingConfig) -> PricingResult<Self> {
        let audience_model = match cfg.audience_model.as_str() {
            "unique_cycles" => AudienceModel::UniqueCycles,
            "concurrent" => AudienceModel::Concurrent,
            other => {
                return Err(PricingError::Config(format!(
                    "unknown audience model '{}', expected 'unique_cycles' or 'concurrent'",
                    other
                )))
            }
        };
        if !(cfg.placement_duration_minutes > 0.0 && cfg.placement_duration_minutes.is_finite()) {
            return Err(PricingError::Config(format!(
                "placement duration must be a positive number of minutes, got {}",
                cfg.placement_duration_minutes
            )));
        }
        Ok(Self {
            audience_model,
            placement_duration_minutes: cfg.placement_duration_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let cfg = PricingConfig {
            audience_model: "concurrent".to_string(),
            placement_duration_minutes: 2.0,
        };
        let policy = PricingPolicy::from_config(&cfg).unwrap();
        assert_eq!(policy.audience_model, AudienceModel::Concurrent);
        assert!((policy.placement_duration_minutes - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_policy_rejects_unknown_model() {
        let cfg = PricingConfig {
            audience_model: "households".to_string(),
            placement_duration_minutes: 0.5,
        };
        assert!(matches!(
            PricingPolicy::from_config(&cfg),
            Err(PricingError::Config(_))
        ));
    }

    #[test]
    fn test_policy_rejects_nonpositive_duration() {
        let cfg = PricingConfig {
            audience_model: "unique_cycles".to_string(),
            placement_duration_minutes: 0.0,
        };
        assert!(matches!(
            PricingPolicy::from_config(&cfg),
            Err(PricingError::Config(_))
        ));
    }
}
