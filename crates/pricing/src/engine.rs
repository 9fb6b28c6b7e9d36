//! Placement valuation: base CPM → premium CPM → audience sizing →
//! placement frequency → slot count → total inventory value.

use serde::{Deserialize, Serialize};
use streamrate_core::{PricingError, PricingResult};

use crate::policy::{AudienceModel, PricingPolicy, PREMIUM_DAMPING, SPONSORED_TIME_CAP};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Caller-supplied valuation inputs. Base CPM and multiplier values are
/// resolved upstream (industry catalog, active-multiplier selection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Currency per thousand impressions for the content category.
    pub base_cpm: f64,
    /// Premium factor values. Order is irrelevant to the math but is
    /// preserved in the result for audit display.
    pub multipliers: Vec<f64>,
    pub stream_length_minutes: f64,
    pub avg_view_time_minutes: f64,
    pub total_views: f64,
    /// Caller-chosen placement count; defaults to the derived minimum.
    #[serde(default)]
    pub selected_frequency: Option<u32>,
}

/// Normalized input echo carried on every result, rounded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoedInputs {
    pub base_cpm: f64,
    pub multipliers: Vec<f64>,
    pub stream_length_minutes: f64,
    pub avg_view_time_minutes: f64,
    pub total_views: f64,
}

/// Fully derived valuation. Monetary and ratio fields are rounded to two
/// decimal places; the chain itself is computed unrounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    pub inputs: EchoedInputs,

    // Policy applied, so persisted rows are self-describing.
    pub audience_model: AudienceModel,
    pub placement_duration_minutes: f64,

    // Multiplier chain
    pub total_multiplier: f64,
    pub geometric_mean: f64,
    pub adjusted_multiplier: f64,
    pub premium_cpm: f64,

    // Audience
    /// How many times the average viewer cycles through the stream.
    pub unique_watch_sessions: f64,
    pub audience_size: u64,

    // Frequency and capacity
    pub min_ad_frequency: u32,
    pub max_placements: u32,
    pub available_brand_slots: u32,
    pub leftover_placements: u32,
    pub selected_frequency: u32,
    pub actual_frequency: u32,
    pub is_partial_reach: bool,
    pub audience_reach_percentage: f64,

    // Pricing outputs
    pub cost_per_placement: f64,
    pub cost_per_activation: f64,
    pub total_inventory_value: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless valuation engine parameterized by an explicit policy.
pub struct PricingEngine {
    policy: PricingPolicy,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingPolicy::default())
    }
}

impl PricingEngine {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PricingPolicy {
        self.policy
    }

    /// Derive the full pricing record for one stream.
    pub fn valuate(&self, input: &CalculationInput) -> PricingResult<CalculationResult> {
        validate(input)?;

        // Blend the premium factors: geometric mean of the compound product,
        // then scale the excess over 1.0.
        let total_multiplier: f64 = input.multipliers.iter().product();
        let geometric_mean = total_multiplier.powf(1.0 / input.multipliers.len() as f64);
        let adjusted_multiplier = 1.0 + (geometric_mean - 1.0) * PREMIUM_DAMPING;
        let premium_cpm = input.base_cpm * adjusted_multiplier;

        let unique_watch_sessions = input.stream_length_minutes / input.avg_view_time_minutes;

        let raw_audience = match self.policy.audience_model {
            AudienceModel::UniqueCycles => input.total_views / unique_watch_sessions,
            AudienceModel::Concurrent => {
                input.total_views
                    * (input.avg_view_time_minutes / input.stream_length_minutes)
            }
        };
        let audience_size = raw_audience.round();
        if audience_size < 1.0 {
            return Err(PricingError::DivisionDegeneracy(format!(
                "audience size rounded to zero ({} views across {:.2} watch sessions)",
                input.total_views, unique_watch_sessions
            )));
        }
        let audience_size = audience_size as u64;

        // Minimum placements so every viewing cycle contains one exposure.
        let min_ad_frequency = unique_watch_sessions.ceil() as u32;

        // Hard ceiling: sponsored time capped at 30% of stream length.
        let max_ad_time_minutes = input.stream_length_minutes * SPONSORED_TIME_CAP;
        let max_placements =
            (max_ad_time_minutes / self.policy.placement_duration_minutes).floor() as u32;

        let available_brand_slots = max_placements / min_ad_frequency;
        let leftover_placements = max_placements % min_ad_frequency;

        let cost_per_placement = premium_cpm / 1000.0 * audience_size as f64;
        let cost_per_activation = cost_per_placement * f64::from(min_ad_frequency);
        let total_inventory_value = cost_per_placement * f64::from(available_brand_slots);

        // A frequency above the ceiling is clamped rather than rejected:
        // the valuation stays usable, flagged with the reach it actually buys.
        let selected_frequency = input.selected_frequency.unwrap_or(min_ad_frequency);
        let (actual_frequency, is_partial_reach, audience_reach_percentage) =
            if selected_frequency > max_placements {
                (
                    max_placements,
                    true,
                    f64::from(max_placements) / f64::from(selected_frequency) * 100.0,
                )
            } else {
                (selected_frequency, false, 100.0)
            };

        Ok(CalculationResult {
            inputs: EchoedInputs {
                base_cpm: round2(input.base_cpm),
                multipliers: input.multipliers.clone(),
                stream_length_minutes: round2(input.stream_length_minutes),
                avg_view_time_minutes: round2(input.avg_view_time_minutes),
                total_views: round2(input.total_views),
            },
            audience_model: self.policy.audience_model,
            placement_duration_minutes: self.policy.placement_duration_minutes,
            total_multiplier: round2(total_multiplier),
            geometric_mean: round2(geometric_mean),
            adjusted_multiplier: round2(adjusted_multiplier),
            premium_cpm: round2(premium_cpm),
            unique_watch_sessions: round2(unique_watch_sessions),
            audience_size,
            min_ad_frequency,
            max_placements,
            available_brand_slots,
            leftover_placements,
            selected_frequency,
            actual_frequency,
            is_partial_reach,
            audience_reach_percentage: round2(audience_reach_percentage),
            cost_per_placement: round2(cost_per_placement),
            cost_per_activation: round2(cost_per_activation),
            total_inventory_value: round2(total_inventory_value),
        })
    }
}

/// Reject malformed input before any computation.
fn validate(input: &CalculationInput) -> PricingResult<()> {
    let finite = [
        input.base_cpm,
        input.stream_length_minutes,
        input.avg_view_time_minutes,
        input.total_views,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        return Err(PricingError::Validation(
            "Numeric inputs must be finite".to_string(),
        ));
    }
    if input.base_cpm <= 0.0 {
        return Err(PricingError::Validation(
            "Base CPM must be a positive number".to_string(),
        ));
    }
    if input.multipliers.is_empty() {
        return Err(PricingError::Validation(
            "At least one multiplier is required".to_string(),
        ));
    }
    if input.multipliers.iter().any(|m| !(*m > 0.0 && m.is_finite())) {
        return Err(PricingError::Validation(
            "Multiplier values must be positive numbers".to_string(),
        ));
    }
    if input.stream_length_minutes <= 0.0
        || input.avg_view_time_minutes <= 0.0
        || input.total_views <= 0.0
    {
        return Err(PricingError::Validation(
            "Stream length, average view time, and total views must be positive".to_string(),
        ));
    }
    if input.avg_view_time_minutes > input.stream_length_minutes {
        return Err(PricingError::Validation(
            "Average view time cannot exceed stream length".to_string(),
        ));
    }
    if input.selected_frequency == Some(0) {
        return Err(PricingError::Validation(
            "Selected frequency must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> CalculationInput {
        CalculationInput {
            base_cpm: 25.0,
            multipliers: vec![1.8, 2.5, 1.3, 1.4],
            stream_length_minutes: 180.0,
            avg_view_time_minutes: 15.0,
            total_views: 50_000.0,
            selected_frequency: None,
        }
    }

    // 1. Reference scenario --------------------------------------------------

    #[test]
    fn test_reference_valuation() {
        let engine = PricingEngine::default();
        let result = engine.valuate(&reference_input()).unwrap();

        assert!((result.total_multiplier - 8.19).abs() < 0.005);
        assert!((result.geometric_mean - 1.69).abs() < 0.005);
        // 1 + (1.6917 - 1) * 1.5
        assert!((result.adjusted_multiplier - 2.04).abs() < 0.005);
        assert!((result.premium_cpm - 50.94).abs() < 0.005);

        assert!((result.unique_watch_sessions - 12.0).abs() < f64::EPSILON);
        assert_eq!(result.audience_size, 4_167);
        assert_eq!(result.min_ad_frequency, 12);
        // floor(180 * 0.30 / 0.5)
        assert_eq!(result.max_placements, 108);
        assert_eq!(result.available_brand_slots, 9);
        assert_eq!(result.leftover_placements, 0);

        assert!((result.cost_per_placement - 212.26).abs() < 0.005);
        assert!((result.cost_per_activation - 2_547.12).abs() < 0.005);
        assert!((result.total_inventory_value - 1_910.34).abs() < 0.005);

        assert_eq!(result.selected_frequency, 12);
        assert_eq!(result.actual_frequency, 12);
        assert!(!result.is_partial_reach);
        assert!((result.audience_reach_percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pricing_chain_consistency() {
        // Derived totals follow from the per-placement price (up to the
        // display rounding applied to each field independently).
        let engine = PricingEngine::default();
        let r = engine.valuate(&reference_input()).unwrap();

        let activation = r.cost_per_placement * f64::from(r.min_ad_frequency);
        assert!((r.cost_per_activation - activation).abs() < 0.05);

        let inventory = r.cost_per_placement * f64::from(r.available_brand_slots);
        assert!((r.total_inventory_value - inventory).abs() < 0.05);
    }

    // 2. Degenerate-but-valid shapes -----------------------------------------

    #[test]
    fn test_single_multiplier_geometric_mean_degenerates() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            multipliers: vec![2.0],
            ..reference_input()
        };
        let result = engine.valuate(&input).unwrap();
        assert!((result.geometric_mean - 2.0).abs() < f64::EPSILON);
        assert!((result.total_multiplier - 2.0).abs() < f64::EPSILON);
        assert!((result.adjusted_multiplier - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_watch_through_gives_unit_frequency() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            stream_length_minutes: 60.0,
            avg_view_time_minutes: 60.0,
            ..reference_input()
        };
        let result = engine.valuate(&input).unwrap();
        assert_eq!(result.min_ad_frequency, 1);
        assert_eq!(result.audience_size, 50_000);
    }

    // 3. Structural properties -----------------------------------------------

    #[test]
    fn test_multiplier_commutativity() {
        let engine = PricingEngine::default();
        let orders: [&[f64]; 3] = [
            &[1.8, 2.5, 1.3, 1.4],
            &[1.4, 1.3, 2.5, 1.8],
            &[2.5, 1.4, 1.8, 1.3],
        ];
        let results: Vec<CalculationResult> = orders
            .iter()
            .map(|order| {
                engine
                    .valuate(&CalculationInput {
                        multipliers: order.to_vec(),
                        ..reference_input()
                    })
                    .unwrap()
            })
            .collect();
        for r in &results[1..] {
            assert!((r.total_multiplier - results[0].total_multiplier).abs() < 1e-9);
            assert!((r.geometric_mean - results[0].geometric_mean).abs() < 1e-9);
        }
    }

    #[test]
    fn test_multiplier_monotonicity() {
        let engine = PricingEngine::default();
        let base = engine.valuate(&reference_input()).unwrap();
        let raised = engine
            .valuate(&CalculationInput {
                multipliers: vec![1.8, 2.5, 1.3, 1.9],
                ..reference_input()
            })
            .unwrap();
        assert!(raised.adjusted_multiplier >= base.adjusted_multiplier);
        assert!(raised.premium_cpm >= base.premium_cpm);
    }

    #[test]
    fn test_frequency_scale_invariance() {
        // Frequency depends only on the length/view-time ratio.
        let engine = PricingEngine::default();
        let a = engine.valuate(&reference_input()).unwrap();
        let b = engine
            .valuate(&CalculationInput {
                stream_length_minutes: 360.0,
                avg_view_time_minutes: 30.0,
                ..reference_input()
            })
            .unwrap();
        assert_eq!(a.min_ad_frequency, b.min_ad_frequency);
    }

    #[test]
    fn test_slot_ceiling_consistency() {
        let engine = PricingEngine::default();
        for (stream, view) in [(180.0, 15.0), (95.0, 7.0), (240.0, 17.5), (60.0, 60.0)] {
            let result = engine
                .valuate(&CalculationInput {
                    stream_length_minutes: stream,
                    avg_view_time_minutes: view,
                    ..reference_input()
                })
                .unwrap();
            assert_eq!(
                result.available_brand_slots * result.min_ad_frequency
                    + result.leftover_placements,
                result.max_placements,
                "slot arithmetic must tile the ceiling for {}/{}",
                stream,
                view
            );
        }
    }

    // 4. Partial reach -------------------------------------------------------

    #[test]
    fn test_partial_reach_clamps_to_ceiling() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            selected_frequency: Some(150),
            ..reference_input()
        };
        let result = engine.valuate(&input).unwrap();
        assert_eq!(result.selected_frequency, 150);
        assert_eq!(result.actual_frequency, 108);
        assert!(result.is_partial_reach);
        // 108 / 150 * 100
        assert!((result.audience_reach_percentage - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reach_is_full_iff_within_ceiling() {
        let engine = PricingEngine::default();
        let result = engine
            .valuate(&CalculationInput {
                selected_frequency: Some(108),
                ..reference_input()
            })
            .unwrap();
        assert!(!result.is_partial_reach);
        assert_eq!(result.actual_frequency, 108);
        assert!((result.audience_reach_percentage - 100.0).abs() < f64::EPSILON);
    }

    // 5. Rejections ----------------------------------------------------------

    #[test]
    fn test_rejects_nonpositive_base_cpm() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            base_cpm: 0.0,
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_empty_multipliers() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            multipliers: vec![],
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_view_time_beyond_stream_length() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            stream_length_minutes: 30.0,
            avg_view_time_minutes: 45.0,
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_negative_views() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            total_views: -5.0,
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            base_cpm: f64::NAN,
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_degenerate_audience_is_an_error_not_a_panic() {
        // 1 view spread over 1000 watch cycles rounds to zero people.
        let engine = PricingEngine::default();
        let input = CalculationInput {
            stream_length_minutes: 1_000.0,
            avg_view_time_minutes: 1.0,
            total_views: 1.0,
            ..reference_input()
        };
        assert!(matches!(
            engine.valuate(&input),
            Err(PricingError::DivisionDegeneracy(_))
        ));
    }

    // 6. Policy variants -----------------------------------------------------

    #[test]
    fn test_long_form_policy_shrinks_the_ceiling() {
        let engine = PricingEngine::new(PricingPolicy::long_form());
        let result = engine.valuate(&reference_input()).unwrap();
        // floor(180 * 0.30 / 2.0)
        assert_eq!(result.max_placements, 27);
        assert_eq!(result.available_brand_slots, 2);
        assert_eq!(result.leftover_placements, 3);
        assert!((result.placement_duration_minutes - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audience_models_agree_on_the_figure() {
        // The models differ in meaning, not arithmetic.
        let cycles = PricingEngine::new(PricingPolicy::default())
            .valuate(&reference_input())
            .unwrap();
        let concurrent = PricingEngine::new(PricingPolicy {
            audience_model: AudienceModel::Concurrent,
            ..PricingPolicy::default()
        })
        .valuate(&reference_input())
        .unwrap();
        assert_eq!(cycles.audience_size, concurrent.audience_size);
        assert_eq!(cycles.audience_model, AudienceModel::UniqueCycles);
        assert_eq!(concurrent.audience_model, AudienceModel::Concurrent);
    }

    #[test]
    fn test_multiplier_order_is_preserved_in_echo() {
        let engine = PricingEngine::default();
        let input = CalculationInput {
            multipliers: vec![1.4, 2.5, 1.8, 1.3],
            ..reference_input()
        };
        let result = engine.valuate(&input).unwrap();
        assert_eq!(result.inputs.multipliers, vec![1.4, 2.5, 1.8, 1.3]);
    }
}
