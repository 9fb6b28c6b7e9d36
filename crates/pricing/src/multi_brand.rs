//! Splitting a stream's placement inventory across several brands.

use serde::{Deserialize, Serialize};
use streamrate_core::{PricingError, PricingResult};

use crate::engine::{round2, CalculationResult, PricingEngine};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One brand's requested share of the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandPlacementRequest {
    pub name: String,
    pub placements: u32,
}

/// One brand's priced share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandPlacementResult {
    pub name: String,
    pub placements: u32,
    pub cost: f64,
    pub ad_time_minutes: f64,
    pub percentage_of_stream: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiBrandTotals {
    pub placements: u32,
    pub cost: f64,
    pub ad_time_minutes: f64,
    pub ad_percentage: f64,
    pub remaining_slots: u32,
}

/// Per-brand breakdown plus aggregates for one stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiBrandResult {
    pub brands: Vec<BrandPlacementResult>,
    pub totals: MultiBrandTotals,
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

impl PricingEngine {
    /// Allocate a prior valuation's inventory across named brands.
    ///
    /// A split is an explicit allocation, so exceeding the ceiling is a
    /// hard rejection rather than the soft clamp `valuate` applies. Each
    /// brand is priced at single-placement granularity, not the
    /// full-activation package.
    pub fn split_across_brands(
        &self,
        base: &CalculationResult,
        brands: &[BrandPlacementRequest],
    ) -> PricingResult<MultiBrandResult> {
        if brands.is_empty() {
            return Err(PricingError::Validation(
                "At least one brand placement request is required".to_string(),
            ));
        }
        if brands.iter().any(|b| b.name.trim().is_empty()) {
            return Err(PricingError::Validation(
                "Brand names must not be empty".to_string(),
            ));
        }
        if brands.iter().any(|b| b.placements == 0) {
            return Err(PricingError::Validation(
                "Brand placement counts must be at least 1".to_string(),
            ));
        }

        let requested: u32 = brands.iter().map(|b| b.placements).sum();
        if requested > base.max_placements {
            return Err(PricingError::CapacityExceeded {
                requested,
                max: base.max_placements,
            });
        }

        let duration = self.policy().placement_duration_minutes;
        let stream_length = base.inputs.stream_length_minutes;

        let breakdown: Vec<BrandPlacementResult> = brands
            .iter()
            .map(|brand| {
                let ad_time_minutes = f64::from(brand.placements) * duration;
                BrandPlacementResult {
                    name: brand.name.clone(),
                    placements: brand.placements,
                    cost: round2(base.cost_per_placement * f64::from(brand.placements)),
                    ad_time_minutes,
                    percentage_of_stream: round2(ad_time_minutes / stream_length * 100.0),
                }
            })
            .collect();

        let total_cost: f64 = breakdown.iter().map(|b| b.cost).sum();
        let total_ad_time = f64::from(requested) * duration;

        Ok(MultiBrandResult {
            brands: breakdown,
            totals: MultiBrandTotals {
                placements: requested,
                cost: round2(total_cost),
                ad_time_minutes: total_ad_time,
                ad_percentage: round2(total_ad_time / stream_length * 100.0),
                remaining_slots: base.max_placements - requested,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CalculationInput;
    use crate::policy::PricingPolicy;

    fn base_result(engine: &PricingEngine) -> CalculationResult {
        engine
            .valuate(&CalculationInput {
                base_cpm: 25.0,
                multipliers: vec![1.8, 2.5, 1.3, 1.4],
                stream_length_minutes: 180.0,
                avg_view_time_minutes: 15.0,
                total_views: 50_000.0,
                selected_frequency: None,
            })
            .unwrap()
    }

    #[test]
    fn test_split_breakdown_and_totals() {
        let engine = PricingEngine::default();
        let base = base_result(&engine);
        let brands = vec![
            BrandPlacementRequest {
                name: "Brand A".to_string(),
                placements: 12,
            },
            BrandPlacementRequest {
                name: "Brand B".to_string(),
                placements: 12,
            },
        ];

        let result = engine.split_across_brands(&base, &brands).unwrap();

        assert_eq!(result.brands.len(), 2);
        let a = &result.brands[0];
        assert_eq!(a.name, "Brand A");
        assert_eq!(a.placements, 12);
        // 212.26 * 12
        assert!((a.cost - 2_547.12).abs() < 0.005);
        assert!((a.ad_time_minutes - 6.0).abs() < f64::EPSILON);
        // 6 / 180 * 100
        assert!((a.percentage_of_stream - 3.33).abs() < 0.005);

        assert_eq!(result.totals.placements, 24);
        assert!((result.totals.cost - 5_094.24).abs() < 0.005);
        assert!((result.totals.ad_time_minutes - 12.0).abs() < f64::EPSILON);
        assert!((result.totals.ad_percentage - 6.67).abs() < 0.005);
        assert_eq!(result.totals.remaining_slots, 84);
    }

    #[test]
    fn test_split_rejects_over_capacity() {
        // Long-form spots: ceiling is floor(180 * 0.30 / 2.0) = 27.
        let engine = PricingEngine::new(PricingPolicy::long_form());
        let base = base_result(&engine);
        assert_eq!(base.max_placements, 27);

        let brands = vec![
            BrandPlacementRequest {
                name: "Brand A".to_string(),
                placements: 10,
            },
            BrandPlacementRequest {
                name: "Brand B".to_string(),
                placements: 10,
            },
            BrandPlacementRequest {
                name: "Brand C".to_string(),
                placements: 10,
            },
        ];

        match engine.split_across_brands(&base, &brands) {
            Err(PricingError::CapacityExceeded { requested, max }) => {
                assert_eq!(requested, 30);
                assert_eq!(max, 27);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_split_fills_ceiling_exactly() {
        let engine = PricingEngine::default();
        let base = base_result(&engine);
        let brands = vec![BrandPlacementRequest {
            name: "Solo".to_string(),
            placements: base.max_placements,
        }];

        let result = engine.split_across_brands(&base, &brands).unwrap();
        assert_eq!(result.totals.remaining_slots, 0);
        // 108 spots * 0.5 min = 54 min = 30% of 180.
        assert!((result.totals.ad_percentage - 30.0).abs() < 0.005);
    }

    #[test]
    fn test_split_rejects_empty_requests() {
        let engine = PricingEngine::default();
        let base = base_result(&engine);
        assert!(matches!(
            engine.split_across_brands(&base, &[]),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_split_rejects_zero_placements() {
        let engine = PricingEngine::default();
        let base = base_result(&engine);
        let brands = vec![BrandPlacementRequest {
            name: "Brand A".to_string(),
            placements: 0,
        }];
        assert!(matches!(
            engine.split_across_brands(&base, &brands),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_split_rejects_blank_brand_name() {
        let engine = PricingEngine::default();
        let base = base_result(&engine);
        let brands = vec![BrandPlacementRequest {
            name: "  ".to_string(),
            placements: 4,
        }];
        assert!(matches!(
            engine.split_across_brands(&base, &brands),
            Err(PricingError::Validation(_))
        ));
    }
}
