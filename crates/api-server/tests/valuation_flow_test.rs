//! Integration test for the full catalog → valuation → split → campaign flow,
//! run in-process against the same stores the REST handlers use.

use std::sync::Arc;
use streamrate_benchmarks::BenchmarkStore;
use streamrate_campaigns::{CalculationStore, CampaignStore};
use streamrate_pricing::{BrandPlacementRequest, CalculationInput, PricingEngine};

struct Harness {
    engine: PricingEngine,
    benchmarks: Arc<BenchmarkStore>,
    calculations: Arc<CalculationStore>,
    campaigns: Arc<CampaignStore>,
}

fn harness() -> Harness {
    Harness {
        engine: PricingEngine::default(),
        benchmarks: Arc::new(BenchmarkStore::with_defaults()),
        calculations: Arc::new(CalculationStore::new()),
        campaigns: Arc::new(CampaignStore::new()),
    }
}

/// Price one stream the way the calculate endpoint does: resolve the
/// industry base CPM and the active multiplier set, then run the engine.
fn price_stream(
    h: &Harness,
    slug: &str,
    stream_length: f64,
    avg_view: f64,
    views: f64,
) -> streamrate_campaigns::StoredCalculation {
    let industry = h.benchmarks.get_industry_by_slug(slug).unwrap();
    let multipliers: Vec<f64> = h
        .benchmarks
        .list_active_multipliers()
        .iter()
        .map(|m| m.value)
        .collect();

    let result = h
        .engine
        .valuate(&CalculationInput {
            base_cpm: industry.video_cpm_avg,
            multipliers,
            stream_length_minutes: stream_length,
            avg_view_time_minutes: avg_view,
            total_views: views,
            selected_frequency: None,
        })
        .unwrap();

    h.calculations.save(industry.id, &industry.name, result)
}

#[test]
fn test_catalog_lookup_feeds_the_engine() {
    let h = harness();
    let stored = price_stream(&h, "sports", 180.0, 15.0, 50_000.0);

    // Sports base CPM is 18.0; the seeded multiplier set blends to ~2.04x.
    assert!((stored.result.inputs.base_cpm - 18.0).abs() < f64::EPSILON);
    assert!((stored.result.adjusted_multiplier - 2.04).abs() < 0.005);
    assert!((stored.result.premium_cpm - 36.68).abs() < 0.005);
    assert_eq!(stored.result.min_ad_frequency, 12);
    assert_eq!(stored.result.max_placements, 108);
    assert_eq!(stored.industry_name, "Sports");

    let fetched = h.calculations.get(stored.id).unwrap();
    assert_eq!(fetched.session_id, stored.session_id);
}

#[test]
fn test_split_persists_brand_slots() {
    let h = harness();
    let stored = price_stream(&h, "finance", 120.0, 20.0, 80_000.0);

    let split = h
        .engine
        .split_across_brands(
            &stored.result,
            &[
                BrandPlacementRequest {
                    name: "Acme Bank".to_string(),
                    placements: 6,
                },
                BrandPlacementRequest {
                    name: "Bolt Trading".to_string(),
                    placements: 6,
                },
            ],
        )
        .unwrap();

    h.calculations.record_slots(stored.id, &split);

    let slots = h.calculations.slots_for(stored.id);
    assert_eq!(slots.len(), 2);
    let slot_total: f64 = slots.iter().map(|s| s.slot_value).sum();
    assert!((slot_total - split.totals.cost).abs() < 0.01);
    assert_eq!(
        split.totals.remaining_slots,
        stored.result.max_placements - 12
    );
}

#[test]
fn test_campaign_aggregates_streams() {
    let h = harness();
    let a = price_stream(&h, "sports", 180.0, 15.0, 50_000.0);
    let b = price_stream(&h, "gaming", 240.0, 30.0, 120_000.0);

    let detail = h
        .campaigns
        .create(
            "FC United",
            &[
                ("match_day".to_string(), a.id),
                ("community_stream".to_string(), b.id),
            ],
            &h.calculations,
        )
        .unwrap();

    let expected = a.result.total_inventory_value + b.result.total_inventory_value;
    assert!((detail.total_value - expected).abs() < 1e-9);

    let summaries = h.campaigns.list(&h.calculations);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].stream_count, 2);

    assert!(h.campaigns.delete(detail.campaign.id));
    assert!(h.campaigns.list(&h.calculations).is_empty());
}

#[test]
fn test_history_reflects_recent_pricing() {
    let h = harness();
    for _ in 0..3 {
        price_stream(&h, "tech", 90.0, 18.0, 25_000.0);
    }

    let history = h.calculations.history(10);
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].industry_name, "Tech & SaaS");
    assert!(history[0].total_inventory_value > 0.0);
}
