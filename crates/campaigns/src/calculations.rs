//! Storage for priced calculations and the brand slots sold against them.
//!
//! In-memory DashMap store; callers persist the engine's result record
//! verbatim and retrieve it by id later.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use streamrate_pricing::{CalculationResult, MultiBrandResult};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A persisted valuation, linked to the industry it was priced against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCalculation {
    pub id: Uuid,
    /// Tracking id handed back to the caller for follow-up requests.
    pub session_id: Uuid,
    pub industry_id: Uuid,
    pub industry_name: String,
    pub result: CalculationResult,
    pub created_at: DateTime<Utc>,
}

/// One brand's purchased share of a stored calculation's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSlot {
    pub id: Uuid,
    pub calculation_id: Uuid,
    pub brand_name: String,
    pub placements_purchased: u32,
    pub slot_value: f64,
    pub created_at: DateTime<Utc>,
}

/// Condensed row for the recent-calculations listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub session_id: Uuid,
    pub industry_name: String,
    pub stream_length_minutes: f64,
    pub total_views: f64,
    pub premium_cpm: f64,
    pub total_inventory_value: f64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe in-memory calculation store.
pub struct CalculationStore {
    calculations: DashMap<Uuid, StoredCalculation>,
    ad_slots: DashMap<Uuid, Vec<AdSlot>>,
}

impl Default for CalculationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationStore {
    pub fn new() -> Self {
        Self {
            calculations: DashMap::new(),
            ad_slots: DashMap::new(),
        }
    }

    /// Persist a priced result under fresh calculation and session ids.
    pub fn save(
        &self,
        industry_id: Uuid,
        industry_name: &str,
        result: CalculationResult,
    ) -> StoredCalculation {
        let stored = StoredCalculation {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            industry_id,
            industry_name: industry_name.to_string(),
            result,
            created_at: Utc::now(),
        };
        self.calculations.insert(stored.id, stored.clone());
        stored
    }

    pub fn get(&self, id: Uuid) -> Option<StoredCalculation> {
        self.calculations.get(&id).map(|r| r.value().clone())
    }

    /// Most recent calculations first.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut rows: Vec<StoredCalculation> =
            self.calculations.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        rows.into_iter()
            .map(|c| HistoryEntry {
                id: c.id,
                session_id: c.session_id,
                industry_name: c.industry_name,
                stream_length_minutes: c.result.inputs.stream_length_minutes,
                total_views: c.result.inputs.total_views,
                premium_cpm: c.result.premium_cpm,
                total_inventory_value: c.result.total_inventory_value,
                created_at: c.created_at,
            })
            .collect()
    }

    /// Record the brand slots sold by a multi-brand split.
    pub fn record_slots(&self, calculation_id: Uuid, split: &MultiBrandResult) -> Vec<AdSlot> {
        let now = Utc::now();
        let slots: Vec<AdSlot> = split
            .brands
            .iter()
            .map(|brand| AdSlot {
                id: Uuid::new_v4(),
                calculation_id,
                brand_name: brand.name.clone(),
                placements_purchased: brand.placements,
                slot_value: brand.cost,
                created_at: now,
            })
            .collect();
        self.ad_slots
            .entry(calculation_id)
            .or_default()
            .extend(slots.iter().cloned());
        slots
    }

    /// Brand slots sold against a calculation, oldest first.
    pub fn slots_for(&self, calculation_id: Uuid) -> Vec<AdSlot> {
        self.ad_slots
            .get(&calculation_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
