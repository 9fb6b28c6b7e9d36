//! Multi-stream campaigns: a channel's set of stored calculations grouped
//! under one name, with aggregate inventory value.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use streamrate_core::{PricingError, PricingResult};
use tracing::info;
use uuid::Uuid;

use crate::calculations::{CalculationStore, StoredCalculation};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub channel_name: String,
    pub created_at: DateTime<Utc>,
}

/// Link between a campaign and one stored calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignStream {
    pub campaign_id: Uuid,
    /// Free-form label, e.g. "match_day" or "weekly_show".
    pub stream_type: String,
    pub calculation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Listing row with aggregate figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: Uuid,
    pub channel_name: String,
    pub stream_count: usize,
    pub total_value: f64,
    pub created_at: DateTime<Utc>,
}

/// Full campaign view: streams joined to their calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    pub streams: Vec<CampaignStreamDetail>,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignStreamDetail {
    pub stream_type: String,
    pub calculation: StoredCalculation,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe in-memory campaign store.
pub struct CampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
    streams: DashMap<Uuid, Vec<CampaignStream>>,
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignStore {
    pub fn new() -> Self {
        Self {
            campaigns: DashMap::new(),
            streams: DashMap::new(),
        }
    }

    /// Create a campaign over existing calculations. Every referenced
    /// calculation id must already be stored.
    pub fn create(
        &self,
        channel_name: &str,
        entries: &[(String, Uuid)],
        calculations: &CalculationStore,
    ) -> PricingResult<CampaignDetail> {
        if channel_name.trim().is_empty() {
            return Err(PricingError::Validation(
                "Channel name must not be empty".to_string(),
            ));
        }
        if entries.is_empty() {
            return Err(PricingError::Validation(
                "At least one stream is required".to_string(),
            ));
        }
        for (_, calculation_id) in entries {
            if calculations.get(*calculation_id).is_none() {
                return Err(PricingError::NotFound(format!(
                    "calculation {} does not exist",
                    calculation_id
                )));
            }
        }

        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            channel_name: channel_name.to_string(),
            created_at: now,
        };
        let links: Vec<CampaignStream> = entries
            .iter()
            .map(|(stream_type, calculation_id)| CampaignStream {
                campaign_id: campaign.id,
                stream_type: stream_type.clone(),
                calculation_id: *calculation_id,
                created_at: now,
            })
            .collect();

        self.campaigns.insert(campaign.id, campaign.clone());
        self.streams.insert(campaign.id, links);
        info!(campaign_id = %campaign.id, channel = channel_name, streams = entries.len(), "Campaign created");

        // The referential check above makes this lookup infallible here.
        self.get(campaign.id, calculations)
            .ok_or_else(|| PricingError::NotFound("campaign vanished during creation".to_string()))
    }

    /// All campaigns with aggregate figures, newest first.
    pub fn list(&self, calculations: &CalculationStore) -> Vec<CampaignSummary> {
        let mut rows: Vec<CampaignSummary> = self
            .campaigns
            .iter()
            .map(|entry| {
                let campaign = entry.value();
                let links = self
                    .streams
                    .get(&campaign.id)
                    .map(|r| r.clone())
                    .unwrap_or_default();
                let total_value = links
                    .iter()
                    .filter_map(|link| calculations.get(link.calculation_id))
                    .map(|calc| calc.result.total_inventory_value)
                    .sum();
                CampaignSummary {
                    id: campaign.id,
                    channel_name: campaign.channel_name.clone(),
                    stream_count: links.len(),
                    total_value,
                    created_at: campaign.created_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Full campaign view with calculations joined in.
    pub fn get(&self, id: Uuid, calculations: &CalculationStore) -> Option<CampaignDetail> {
        let campaign = self.campaigns.get(&id).map(|r| r.value().clone())?;
        let links = self.streams.get(&id).map(|r| r.clone()).unwrap_or_default();

        let streams: Vec<CampaignStreamDetail> = links
            .iter()
            .filter_map(|link| {
                calculations
                    .get(link.calculation_id)
                    .map(|calculation| CampaignStreamDetail {
                        stream_type: link.stream_type.clone(),
                        calculation,
                    })
            })
            .collect();

        let total_value = streams
            .iter()
            .map(|s| s.calculation.result.total_inventory_value)
            .sum();

        Some(CampaignDetail {
            campaign,
            streams,
            total_value,
        })
    }

    /// Delete a campaign and its stream links. Returns `true` if found.
    pub fn delete(&self, id: Uuid) -> bool {
        let removed = self.campaigns.remove(&id).is_some();
        if removed {
            self.streams.remove(&id);
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
