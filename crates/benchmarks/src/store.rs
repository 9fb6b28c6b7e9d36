//! In-memory benchmark catalog backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A content category with its video CPM benchmark band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Industry {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub video_cpm_low: f64,
    pub video_cpm_avg: f64,
    pub video_cpm_high: f64,
    pub notes: String,
    pub last_updated: DateTime<Utc>,
}

/// Payload for creating or replacing an industry row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIndustry {
    pub name: String,
    pub slug: String,
    pub video_cpm_low: f64,
    pub video_cpm_avg: f64,
    pub video_cpm_high: f64,
    #[serde(default)]
    pub notes: String,
}

/// A premium factor applied on top of the industry base CPM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumMultiplier {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub value: f64,
    pub description: String,
    pub is_active: bool,
    pub sort_order: u32,
}

/// Combined catalog view: industries plus the active multiplier set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub industries: Vec<Industry>,
    pub multipliers: Vec<PremiumMultiplier>,
    pub total_multiplier: f64,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe in-memory store for industries and multipliers.
pub struct BenchmarkStore {
    industries: DashMap<Uuid, Industry>,
    multipliers: DashMap<Uuid, PremiumMultiplier>,
}

impl Default for BenchmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkStore {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            industries: DashMap::new(),
            multipliers: DashMap::new(),
        }
    }

    /// Create a catalog pre-loaded with the default benchmark rows.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        store.seed_defaults();
        store
    }

    // ─── Industries ────────────────────────────────────────────────────────

    /// All industries, name order.
    pub fn list_industries(&self) -> Vec<Industry> {
        let mut rows: Vec<Industry> = self.industries.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn get_industry(&self, id: Uuid) -> Option<Industry> {
        self.industries.get(&id).map(|r| r.value().clone())
    }

    pub fn get_industry_by_slug(&self, slug: &str) -> Option<Industry> {
        self.industries
            .iter()
            .find(|r| r.value().slug == slug)
            .map(|r| r.value().clone())
    }

    /// Insert an industry, or update the existing row with the same slug.
    /// Returns the stored row.
    pub fn upsert_industry(&self, new: NewIndustry) -> Industry {
        let now = Utc::now();
        if let Some(existing) = self.get_industry_by_slug(&new.slug) {
            let updated = Industry {
                id: existing.id,
                name: new.name,
                slug: new.slug,
                video_cpm_low: new.video_cpm_low,
                video_cpm_avg: new.video_cpm_avg,
                video_cpm_high: new.video_cpm_high,
                notes: new.notes,
                last_updated: now,
            };
            self.industries.insert(existing.id, updated.clone());
            return updated;
        }
        let industry = Industry {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            video_cpm_low: new.video_cpm_low,
            video_cpm_avg: new.video_cpm_avg,
            video_cpm_high: new.video_cpm_high,
            notes: new.notes,
            last_updated: now,
        };
        self.industries.insert(industry.id, industry.clone());
        industry
    }

    /// Remove an industry by slug. Returns the removed row's name.
    pub fn remove_industry(&self, slug: &str) -> Option<String> {
        let id = self
            .industries
            .iter()
            .find(|r| r.value().slug == slug)
            .map(|r| *r.key())?;
        self.industries.remove(&id).map(|(_, row)| row.name)
    }

    // ─── Multipliers ───────────────────────────────────────────────────────

    /// Active multipliers in display order — the ordered value set fed to
    /// the pricing engine.
    pub fn list_active_multipliers(&self) -> Vec<PremiumMultiplier> {
        let mut rows: Vec<PremiumMultiplier> = self
            .multipliers
            .iter()
            .filter(|r| r.value().is_active)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|m| m.sort_order);
        rows
    }

    /// Compound product of the active multiplier values.
    pub fn compound_multiplier(&self) -> f64 {
        self.list_active_multipliers()
            .iter()
            .map(|m| m.value)
            .product()
    }

    /// Combined industries + active multipliers view.
    pub fn summary(&self) -> BenchmarkSummary {
        BenchmarkSummary {
            industries: self.list_industries(),
            multipliers: self.list_active_multipliers(),
            total_multiplier: (self.compound_multiplier() * 100.0).round() / 100.0,
        }
    }

    fn add_multiplier(
        &self,
        name: &str,
        category: &str,
        value: f64,
        description: &str,
        sort_order: u32,
    ) {
        let row = PremiumMultiplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            value,
            description: description.to_string(),
            is_active: true,
            sort_order,
        };
        self.multipliers.insert(row.id, row);
    }

    // ─── Seed data ─────────────────────────────────────────────────────────

    /// Load the default benchmark rows: the reference multiplier set and
    /// the industry CPM bands sourced quarterly from published creator
    /// economy surveys.
    pub fn seed_defaults(&self) {
        self.add_multiplier(
            "Unskippable Format",
            "format",
            1.8,
            "Placements are woven into the broadcast and cannot be skipped",
            1,
        );
        self.add_multiplier(
            "Integrated Placement",
            "placement",
            2.5,
            "Talent-delivered integration rather than a pre-roll slot",
            2,
        );
        self.add_multiplier(
            "Live Broadcast",
            "liveness",
            1.3,
            "Real-time broadcasts command a premium over pre-recorded content",
            3,
        );
        self.add_multiplier(
            "High Attention",
            "attention",
            1.4,
            "Focused lean-back viewing with elevated completion rates",
            4,
        );

        let industries: [(&str, &str, f64, f64, f64, &str); 15] = [
            ("Sports", "sports", 12.0, 18.0, 25.0, "Live sports and sports-talk programming"),
            ("Fashion & Beauty", "fashion", 10.0, 15.0, 22.0, "Apparel, cosmetics, and style content"),
            ("Gaming", "gaming", 8.0, 12.0, 18.0, "Esports, playthroughs, and gaming culture"),
            ("Entertainment", "entertainment", 10.0, 14.0, 20.0, "General entertainment and talk formats"),
            ("Food & Beverage", "food", 9.0, 13.0, 19.0, "Cooking, restaurant, and drinks content"),
            ("Travel & Lifestyle", "travel", 11.0, 16.0, 24.0, "Travel, outdoors, and lifestyle programming"),
            ("Finance & Investing", "finance", 30.0, 40.0, 50.0, "Personal finance, crypto, stock market, wealth building - highest paying niche. Source: OutlierKit, Lenos, upGrowth 2025-2026"),
            ("Legal & Insurance", "legal", 25.0, 35.0, 55.0, "Legal advice, court content, insurance products - ultra-premium CPM. Source: OutlierKit, YouTube Tools Hub 2026"),
            ("Real Estate", "real_estate", 25.0, 32.0, 45.0, "Property investing, market analysis, home buying. Source: YouTube Tools Hub, OutlierKit 2026"),
            ("Business & Entrepreneurship", "business", 20.0, 28.0, 45.0, "Startups, B2B software, business strategy. Source: YouTube Tools Hub, Lenos 2026"),
            ("Tech & SaaS", "tech", 18.0, 24.0, 40.0, "Software reviews, enterprise tech, cybersecurity. Source: YouTube Tools Hub, upGrowth 2026"),
            ("Automotive", "automotive", 18.0, 23.0, 35.0, "Car reviews, auto industry news. Source: AWISEE, upGrowth 2025"),
            ("Digital Marketing", "marketing", 15.0, 20.0, 30.0, "SEO, social media marketing, affiliate marketing. Source: TastyEdits, OutlierKit 2025"),
            ("Education & Tutorials", "education", 15.0, 20.0, 35.0, "Online learning, skill development, certifications. Source: Lenos, AWISEE 2025-2026"),
            ("Health & Wellness", "health", 15.0, 18.0, 28.0, "Fitness, nutrition, mental health, longevity. Source: upGrowth, OutlierKit 2026"),
        ];

        for (name, slug, low, avg, high, notes) in industries {
            self.upsert_industry(NewIndustry {
                name: name.to_string(),
                slug: slug.to_string(),
                video_cpm_low: low,
                video_cpm_avg: avg,
                video_cpm_high: high,
                notes: notes.to_string(),
            });
        }

        info!(
            industries = self.industries.len(),
            multipliers = self.multipliers.len(),
            "Seeded benchmark catalog"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
