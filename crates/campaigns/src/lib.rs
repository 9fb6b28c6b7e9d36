//! Persistence of priced calculations, sold brand slots, and
//! multi-stream campaigns.

pub mod calculations;
pub mod campaigns;

pub use calculations::{AdSlot, CalculationStore, HistoryEntry, StoredCalculation};
pub use campaigns::{Campaign, CampaignDetail, CampaignStore, CampaignStream, CampaignSummary};
