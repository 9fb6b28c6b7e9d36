//! Sponsorship-inventory valuation for live-streamed content.
//!
//! Pure computation: a validated input record goes in, a fully derived
//! pricing record comes out. No I/O, no state between calls — every
//! invocation is independent and safe to run from any number of tasks.

pub mod engine;
pub mod multi_brand;
pub mod policy;

pub use engine::{CalculationInput, CalculationResult, EchoedInputs, PricingEngine};
pub use multi_brand::{BrandPlacementRequest, BrandPlacementResult, MultiBrandResult, MultiBrandTotals};
pub use policy::{AudienceModel, PricingPolicy};
