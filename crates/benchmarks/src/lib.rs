//! Industry CPM benchmarks and premium-multiplier catalog.

pub mod store;

pub use store::{BenchmarkStore, BenchmarkSummary, Industry, NewIndustry, PremiumMultiplier};
