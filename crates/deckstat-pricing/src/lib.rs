//! Pricing table and cost calculator for deckstat
//!
//! This crate holds the static per-model price-per-token data and the pure
//! functions that turn token counts into USD costs, including the tiered
//! rate applied above 200k tokens.

pub mod cost_calculator;
pub mod pricing_table;

pub use cost_calculator::{CostCalculator, TIERED_THRESHOLD};
pub use pricing_table::{ModelPricing, PricingTable, normalize_model_name};
