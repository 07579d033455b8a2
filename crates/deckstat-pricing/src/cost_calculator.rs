//! Cost calculator module for computing usage costs
//!
//! Costs are derived from token counts and the static [`PricingTable`].
//! Nothing here fails: a missing or unknown model costs `0.0`, so unpriced
//! experimental models never break downstream aggregation.
//!
//! # Examples
//!
//! ```
//! use deckstat_core::types::{CostMode, ModelName, TokenCounts};
//! use deckstat_pricing::CostCalculator;
//!
//! let calculator = CostCalculator::new();
//! let tokens = TokenCounts::new(1000, 500, 0, 0);
//! let model = ModelName::new("claude-sonnet-4-20250514");
//!
//! let cost = calculator.calculate_cost(&tokens, Some(&model));
//! assert!((cost - 0.0105).abs() < 1e-9);
//!
//! // Unknown models are free
//! let unknown = ModelName::new("unknown-model-xyz");
//! assert_eq!(calculator.calculate_cost(&tokens, Some(&unknown)), 0.0);
//! ```

use crate::pricing_table::{ModelPricing, PricingTable};
use deckstat_core::types::{CostMode, ModelName, TokenCounts, UsageEntry};
use tracing::trace;

/// Tokens above this count within one calculation use the tiered rate
pub const TIERED_THRESHOLD: u64 = 200_000;

/// Calculates costs based on token usage and pricing
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator {
    table: &'static PricingTable,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostCalculator {
    /// Calculator backed by the global pricing table
    pub fn new() -> Self {
        Self::with_table(PricingTable::global())
    }

    /// Calculator backed by a specific table
    pub fn with_table(table: &'static PricingTable) -> Self {
        Self { table }
    }

    /// The table prices are read from
    pub fn table(&self) -> &'static PricingTable {
        self.table
    }

    /// Calculate cost for token usage
    ///
    /// Returns `0.0` when the model is absent or not in the table.
    pub fn calculate_cost(&self, tokens: &TokenCounts, model: Option<&ModelName>) -> f64 {
        let Some(model) = model else {
            return 0.0;
        };

        match self.table.lookup(model.as_str()) {
            Some(pricing) => Self::calculate_from_pricing(tokens, pricing),
            None => 0.0,
        }
    }

    /// Calculate cost from pricing data without a table lookup
    pub fn calculate_from_pricing(tokens: &TokenCounts, pricing: &ModelPricing) -> f64 {
        let cost = Self::calculate_tiered_cost(
            tokens.input_tokens,
            pricing.input_cost_per_token,
            pricing.input_cost_per_token_above_200k,
        ) + Self::calculate_tiered_cost(
            tokens.output_tokens,
            pricing.output_cost_per_token,
            pricing.output_cost_per_token_above_200k,
        ) + Self::calculate_tiered_cost(
            tokens.cache_creation_tokens,
            pricing.cache_creation_input_token_cost,
            pricing.cache_creation_input_token_cost_above_200k,
        ) + Self::calculate_tiered_cost(
            tokens.cache_read_tokens,
            pricing.cache_read_input_token_cost,
            pricing.cache_read_input_token_cost_above_200k,
        );

        trace!(
            "Calculated cost: ${:.6} for {} total tokens",
            cost,
            tokens.total()
        );

        cost
    }

    /// Apply the tiered rate to the tokens above [`TIERED_THRESHOLD`]
    ///
    /// At exactly the threshold every token is billed at the base rate.
    pub fn calculate_tiered_cost(
        total_tokens: u64,
        base_price: f64,
        tiered_price: Option<f64>,
    ) -> f64 {
        match tiered_price {
            Some(tiered) if total_tokens > TIERED_THRESHOLD => {
                TIERED_THRESHOLD as f64 * base_price
                    + (total_tokens - TIERED_THRESHOLD) as f64 * tiered
            }
            _ => total_tokens as f64 * base_price,
        }
    }

    /// Cost of a single entry under the given mode
    ///
    /// - `Auto`: the entry's precomputed cost if present, otherwise calculated
    /// - `Calculate`: always calculated from tokens
    /// - `Display`: the precomputed cost, or `0.0` when the entry has none
    pub fn cost_for_entry(&self, entry: &UsageEntry, mode: CostMode) -> f64 {
        match mode {
            CostMode::Auto => entry
                .cost_usd
                .unwrap_or_else(|| self.calculate_cost(&entry.tokens, entry.model.as_ref())),
            CostMode::Calculate => self.calculate_cost(&entry.tokens, entry.model.as_ref()),
            CostMode::Display => entry.cost_usd.unwrap_or(0.0),
        }
    }
}
