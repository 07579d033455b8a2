//! Static model pricing data
//!
//! Prices are USD per individual token (3e-6 = $3 per million tokens). The
//! table is built once on first use and never mutated afterwards.
//!
//! # Examples
//!
//! ```
//! use deckstat_pricing::PricingTable;
//!
//! let table = PricingTable::global();
//! let pricing = table.lookup("anthropic/claude-sonnet-4-20250514").unwrap();
//! assert_eq!(pricing.input_cost_per_token, 3e-6);
//! assert!(table.lookup("unknown-model-xyz").is_none());
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Per-model pricing
///
/// Each category has a base price and an optional tiered price that applies
/// to the tokens above the tier threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPricing {
    pub input_cost_per_token: f64,
    pub output_cost_per_token: f64,
    pub cache_creation_input_token_cost: f64,
    pub cache_read_input_token_cost: f64,
    pub input_cost_per_token_above_200k: Option<f64>,
    pub output_cost_per_token_above_200k: Option<f64>,
    pub cache_creation_input_token_cost_above_200k: Option<f64>,
    pub cache_read_input_token_cost_above_200k: Option<f64>,
}

impl ModelPricing {
    /// Pricing with base rates only
    pub const fn flat(input: f64, output: f64, cache_creation: f64, cache_read: f64) -> Self {
        Self {
            input_cost_per_token: input,
            output_cost_per_token: output,
            cache_creation_input_token_cost: cache_creation,
            cache_read_input_token_cost: cache_read,
            input_cost_per_token_above_200k: None,
            output_cost_per_token_above_200k: None,
            cache_creation_input_token_cost_above_200k: None,
            cache_read_input_token_cost_above_200k: None,
        }
    }

    /// Add a tiered input rate
    pub const fn with_tiered_input(mut self, price: f64) -> Self {
        self.input_cost_per_token_above_200k = Some(price);
        self
    }
}

const OPUS_4: ModelPricing = ModelPricing::flat(15e-6, 75e-6, 18.75e-6, 1.5e-6);
const OPUS_4_5: ModelPricing = ModelPricing::flat(5e-6, 25e-6, 6.25e-6, 0.5e-6);
const SONNET: ModelPricing = ModelPricing::flat(3e-6, 15e-6, 3.75e-6, 0.3e-6);
const SONNET_LONG_CONTEXT: ModelPricing = SONNET.with_tiered_input(6e-6);
const HAIKU_3: ModelPricing = ModelPricing::flat(0.25e-6, 1.25e-6, 0.3e-6, 0.03e-6);
const HAIKU_3_5: ModelPricing = ModelPricing::flat(0.8e-6, 4e-6, 1e-6, 0.08e-6);
const HAIKU_4_5: ModelPricing = ModelPricing::flat(1e-6, 5e-6, 1.25e-6, 0.1e-6);

static GLOBAL_TABLE: Lazy<PricingTable> = Lazy::new(|| {
    PricingTable::from_entries([
        ("claude-opus-4-20250514", OPUS_4),
        ("claude-opus-4-1-20250805", OPUS_4),
        ("claude-opus-4-5-20251101", OPUS_4_5),
        ("claude-3-opus-20240229", OPUS_4),
        ("claude-sonnet-4-20250514", SONNET_LONG_CONTEXT),
        ("claude-sonnet-4-5-20250929", SONNET_LONG_CONTEXT),
        ("claude-3-7-sonnet-20250219", SONNET),
        ("claude-3-5-sonnet-20241022", SONNET),
        ("claude-3-5-sonnet-20240620", SONNET),
        ("claude-haiku-4-5-20251001", HAIKU_4_5),
        ("claude-3-5-haiku-20241022", HAIKU_3_5),
        ("claude-3-haiku-20240307", HAIKU_3),
    ])
});

/// Immutable mapping from model name to pricing
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Build a table from `(model, pricing)` pairs
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ModelPricing)>,
        S: Into<String>,
    {
        Self {
            models: entries
                .into_iter()
                .map(|(name, pricing)| (name.into(), pricing))
                .collect(),
        }
    }

    /// The process-wide table of known Claude models
    pub fn global() -> &'static PricingTable {
        &GLOBAL_TABLE
    }

    /// Resolve pricing for a model name
    ///
    /// Tries the name as given, then without any `vendor/` prefix. Unknown
    /// models yield `None`.
    pub fn lookup(&self, model: &str) -> Option<&ModelPricing> {
        if let Some(pricing) = self.models.get(model) {
            return Some(pricing);
        }

        let bare = normalize_model_name(model);
        if bare != model {
            if let Some(pricing) = self.models.get(bare) {
                return Some(pricing);
            }
        }

        tracing::trace!(model, "No pricing for model");
        None
    }

    /// Sorted list of model names with defined pricing
    pub fn supported_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.models.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Strip a provider prefix such as `anthropic/` or `bedrock/anthropic/`
pub fn normalize_model_name(model: &str) -> &str {
    match model.rfind('/') {
        Some(idx) => &model[idx + 1..],
        None => model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let pricing = PricingTable::global()
            .lookup("claude-sonnet-4-20250514")
            .unwrap();
        assert_eq!(pricing.input_cost_per_token, 3e-6);
        assert_eq!(pricing.output_cost_per_token, 15e-6);
        assert_eq!(pricing.cache_creation_input_token_cost, 3.75e-6);
        assert_eq!(pricing.cache_read_input_token_cost, 0.3e-6);
        assert_eq!(pricing.input_cost_per_token_above_200k, Some(6e-6));
        assert_eq!(pricing.output_cost_per_token_above_200k, None);
    }

    #[test]
    fn test_prefixed_lookup() {
        let table = PricingTable::global();
        assert_eq!(
            table.lookup("anthropic/claude-sonnet-4-20250514"),
            table.lookup("claude-sonnet-4-20250514")
        );
        assert!(table.lookup("bedrock/anthropic/claude-opus-4-20250514").is_some());
    }

    #[test]
    fn test_unknown_model() {
        let table = PricingTable::global();
        assert!(table.lookup("unknown-model-xyz").is_none());
        assert!(table.lookup("").is_none());
        assert!(table.lookup("anthropic/").is_none());
    }

    #[test]
    fn test_supported_models_sorted() {
        let models = PricingTable::global().supported_models();
        assert!(!models.is_empty());
        assert!(models.contains(&"claude-sonnet-4-20250514"));
        let mut sorted = models.clone();
        sorted.sort();
        assert_eq!(models, sorted);
    }

    #[test]
    fn test_normalize_model_name() {
        assert_eq!(normalize_model_name("anthropic/claude-3-opus"), "claude-3-opus");
        assert_eq!(normalize_model_name("a/b/c"), "c");
        assert_eq!(normalize_model_name("claude-3-opus"), "claude-3-opus");
    }

    #[test]
    fn test_custom_table() {
        let table = PricingTable::from_entries([("m", ModelPricing::flat(1.0, 2.0, 0.0, 0.0))]);
        assert_eq!(table.len(), 1);
        assert!(table.lookup("vendor/m").is_some());
        assert!(PricingTable::default().is_empty());
    }
}
