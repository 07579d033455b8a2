use criterion::{Criterion, criterion_group, criterion_main};
use deckstat_core::types::{CostMode, ISOTimestamp, ModelName, SessionId, TokenCounts, UsageEntry};
use deckstat_pricing::{CostCalculator, ModelPricing, PricingTable};
use std::hint::black_box;

fn create_test_pricing() -> ModelPricing {
    ModelPricing::flat(3e-6, 15e-6, 3.75e-6, 0.3e-6).with_tiered_input(6e-6)
}

fn benchmark_cost_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_calculation");
    let pricing = create_test_pricing();

    group.bench_function("calculate_small_tokens", |b| {
        let tokens = TokenCounts::new(100, 50, 10, 5);
        b.iter(|| CostCalculator::calculate_from_pricing(black_box(&tokens), black_box(&pricing)));
    });

    group.bench_function("calculate_tiered_tokens", |b| {
        let tokens = TokenCounts::new(1_000_000, 500_000, 100_000, 50_000);
        b.iter(|| CostCalculator::calculate_from_pricing(black_box(&tokens), black_box(&pricing)));
    });

    group.finish();
}

fn benchmark_model_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_lookup");
    let table = PricingTable::global();

    group.bench_function("exact", |b| {
        b.iter(|| table.lookup(black_box("claude-sonnet-4-20250514")));
    });

    group.bench_function("provider_prefixed", |b| {
        b.iter(|| table.lookup(black_box("anthropic/claude-sonnet-4-20250514")));
    });

    group.bench_function("unknown", |b| {
        b.iter(|| table.lookup(black_box("gpt-4o")));
    });

    group.finish();
}

fn benchmark_cost_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_modes");
    let calculator = CostCalculator::new();
    let entry = UsageEntry {
        timestamp: ISOTimestamp::new(chrono::Utc::now()),
        tokens: TokenCounts::new(10_000, 5_000, 1_000, 500),
        cost_usd: Some(0.25),
        model: Some(ModelName::new("claude-opus-4-20250514")),
        session_id: SessionId::new("bench"),
        project_path: "/bench".to_string(),
        version: None,
    };

    for mode in [CostMode::Auto, CostMode::Calculate, CostMode::Display] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| calculator.cost_for_entry(black_box(&entry), mode));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_cost_calculation,
    benchmark_model_lookup,
    benchmark_cost_modes
);
criterion_main!(benches);
