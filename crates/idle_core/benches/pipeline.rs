//! Tick pipeline benchmarks for idle_core.
//!
//! Run with: `cargo bench -p idle_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use idle_core::actions::Modifiers;
use idle_core::math::Fixed;
use idle_core::pipeline::{settle, ResourceFlow};
use idle_core::resources::{ResourceAmounts, ResourceKind, ResourceLedger};
use idle_test_utils::fixtures::{developed_economy, solar_economy};

/// Settlement alone, with and without an energy deficit.
pub fn settle_benchmark(c: &mut Criterion) {
    let flow = ResourceFlow::compute(
        &ResourceAmounts::splat(Fixed::ONE),
        &ResourceAmounts::from_pairs(&[
            (ResourceKind::Energy, Fixed::from_num(3)),
            (ResourceKind::Material, Fixed::from_num(2)),
        ]),
        &ResourceAmounts::single(ResourceKind::Energy, Fixed::from_num(8)),
        &Modifiers::default(),
        &ResourceAmounts::ZERO,
    );

    c.bench_function("settle_funded", |b| {
        b.iter_batched(
            || ResourceLedger::with_amounts(ResourceAmounts::splat(Fixed::from_num(1_000))),
            |mut ledger| settle(&mut ledger, black_box(&flow), Fixed::ONE),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("settle_deficit", |b| {
        b.iter_batched(
            ResourceLedger::new,
            |mut ledger| settle(&mut ledger, black_box(&flow), Fixed::ONE),
            BatchSize::SmallInput,
        )
    });
}

/// Whole ticks on small and mid-game economies.
pub fn tick_benchmark(c: &mut Criterion) {
    c.bench_function("tick_solar_10", |b| {
        b.iter_batched(
            || solar_economy(10),
            |mut sim| black_box(sim.tick()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("tick_developed_1000", |b| {
        b.iter_batched(
            developed_economy,
            |mut sim| {
                for _ in 0..1_000 {
                    black_box(sim.tick());
                }
                sim.state_hash()
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, settle_benchmark, tick_benchmark);
criterion_main!(benches);
