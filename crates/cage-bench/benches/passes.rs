//! Criterion benchmarks for the populate, decouple and evaluate passes.

use std::hint::black_box;

use cage_arena::AgentArena;
use cage_bench::{dense_profile, reference_profile, Profile};
use cage_core::WorkerPool;
use cage_engine::{decouple, populate, BubbleCage};
use cage_grid::Grid;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

/// Same agents in the same slots, so grid handles stay valid.
fn copy_agents(agents: &AgentArena) -> AgentArena {
    let mut copy = AgentArena::with_capacity(agents.len());
    for (_, agent) in agents.iter() {
        copy.spawn_tagged(agent.position, agent.sphere, agent.fingerprint)
            .unwrap();
    }
    copy
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate");
    for threads in [1, 4] {
        let Profile { config, mut agents } = reference_profile(42, Some(threads)).unwrap();
        let mut cage = BubbleCage::new(config).unwrap();
        group.bench_function(format!("reference_10k_t{threads}"), |b| {
            b.iter(|| black_box(cage.update(&mut agents)));
        });
    }
    group.finish();
}

fn bench_decouple(c: &mut Criterion) {
    let mut group = c.benchmark_group("decouple");
    let profiles = [
        ("reference_10k", reference_profile(42, Some(4)).unwrap()),
        ("dense_10k", dense_profile(42, Some(4)).unwrap()),
    ];
    for (name, Profile { config, mut agents }) in profiles {
        let pool = WorkerPool::new(config.resolved_threads_count()).unwrap();
        let mut grid = Grid::new(config.cell_size, config.size, config.bounds).unwrap();
        populate::populate(&mut grid, &mut agents, &pool);
        group.bench_function(name, |b| {
            b.iter_batched(
                || copy_agents(&agents),
                |mut fresh| black_box(decouple::decouple(&grid, &mut fresh, &pool)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let Profile { config, mut agents } = reference_profile(42, Some(4)).unwrap();
    let mut cage = BubbleCage::new(config).unwrap();
    c.bench_function("evaluate_reference_10k", |b| {
        b.iter(|| black_box(cage.evaluate(&mut agents)));
    });
}

criterion_group!(benches, bench_populate, bench_decouple, bench_evaluate);
criterion_main!(benches);
