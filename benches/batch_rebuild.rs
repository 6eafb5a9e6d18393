//! Benchmarks for the per-frame CPU work: pool advance, spawning and mesh
//! rebuild.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use warchief_fx::mesh::{MeshBatcher, QuadShape, QuadStyle, ViewBasis};
use warchief_fx::pool::{ParticlePool, SlotSearch};
use warchief_fx::{Effect, EffectSet, EffectsConfig};

fn full_pool(capacity: usize, search: SlotSearch) -> ParticlePool {
    let mut pool = ParticlePool::with_search(capacity, search);
    for i in 0..capacity {
        pool.spawn(|p| {
            p.position = Vec3::new(i as f32 * 0.01, 1.0, 0.0);
            p.velocity = Vec3::new(0.3, 1.0, -0.2);
            p.set_life(1.0e6);
        });
    }
    pool
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    let view = ViewBasis::isometric();

    for &count in &[256usize, 4096, 65536] {
        let pool = full_pool(count, SlotSearch::for_capacity(count));

        group.bench_with_input(BenchmarkId::new("billboard", count), &pool, |b, pool| {
            let mut batcher = MeshBatcher::with_capacity(QuadStyle::default(), count);
            b.iter(|| black_box(batcher.rebuild(pool, &view).map(|m| m.quad_count())))
        });

        group.bench_with_input(BenchmarkId::new("streak", count), &pool, |b, pool| {
            let style = QuadStyle {
                shape: QuadShape::Streak { stretch: 0.1 },
                ..QuadStyle::default()
            };
            let mut batcher = MeshBatcher::with_capacity(style, count);
            b.iter(|| black_box(batcher.rebuild(pool, &view).map(|m| m.quad_count())))
        });
    }

    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");

    for &count in &[256usize, 4096, 65536] {
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let mut pool = full_pool(count, SlotSearch::for_capacity(count));
            b.iter(|| black_box(pool.advance(1.0 / 60.0)))
        });
    }

    group.finish();
}

fn bench_spawn_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_into_nearly_full");

    for search in [SlotSearch::LinearScan, SlotSearch::FreeList] {
        group.bench_function(format!("{search:?}"), |b| {
            let mut pool = full_pool(4096, search);
            b.iter(|| {
                pool.kill(4000);
                black_box(pool.spawn(|p| p.set_life(1.0e6)))
            })
        });
    }

    group.finish();
}

fn bench_effect_set(c: &mut Criterion) {
    c.bench_function("effect_set_frame", |b| {
        let mut effects = EffectSet::new(&EffectsConfig::default());
        effects.wind_mut().set_intensity(1.0);
        effects.meteors_mut().set_intensity(1.0);
        effects.mana_sparkle_mut().set_mana_fraction(1.0);
        let view = ViewBasis::isometric();
        for _ in 0..300 {
            effects.update(1.0 / 60.0, &view);
        }
        b.iter(|| {
            effects.update(1.0 / 60.0, &view);
            black_box(effects.effects().iter().map(|e| e.active_count()).sum::<usize>())
        })
    });
}

criterion_group!(
    benches,
    bench_rebuild,
    bench_advance,
    bench_spawn_search,
    bench_effect_set
);
criterion_main!(benches);
