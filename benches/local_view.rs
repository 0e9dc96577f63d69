//! Local view benchmarks
//!
//! Measures view construction plus segment/food queries at various field
//! densities, and a full simulation tick.
//!
//! Run with: cargo bench --bench local_view

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snake_local_view::config::{FieldConfig, SimulationConfig};
use snake_local_view::game::field::Field;
use snake_local_view::game::local_view::LocalView;
use snake_local_view::game::simulation::Simulation;
use snake_local_view::util::vec2::Vec2;

/// Create a field with `count` food items and `count / 10` bots, randomly placed
fn create_field(count: usize) -> Field {
    let config = FieldConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut field = Field::new(config.clone()).expect("default config is valid");

    for _ in 0..count {
        let position = Vec2::new(rng.gen_range(0.0..config.width), rng.gen_range(0.0..config.height));
        field.add_food(position, 1.0);
    }
    for i in 0..count / 10 {
        let head = Vec2::new(rng.gen_range(0.0..config.width), rng.gen_range(0.0..config.height));
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        field.add_bot(format!("bench-{}", i), head, heading, 20, 4.0, 4.0);
    }
    field
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_view");

    for count in [1_000, 5_000, 20_000] {
        let field = create_field(count);
        // Near the corner so every query crosses both wrapped edges
        let center = Vec2::new(8.0, 8.0);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("food_and_segments", count), &count, |b, _| {
            b.iter(|| {
                let mut view = LocalView::new(&field, center, 120.0).expect("valid radius");
                black_box(view.food().map(|f| f.len()).unwrap_or(0));
                black_box(view.segments().map(|s| s.len()).unwrap_or(0));
            });
        });

        group.bench_with_input(BenchmarkId::new("cached_reads", count), &count, |b, _| {
            let mut view = LocalView::new(&field, center, 120.0).expect("valid radius");
            b.iter(|| {
                black_box(view.food().map(|f| f.len()).unwrap_or(0));
            });
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(30);

    for bots in [32, 128, 512] {
        let config = SimulationConfig {
            initial_bots: bots,
            target_food: bots * 20,
            seed: Some(7),
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config).expect("valid config");
        simulation.populate();

        group.bench_with_input(BenchmarkId::new("tick", bots), &bots, |b, _| {
            b.iter(|| black_box(simulation.step().expect("tick succeeds")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queries, bench_tick);
criterion_main!(benches);
