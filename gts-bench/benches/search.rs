use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gts_search::{SearchConfig, SearchEngine, SearchStatus};
use gts_task::{builders, GoalCountEvaluator};

fn solve_grid(side: u16, epsilon: f64) -> u64 {
    let cfg = SearchConfig {
        epsilon,
        seed: 42,
        ..SearchConfig::default()
    };
    let mut engine = SearchEngine::new(
        builders::grid(side, side),
        Box::new(GoalCountEvaluator),
        cfg,
    )
    .expect("valid config");
    engine.initialize();
    let mut steps = 0u64;
    while engine.step() == SearchStatus::InProgress {
        steps += 1;
        if steps > 1_000_000 {
            break;
        }
    }
    steps
}

fn bench_solve_grid(c: &mut Criterion) {
    c.bench_function("solve_grid_8_greedy", |b| {
        b.iter(|| black_box(solve_grid(black_box(8), 0.0)))
    });
    c.bench_function("solve_grid_8_explore", |b| {
        b.iter(|| black_box(solve_grid(black_box(8), 0.2)))
    });
}

fn bench_expand_chain(c: &mut Criterion) {
    c.bench_function("solve_chain_256", |b| {
        b.iter(|| {
            let cfg = SearchConfig {
                epsilon: 0.0,
                seed: 7,
                ..SearchConfig::default()
            };
            let mut engine = SearchEngine::new(
                builders::chain(256),
                Box::new(GoalCountEvaluator),
                cfg,
            )
            .expect("valid config");
            engine.initialize();
            while engine.step() == SearchStatus::InProgress {}
            black_box(engine.statistics().expanded)
        })
    });
}

criterion_group!(benches, bench_solve_grid, bench_expand_chain);
criterion_main!(benches);
