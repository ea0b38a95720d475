mod common;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use arsearch::{
    DiscreteSearch, HierarchicalRefinement, Infallible, LargestExtentFirst, Point, PointBudget,
    Region, Scheduler, SearchConfig,
};
use common::{random_witnesses, unit_grid, verbose};

const DIMENSIONS: usize = 3;
const EXTENT: u32 = 32;
const WITNESSES: usize = 12;

fn run_search(workers: usize, witnesses: &[Point]) -> usize {
    let grid = unit_grid(DIMENSIONS);
    let failing = witnesses.to_vec();
    let predicate = move |p: &Point| !failing.contains(p);
    let domain = Region::from_pairs(&[(0.0, f64::from(EXTENT)); DIMENSIONS]);
    let scheduler = Scheduler::builder(domain, grid.clone())
        .predicate_fn(predicate.clone())
        .verification(DiscreteSearch::new(
            PointBudget::new(grid.clone(), 64),
            grid,
            Infallible(predicate),
        ))
        .refinement(HierarchicalRefinement::new(LargestExtentFirst, 2, DIMENSIONS))
        .config(
            SearchConfig::default()
                .with_workers(workers)
                .with_status_interval(0),
        )
        .build()
        .expect("valid configuration");
    scheduler
        .search()
        .expect("search should succeed")
        .witnesses
        .len()
}

fn bench_search(c: &mut Criterion) {
    let witnesses = random_witnesses(3, WITNESSES, DIMENSIONS, EXTENT);

    if verbose() {
        eprintln!("[search] witnesses found: {}", run_search(1, &witnesses));
    }

    let mut group = c.benchmark_group("search");
    for workers in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &n| {
            b.iter(|| black_box(run_search(n, &witnesses)))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_search
}
criterion_main!(benches);
