#![allow(dead_code)]

use arsearch::{Grid, Point, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Set `ARSEARCH_BENCH_VERBOSE=1` to print a one-line summary before timing.
pub fn verbose() -> bool {
    std::env::var_os("ARSEARCH_BENCH_VERBOSE").is_some()
}

pub fn unit_grid(dimensions: usize) -> Grid {
    Grid::uniform(Point::zeros(dimensions), 1.0).expect("unit grid is valid")
}

/// Regions with random offsets and widths in `[min_width, max_width)`.
pub fn random_regions(
    seed: u64,
    count: usize,
    dimensions: usize,
    min_width: f64,
    max_width: f64,
) -> Vec<Region> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let pairs: Vec<(f64, f64)> = (0..dimensions)
                .map(|_| {
                    let low = rng.gen_range(-100.0..100.0);
                    (low, low + rng.gen_range(min_width..max_width))
                })
                .collect();
            Region::from_pairs(&pairs)
        })
        .collect()
}

/// Points failing the predicate, drawn on the unit grid inside `[0, extent)^d`.
pub fn random_witnesses(seed: u64, count: usize, dimensions: usize, extent: u32) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Point::new(
                (0..dimensions)
                    .map(|_| f64::from(rng.gen_range(0..extent)))
                    .collect(),
            )
        })
        .collect()
}
