//! Candidate-point strategies used as a cheap pre-filter on refined regions.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;
use crate::point::Point;
use crate::region::Region;
use crate::strategy::AbstractionStrategy;

/// The centre of the region.
#[derive(Clone, Copy, Debug, Default)]
pub struct CentralPoint;

impl AbstractionStrategy for CentralPoint {
    fn candidates(&self, region: &Region) -> Vec<Point> {
        vec![region.centre()]
    }
}

/// `count` points drawn uniformly from the region.
#[derive(Debug)]
pub struct RandomPoints {
    count: usize,
    rng: Mutex<StdRng>,
}

impl RandomPoints {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl AbstractionStrategy for RandomPoints {
    fn candidates(&self, region: &Region) -> Vec<Point> {
        let mut rng = self.rng.lock();
        (0..self.count)
            .map(|_| {
                Point::new(
                    region
                        .bounds()
                        .iter()
                        .map(|interval| {
                            if interval.is_degenerate() {
                                interval.low()
                            } else {
                                rng.gen_range(interval.low()..interval.high())
                            }
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

/// Every grid point of the region. Only sensible for small regions.
impl AbstractionStrategy for Grid {
    fn candidates(&self, region: &Region) -> Vec<Point> {
        self.enumerate(region).collect()
    }
}
