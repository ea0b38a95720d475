//! The reference verification strategy: an exhaustive check over grid points.
//!
//! `DiscreteSearch` returning `Safe` is a claim about the grid points of the region
//! only, not about the continuum between them.

use std::sync::Arc;

use tracing::debug;

use crate::grid::Grid;
use crate::point::Point;
use crate::region::Region;
use crate::strategy::{
    AttemptGate, PointSource, SafetyPredicate, VerificationOutcome, VerificationStrategy,
};

impl PointSource for Grid {
    fn points<'a>(&'a self, region: &Region) -> Box<dyn Iterator<Item = Point> + 'a> {
        Box::new(self.enumerate(region))
    }
}

/// Attempts regions holding fewer than `max_points` grid points.
#[derive(Clone, Debug)]
pub struct PointBudget {
    grid: Grid,
    max_points: u64,
}

impl PointBudget {
    pub fn new(grid: Grid, max_points: u64) -> Self {
        Self { grid, max_points }
    }
}

impl AttemptGate for PointBudget {
    fn should_attempt(&self, region: &Region) -> bool {
        self.grid.count_valid_points(region) < self.max_points
    }
}

/// Attempts regions whose volume is below `threshold`.
#[derive(Clone, Copy, Debug)]
pub struct VolumeThreshold {
    threshold: f64,
}

impl VolumeThreshold {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl AttemptGate for VolumeThreshold {
    fn should_attempt(&self, region: &Region) -> bool {
        region.volume() < self.threshold
    }
}

/// Evaluates the oracle on every point of a region, stopping at the first failure.
///
/// Returns `Unknown` when the gate declines the region or when the oracle errors
/// on any point; an oracle error never counts as a pass.
pub struct DiscreteSearch {
    gate: Arc<dyn AttemptGate>,
    source: Arc<dyn PointSource>,
    predicate: Arc<dyn SafetyPredicate>,
}

impl DiscreteSearch {
    pub fn new(
        gate: impl AttemptGate + 'static,
        source: impl PointSource + 'static,
        predicate: impl SafetyPredicate + 'static,
    ) -> Self {
        Self {
            gate: Arc::new(gate),
            source: Arc::new(source),
            predicate: Arc::new(predicate),
        }
    }

    /// Shares a predicate that the scheduler also uses.
    pub fn with_shared_predicate(
        gate: impl AttemptGate + 'static,
        source: impl PointSource + 'static,
        predicate: Arc<dyn SafetyPredicate>,
    ) -> Self {
        Self {
            gate: Arc::new(gate),
            source: Arc::new(source),
            predicate,
        }
    }
}

impl VerificationStrategy for DiscreteSearch {
    fn verify(&self, region: &Region) -> VerificationOutcome {
        if !self.gate.should_attempt(region) {
            return VerificationOutcome::Unknown;
        }
        for point in self.source.points(region) {
            match self.predicate.check(&point) {
                Ok(true) => continue,
                Ok(false) => return VerificationOutcome::Unsafe(point),
                Err(error) => {
                    debug!(%region, %point, %error, "oracle failed during discrete search");
                    return VerificationOutcome::Unknown;
                }
            }
        }
        VerificationOutcome::Safe
    }
}
