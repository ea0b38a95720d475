#![warn(
    clippy::shadow_reuse,
    clippy::shadow_same,
    clippy::shadow_unrelated,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

//! Abstraction-refinement search for unsafe points in axis-aligned regions.
//!
//! A [`Scheduler`] repeatedly classifies regions of an input space with a
//! pluggable [`VerificationStrategy`], refines the ones it cannot decide with a
//! [`RefinementStrategy`], and checks cheap candidate points from an
//! [`AbstractionStrategy`] against the [`SafetyPredicate`]. Regions proven safe
//! end up in the resolved set; unsafe points are collected as witnesses.
//!
//! All "safe" claims made by [`DiscreteSearch`] are relative to a [`Grid`]: a
//! region is safe when every grid point inside it satisfies the predicate.
//!
//! ```ignore
//! let grid = Grid::uniform(Point::zeros(2), 0.25)?;
//! let predicate = |p: &Point| p.l2_distance(&Point::zeros(2)) > 0.5;
//! let scheduler = Scheduler::builder(Region::from_pairs(&[(-1.0, 1.0); 2]), grid.clone())
//!     .predicate_fn(predicate)
//!     .verification(DiscreteSearch::new(
//!         PointBudget::new(grid.clone(), 64),
//!         grid,
//!         Infallible(predicate),
//!     ))
//!     .build()?;
//! let summary = scheduler.search()?;
//! ```

mod abstraction;
mod concurrency;
mod config;
mod error;
mod grid;
mod interval;
mod order;
mod point;
mod refinement;
mod region;
mod scheduler;
mod selection;
mod strategy;
mod verification;

#[cfg(test)]
mod test_utils;

pub use abstraction::{CentralPoint, RandomPoints};
pub use config::{DEFAULT_IDLE_BACKOFF, DEFAULT_STATUS_INTERVAL, SearchConfig};
pub use error::{OracleError, SearchError};
pub use grid::{Grid, GridPoints};
pub use interval::{Interval, IntervalError};
pub use order::{OrderKey, OverlapMap, OverlapSet, overlaps, point_region_cmp, region_cmp};
pub use point::Point;
pub use refinement::{DEFAULT_DIVISOR, DEFAULT_SPLIT_DIMENSIONS, HierarchicalRefinement};
pub use region::Region;
pub use scheduler::{Scheduler, SchedulerBuilder, SearchStats, SearchSummary};
pub use selection::{
    LargestExtentFirst, MaxAverageDeviation, NearestClassDeviation, RandomDimensions,
};
pub use strategy::{
    AbstractionStrategy, AttemptGate, DimensionSelection, Infallible, PointSource,
    RefinementStrategy, RegionPartition, SafetyPredicate, VerificationOutcome,
    VerificationStrategy,
};
pub use verification::{DiscreteSearch, PointBudget, VolumeThreshold};
