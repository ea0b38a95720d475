//! Pluggable strategy contracts consumed by the scheduler.
//!
//! Every trait has a blanket implementation for the matching closure type, so a
//! caller can pass `|region: &Region| ...` wherever a strategy is expected.
//! All strategies must be `Send + Sync`: workers call them concurrently and
//! without holding any collection lock.

use crate::error::OracleError;
use crate::point::Point;
use crate::region::Region;

/// Result of checking a single region.
#[derive(Clone, Debug, PartialEq)]
pub enum VerificationOutcome {
    /// Every point of the region satisfies the safety predicate.
    Safe,
    /// The region contains this unsafe point.
    Unsafe(Point),
    /// The check declined or could not decide; the region will be refined.
    Unknown,
}

/// Sub-regions produced by refining a region.
///
/// A well-behaved refinement returns pairwise disjoint children whose union is the
/// parent and whose volumes sum to the parent's volume.
pub type RegionPartition = Vec<Region>;

/// Point-level safety check backed by the external oracle.
///
/// `Ok(true)` means safe, `Ok(false)` means the point is a witness, and an error
/// means the oracle could not classify the point. Errors are handled fail-closed.
pub trait SafetyPredicate: Send + Sync {
    fn check(&self, point: &Point) -> Result<bool, OracleError>;
}

impl<F> SafetyPredicate for F
where
    F: Fn(&Point) -> Result<bool, OracleError> + Send + Sync,
{
    fn check(&self, point: &Point) -> Result<bool, OracleError> {
        self(point)
    }
}

/// Wraps an infallible predicate.
pub struct Infallible<F>(pub F);

impl<F> SafetyPredicate for Infallible<F>
where
    F: Fn(&Point) -> bool + Send + Sync,
{
    fn check(&self, point: &Point) -> Result<bool, OracleError> {
        Ok((self.0)(point))
    }
}

/// Region-level check.
pub trait VerificationStrategy: Send + Sync {
    fn verify(&self, region: &Region) -> VerificationOutcome;
}

impl<F> VerificationStrategy for F
where
    F: Fn(&Region) -> VerificationOutcome + Send + Sync,
{
    fn verify(&self, region: &Region) -> VerificationOutcome {
        self(region)
    }
}

/// Produces a small set of candidate points for a region. May return nothing.
pub trait AbstractionStrategy: Send + Sync {
    fn candidates(&self, region: &Region) -> Vec<Point>;
}

impl<F> AbstractionStrategy for F
where
    F: Fn(&Region) -> Vec<Point> + Send + Sync,
{
    fn candidates(&self, region: &Region) -> Vec<Point> {
        self(region)
    }
}

/// Chooses up to `count` dimensions to subdivide, most preferred first.
pub trait DimensionSelection: Send + Sync {
    fn select(&self, region: &Region, count: usize) -> Vec<usize>;
}

impl<F> DimensionSelection for F
where
    F: Fn(&Region, usize) -> Vec<usize> + Send + Sync,
{
    fn select(&self, region: &Region, count: usize) -> Vec<usize> {
        self(region, count)
    }
}

/// Splits a region into a partition.
pub trait RefinementStrategy: Send + Sync {
    fn refine(&self, region: &Region) -> RegionPartition;
}

impl<F> RefinementStrategy for F
where
    F: Fn(&Region) -> RegionPartition + Send + Sync,
{
    fn refine(&self, region: &Region) -> RegionPartition {
        self(region)
    }
}

/// Decides whether an expensive check is worth attempting on a region.
pub trait AttemptGate: Send + Sync {
    fn should_attempt(&self, region: &Region) -> bool;
}

impl<F> AttemptGate for F
where
    F: Fn(&Region) -> bool + Send + Sync,
{
    fn should_attempt(&self, region: &Region) -> bool {
        self(region)
    }
}

/// Generates the points a verifier evaluates, in a deterministic order.
pub trait PointSource: Send + Sync {
    fn points<'a>(&'a self, region: &Region) -> Box<dyn Iterator<Item = Point> + 'a>;
}
