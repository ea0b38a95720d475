//! Shared helpers for the in-crate test modules.

use crate::grid::Grid;
use crate::point::Point;
use crate::region::Region;

/// Builds a region from `(low, high)` pairs, keeping inverted pairs as given.
///
/// # Examples
/// ```ignore
/// let square = region(&[(0.0, 1.0), (0.0, 1.0)]);
/// let line = region(&[(0.0, 4.0), (2.0, 2.0)]); // degenerate second dimension
/// ```
pub fn region(pairs: &[(f64, f64)]) -> Region {
    Region::from_pairs(pairs)
}

pub fn point(coords: &[f64]) -> Point {
    Point::from(coords)
}

/// Grid with spacing 1 anchored at the origin.
pub fn unit_grid(dimensions: usize) -> Grid {
    Grid::uniform(Point::zeros(dimensions), 1.0).expect("unit grid is valid")
}

/// Predicate failing exactly on the listed points.
pub fn fails_at(witnesses: &[&[f64]]) -> impl Fn(&Point) -> bool + Send + Sync + Clone + 'static {
    let witnesses: Vec<Point> = witnesses.iter().map(|coords| point(coords)).collect();
    move |candidate: &Point| !witnesses.contains(candidate)
}
