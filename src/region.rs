use std::fmt;

use crate::interval::Interval;
use crate::point::Point;

/// An axis-aligned hyperrectangle: one half-open `Interval` per dimension.
///
/// Regions are plain values; the overlap order used to key them in shared
/// collections lives in `crate::order`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Region {
    bounds: Vec<Interval>,
}

impl Region {
    pub fn new(bounds: Vec<Interval>) -> Self {
        Self { bounds }
    }

    /// Builds a region from `(low, high)` pairs without reordering them, so an
    /// inverted pair produces an invalid region rather than a silently fixed one.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            bounds: pairs
                .iter()
                .map(|&(low, high)| Interval::raw(low, high))
                .collect(),
        }
    }

    /// The box `[centre - radius, centre + radius)` in every dimension.
    pub fn around(centre: &Point, radius: f64) -> Self {
        Self {
            bounds: centre
                .iter()
                .map(|&value| Interval::new(value - radius, value + radius))
                .collect(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Interval] {
        &self.bounds
    }

    pub fn interval(&self, dimension: usize) -> &Interval {
        &self.bounds[dimension]
    }

    /// True when every dimension satisfies `low <= high` (NaN fails).
    pub fn is_valid(&self) -> bool {
        self.bounds.iter().all(Interval::is_valid)
    }

    /// True when every bound is a finite number.
    pub fn is_finite(&self) -> bool {
        self.bounds
            .iter()
            .all(|interval| interval.low().is_finite() && interval.high().is_finite())
    }

    /// Product of per-dimension extents. Degenerate dimensions contribute a
    /// factor of 1, so a fixed coordinate does not zero the volume.
    pub fn volume(&self) -> f64 {
        self.bounds
            .iter()
            .filter(|interval| !interval.is_degenerate())
            .map(Interval::width)
            .product()
    }

    /// Clamps both bounds of every dimension into `domain`.
    pub fn clamp_to(&self, domain: &Region) -> Region {
        debug_assert_eq!(self.dimensions(), domain.dimensions());
        Region {
            bounds: self
                .bounds
                .iter()
                .zip(&domain.bounds)
                .map(|(interval, outer)| interval.clamp_to(outer))
                .collect(),
        }
    }

    /// Clamps each coordinate of `point` into the closed hull of this region.
    pub fn clamp_point(&self, point: &Point) -> Point {
        debug_assert_eq!(self.dimensions(), point.dimensions());
        Point::new(
            point
                .iter()
                .zip(&self.bounds)
                .map(|(&value, interval)| value.clamp(interval.low(), interval.high()))
                .collect(),
        )
    }

    /// Half-open containment; agrees with `order::point_region_cmp` returning `Equal`.
    pub fn contains(&self, point: &Point) -> bool {
        point.dimensions() == self.dimensions()
            && self
                .bounds
                .iter()
                .zip(point.iter())
                .all(|(interval, &value)| interval.contains(value))
    }

    pub fn centre(&self) -> Point {
        Point::new(self.bounds.iter().map(Interval::midpoint).collect())
    }

    /// Replaces the interval of one dimension.
    pub fn with_interval(&self, dimension: usize, interval: Interval) -> Region {
        let mut bounds = self.bounds.clone();
        bounds[dimension] = interval;
        Region { bounds }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        for interval in &self.bounds {
            write!(f, " {interval} |")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{point, region};

    #[test]
    fn validity_requires_ordered_bounds() {
        assert!(region(&[(0.0, 1.0), (2.0, 2.0)]).is_valid());
        assert!(!region(&[(0.0, 1.0), (3.0, 2.0)]).is_valid());
        assert!(!region(&[(f64::NAN, 1.0)]).is_valid());
    }

    #[test]
    fn finiteness_checks_every_bound() {
        assert!(region(&[(0.0, 1.0), (2.0, 2.0)]).is_finite());
        assert!(!region(&[(0.0, f64::INFINITY)]).is_finite());
        assert!(!region(&[(0.0, 1.0), (f64::NEG_INFINITY, 0.0)]).is_finite());
    }

    #[test]
    fn volume_treats_degenerate_dimensions_as_unit() {
        assert_eq!(region(&[(0.0, 2.0), (1.0, 4.0)]).volume(), 6.0);
        assert_eq!(region(&[(0.0, 2.0), (5.0, 5.0)]).volume(), 2.0);
    }

    #[test]
    fn clamp_to_domain() {
        let domain = region(&[(0.0, 1.0), (0.0, 1.0)]);
        let clamped = region(&[(-0.5, 0.5), (0.8, 3.0)]).clamp_to(&domain);
        assert_eq!(clamped, region(&[(0.0, 0.5), (0.8, 1.0)]));

        // A region entirely outside the domain collapses onto its face.
        let outside = region(&[(2.0, 3.0), (0.0, 1.0)]).clamp_to(&domain);
        assert_eq!(outside, region(&[(1.0, 1.0), (0.0, 1.0)]));
        assert!(outside.is_valid());
    }

    #[test]
    fn containment_is_half_open() {
        let r = region(&[(0.0, 2.0), (0.0, 2.0)]);
        assert!(r.contains(&point(&[0.0, 1.0])));
        assert!(!r.contains(&point(&[2.0, 1.0])));
        assert!(!r.contains(&point(&[1.0])));

        let fixed = region(&[(0.0, 2.0), (1.0, 1.0)]);
        assert!(fixed.contains(&point(&[0.5, 1.0])));
        assert!(!fixed.contains(&point(&[0.5, 1.5])));
    }

    #[test]
    fn clamp_point_and_centre() {
        let r = region(&[(0.0, 2.0), (-1.0, 1.0)]);
        assert_eq!(r.clamp_point(&point(&[3.0, -4.0])), point(&[2.0, -1.0]));
        assert_eq!(r.centre(), point(&[1.0, 0.0]));
    }

    #[test]
    fn around_builds_symmetric_box() {
        let r = Region::around(&point(&[1.0, 2.0]), 0.5);
        assert_eq!(r, region(&[(0.5, 1.5), (1.5, 2.5)]));
    }
}
