//! Discretization of regions onto a regular grid.
//!
//! The grid is defined by a reference point known to lie on it and a spacing per
//! dimension. Grid coordinate `k` of dimension `i` is `reference[i] + k * spacing[i]`.
//!
//! Both bounds of a non-degenerate interval map to grid indices with the same rule:
//! the smallest index whose computed coordinate is `>= bound`. The interval owns the
//! half-open index range between them. The rule is evaluated on the coordinate the
//! grid actually produces, not on `(bound - reference) / spacing` alone, so every
//! enumerated point satisfies [`Interval::contains`] even when `reference + k *
//! spacing` rounds. Neighbouring regions that share a face split the grid points
//! between them exactly, with no point counted twice or lost.
//!
//! A degenerate interval `[c, c]` owns one grid point if `c` is on the grid and none
//! otherwise.
//!
//! ## Scaling limit
//!
//! Counts are `u64`. A high-dimensional region can hold more grid points than that;
//! `checked_count` reports the overflow as `None` and `count_valid_points`
//! saturates at `u64::MAX`.

use crate::error::SearchError;
use crate::interval::Interval;
use crate::point::Point;
use crate::region::Region;

const MAX_INDEX_CORRECTION: usize = 4;

/// Index range of one dimension: the first grid index and the number of grid points.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisRange {
    first: f64,
    count: u64,
    fixed: Option<f64>,
}

/// A regular grid anchored at a reference point.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    reference: Point,
    spacing: Point,
}

impl Grid {
    /// Builds a grid. Negative spacings are taken by absolute value; zero, NaN or
    /// infinite spacings are rejected.
    pub fn new(reference: Point, spacing: Point) -> Result<Self, SearchError> {
        if reference.dimensions() != spacing.dimensions() {
            return Err(SearchError::DimensionMismatch {
                expected: reference.dimensions(),
                got: spacing.dimensions(),
            });
        }
        if !reference.is_finite() {
            return Err(SearchError::InvalidReference);
        }
        for (dimension, &value) in spacing.iter().enumerate() {
            if !value.is_finite() || value == 0.0 {
                return Err(SearchError::InvalidGranularity {
                    dimension,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self {
            reference,
            spacing: spacing.abs(),
        })
    }

    /// A grid with the same spacing in every dimension.
    pub fn uniform(reference: Point, spacing: f64) -> Result<Self, SearchError> {
        let dimensions = reference.dimensions();
        Self::new(reference, Point::new(vec![spacing; dimensions]))
    }

    pub fn dimensions(&self) -> usize {
        self.reference.dimensions()
    }

    pub fn reference(&self) -> &Point {
        &self.reference
    }

    pub fn spacing(&self) -> &Point {
        &self.spacing
    }

    /// Smallest grid index whose coordinate is `>= value`.
    fn index_of(&self, dimension: usize, value: f64) -> f64 {
        let mut index = ((value - self.reference[dimension]) / self.spacing[dimension]).ceil();
        // The quotient is off by at most one step after rounding; the bound keeps
        // indices beyond 2^53 (where `index + 1.0 == index`) from spinning.
        for _ in 0..MAX_INDEX_CORRECTION {
            if self.coordinate(dimension, index) >= value {
                break;
            }
            index += 1.0;
        }
        for _ in 0..MAX_INDEX_CORRECTION {
            if self.coordinate(dimension, index - 1.0) < value {
                break;
            }
            index -= 1.0;
        }
        index
    }

    fn coordinate(&self, dimension: usize, index: f64) -> f64 {
        self.reference[dimension] + index * self.spacing[dimension]
    }

    fn axis_range(&self, dimension: usize, interval: &Interval) -> Option<AxisRange> {
        let first = self.index_of(dimension, interval.low());
        if interval.is_degenerate() {
            if self.coordinate(dimension, first) != interval.low() {
                return None;
            }
            return Some(AxisRange {
                first,
                count: 1,
                fixed: Some(interval.low()),
            });
        }
        let end = self.index_of(dimension, interval.high());
        if end <= first {
            return None;
        }
        let span = end - first;
        let count = if span >= u64::MAX as f64 {
            u64::MAX
        } else {
            span as u64
        };
        Some(AxisRange {
            first,
            count,
            fixed: None,
        })
    }

    fn axis_ranges(&self, region: &Region) -> Option<Vec<AxisRange>> {
        debug_assert_eq!(region.dimensions(), self.dimensions());
        region
            .bounds()
            .iter()
            .enumerate()
            .map(|(dimension, interval)| self.axis_range(dimension, interval))
            .collect()
    }

    /// The lowest grid point inside `region` in every dimension, or `None` when the
    /// region holds no grid point.
    pub fn find_anchor(&self, region: &Region) -> Option<Point> {
        let ranges = self.axis_ranges(region)?;
        Some(Point::new(
            ranges
                .iter()
                .enumerate()
                .map(|(dimension, range)| {
                    range
                        .fixed
                        .unwrap_or_else(|| self.coordinate(dimension, range.first))
                })
                .collect(),
        ))
    }

    /// Number of grid points in `region`, or `None` if it does not fit in a `u64`.
    pub fn checked_count(&self, region: &Region) -> Option<u64> {
        let Some(ranges) = self.axis_ranges(region) else {
            return Some(0);
        };
        ranges
            .iter()
            .try_fold(1u64, |total, range| total.checked_mul(range.count))
    }

    /// Number of grid points in `region`, saturating at `u64::MAX`.
    pub fn count_valid_points(&self, region: &Region) -> u64 {
        self.checked_count(region).unwrap_or(u64::MAX)
    }

    /// Every grid point of `region`, in a fixed depth-first order (last dimension
    /// varies fastest). The iterator yields exactly `count_valid_points` points.
    pub fn enumerate<'a>(&'a self, region: &Region) -> GridPoints<'a> {
        let ranges = self.axis_ranges(region).unwrap_or_default();
        let exhausted = ranges.is_empty() && region.dimensions() > 0
            || ranges.iter().any(|range| range.count == 0);
        GridPoints {
            grid: self,
            cursors: vec![0; ranges.len()],
            ranges,
            exhausted,
        }
    }

    /// Moves `point` to the nearest grid point in every dimension.
    pub fn snap(&self, point: &Point) -> Point {
        debug_assert_eq!(point.dimensions(), self.dimensions());
        Point::new(
            point
                .iter()
                .enumerate()
                .map(|(dimension, &value)| {
                    let index =
                        ((value - self.reference[dimension]) / self.spacing[dimension]).round();
                    self.coordinate(dimension, index)
                })
                .collect(),
        )
    }
}

/// Iterator over the grid points of a region.
///
/// Keeps one cursor per dimension, so memory is bounded by the dimensionality and
/// not by the number of points.
#[derive(Clone, Debug)]
pub struct GridPoints<'a> {
    grid: &'a Grid,
    ranges: Vec<AxisRange>,
    cursors: Vec<u64>,
    exhausted: bool,
}

impl GridPoints<'_> {
    fn current(&self) -> Point {
        Point::new(
            self.ranges
                .iter()
                .zip(&self.cursors)
                .enumerate()
                .map(|(dimension, (range, &cursor))| {
                    range.fixed.unwrap_or_else(|| {
                        self.grid.coordinate(dimension, range.first + cursor as f64)
                    })
                })
                .collect(),
        )
    }

    fn advance(&mut self) {
        for dimension in (0..self.cursors.len()).rev() {
            self.cursors[dimension] += 1;
            if self.cursors[dimension] < self.ranges[dimension].count {
                return;
            }
            self.cursors[dimension] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for GridPoints<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.exhausted {
            return None;
        }
        let point = self.current();
        self.advance();
        Some(point)
    }
}
