use std::fmt;

use thiserror::Error;

/// One dimension of a region: the half-open extent `[low, high)`.
///
/// `low == high` is legal and denotes the fixed coordinate `low`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    low: f64,
    high: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("low must be <= high and neither may be NaN")]
    InvalidOrder,
}

impl Interval {
    /// Creates an interval, ordering the endpoints so that `low <= high`.
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Self { low: b, high: a }
        } else {
            Self { low: a, high: b }
        }
    }

    /// Creates an interval with explicit endpoints.
    /// Returns an error if `low > high` or either endpoint is NaN.
    pub fn new_checked(low: f64, high: f64) -> Result<Self, IntervalError> {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(IntervalError::InvalidOrder);
        }
        Ok(Self { low, high })
    }

    /// Builds an interval without validation. Used for values that are
    /// checked later through `Region::is_valid`.
    pub(crate) fn raw(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn point(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }

    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }

    pub fn midpoint(&self) -> f64 {
        self.low + (self.high - self.low) / 2.0
    }

    /// Half-open membership; a degenerate interval contains only its coordinate.
    pub fn contains(&self, value: f64) -> bool {
        if self.is_degenerate() {
            return value == self.low;
        }
        self.low <= value && value < self.high
    }

    /// Clamps both endpoints into `outer`.
    pub fn clamp_to(&self, outer: &Interval) -> Self {
        Self {
            low: self.low.clamp(outer.low, outer.high),
            high: self.high.clamp(outer.low, outer.high),
        }
    }

    /// Splits into `parts` consecutive sub-intervals of equal width.
    ///
    /// Interior boundaries are computed once and shared by both neighbours, and the
    /// last piece ends exactly at `high`, so the pieces tile the interval with no
    /// gaps or overlaps. A degenerate interval yields itself.
    pub fn split(&self, parts: usize) -> Vec<Interval> {
        if self.is_degenerate() || parts <= 1 {
            return vec![*self];
        }
        let width = self.width();
        let mut boundaries = Vec::with_capacity(parts + 1);
        boundaries.push(self.low);
        for step in 1..parts {
            let boundary = self.low + width * (step as f64) / (parts as f64);
            boundaries.push(boundary.clamp(self.low, self.high));
        }
        boundaries.push(self.high);

        boundaries
            .windows(2)
            .filter(|pair| pair[0] < pair[1])
            .map(|pair| Interval {
                low: pair[0],
                high: pair[1],
            })
            .collect()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}
