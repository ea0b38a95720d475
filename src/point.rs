use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Sub};

/// A coordinate vector in the input space.
///
/// Points order lexicographically using `f64::total_cmp`, which makes them usable
/// as keys of ordered sets (the witness set is a `BTreeSet<Point>`).
#[derive(Clone, Debug, Default)]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    pub fn zeros(dimensions: usize) -> Self {
        Self {
            coords: vec![0.0; dimensions],
        }
    }

    pub fn dimensions(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<f64> {
        self.coords
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|value| value.is_finite())
    }

    /// Elementwise sign (`-1`, `0` or `1`).
    pub fn sign(&self) -> Self {
        self.map(|value| {
            if value > 0.0 {
                1.0
            } else if value < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Multiplies every coordinate by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|value| value * factor)
    }

    /// Euclidean distance to `other`.
    pub fn l2_distance(&self, other: &Point) -> f64 {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            coords: self.coords.iter().map(|&value| f(value)).collect(),
        }
    }

    fn zip_with(&self, other: &Point, f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "elementwise operation on points of different dimensionality"
        );
        Self {
            coords: self
                .coords
                .iter()
                .zip(&other.coords)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl From<&[f64]> for Point {
    fn from(coords: &[f64]) -> Self {
        Self::new(coords.to_vec())
    }
}

impl Deref for Point {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.coords
    }
}

/// # Panics
///
/// Arithmetic on points panics if the operands differ in dimensionality.
impl Add for &Point {
    type Output = Point;

    fn add(self, other: &Point) -> Point {
        self.zip_with(other, |a, b| a + b)
    }
}

impl Sub for &Point {
    type Output = Point;

    fn sub(self, other: &Point) -> Point {
        self.zip_with(other, |a, b| a - b)
    }
}

/// Elementwise (Hadamard) product. Panics like [`Add`] on mismatched dimensions.
impl Mul for &Point {
    type Output = Point;

    fn mul(self, other: &Point) -> Point {
        self.zip_with(other, |a, b| a * b)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.coords.iter().zip(&other.coords) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.coords.len().cmp(&other.coords.len())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, value) in self.coords.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_elementwise() {
        let a = Point::new(vec![1.0, -2.0, 3.0]);
        let b = Point::new(vec![0.5, 0.5, -1.0]);
        assert_eq!(&a + &b, Point::new(vec![1.5, -1.5, 2.0]));
        assert_eq!(&a - &b, Point::new(vec![0.5, -2.5, 4.0]));
        assert_eq!(&a * &b, Point::new(vec![0.5, -1.0, -3.0]));
        assert_eq!(a.sign(), Point::new(vec![1.0, -1.0, 1.0]));
        assert_eq!(a.abs(), Point::new(vec![1.0, 2.0, 3.0]));
        assert_eq!(a.scale(2.0), Point::new(vec![2.0, -4.0, 6.0]));
    }

    #[test]
    #[should_panic(expected = "different dimensionality")]
    fn arithmetic_rejects_mismatched_dimensions() {
        let _ = &Point::new(vec![1.0, 2.0]) + &Point::new(vec![1.0]);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(Point::new(vec![0.0]).sign(), Point::new(vec![0.0]));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Point::new(vec![1.0, 5.0]);
        let b = Point::new(vec![2.0, 0.0]);
        let c = Point::new(vec![1.0, 6.0]);
        assert!(a < b);
        assert!(a < c);
        assert!(c < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn l2_distance_matches_pythagoras() {
        let a = Point::new(vec![0.0, 0.0]);
        let b = Point::new(vec![3.0, 4.0]);
        assert_eq!(a.l2_distance(&b), 5.0);
    }
}
