//! Dimension-selection strategies for hierarchical refinement.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::point::Point;
use crate::region::Region;
use crate::strategy::DimensionSelection;

/// Indices of `values` sorted by descending value; ties keep index order.
fn descending_indices(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    indices
}

/// Picks the dimensions with the widest extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestExtentFirst;

impl DimensionSelection for LargestExtentFirst {
    fn select(&self, region: &Region, count: usize) -> Vec<usize> {
        let widths: Vec<f64> = region.bounds().iter().map(|interval| interval.width()).collect();
        let mut indices = descending_indices(&widths);
        indices.truncate(count);
        indices
    }
}

/// Picks dimensions uniformly at random from a seeded generator.
///
/// The generator is shared between workers, so with more than one worker the
/// sequence of choices (and therefore the refinement tree) depends on scheduling.
#[derive(Debug)]
pub struct RandomDimensions {
    rng: Mutex<StdRng>,
}

impl RandomDimensions {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DimensionSelection for RandomDimensions {
    fn select(&self, region: &Region, count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..region.dimensions()).collect();
        indices.shuffle(&mut *self.rng.lock());
        indices.truncate(count);
        indices
    }
}

/// Picks the dimensions whose centre coordinate deviates most from the mean of all
/// centre coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxAverageDeviation;

impl DimensionSelection for MaxAverageDeviation {
    fn select(&self, region: &Region, count: usize) -> Vec<usize> {
        if region.dimensions() == 0 {
            return Vec::new();
        }
        let centre = region.centre();
        let mean = centre.iter().sum::<f64>() / centre.dimensions() as f64;
        let deviations: Vec<f64> = centre.iter().map(|value| (mean - value).abs()).collect();
        let mut indices = descending_indices(&deviations);
        indices.truncate(count);
        indices
    }
}

type Norm = dyn Fn(&Point, &Point) -> f64 + Send + Sync;

/// Picks the dimensions along which the region centre differs most from the
/// nearest average point of another class.
///
/// `averages[i]` is the average input of class `i` and `original_class` is the
/// class the search is trying to keep. The nearest other class is chosen under
/// the caller's `norm`; dimensions are then ranked by absolute difference to
/// that class average. Averages of the wrong dimensionality are ignored, and
/// when no other class remains the widest dimensions are picked instead.
pub struct NearestClassDeviation {
    averages: Vec<Point>,
    norm: Arc<Norm>,
    original_class: usize,
}

impl NearestClassDeviation {
    pub fn new(
        averages: Vec<Point>,
        norm: impl Fn(&Point, &Point) -> f64 + Send + Sync + 'static,
        original_class: usize,
    ) -> Self {
        Self {
            averages,
            norm: Arc::new(norm),
            original_class,
        }
    }

    /// Uses the Euclidean distance between points as the norm.
    pub fn euclidean(averages: Vec<Point>, original_class: usize) -> Self {
        Self::new(averages, Point::l2_distance, original_class)
    }

    pub fn averages(&self) -> &[Point] {
        &self.averages
    }

    pub fn original_class(&self) -> usize {
        self.original_class
    }

    fn nearest_other_class(&self, centre: &Point) -> Option<&Point> {
        self.averages
            .iter()
            .enumerate()
            .filter(|&(class, average)| {
                class != self.original_class && average.dimensions() == centre.dimensions()
            })
            .map(|(_, average)| (average, (self.norm)(average, centre)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(average, _)| average)
    }
}

impl fmt::Debug for NearestClassDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearestClassDeviation")
            .field("averages", &self.averages)
            .field("original_class", &self.original_class)
            .finish_non_exhaustive()
    }
}

impl DimensionSelection for NearestClassDeviation {
    fn select(&self, region: &Region, count: usize) -> Vec<usize> {
        let centre = region.centre();
        let Some(nearest) = self.nearest_other_class(&centre) else {
            return LargestExtentFirst.select(region, count);
        };
        let deviations: Vec<f64> = centre
            .iter()
            .zip(nearest.iter())
            .map(|(value, average)| (value - average).abs())
            .collect();
        let mut indices = descending_indices(&deviations);
        indices.truncate(count);
        indices
    }
}
