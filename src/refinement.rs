//! Exact partitioning of regions along selected dimensions.

use std::sync::Arc;

use tracing::warn;

use crate::interval::Interval;
use crate::region::Region;
use crate::selection::LargestExtentFirst;
use crate::strategy::{DimensionSelection, RefinementStrategy, RegionPartition};

pub const DEFAULT_DIVISOR: usize = 2;
pub const DEFAULT_SPLIT_DIMENSIONS: usize = 5;

/// Splits each of the top-`split_dimensions` selected dimensions into `divisor`
/// equal pieces and returns the Cartesian product of the pieces.
///
/// Dimensions that are not selected are copied unchanged. Degenerate selected
/// dimensions contribute a single piece. The children are pairwise disjoint, cover
/// the parent exactly, and their volumes sum to the parent's volume up to
/// floating-point rounding.
#[derive(Clone)]
pub struct HierarchicalRefinement {
    selection: Arc<dyn DimensionSelection>,
    divisor: usize,
    split_dimensions: usize,
}

impl HierarchicalRefinement {
    /// `divisor` values below 2 are raised to 2; `split_dimensions` is clamped to
    /// the dimensionality of each refined region.
    pub fn new(
        selection: impl DimensionSelection + 'static,
        divisor: usize,
        split_dimensions: usize,
    ) -> Self {
        Self {
            selection: Arc::new(selection),
            divisor: divisor.max(2),
            split_dimensions,
        }
    }

    pub fn divisor(&self) -> usize {
        self.divisor
    }

    pub fn split_dimensions(&self) -> usize {
        self.split_dimensions
    }

    fn selected_dimensions(&self, region: &Region) -> Vec<usize> {
        let count = self.split_dimensions.min(region.dimensions());
        let mut selected = Vec::with_capacity(count);
        for dimension in self.selection.select(region, count) {
            if dimension >= region.dimensions() {
                warn!(dimension, "dimension selection returned an out-of-range index");
                continue;
            }
            if !selected.contains(&dimension) && selected.len() < count {
                selected.push(dimension);
            }
        }
        selected
    }
}

impl Default for HierarchicalRefinement {
    fn default() -> Self {
        Self::new(LargestExtentFirst, DEFAULT_DIVISOR, DEFAULT_SPLIT_DIMENSIONS)
    }
}

impl RefinementStrategy for HierarchicalRefinement {
    fn refine(&self, region: &Region) -> RegionPartition {
        let mut children = vec![region.clone()];
        for dimension in self.selected_dimensions(region) {
            let pieces: Vec<Interval> = region.interval(dimension).split(self.divisor);
            if pieces.len() <= 1 {
                continue;
            }
            children = children
                .iter()
                .flat_map(|child| {
                    pieces
                        .iter()
                        .map(move |piece| child.with_interval(dimension, *piece))
                })
                .collect();
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::overlaps;
    use crate::test_utils::{point, region};
    use proptest::prelude::*;

    fn assert_exact_partition(parent: &Region, children: &[Region]) {
        let total: f64 = children.iter().map(Region::volume).sum();
        let tolerance = 1e-9 * parent.volume().abs().max(1.0);
        assert!(
            (total - parent.volume()).abs() <= tolerance,
            "children volume {total} != parent volume {}",
            parent.volume()
        );
        for (index, a) in children.iter().enumerate() {
            for b in &children[index + 1..] {
                assert!(!overlaps(a, b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn splits_one_dimension_in_halves() {
        let refinement = HierarchicalRefinement::new(LargestExtentFirst, 2, 1);
        let children = refinement.refine(&region(&[(0.0, 4.0)]));
        assert_eq!(children, vec![region(&[(0.0, 2.0)]), region(&[(2.0, 4.0)])]);
    }

    #[test]
    fn produces_divisor_to_the_k_children() {
        let refinement = HierarchicalRefinement::new(LargestExtentFirst, 3, 2);
        let parent = region(&[(0.0, 3.0), (0.0, 6.0), (0.0, 1.0)]);
        let children = refinement.refine(&parent);
        assert_eq!(children.len(), 9);
        assert_exact_partition(&parent, &children);
        // The unselected dimension is untouched.
        assert!(children.iter().all(|c| c.interval(2) == parent.interval(2)));
    }

    #[test]
    fn degenerate_dimensions_are_not_split() {
        let refinement = HierarchicalRefinement::new(LargestExtentFirst, 2, 2);
        let parent = region(&[(0.0, 2.0), (1.0, 1.0)]);
        let children = refinement.refine(&parent);
        assert_eq!(children.len(), 2);
        assert_exact_partition(&parent, &children);
    }

    #[test]
    fn split_count_is_clamped_and_bad_indices_ignored() {
        let refinement = HierarchicalRefinement::new(
            |_: &Region, _: usize| vec![7usize, 0, 0, 1],
            2,
            8,
        );
        let children = refinement.refine(&region(&[(0.0, 1.0), (0.0, 1.0)]));
        assert_eq!(children.len(), 4);
    }

    #[test]
    fn every_point_lands_in_exactly_one_child() {
        let refinement = HierarchicalRefinement::new(LargestExtentFirst, 2, 2);
        let parent = region(&[(0.0, 1.0), (0.0, 1.0)]);
        let children = refinement.refine(&parent);
        for sample in [
            point(&[0.0, 0.0]),
            point(&[0.5, 0.5]),
            point(&[0.25, 0.75]),
            point(&[0.999, 0.5]),
        ] {
            let owners = children.iter().filter(|c| c.contains(&sample)).count();
            assert_eq!(owners, 1, "{sample} owned by {owners} children");
        }
    }

    proptest! {
        #[test]
        fn partition_is_exact(
            pairs in prop::collection::vec((-100.0f64..100.0, 0.0f64..50.0), 1..5),
            divisor in 2usize..5,
            split in 1usize..4,
        ) {
            let parent = region(
                &pairs
                    .iter()
                    .map(|&(low, width)| (low, low + width))
                    .collect::<Vec<_>>(),
            );
            let children = HierarchicalRefinement::new(LargestExtentFirst, divisor, split)
                .refine(&parent);
            let total: f64 = children.iter().map(Region::volume).sum();
            let tolerance = 1e-9 * parent.volume().abs().max(1.0);
            prop_assert!((total - parent.volume()).abs() <= tolerance);
            for (index, a) in children.iter().enumerate() {
                for b in &children[index + 1..] {
                    prop_assert!(!overlaps(a, b));
                }
            }
        }
    }
}
