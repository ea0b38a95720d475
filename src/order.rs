//! The overlap order over regions and points, and the ordered collections keyed by it.
//!
//! Two regions compare dimension by dimension: if `a`'s extent in dimension `i`
//! lies entirely below `b`'s (`a.high <= b.low`) then `a < b`; entirely above
//! means `a > b`; overlapping extents defer to dimension `i + 1`. Regions that
//! overlap in every dimension compare `Equal`.
//!
//! A point compares against a region with the same rule applied to the
//! half-open extent `[low, high)`, so a point is inside a region exactly when
//! the two compare `Equal`. Two points compare lexicographically.
//!
//! ## Invariant
//!
//! The order is a strict weak ordering only over a set of **pairwise disjoint**
//! regions. `OverlapSet` and `OverlapMap` treat equal-comparing keys as the same
//! key: inserting a region that overlaps a stored one is rejected, and a point
//! lookup returns the unique stored region containing it in `O(log n)`.
//! Debug builds verify disjointness on every insert.
//!
//! Point lookups are exact when the stored regions form a product grid, such as
//! the children of a single refinement. Over arbitrary disjoint boxes (for
//! example `[1, 2) x [0, 1)` next to `[0, 2) x [1, 2)`) the point-to-region
//! comparison can disagree with the region-to-region one, and a lookup may miss.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::interval::Interval;
use crate::point::Point;
use crate::region::Region;

fn interval_cmp(a: &Interval, b: &Interval) -> Ordering {
    match (a.is_degenerate(), b.is_degenerate()) {
        (true, true) => a.low().total_cmp(&b.low()),
        (true, false) => value_interval_cmp(a.low(), b),
        (false, true) => value_interval_cmp(b.low(), a).reverse(),
        (false, false) => {
            if a.high() <= b.low() {
                Ordering::Less
            } else if a.low() >= b.high() {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
    }
}

fn value_interval_cmp(value: f64, interval: &Interval) -> Ordering {
    if value < interval.low() {
        Ordering::Less
    } else if interval.contains(value) {
        Ordering::Equal
    } else {
        Ordering::Greater
    }
}

/// Overlap order between two regions of the same dimensionality.
pub fn region_cmp(a: &Region, b: &Region) -> Ordering {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    for (left, right) in a.bounds().iter().zip(b.bounds()) {
        match interval_cmp(left, right) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

/// Overlap order between a point and a region; `Equal` means the region contains the point.
pub fn point_region_cmp(point: &Point, region: &Region) -> Ordering {
    debug_assert_eq!(point.dimensions(), region.dimensions());
    for (&value, interval) in point.iter().zip(region.bounds()) {
        match value_interval_cmp(value, interval) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

/// True when the two regions share at least one point under the half-open convention.
pub fn overlaps(a: &Region, b: &Region) -> bool {
    a.bounds()
        .iter()
        .zip(b.bounds())
        .all(|(left, right)| interval_cmp(left, right) == Ordering::Equal)
}

/// Key type for overlap-ordered containers.
///
/// Stored keys are always regions; the point variant exists so that a lookup by
/// point can be expressed directly as a container lookup.
#[derive(Clone, Debug)]
pub enum OrderKey {
    Region(Region),
    Point(Point),
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Region(a), Self::Region(b)) => region_cmp(a, b),
            (Self::Point(p), Self::Region(r)) => point_region_cmp(p, r),
            (Self::Region(r), Self::Point(p)) => point_region_cmp(p, r).reverse(),
            (Self::Point(a), Self::Point(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

impl OrderKey {
    fn into_region(self) -> Option<Region> {
        match self {
            Self::Region(region) => Some(region),
            Self::Point(_) => None,
        }
    }

    fn as_region(&self) -> Option<&Region> {
        match self {
            Self::Region(region) => Some(region),
            Self::Point(_) => None,
        }
    }
}

#[cfg(debug_assertions)]
fn debug_check_disjoint<'a>(existing: impl Iterator<Item = &'a OrderKey>, key: &OrderKey) {
    let Some(region) = key.as_region() else {
        return;
    };
    for stored in existing.filter_map(OrderKey::as_region) {
        debug_assert!(
            !overlaps(stored, region),
            "overlap-ordered insert of {region} overlaps stored region {stored}"
        );
    }
}

/// An ordered set of pairwise disjoint regions.
#[derive(Clone, Debug, Default)]
pub struct OverlapSet {
    inner: BTreeSet<OrderKey>,
}

impl OverlapSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Inserts `region`, returning `false` if it compares equal to (overlaps) a stored region.
    pub fn insert(&mut self, region: Region) -> bool {
        let key = OrderKey::Region(region);
        if self.inner.contains(&key) {
            return false;
        }
        #[cfg(debug_assertions)]
        debug_check_disjoint(self.inner.iter(), &key);
        self.inner.insert(key)
    }

    /// Removes and returns the lowest region under the overlap order.
    pub fn pop_first(&mut self) -> Option<Region> {
        self.inner.pop_first().and_then(OrderKey::into_region)
    }

    /// The stored region containing `point`, if any.
    pub fn find_containing(&self, point: &Point) -> Option<&Region> {
        self.inner
            .get(&OrderKey::Point(point.clone()))
            .and_then(OrderKey::as_region)
    }

    /// Removes and returns the stored region containing `point`, if any.
    pub fn take_containing(&mut self, point: &Point) -> Option<Region> {
        self.inner
            .take(&OrderKey::Point(point.clone()))
            .and_then(OrderKey::into_region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.inner.iter().filter_map(OrderKey::as_region)
    }

    pub fn into_regions(self) -> impl Iterator<Item = Region> {
        self.inner.into_iter().filter_map(OrderKey::into_region)
    }
}

impl FromIterator<Region> for OverlapSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut set = Self::new();
        for region in iter {
            set.insert(region);
        }
        set
    }
}

/// An ordered map from pairwise disjoint regions to values.
#[derive(Clone, Debug)]
pub struct OverlapMap<V> {
    inner: BTreeMap<OrderKey, V>,
}

impl<V> Default for OverlapMap<V> {
    fn default() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }
}

impl<V> OverlapMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Inserts `region -> value`. If `region` overlaps a stored region nothing is
    /// changed and the rejected pair is handed back.
    pub fn insert(&mut self, region: Region, value: V) -> Result<(), (Region, V)> {
        let key = OrderKey::Region(region);
        if self.inner.contains_key(&key) {
            return match key {
                OrderKey::Region(region) => Err((region, value)),
                OrderKey::Point(_) => Ok(()),
            };
        }
        #[cfg(debug_assertions)]
        debug_check_disjoint(self.inner.keys(), &key);
        self.inner.insert(key, value);
        Ok(())
    }

    pub fn pop_first(&mut self) -> Option<(Region, V)> {
        let (key, value) = self.inner.pop_first()?;
        key.into_region().map(|region| (region, value))
    }

    pub fn find_containing(&self, point: &Point) -> Option<(&Region, &V)> {
        let (key, value) = self.inner.get_key_value(&OrderKey::Point(point.clone()))?;
        key.as_region().map(|region| (region, value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Region, &V)> {
        self.inner
            .iter()
            .filter_map(|(key, value)| key.as_region().map(|region| (region, value)))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{point, region};
    use proptest::prelude::*;

    #[test]
    fn disjoint_regions_order_by_first_separating_dimension() {
        let left = region(&[(0.0, 1.0), (0.0, 4.0)]);
        let right = region(&[(1.0, 2.0), (0.0, 4.0)]);
        assert_eq!(region_cmp(&left, &right), Ordering::Less);
        assert_eq!(region_cmp(&right, &left), Ordering::Greater);

        let lower = region(&[(0.0, 2.0), (0.0, 1.0)]);
        let upper = region(&[(0.0, 2.0), (1.0, 2.0)]);
        assert_eq!(region_cmp(&lower, &upper), Ordering::Less);
    }

    #[test]
    fn overlapping_regions_compare_equal() {
        let a = region(&[(0.0, 2.0), (0.0, 2.0)]);
        let b = region(&[(1.0, 3.0), (1.0, 3.0)]);
        assert_eq!(region_cmp(&a, &b), Ordering::Equal);
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn touching_faces_do_not_overlap() {
        let a = region(&[(0.0, 1.0)]);
        let b = region(&[(1.0, 2.0)]);
        assert!(!overlaps(&a, &b));
        let fixed = region(&[(1.0, 1.0)]);
        assert!(!overlaps(&a, &fixed));
        assert!(overlaps(&b, &fixed));
        assert!(overlaps(&fixed, &fixed.clone()));
    }

    #[test]
    fn point_compares_equal_exactly_when_contained() {
        let r = region(&[(0.0, 2.0), (0.0, 2.0)]);
        assert_eq!(point_region_cmp(&point(&[1.0, 1.0]), &r), Ordering::Equal);
        assert_eq!(point_region_cmp(&point(&[-1.0, 1.0]), &r), Ordering::Less);
        assert_eq!(point_region_cmp(&point(&[2.0, 1.0]), &r), Ordering::Greater);
        assert_eq!(point_region_cmp(&point(&[1.0, 2.0]), &r), Ordering::Greater);
    }

    #[test]
    fn set_rejects_overlapping_insert() {
        let mut set = OverlapSet::new();
        assert!(set.insert(region(&[(0.0, 1.0)])));
        assert!(set.insert(region(&[(1.0, 2.0)])));
        assert!(!set.insert(region(&[(0.5, 1.5)])));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_lookup_by_point() {
        let set: OverlapSet = [
            region(&[(0.0, 1.0), (0.0, 1.0)]),
            region(&[(0.0, 1.0), (1.0, 2.0)]),
            region(&[(1.0, 2.0), (0.0, 2.0)]),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.find_containing(&point(&[0.5, 1.5])),
            Some(&region(&[(0.0, 1.0), (1.0, 2.0)]))
        );
        assert_eq!(set.find_containing(&point(&[2.5, 0.5])), None);

        let mut set = set;
        let taken = set.take_containing(&point(&[1.5, 0.0]));
        assert_eq!(taken, Some(region(&[(1.0, 2.0), (0.0, 2.0)])));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn pop_first_returns_lowest() {
        let mut set: OverlapSet = [region(&[(2.0, 3.0)]), region(&[(0.0, 1.0)])]
            .into_iter()
            .collect();
        assert_eq!(set.pop_first(), Some(region(&[(0.0, 1.0)])));
        assert_eq!(set.pop_first(), Some(region(&[(2.0, 3.0)])));
        assert_eq!(set.pop_first(), None);
    }

    #[test]
    fn map_hands_back_rejected_pair() {
        let mut map = OverlapMap::new();
        assert!(map.insert(region(&[(0.0, 2.0)]), point(&[1.0])).is_ok());
        assert!(map.insert(region(&[(2.0, 4.0)]), point(&[3.0])).is_ok());
        let rejected = map.insert(region(&[(1.0, 3.0)]), point(&[2.5]));
        assert_eq!(rejected, Err((region(&[(1.0, 3.0)]), point(&[2.5]))));
        assert_eq!(map.len(), 2);
        let (found, witness) = map
            .find_containing(&point(&[3.5]))
            .expect("point lies in the second region");
        assert_eq!(found, &region(&[(2.0, 4.0)]));
        assert_eq!(witness, &point(&[3.0]));
    }

    /// A grid of unit cells, which are pairwise disjoint by construction.
    fn cells(columns: u32, rows: u32) -> Vec<Region> {
        let mut cells = Vec::new();
        for column in 0..columns {
            for row in 0..rows {
                let x = f64::from(column);
                let y = f64::from(row);
                cells.push(region(&[(x, x + 1.0), (y, y + 1.0)]));
            }
        }
        cells
    }

    proptest! {
        #[test]
        fn order_is_strict_weak_on_disjoint_cells(
            columns in 1u32..6,
            rows in 1u32..6,
        ) {
            let cells = cells(columns, rows);
            for a in &cells {
                prop_assert_eq!(region_cmp(a, a), Ordering::Equal);
                for b in &cells {
                    if a != b {
                        prop_assert_ne!(region_cmp(a, b), Ordering::Equal);
                        prop_assert_eq!(region_cmp(a, b), region_cmp(b, a).reverse());
                    }
                    for c in &cells {
                        if region_cmp(a, b) == Ordering::Less && region_cmp(b, c) == Ordering::Less {
                            prop_assert_eq!(region_cmp(a, c), Ordering::Less);
                        }
                    }
                }
            }
        }

        #[test]
        fn point_lookup_agrees_with_linear_scan(
            columns in 1u32..6,
            rows in 1u32..6,
            x in -1.0f64..7.0,
            y in -1.0f64..7.0,
        ) {
            let cells = cells(columns, rows);
            let set: OverlapSet = cells.iter().cloned().collect();
            let sample = point(&[x, y]);
            let brute = cells.iter().find(|cell| cell.contains(&sample));
            prop_assert_eq!(set.find_containing(&sample), brute);
        }
    }
}
