//! Per-axis slice arguments for [`Array::slice_axis`](crate::Array::slice_axis).

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

/// Types that select positions along one axis.
///
/// Ranges keep the axis, [`Idx`] removes it, and [`StridedRange`] adds a step
/// (negative steps walk the range back to front).
pub trait SliceIndex {
    /// Half-open range of positions, given the axis extent.
    fn to_range(&self, extent: usize) -> Range<usize>;

    /// Step between selected positions.
    fn step(&self) -> isize {
        1
    }

    /// Whether the axis disappears from the result.
    fn reduces_dim(&self) -> bool {
        false
    }
}

impl SliceIndex for RangeFull {
    fn to_range(&self, extent: usize) -> Range<usize> {
        0..extent
    }
}

impl SliceIndex for Range<usize> {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        self.clone()
    }
}

impl SliceIndex for RangeFrom<usize> {
    fn to_range(&self, extent: usize) -> Range<usize> {
        self.start..extent
    }
}

impl SliceIndex for RangeTo<usize> {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        0..self.end
    }
}

impl SliceIndex for RangeInclusive<usize> {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        *self.start()..self.end().saturating_add(1)
    }
}

impl SliceIndex for RangeToInclusive<usize> {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        0..self.end.saturating_add(1)
    }
}

/// A single position; the axis is removed from the result.
#[derive(Debug, Clone, Copy)]
pub struct Idx(pub usize);

impl SliceIndex for Idx {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        self.0..self.0.saturating_add(1)
    }

    fn reduces_dim(&self) -> bool {
        true
    }
}

/// Every `|step|`-th position of `start..end`.
///
/// With a negative step the positions are taken from the back: `end - 1`,
/// `end - 1 - |step|`, and so on down to `start`.
#[derive(Debug, Clone, Copy)]
pub struct StridedRange {
    pub start: usize,
    pub end: usize,
    pub step: isize,
}

impl StridedRange {
    pub fn new(start: usize, end: usize, step: isize) -> Self {
        Self { start, end, step }
    }

    /// The whole axis, back to front.
    pub fn reversed(extent: usize) -> Self {
        Self::new(0, extent, -1)
    }
}

impl SliceIndex for StridedRange {
    fn to_range(&self, _extent: usize) -> Range<usize> {
        self.start..self.end
    }

    fn step(&self) -> isize {
        self.step
    }
}

/// Number of positions selected from `start..end` with `step`.
pub(crate) fn slice_len(range: &Range<usize>, step: isize) -> usize {
    range.end.saturating_sub(range.start).div_ceil(step.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!((..).to_range(5), 0..5);
        assert_eq!((1..3).to_range(5), 1..3);
        assert_eq!((2..).to_range(5), 2..5);
        assert_eq!((..2).to_range(5), 0..2);
        assert_eq!((1..=3).to_range(5), 1..4);
        assert_eq!((..=3).to_range(5), 0..4);
    }

    #[test]
    fn test_idx_reduces() {
        assert!(Idx(2).reduces_dim());
        assert_eq!(Idx(2).to_range(5), 2..3);
        assert!(!(0..2).reduces_dim());
    }

    #[test]
    fn test_slice_len() {
        assert_eq!(slice_len(&(0..6), 1), 6);
        assert_eq!(slice_len(&(0..6), 2), 3);
        assert_eq!(slice_len(&(1..6), 2), 3);
        assert_eq!(slice_len(&(0..6), -4), 2);
        assert_eq!(slice_len(&(3..3), 1), 0);
    }
}
