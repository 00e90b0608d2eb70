//! Shape/stride descriptor for row-major strided arrays.

use crate::{ArrayError, Result};

/// Compute row-major strides (C default: last index varies fastest).
///
/// Strides that do not fit `isize` saturate; [`Extents::new`] rejects such
/// shapes instead.
pub fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let rank = shape.len();
    let mut strides = vec![1isize; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        let dim = isize::try_from(shape[i + 1]).unwrap_or(isize::MAX);
        strides[i] = strides[i + 1].saturating_mul(dim);
    }
    strides
}

/// Row-major strides, or `None` if one of them overflows `isize`.
///
/// A zero-length axis keeps the element count at 0 but does not bound the
/// strides of the axes before it.
fn checked_row_major_strides(shape: &[usize]) -> Option<Vec<isize>> {
    let rank = shape.len();
    let mut strides = vec![1isize; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        let dim = isize::try_from(shape[i + 1]).ok()?;
        strides[i] = strides[i + 1].checked_mul(dim)?;
    }
    Some(strides)
}

/// Check whether `strides` are the row-major strides of `shape`.
///
/// Axes of extent 0 or 1 are ignored: their stride never contributes to an
/// offset, so any value is compatible with a dense layout.
pub fn is_row_major(shape: &[usize], strides: &[isize]) -> bool {
    if shape.len() != strides.len() {
        return false;
    }
    let mut expected = 1isize;
    for i in (0..shape.len()).rev() {
        if shape[i] <= 1 {
            continue;
        }
        if strides[i] != expected {
            return false;
        }
        expected = expected.saturating_mul(isize::try_from(shape[i]).unwrap_or(isize::MAX));
    }
    true
}

/// Product of `shape`, failing if it is not representable as a buffer length.
pub(crate) fn checked_size(shape: &[usize]) -> Result<usize> {
    let size = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| ArrayError::Shape(format!("element count of {shape:?} overflows")))?;
    if size > isize::MAX as usize {
        return Err(ArrayError::Shape(format!(
            "element count of {shape:?} exceeds isize::MAX"
        )));
    }
    Ok(size)
}

/// Shape, strides, element count and contiguity of an array or view.
///
/// Built once and never mutated; structural operations (reshape, transpose,
/// view) construct a fresh `Extents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extents {
    shape: Vec<usize>,
    strides: Vec<isize>,
    size: usize,
    contiguous: bool,
}

impl Extents {
    /// Row-major extents for a freshly allocated buffer of `shape`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if the element count or a stride
    /// overflows.
    pub fn new(shape: &[usize]) -> Result<Self> {
        let size = checked_size(shape)?;
        let strides = checked_row_major_strides(shape).ok_or_else(|| {
            ArrayError::Shape(format!("strides of {shape:?} do not fit isize"))
        })?;
        Ok(Self {
            shape: shape.to_vec(),
            strides,
            size,
            contiguous: true,
        })
    }

    /// Explicit extents, as used by views.
    ///
    /// Only the rank of `shape` and `strides` is checked; the caller vouches
    /// for `size` and `contiguous`.
    pub fn with_strides(
        shape: &[usize],
        strides: &[isize],
        size: usize,
        contiguous: bool,
    ) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(ArrayError::Shape(format!(
                "shape {shape:?} and strides {strides:?} have different ranks"
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides: strides.to_vec(),
            size,
            contiguous,
        })
    }

    /// Extents of a view: size is the product of `shape` and contiguity is
    /// derived from the strides.
    pub(crate) fn strided(shape: Vec<usize>, strides: Vec<isize>) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        let size = shape.iter().product();
        let contiguous = is_row_major(&shape, &strides);
        Self {
            shape,
            strides,
            size,
            contiguous,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// Extent of `axis`.
    pub fn extent(&self, axis: usize) -> Result<usize> {
        self.shape
            .get(axis)
            .copied()
            .ok_or(ArrayError::InvalidAxis {
                axis,
                rank: self.rank(),
            })
    }

    /// Flat offset of `indices`, relative to the owning array's base offset.
    ///
    /// Exactly `rank` components are expected. Bounds are not checked here.
    #[inline]
    pub fn index(&self, indices: &[usize]) -> isize {
        debug_assert_eq!(indices.len(), self.rank());
        indices
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum()
    }

    /// Reorder axes so that axis `k` of the result is axis `perm[k]` of `self`.
    ///
    /// `perm` must already be a validated permutation of `0..rank`.
    pub(crate) fn permuted(&self, perm: &[usize]) -> Self {
        let shape = perm.iter().map(|&p| self.shape[p]).collect();
        let strides = perm.iter().map(|&p| self.strides[p]).collect();
        Self::strided(shape, strides)
    }
}

/// Check that every offset reachable through `shape`/`strides` from `offset`
/// lies inside a buffer of `len` elements.
pub(crate) fn validate_bounds(
    len: usize,
    shape: &[usize],
    strides: &[isize],
    offset: usize,
) -> Result<()> {
    if shape.len() != strides.len() {
        return Err(ArrayError::Shape(format!(
            "shape {shape:?} and strides {strides:?} have different ranks"
        )));
    }
    // Empty array - no access needed
    if shape.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let overflow = || ArrayError::Shape("offset overflow while validating view".to_string());
    let base = isize::try_from(offset).map_err(|_| overflow())?;
    let mut min_offset = base;
    let mut max_offset = base;
    for (&dim, &stride) in shape.iter().zip(strides) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or_else(overflow)?;
            if end >= 0 {
                max_offset = max_offset.checked_add(end).ok_or_else(overflow)?;
            } else {
                min_offset = min_offset.checked_add(end).ok_or_else(overflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset as usize >= len {
        return Err(ArrayError::Shape(format!(
            "view {shape:?} with strides {strides:?} at offset {offset} exceeds buffer of {len}"
        )));
    }
    Ok(())
}
