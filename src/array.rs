//! The array container: extents, a shared storage handle and a base offset.

use std::cell::Cell;
use std::fmt;

use log::debug;
use num_traits::{One, Zero};

use crate::broadcast::{map_collect, map_new, update_each};
use crate::extents::{checked_size, is_row_major, row_major_strides, validate_bounds, Extents};
use crate::iter::{AxisIter, Iter};
use crate::literal::NestedLiteral;
use crate::slice::{slice_len, SliceIndex};
use crate::storage::{try_vec, Storage};
use crate::{ArrayError, Result};

/// N-dimensional strided array over shared storage.
///
/// Views (transpose, [`view`](Array::view), [`slice_axis`](Array::slice_axis),
/// zero-copy [`reshape`](Array::reshape)) share the storage of the array they
/// were taken from; writes through any of them are visible through all of
/// them. [`Clone`] is a deep copy into fresh contiguous storage, while
/// [`share`](Array::share) makes another handle on the same elements.
pub struct Array<T> {
    extents: Extents,
    storage: Storage<T>,
    offset: usize,
}

impl<T> Array<T> {
    /// Assemble an array without checks; callers guarantee that every
    /// reachable offset lies inside `storage`.
    pub(crate) fn from_parts(storage: Storage<T>, extents: Extents, offset: usize) -> Self {
        Self {
            extents,
            storage,
            offset,
        }
    }

    /// Wrap `data` as a row-major array of `shape` without copying.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if `data.len()` differs from the element
    /// count of `shape`.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let extents = Extents::new(shape)?;
        if data.len() != extents.size() {
            return Err(ArrayError::Shape(format!(
                "{} elements cannot fill shape {shape:?}",
                data.len()
            )));
        }
        Ok(Self::from_parts(Storage::from_vec(data), extents, 0))
    }

    /// View an existing storage buffer through explicit extents.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if some reachable element lies outside
    /// `storage`, if `extents.size()` is not the product of the shape, or if
    /// the extents claim contiguity their strides do not have.
    pub fn from_raw_parts(storage: Storage<T>, extents: Extents, offset: usize) -> Result<Self> {
        validate_bounds(storage.len(), extents.shape(), extents.strides(), offset)?;
        let size = checked_size(extents.shape())?;
        if extents.size() != size {
            return Err(ArrayError::Shape(format!(
                "extents report {} elements for shape {:?}",
                extents.size(),
                extents.shape()
            )));
        }
        if extents.is_contiguous() && !is_row_major(extents.shape(), extents.strides()) {
            return Err(ArrayError::Shape(format!(
                "strides {:?} are not row-major for shape {:?}",
                extents.strides(),
                extents.shape()
            )));
        }
        Ok(Self::from_parts(storage, extents, offset))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.extents.shape()
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.extents.strides()
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.extents.rank()
    }

    /// Number of elements addressed by this array.
    #[inline]
    pub fn size(&self) -> usize {
        self.extents.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.extents.is_contiguous()
    }

    /// Extent of `axis`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidAxis`] if `axis >= rank`.
    pub fn extent(&self, axis: usize) -> Result<usize> {
        self.extents.extent(axis)
    }

    #[inline]
    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    /// Position of element `(0, …, 0)` in [`data`](Array::data).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The whole shared buffer, including elements this view does not reach.
    ///
    /// Elements are [`Cell`]s, so collaborators may fill or read the buffer
    /// in bulk; writes are seen by every array sharing the storage.
    #[inline]
    pub fn data(&self) -> &[Cell<T>] {
        self.storage.cells()
    }

    #[inline]
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Another handle on the same storage, extents and offset.
    pub fn share(&self) -> Self {
        Self::from_parts(self.storage.clone(), self.extents.clone(), self.offset)
    }

    /// True if both arrays read and write the same buffer.
    pub fn shares_storage_with<U>(&self, other: &Array<U>) -> bool {
        std::ptr::eq(
            self.data().as_ptr() as *const u8,
            other.data().as_ptr() as *const u8,
        ) && !self.data().is_empty()
    }

    /// True if no other array or view holds this storage.
    pub fn is_unique(&self) -> bool {
        self.storage.holders() == 1
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub(crate) fn permuted(&self, perm: &[usize]) -> Self {
        Self::from_parts(self.storage.clone(), self.extents.permuted(perm), self.offset)
    }

    /// Reorder axes: axis `k` of the result is axis `perm[k]` of `self`.
    ///
    /// Zero-copy; the result shares storage with `self`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if `rank < 2` or `perm` is not a
    /// permutation of `0..rank`.
    pub fn transpose_axes(&self, perm: &[usize]) -> Result<Self> {
        let rank = self.rank();
        if rank < 2 {
            return Err(ArrayError::Shape(format!(
                "cannot transpose an array of rank {rank}"
            )));
        }
        if perm.len() != rank {
            return Err(ArrayError::Shape(format!(
                "permutation {perm:?} has length {} but array has rank {rank}",
                perm.len()
            )));
        }
        let mut seen = vec![false; rank];
        for &axis in perm {
            if axis >= rank {
                return Err(ArrayError::Shape(format!(
                    "axis {axis} in permutation {perm:?} exceeds rank {rank}"
                )));
            }
            if seen[axis] {
                return Err(ArrayError::Shape(format!(
                    "axis {axis} repeated in permutation {perm:?}"
                )));
            }
            seen[axis] = true;
        }
        Ok(self.permuted(perm))
    }

    /// Swap the last two axes. Zero-copy.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if `rank < 2`.
    pub fn transpose(&self) -> Result<Self> {
        let rank = self.rank();
        if rank < 2 {
            return Err(ArrayError::Shape(format!(
                "cannot transpose an array of rank {rank}"
            )));
        }
        let mut perm: Vec<usize> = (0..rank).collect();
        perm.swap(rank - 2, rank - 1);
        Ok(self.permuted(&perm))
    }

    /// Fix the leading `indices.len()` axes and view the rest.
    ///
    /// The result has rank `rank - indices.len()` and shares storage with
    /// `self`. An empty `indices` returns a shared handle on the whole array.
    ///
    /// # Errors
    /// Returns [`ArrayError::Index`] if there are more indices than axes or a
    /// component is out of bounds.
    pub fn view(&self, indices: &[usize]) -> Result<Self> {
        let k = indices.len();
        let out_of_bounds = indices
            .iter()
            .zip(self.shape())
            .any(|(&i, &dim)| i >= dim);
        if k > self.rank() || out_of_bounds {
            return Err(self.index_error(indices));
        }
        let shift: isize = indices
            .iter()
            .zip(self.strides())
            .map(|(&i, &s)| i as isize * s)
            .sum();
        let extents = Extents::strided(self.shape()[k..].to_vec(), self.strides()[k..].to_vec());
        Ok(Self::from_parts(
            self.storage.clone(),
            extents,
            (self.offset as isize + shift) as usize,
        ))
    }

    /// Restrict `axis` to the positions selected by `index`.
    ///
    /// Ranges keep the axis, [`Idx`](crate::Idx) removes it, and
    /// [`StridedRange`](crate::StridedRange) steps through it (backwards for
    /// a negative step). Zero-copy.
    ///
    /// # Errors
    /// [`ArrayError::InvalidAxis`] for a bad axis, [`ArrayError::Index`] for
    /// an [`Idx`](crate::Idx) past the end, and [`ArrayError::Shape`] for a
    /// range outside the axis or a zero step.
    pub fn slice_axis<I: SliceIndex>(&self, axis: usize, index: I) -> Result<Self> {
        let extent = self.extent(axis)?;
        let range = index.to_range(extent);
        let step = index.step();
        if index.reduces_dim() && range.start >= extent {
            let mut position = vec![0; self.rank()];
            position[axis] = range.start;
            return Err(self.index_error(&position));
        }
        if step == 0 {
            return Err(ArrayError::Shape("slice step cannot be zero".to_string()));
        }
        if range.start > range.end || range.end > extent {
            return Err(ArrayError::Shape(format!(
                "range {}..{} out of bounds for axis {axis} of extent {extent}",
                range.start, range.end
            )));
        }

        let len = slice_len(&range, step);
        let stride = self.strides()[axis];
        let offset = if len == 0 {
            self.offset
        } else {
            let first = if step > 0 { range.start } else { range.end - 1 };
            (self.offset as isize + first as isize * stride) as usize
        };

        let mut shape = self.shape().to_vec();
        let mut strides = self.strides().to_vec();
        if index.reduces_dim() {
            shape.remove(axis);
            strides.remove(axis);
        } else {
            shape[axis] = len;
            strides[axis] = stride * step;
        }
        Ok(Self::from_parts(
            self.storage.clone(),
            Extents::strided(shape, strides),
            offset,
        ))
    }

    /// Views along axis 0, in order.
    pub fn axis_iter(&self) -> AxisIter<T> {
        AxisIter::new(self.share())
    }

    fn index_error(&self, indices: &[usize]) -> ArrayError {
        ArrayError::Index {
            index: indices.to_vec(),
            shape: self.shape().to_vec(),
        }
    }

    /// Storage position of `indices`, bounds-checked.
    fn position(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.rank()
            || indices.iter().zip(self.shape()).any(|(&i, &dim)| i >= dim)
        {
            return Err(self.index_error(indices));
        }
        Ok((self.offset as isize + self.extents.index(indices)) as usize)
    }
}

impl<T: Copy> Array<T> {
    /// Array of `shape` with every element set to `value`.
    ///
    /// # Errors
    /// [`ArrayError::Shape`] if the element count overflows,
    /// [`ArrayError::Allocation`] if it cannot be allocated.
    pub fn full(shape: &[usize], value: T) -> Result<Self> {
        let extents = Extents::new(shape)?;
        let storage = Storage::filled(extents.size(), value)?;
        Ok(Self::from_parts(storage, extents, 0))
    }

    /// Copy `data` into a new row-major array of `shape`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] unless `data.len()` is exactly the
    /// element count of `shape`.
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        let size = checked_size(shape)?;
        if data.len() != size {
            return Err(ArrayError::Shape(format!(
                "{} elements cannot fill shape {shape:?}",
                data.len()
            )));
        }
        let mut buf = try_vec(size)?;
        buf.extend_from_slice(data);
        Self::from_vec(buf, shape)
    }

    /// Array whose element at each index is `f(index)`, filled in row-major
    /// order.
    pub fn from_fn<F>(shape: &[usize], mut f: F) -> Result<Self>
    where
        F: FnMut(&[usize]) -> T,
    {
        let extents = Extents::new(shape)?;
        let mut data = try_vec(extents.size())?;
        if extents.size() > 0 {
            let mut index = vec![0usize; shape.len()];
            'fill: loop {
                data.push(f(&index));
                for axis in (0..shape.len()).rev() {
                    index[axis] += 1;
                    if index[axis] < shape[axis] {
                        continue 'fill;
                    }
                    index[axis] = 0;
                }
                break;
            }
        }
        Ok(Self::from_parts(Storage::from_vec(data), extents, 0))
    }

    /// Array from a nested literal such as `[[1, 2], [3, 4]]`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if the nesting is jagged.
    pub fn from_nested<L>(literal: &L) -> Result<Self>
    where
        L: NestedLiteral<Elem = T> + ?Sized,
    {
        let mut shape = Vec::new();
        literal.push_shape(&mut shape);
        let mut data = try_vec(checked_size(&shape)?)?;
        literal.flatten_into(&shape, &mut data)?;
        Self::from_vec(data, &shape)
    }

    /// The single element of a size-1 array.
    #[inline]
    pub(crate) fn first(&self) -> T {
        debug_assert!(self.size() >= 1);
        self.data()[self.offset].get()
    }

    /// Element at `indices`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Index`] if the number of indices differs from
    /// the rank or a component is out of bounds.
    pub fn at(&self, indices: &[usize]) -> Result<T> {
        let pos = self.position(indices)?;
        Ok(self.data()[pos].get())
    }

    /// Overwrite the element at `indices`.
    ///
    /// # Errors
    /// Same conditions as [`at`](Array::at).
    pub fn set(&self, indices: &[usize], value: T) -> Result<()> {
        let pos = self.position(indices)?;
        self.data()[pos].set(value);
        Ok(())
    }

    /// Set every element reachable through this array to `value`.
    pub fn fill(&self, value: T) {
        update_each(self, |_| value);
    }

    /// Elements in logical row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.size());
        map_collect(self, &mut out, |x| x);
        out
    }

    /// Elements in logical row-major order, read through the storage.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Same elements under `new_shape`.
    ///
    /// Contiguous arrays are reinterpreted in place and the result shares
    /// storage. Otherwise the elements are first copied, in this array's
    /// logical row-major order, into a fresh contiguous buffer.
    ///
    /// # Errors
    /// Returns [`ArrayError::Shape`] if the element counts differ.
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self> {
        let size = checked_size(new_shape)?;
        if size != self.size() {
            return Err(ArrayError::Shape(format!(
                "cannot reshape {:?} ({} elements) into {new_shape:?} ({size} elements)",
                self.shape(),
                self.size()
            )));
        }
        let extents = Extents::new(new_shape)?;
        if self.is_contiguous() {
            return Ok(Self::from_parts(self.storage.clone(), extents, self.offset));
        }
        debug!(
            "reshape {:?} -> {:?} copies {} elements from a strided view",
            self.shape(),
            new_shape,
            size
        );
        let dense = map_new(self, |x| x)?;
        Ok(Self::from_parts(dense.storage, extents, 0))
    }

    /// `reshape(&[size])`.
    pub fn flatten(&self) -> Result<Self> {
        self.reshape(&[self.size()])
    }

    /// New contiguous array of `f(x)` for every element, same shape.
    ///
    /// # Errors
    /// Returns [`ArrayError::Allocation`] if the result cannot be allocated.
    pub fn apply<U, F>(&self, f: F) -> Result<Array<U>>
    where
        F: FnMut(T) -> U,
    {
        map_new(self, f)
    }

    /// Replace every element `x` by `f(x)`, through the shared storage.
    pub fn apply_in_place<F>(&self, f: F)
    where
        F: FnMut(T) -> T,
    {
        update_each(self, f);
    }
}

impl<T: Copy + Default> Array<T> {
    /// Array of `shape` filled with `T::default()`.
    pub fn new(shape: &[usize]) -> Result<Self> {
        Self::full(shape, T::default())
    }
}

impl<T: Copy + Zero> Array<T> {
    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::full(shape, T::zero())
    }
}

impl<T: Copy + One> Array<T> {
    pub fn ones(shape: &[usize]) -> Result<Self> {
        Self::full(shape, T::one())
    }
}

impl<T: Copy> Clone for Array<T> {
    /// Deep copy into fresh contiguous storage.
    fn clone(&self) -> Self {
        let shape = self.shape().to_vec();
        let strides = row_major_strides(&shape);
        Self::from_parts(
            Storage::from_vec(self.to_vec()),
            Extents::strided(shape, strides),
            0,
        )
    }
}

impl<T: Copy + PartialEq> PartialEq for Array<T> {
    /// Equal shapes and equal elements in logical order; layout is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.iter().eq(other.iter())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.offset)
            .field("data", &self.to_vec())
            .finish()
    }
}

impl<'a, T: Copy> IntoIterator for &'a Array<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
