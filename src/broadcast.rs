//! Broadcasting engine.
//!
//! Shapes are aligned at their trailing axis (NumPy rule). Each operand is
//! then given a stride vector of the result's rank, with stride 0 on every
//! axis it is broadcast along, so the traversal never materializes the
//! broadcast.
//!
//! Three traversals are used, picked by [`select_strategy`]:
//!
//! - [`Strategy::Scalar`]: one operand holds a single element; the other is
//!   walked once with that value fixed in its argument position.
//! - [`Strategy::Linear`]: both operands are contiguous and already have the
//!   result's element count; one flat zip over the two buffers.
//! - [`Strategy::Strided`]: everything else. Axes are fused where every
//!   operand allows it and the remaining outer axes are walked odometer-style,
//!   handing each innermost run to a segment kernel.
//!
//! All three produce elements in the row-major order of the result shape.

use log::trace;

use crate::array::Array;
use crate::extents::Extents;
use crate::fuse::fuse_axes;
use crate::kernel::{apply_segment, for_each_segment, map_segment, update_segment, zip_segment};
use crate::storage::{try_vec, Storage};
use crate::{ArrayError, Result};

/// Traversal chosen for a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One operand has exactly one element.
    Scalar,
    /// Both operands are contiguous and have the result's size.
    Linear,
    /// General strided walk with axis fusion.
    Strided,
}

// ============================================================================
// Shape rules
// ============================================================================

/// Result shape of broadcasting `lhs` against `rhs`.
///
/// Shapes are aligned at the trailing axis; each aligned pair must be equal or
/// contain a 1, and missing leading axes count as 1. The non-1 side of a pair
/// wins, so a zero-length axis broadcast against 1 stays zero-length.
///
/// # Errors
/// Returns [`ArrayError::Broadcast`] if some aligned pair is incompatible.
///
/// # Example
/// ```rust
/// use strided_array::broadcast_shape;
///
/// assert_eq!(broadcast_shape(&[3, 1], &[1, 4]).unwrap(), vec![3, 4]);
/// assert_eq!(broadcast_shape(&[2, 3, 4], &[4]).unwrap(), vec![2, 3, 4]);
/// assert!(broadcast_shape(&[2, 3], &[4, 3]).is_err());
/// ```
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let rank = lhs.len().max(rhs.len());
    let aligned = |shape: &[usize], k: usize| -> usize {
        let pad = rank - shape.len();
        if k < pad {
            1
        } else {
            shape[k - pad]
        }
    };

    let mut out = Vec::with_capacity(rank);
    for k in 0..rank {
        let (x1, x2) = (aligned(lhs, k), aligned(rhs, k));
        let dim = if x1 == x2 || x2 == 1 {
            x1
        } else if x1 == 1 {
            x2
        } else {
            return Err(ArrayError::Broadcast {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            });
        };
        out.push(dim);
    }
    Ok(out)
}

/// Strides of an operand seen through the broadcast result shape.
///
/// Missing leading axes and axes of extent 1 get stride 0. `shape` must
/// already be known to broadcast to `out_shape`.
pub(crate) fn aligned_strides(shape: &[usize], strides: &[isize], out_shape: &[usize]) -> Vec<isize> {
    debug_assert!(shape.len() <= out_shape.len());
    let pad = out_shape.len() - shape.len();
    (0..out_shape.len())
        .map(|k| {
            if k < pad || shape[k - pad] == 1 {
                0
            } else {
                strides[k - pad]
            }
        })
        .collect()
}

fn choose<A, B>(lhs: &Array<A>, rhs: &Array<B>, out_size: usize) -> Strategy {
    if lhs.size() == 1 || rhs.size() == 1 {
        Strategy::Scalar
    } else if lhs.is_contiguous()
        && rhs.is_contiguous()
        && lhs.size() == out_size
        && rhs.size() == out_size
    {
        Strategy::Linear
    } else {
        Strategy::Strided
    }
}

/// Traversal [`broadcast`] would use for `lhs` and `rhs`.
///
/// # Errors
/// Returns [`ArrayError::Broadcast`] if the shapes are incompatible.
pub fn select_strategy<A, B>(lhs: &Array<A>, rhs: &Array<B>) -> Result<Strategy> {
    let out_shape = broadcast_shape(lhs.shape(), rhs.shape())?;
    Ok(choose(lhs, rhs, out_shape.iter().product()))
}

// ============================================================================
// Single-operand traversal
// ============================================================================

/// Append `f(x)` for every element of `a` in logical row-major order.
pub(crate) fn map_collect<A, C, F>(a: &Array<A>, out: &mut Vec<C>, mut f: F)
where
    A: Copy,
    F: FnMut(A) -> C,
{
    if a.size() == 0 {
        return;
    }
    let base = a.offset() as isize;
    if a.is_contiguous() {
        map_segment(out, a.data(), base, 1, a.size(), &mut f);
        return;
    }
    let layout = fuse_axes(a.shape(), &[a.strides()]);
    for_each_segment(&layout.dims, &layout.strides, &[base], |offsets, len, strides| {
        map_segment(out, a.data(), offsets[0], strides[0], len, &mut f);
    });
}

/// Replace every element `x` of `a` (through its storage) by `f(x)`.
pub(crate) fn update_each<T, F>(a: &Array<T>, mut f: F)
where
    T: Copy,
    F: FnMut(T) -> T,
{
    if a.size() == 0 {
        return;
    }
    let base = a.offset() as isize;
    if a.is_contiguous() {
        apply_segment(a.data(), base, 1, a.size(), &mut f);
        return;
    }
    let layout = fuse_axes(a.shape(), &[a.strides()]);
    for_each_segment(&layout.dims, &layout.strides, &[base], |offsets, len, strides| {
        apply_segment(a.data(), offsets[0], strides[0], len, &mut f);
    });
}

fn collect_into_array<C, G>(shape: &[usize], fill: G) -> Result<Array<C>>
where
    G: FnOnce(&mut Vec<C>, usize),
{
    let extents = Extents::new(shape)?;
    let mut out = try_vec(extents.size())?;
    if extents.size() > 0 {
        fill(&mut out, extents.size());
    }
    debug_assert_eq!(out.len(), extents.size());
    Ok(Array::from_parts(Storage::from_vec(out), extents, 0))
}

// ============================================================================
// Broadcast into a new array
// ============================================================================

/// Combine `lhs` and `rhs` element-wise into a new contiguous array.
///
/// The result has the broadcast shape of the two operands and element type
/// `C`, whatever `f` returns.
///
/// # Errors
/// [`ArrayError::Broadcast`] for incompatible shapes,
/// [`ArrayError::Allocation`] if the result cannot be allocated.
pub fn broadcast<A, B, C, F>(lhs: &Array<A>, rhs: &Array<B>, mut f: F) -> Result<Array<C>>
where
    A: Copy,
    B: Copy,
    F: FnMut(A, B) -> C,
{
    let out_shape = broadcast_shape(lhs.shape(), rhs.shape())?;
    collect_into_array(&out_shape, |out, size| {
        let strategy = choose(lhs, rhs, size);
        trace!(
            "broadcast {:?} x {:?} -> {:?} via {:?}",
            lhs.shape(),
            rhs.shape(),
            out_shape,
            strategy
        );
        match strategy {
            Strategy::Scalar => {
                if lhs.size() == 1 {
                    let x = lhs.first();
                    map_collect(rhs, out, |y| f(x, y));
                } else {
                    let y = rhs.first();
                    map_collect(lhs, out, |x| f(x, y));
                }
            }
            Strategy::Linear => zip_segment(
                out,
                lhs.data(),
                lhs.offset() as isize,
                1,
                rhs.data(),
                rhs.offset() as isize,
                1,
                size,
                &mut f,
            ),
            Strategy::Strided => {
                let ls = aligned_strides(lhs.shape(), lhs.strides(), &out_shape);
                let rs = aligned_strides(rhs.shape(), rhs.strides(), &out_shape);
                let layout = fuse_axes(&out_shape, &[&ls, &rs]);
                trace!("strided walk: fused dims {:?}, strides {:?}", layout.dims, layout.strides);
                let base = [lhs.offset() as isize, rhs.offset() as isize];
                for_each_segment(&layout.dims, &layout.strides, &base, |offsets, len, strides| {
                    zip_segment(
                        out,
                        lhs.data(),
                        offsets[0],
                        strides[0],
                        rhs.data(),
                        offsets[1],
                        strides[1],
                        len,
                        &mut f,
                    );
                });
            }
        }
    })
}

/// `f(scalar, x)` for every element `x` of `rhs`, into a new array.
///
/// # Errors
/// Returns [`ArrayError::Allocation`] if the result cannot be allocated.
pub fn broadcast_scalar_left<A, B, C, F>(scalar: A, rhs: &Array<B>, mut f: F) -> Result<Array<C>>
where
    A: Copy,
    B: Copy,
    F: FnMut(A, B) -> C,
{
    collect_into_array(rhs.shape(), |out, _| map_collect(rhs, out, |y| f(scalar, y)))
}

/// `f(x, scalar)` for every element `x` of `lhs`, into a new array.
///
/// # Errors
/// Returns [`ArrayError::Allocation`] if the result cannot be allocated.
pub fn broadcast_scalar_right<A, B, C, F>(lhs: &Array<A>, scalar: B, mut f: F) -> Result<Array<C>>
where
    A: Copy,
    B: Copy,
    F: FnMut(A, B) -> C,
{
    collect_into_array(lhs.shape(), |out, _| map_collect(lhs, out, |x| f(x, scalar)))
}

/// `f(x)` for every element of `a`, into a new contiguous array.
pub(crate) fn map_new<A, C, F>(a: &Array<A>, f: F) -> Result<Array<C>>
where
    A: Copy,
    F: FnMut(A) -> C,
{
    collect_into_array(a.shape(), |out, _| map_collect(a, out, f))
}

// ============================================================================
// Broadcast in place
// ============================================================================

/// `dst[i] = f(dst[i], src[i])`, with `src` broadcast onto `dst`'s shape.
///
/// Writes go through `dst`'s storage, so every view sharing it observes them.
/// `src` may alias `dst`; elements are then read as the row-major walk over
/// `dst` finds them.
///
/// # Errors
/// Returns [`ArrayError::BroadcastInto`] if `src` has more elements than
/// `dst` or the broadcast result is not `dst`'s shape, and
/// [`ArrayError::Broadcast`] for incompatible shapes. Nothing is written
/// when an error is returned.
pub fn broadcast_in_place<T, U, F>(dst: &Array<T>, src: &Array<U>, mut f: F) -> Result<()>
where
    T: Copy,
    U: Copy,
    F: FnMut(T, U) -> T,
{
    let into_error = || ArrayError::BroadcastInto {
        dst: dst.shape().to_vec(),
        src: src.shape().to_vec(),
    };
    if dst.size() < src.size() {
        return Err(into_error());
    }
    let out_shape = broadcast_shape(dst.shape(), src.shape())?;
    if out_shape != dst.shape() {
        return Err(into_error());
    }
    if dst.size() == 0 {
        return Ok(());
    }

    let strategy = choose(dst, src, dst.size());
    trace!(
        "broadcast in place {:?} <- {:?} via {:?}",
        dst.shape(),
        src.shape(),
        strategy
    );
    match strategy {
        Strategy::Scalar => {
            debug_assert_eq!(src.size(), 1);
            let y = src.first();
            update_each(dst, |x| f(x, y));
        }
        Strategy::Linear => update_segment(
            dst.data(),
            dst.offset() as isize,
            1,
            src.data(),
            src.offset() as isize,
            1,
            dst.size(),
            &mut f,
        ),
        Strategy::Strided => {
            let ss = aligned_strides(src.shape(), src.strides(), dst.shape());
            let layout = fuse_axes(dst.shape(), &[dst.strides(), &ss]);
            trace!("strided walk: fused dims {:?}, strides {:?}", layout.dims, layout.strides);
            let base = [dst.offset() as isize, src.offset() as isize];
            for_each_segment(&layout.dims, &layout.strides, &base, |offsets, len, strides| {
                update_segment(
                    dst.data(),
                    offsets[0],
                    strides[0],
                    src.data(),
                    offsets[1],
                    strides[1],
                    len,
                    &mut f,
                );
            });
        }
    }
    Ok(())
}

/// `dst[i] = f(dst[i], scalar)` for every element of `dst`.
pub fn broadcast_scalar_in_place<T, U, F>(dst: &Array<T>, scalar: U, mut f: F)
where
    T: Copy,
    U: Copy,
    F: FnMut(T, U) -> T,
{
    update_each(dst, |x| f(x, scalar));
}
