//! Traversal engine: odometer over outer axes plus segment kernels for the
//! innermost axis.
//!
//! The driver hands each innermost run to a callback as
//! `(offsets, len, inner_strides)`, one offset and one stride per operand.
//! The segment kernels below then specialise on the stride pattern so the
//! common unit-stride and broadcast-scalar runs compile to tight loops over
//! slices.

use std::cell::Cell;

// ============================================================================
// Odometer driver
// ============================================================================

/// Visit every innermost run of a (fused) layout in row-major order.
///
/// `strides` holds one stride vector per operand and `base` the starting
/// offset of each operand in its own buffer. The callback receives the
/// current offsets, the run length (the innermost extent), and the innermost
/// stride of each operand.
///
/// A rank-0 layout produces a single run of length 1. A layout with a zero
/// extent produces no runs.
pub(crate) fn for_each_segment<F>(dims: &[usize], strides: &[Vec<isize>], base: &[isize], mut f: F)
where
    F: FnMut(&[isize], usize, &[isize]),
{
    debug_assert_eq!(strides.len(), base.len());
    if dims.contains(&0) {
        return;
    }
    let rank = dims.len();
    if rank == 0 {
        let zeros = vec![0isize; base.len()];
        f(base, 1, &zeros);
        return;
    }

    let inner = rank - 1;
    let inner_len = dims[inner];
    let inner_strides: Vec<isize> = strides.iter().map(|s| s[inner]).collect();
    let mut offsets = base.to_vec();
    let mut index = vec![0usize; inner];

    loop {
        f(&offsets, inner_len, &inner_strides);

        // Carry through the outer axes, innermost first.
        let mut axis = inner;
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            index[axis] += 1;
            for (offset, s) in offsets.iter_mut().zip(strides) {
                *offset += s[axis];
            }
            if index[axis] < dims[axis] {
                break;
            }
            for (offset, s) in offsets.iter_mut().zip(strides) {
                *offset -= s[axis] * dims[axis] as isize;
            }
            index[axis] = 0;
        }
    }
}

#[inline(always)]
fn pos(base: isize, i: usize, stride: isize) -> usize {
    (base + i as isize * stride) as usize
}

#[inline(always)]
fn run<T>(cells: &[Cell<T>], offset: isize, len: usize) -> &[Cell<T>] {
    let start = offset as usize;
    &cells[start..start + len]
}

// ============================================================================
// Segment kernels
// ============================================================================

/// Append `f(a[i], b[i])` for one run of two operands.
#[inline]
#[allow(clippy::too_many_arguments)]
pub(crate) fn zip_segment<A, B, C, F>(
    out: &mut Vec<C>,
    a: &[Cell<A>],
    a_offset: isize,
    a_stride: isize,
    b: &[Cell<B>],
    b_offset: isize,
    b_stride: isize,
    len: usize,
    f: &mut F,
) where
    A: Copy,
    B: Copy,
    F: FnMut(A, B) -> C,
{
    match (a_stride, b_stride) {
        (1, 1) => out.extend(
            run(a, a_offset, len)
                .iter()
                .zip(run(b, b_offset, len))
                .map(|(x, y)| f(x.get(), y.get())),
        ),
        (1, 0) => {
            let y = b[b_offset as usize].get();
            out.extend(run(a, a_offset, len).iter().map(|x| f(x.get(), y)));
        }
        (0, 1) => {
            let x = a[a_offset as usize].get();
            out.extend(run(b, b_offset, len).iter().map(|y| f(x, y.get())));
        }
        _ => out.extend((0..len).map(|i| {
            f(
                a[pos(a_offset, i, a_stride)].get(),
                b[pos(b_offset, i, b_stride)].get(),
            )
        })),
    }
}

/// Append `f(a[i])` for one run of a single operand.
#[inline]
pub(crate) fn map_segment<A, C, F>(
    out: &mut Vec<C>,
    a: &[Cell<A>],
    offset: isize,
    stride: isize,
    len: usize,
    f: &mut F,
) where
    A: Copy,
    F: FnMut(A) -> C,
{
    if stride == 1 {
        out.extend(run(a, offset, len).iter().map(|x| f(x.get())));
    } else {
        out.extend((0..len).map(|i| f(a[pos(offset, i, stride)].get())));
    }
}

/// `dst[i] = f(dst[i], src[i])` for one run.
#[inline]
#[allow(clippy::too_many_arguments)]
pub(crate) fn update_segment<T, U, F>(
    dst: &[Cell<T>],
    d_offset: isize,
    d_stride: isize,
    src: &[Cell<U>],
    s_offset: isize,
    s_stride: isize,
    len: usize,
    f: &mut F,
) where
    T: Copy,
    U: Copy,
    F: FnMut(T, U) -> T,
{
    match (d_stride, s_stride) {
        (1, 1) => {
            for (d, s) in run(dst, d_offset, len).iter().zip(run(src, s_offset, len)) {
                d.set(f(d.get(), s.get()));
            }
        }
        (1, 0) => {
            let y = src[s_offset as usize].get();
            for d in run(dst, d_offset, len) {
                d.set(f(d.get(), y));
            }
        }
        _ => {
            for i in 0..len {
                let d = &dst[pos(d_offset, i, d_stride)];
                d.set(f(d.get(), src[pos(s_offset, i, s_stride)].get()));
            }
        }
    }
}

/// `dst[i] = f(dst[i])` for one run.
#[inline]
pub(crate) fn apply_segment<T, F>(dst: &[Cell<T>], offset: isize, stride: isize, len: usize, f: &mut F)
where
    T: Copy,
    F: FnMut(T) -> T,
{
    if stride == 1 {
        for d in run(dst, offset, len) {
            d.set(f(d.get()));
        }
    } else {
        for i in 0..len {
            let d = &dst[pos(offset, i, stride)];
            d.set(f(d.get()));
        }
    }
}
