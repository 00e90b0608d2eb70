//! Axis fusion for strided traversal.
//!
//! Adjacent axes can be iterated as one when, for every operand, stepping
//! past the end of the inner axis lands exactly on the next position of the
//! outer axis. Fusing them shortens the odometer and lengthens the innermost
//! run the kernels see.

/// Fused dimensions and per-operand strides, outer axis first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FusedLayout {
    pub(crate) dims: Vec<usize>,
    pub(crate) strides: Vec<Vec<isize>>,
}

/// Merge adjacent axes of a row-major traversal across all operands.
///
/// `all_strides` holds one stride vector per operand, each of the same rank
/// as `dims`. Axes of extent 1 are dropped. Axis `i` merges into its inner
/// neighbour `j` when `strides[k][i] == dims[j] * strides[k][j]` for every
/// operand `k`; a broadcast axis (stride 0) next to another broadcast axis
/// satisfies this trivially.
///
/// The element visiting order is unchanged: walking the fused layout
/// odometer-style visits the same offsets, in the same sequence, as walking
/// the original one.
pub(crate) fn fuse_axes(dims: &[usize], all_strides: &[&[isize]]) -> FusedLayout {
    debug_assert!(all_strides.iter().all(|s| s.len() == dims.len()));

    // Built inner to outer, reversed at the end.
    let mut fused_dims: Vec<usize> = Vec::with_capacity(dims.len());
    let mut fused_strides: Vec<Vec<isize>> = vec![Vec::with_capacity(dims.len()); all_strides.len()];

    for axis in (0..dims.len()).rev() {
        let dim = dims[axis];
        if dim == 1 {
            continue;
        }
        if let Some(outer) = fused_dims.last_mut() {
            let inner_dim = *outer as isize;
            let mergeable = all_strides
                .iter()
                .zip(&fused_strides)
                .all(|(s, f)| f.last().is_some_and(|&fs| s[axis] == inner_dim * fs));
            if mergeable {
                *outer *= dim;
                continue;
            }
        }
        fused_dims.push(dim);
        for (s, f) in all_strides.iter().zip(fused_strides.iter_mut()) {
            f.push(s[axis]);
        }
    }

    fused_dims.reverse();
    for f in &mut fused_strides {
        f.reverse();
    }
    FusedLayout {
        dims: fused_dims,
        strides: fused_strides,
    }
}
