//! Reductions over whole arrays and along one axis.

use std::ops::Add;

use num_traits::Zero;

use crate::array::Array;
use crate::broadcast::broadcast_in_place;
use crate::{ArrayError, Result};

/// Fold every element of `a`, in logical row-major order, into `init`.
pub fn reduce<T, U, F>(a: &Array<T>, init: U, f: F) -> U
where
    T: Copy,
    F: FnMut(U, T) -> U,
{
    a.iter().fold(init, f)
}

/// Sum of all elements; zero for an empty array.
pub fn sum<T>(a: &Array<T>) -> T
where
    T: Copy + Zero,
{
    reduce(a, T::zero(), |acc, x| acc + x)
}

/// Sum along `axis`, removing it from the shape.
///
/// The axis is moved to the front of a zero-copy view, and each slice along
/// it is accumulated into the result with [`broadcast_in_place`]. A rank-1
/// input gives a rank-0 result; a zero-length axis gives zeros.
///
/// # Errors
/// Returns [`ArrayError::InvalidAxis`] if `axis >= rank`.
pub fn sum_axis<T>(a: &Array<T>, axis: usize) -> Result<Array<T>>
where
    T: Copy + Zero + Add<Output = T>,
{
    let rank = a.rank();
    if axis >= rank {
        return Err(ArrayError::InvalidAxis { axis, rank });
    }
    let perm: Vec<usize> = std::iter::once(axis)
        .chain((0..rank).filter(|&k| k != axis))
        .collect();
    let moved = a.permuted(&perm);

    let acc = Array::zeros(&moved.shape()[1..])?;
    for slice in moved.axis_iter() {
        broadcast_in_place(&acc, &slice, |x, y| x + y)?;
    }
    Ok(acc)
}

fn first_or_empty<T: Copy>(a: &Array<T>, what: &str) -> Result<T> {
    if a.is_empty() {
        return Err(ArrayError::Shape(format!(
            "cannot find the {what} of an empty array"
        )));
    }
    Ok(a.first())
}

/// Smallest element.
///
/// # Errors
/// Returns [`ArrayError::Shape`] for an empty array.
pub fn min<T>(a: &Array<T>) -> Result<T>
where
    T: Copy + PartialOrd,
{
    let first = first_or_empty(a, "minimum")?;
    Ok(reduce(a, first, |m, x| if x < m { x } else { m }))
}

/// Largest element.
///
/// # Errors
/// Returns [`ArrayError::Shape`] for an empty array.
pub fn max<T>(a: &Array<T>) -> Result<T>
where
    T: Copy + PartialOrd,
{
    let first = first_or_empty(a, "maximum")?;
    Ok(reduce(a, first, |m, x| if x > m { x } else { m }))
}

/// `(min, max)` in a single pass.
///
/// # Errors
/// Returns [`ArrayError::Shape`] for an empty array.
pub fn minmax<T>(a: &Array<T>) -> Result<(T, T)>
where
    T: Copy + PartialOrd,
{
    let first = first_or_empty(a, "minimum and maximum")?;
    Ok(reduce(a, (first, first), |(lo, hi), x| {
        if x < lo {
            (x, hi)
        } else if x > hi {
            (lo, x)
        } else {
            (lo, hi)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Array<i32> {
        Array::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap()
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&sample()), 21);
        assert_eq!(sum(&Array::<f64>::zeros(&[0]).unwrap()), 0.0);
    }

    #[test]
    fn test_sum_axis() {
        let a = sample();
        assert_eq!(sum_axis(&a, 0).unwrap().to_vec(), vec![5, 7, 9]);
        let rows = sum_axis(&a, 1).unwrap();
        assert_eq!(rows.shape(), &[2]);
        assert_eq!(rows.to_vec(), vec![6, 15]);
        assert_eq!(
            sum_axis(&a, 2).unwrap_err(),
            ArrayError::InvalidAxis { axis: 2, rank: 2 }
        );
    }

    #[test]
    fn test_sum_axis_rank3_keeps_axis_order() {
        let a = Array::from_fn(&[2, 3, 4], |i| (i[0] * 100 + i[1] * 10 + i[2]) as i64).unwrap();
        let s = sum_axis(&a, 1).unwrap();
        assert_eq!(s.shape(), &[2, 4]);
        for i in 0..2 {
            for k in 0..4 {
                let expected: i64 = (0..3).map(|j| (i * 100 + j * 10 + k) as i64).sum();
                assert_eq!(s.at(&[i, k]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_sum_axis_edge_shapes() {
        let v = Array::from_vec(vec![1.5, 2.5], &[2]).unwrap();
        let s = sum_axis(&v, 0).unwrap();
        assert_eq!(s.rank(), 0);
        assert_relative_eq!(s.at(&[]).unwrap(), 4.0);

        let e = Array::<i32>::zeros(&[0, 3]).unwrap();
        assert_eq!(sum_axis(&e, 0).unwrap().to_vec(), vec![0, 0, 0]);
    }

    #[test]
    fn test_sum_axis_of_view() {
        let a = sample();
        let t = a.transpose().unwrap();
        assert_eq!(sum_axis(&t, 0).unwrap().to_vec(), vec![6, 15]);
    }

    #[test]
    fn test_min_max() {
        let a = Array::from_vec(vec![3.0, -1.0, 7.5, 2.0], &[2, 2]).unwrap();
        assert_eq!(min(&a).unwrap(), -1.0);
        assert_eq!(max(&a).unwrap(), 7.5);
        assert_eq!(minmax(&a).unwrap(), (-1.0, 7.5));

        let e = Array::<f64>::zeros(&[2, 0]).unwrap();
        assert!(matches!(min(&e), Err(ArrayError::Shape(_))));
        assert!(matches!(minmax(&e), Err(ArrayError::Shape(_))));
    }

    #[test]
    fn test_reduce_custom() {
        let a = sample();
        let product = reduce(&a, 1i64, |acc, x| acc * x as i64);
        assert_eq!(product, 720);
    }
}
