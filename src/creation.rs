//! Array constructors: identity, diagonal and evenly spaced ranges.

use num_traits::{Float, NumCast, One, Zero};

use crate::array::Array;
use crate::storage::try_vec;
use crate::{ArrayError, Result};

/// `n × n` identity matrix.
pub fn eye<T>(n: usize) -> Result<Array<T>>
where
    T: Copy + Zero + One,
{
    Array::from_fn(&[n, n], |i| if i[0] == i[1] { T::one() } else { T::zero() })
}

/// Square matrix with `values` on the main diagonal and zeros elsewhere.
pub fn diagonal<T>(values: &[T]) -> Result<Array<T>>
where
    T: Copy + Zero,
{
    let n = values.len();
    Array::from_fn(&[n, n], |i| {
        if i[0] == i[1] {
            values[i[0]]
        } else {
            T::zero()
        }
    })
}

/// `num` evenly spaced values from `start` to `end`, both included.
///
/// `num == 0` gives an empty array and `num == 1` gives `[start]`.
///
/// # Errors
/// Returns [`ArrayError::Allocation`] if `num` elements cannot be allocated.
pub fn linspace<T: Float>(start: T, end: T, num: usize) -> Result<Array<T>> {
    let mut data = try_vec(num)?;
    match num {
        0 => {}
        1 => data.push(start),
        _ => {
            let intervals = <T as NumCast>::from(num - 1).ok_or_else(|| {
                ArrayError::Shape(format!("{num} points are not representable"))
            })?;
            let step = (end - start) / intervals;
            for i in 0..num - 1 {
                data.push(start + position::<T>(i)? * step);
            }
            data.push(end);
        }
    }
    Array::from_vec(data, &[num])
}

/// Values `start, start + step, …` strictly before `end`.
///
/// A step pointing away from `end` gives an empty array.
///
/// # Errors
/// Returns [`ArrayError::Shape`] if `step` is zero or the element count is
/// not finite.
pub fn arange<T: Float>(start: T, end: T, step: T) -> Result<Array<T>> {
    if step.is_zero() {
        return Err(ArrayError::Shape("arange step cannot be zero".to_string()));
    }
    let span = ((end - start) / step).ceil();
    let num = if span <= T::zero() {
        0
    } else {
        span.to_usize().ok_or_else(|| {
            ArrayError::Shape("arange bounds do not give a finite element count".to_string())
        })?
    };

    let mut data = try_vec(num)?;
    for i in 0..num {
        data.push(start + position::<T>(i)? * step);
    }
    Array::from_vec(data, &[num])
}

fn position<T: Float>(i: usize) -> Result<T> {
    <T as NumCast>::from(i)
        .ok_or_else(|| ArrayError::Shape(format!("position {i} is not representable")))
}
