//! Element and outer-axis iterators.

use std::cell::Cell;

use crate::array::Array;

/// Elements of an array in logical row-major order.
///
/// Values are read through the shared storage when `next` is called, so a
/// write made mid-iteration through another view is observed.
pub struct Iter<'a, T> {
    data: &'a [Cell<T>],
    shape: &'a [usize],
    strides: &'a [isize],
    index: Vec<usize>,
    pos: isize,
    remaining: usize,
}

impl<'a, T: Copy> Iter<'a, T> {
    pub(crate) fn new(array: &'a Array<T>) -> Self {
        Self {
            data: array.data(),
            shape: array.shape(),
            strides: array.strides(),
            index: vec![0; array.rank()],
            pos: array.offset() as isize,
            remaining: array.size(),
        }
    }
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.data[self.pos as usize].get();
        self.remaining -= 1;

        // Advance indices (row-major order: last index changes fastest)
        for axis in (0..self.shape.len()).rev() {
            self.index[axis] += 1;
            self.pos += self.strides[axis];
            if self.index[axis] < self.shape[axis] {
                break;
            }
            self.pos -= self.strides[axis] * self.shape[axis] as isize;
            self.index[axis] = 0;
        }
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Copy> ExactSizeIterator for Iter<'_, T> {}

/// Views along axis 0: `array.view(&[0])`, `array.view(&[1])`, ...
///
/// Each item shares storage with the iterated array. A rank-0 array yields
/// nothing.
pub struct AxisIter<T> {
    array: Array<T>,
    next: usize,
    end: usize,
}

impl<T> AxisIter<T> {
    pub(crate) fn new(array: Array<T>) -> Self {
        let end = array.shape().first().copied().unwrap_or(0);
        Self {
            array,
            next: 0,
            end,
        }
    }
}

impl<T> Iterator for AxisIter<T> {
    type Item = Array<T>;

    fn next(&mut self) -> Option<Array<T>> {
        if self.next >= self.end {
            return None;
        }
        let item = self.array.view(&[self.next]).ok()?;
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for AxisIter<T> {
    fn next_back(&mut self) -> Option<Array<T>> {
        if self.next >= self.end {
            return None;
        }
        let item = self.array.view(&[self.end - 1]).ok()?;
        self.end -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for AxisIter<T> {}

#[cfg(test)]
mod tests {
    use crate::Array;

    #[test]
    fn test_iter_row_major() {
        let a = Array::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
        let it = a.iter();
        assert_eq!(it.len(), 6);
        assert_eq!(it.collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_iter_transposed() {
        let a = Array::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
        let t = a.transpose().unwrap();
        let values: Vec<i32> = (&t).into_iter().collect();
        assert_eq!(values, vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_iter_rank_zero_and_empty() {
        let s = Array::from_vec(vec![9], &[]).unwrap();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![9]);
        let e = Array::<i32>::zeros(&[3, 0]).unwrap();
        assert_eq!(e.iter().count(), 0);
    }

    #[test]
    fn test_axis_iter() {
        let a = Array::from_vec((0..6).collect::<Vec<i32>>(), &[3, 2]).unwrap();
        let rows: Vec<Vec<i32>> = a.axis_iter().map(|r| r.to_vec()).collect();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);

        let last = a.axis_iter().next_back().unwrap();
        last.set(&[0], 40).unwrap();
        assert_eq!(a.at(&[2, 0]).unwrap(), 40);

        let s = Array::from_vec(vec![1], &[]).unwrap();
        assert_eq!(s.axis_iter().len(), 0);
    }
}
