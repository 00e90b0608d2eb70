//! Shared element buffer behind arrays and their views.

use std::cell::Cell;
use std::rc::Rc;

use crate::{ArrayError, Result};

/// Reference-counted, fixed-length element buffer.
///
/// Every view derived from an array holds a clone of the same `Storage`, and
/// the buffer is released when the last holder drops. Elements live in
/// [`Cell`]s: any holder may write through a shared reference, and writes are
/// immediately visible to every other holder. There is no locking and no
/// copy-on-write, and the type is neither `Send` nor `Sync`.
pub struct Storage<T> {
    cells: Rc<Vec<Cell<T>>>,
}

impl<T> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T> std::fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.cells.len())
            .field("holders", &Rc::strong_count(&self.cells))
            .finish()
    }
}

impl<T> Storage<T> {
    /// Take ownership of `data` without copying it.
    pub fn from_vec(data: Vec<T>) -> Self {
        let cells: Vec<Cell<T>> = data.into_iter().map(Cell::new).collect();
        Self {
            cells: Rc::new(cells),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The whole buffer.
    #[inline]
    pub fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    /// Number of arrays and views currently holding this buffer.
    #[inline]
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.cells)
    }

    /// True if both handles refer to the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Storage<T>) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }
}

impl<T: Copy> Storage<T> {
    /// Allocate `len` copies of `value`.
    ///
    /// # Errors
    /// Returns [`ArrayError::Allocation`] if the allocator refuses.
    pub fn filled(len: usize, value: T) -> Result<Self> {
        let mut data = try_vec(len)?;
        data.resize(len, value);
        Ok(Self::from_vec(data))
    }

    /// Read the element at flat position `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.cells.get(index).map(Cell::get)
    }
}

/// Empty vector with room for exactly `len` elements, surfacing allocation
/// failure as an error instead of aborting.
pub(crate) fn try_vec<T>(len: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ArrayError::Allocation(len))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let s = Storage::filled(4, 2.5f64).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.get(3), Some(2.5));
        assert_eq!(s.get(4), None);
    }

    #[test]
    fn test_shared_writes_are_visible() {
        let a = Storage::from_vec(vec![1, 2, 3]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.holders(), 2);
        b.cells()[1].set(20);
        assert_eq!(a.get(1), Some(20));
        drop(b);
        assert_eq!(a.holders(), 1);
    }

    #[test]
    fn test_allocation_failure_is_reported() {
        let err = try_vec::<u64>(usize::MAX).unwrap_err();
        assert_eq!(err, ArrayError::Allocation(usize::MAX));
    }
}
