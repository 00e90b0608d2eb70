//! Reference-counted N-dimensional arrays with NumPy-style broadcasting.
//!
//! An [`Array`] pairs an [`Extents`] (shape, strides, size, contiguity) with a
//! shared [`Storage`] buffer. Views produced by [`Array::view`],
//! [`Array::transpose`], [`Array::slice_axis`] and zero-copy
//! [`Array::reshape`] share the buffer of the array they came from, so a write
//! through any of them is visible through all of them.
//!
//! # Core Types
//!
//! - [`Extents`]: Shape/stride descriptor with row-major stride derivation
//! - [`Storage`]: Shared, single-threaded, fixed-length element buffer
//! - [`Array`]: Extents + storage handle + base offset
//!
//! # Broadcasting
//!
//! - [`broadcast_shape`]: Right-aligned shape compatibility and result shape
//! - [`broadcast`], [`broadcast_scalar_left`], [`broadcast_scalar_right`]:
//!   Combine two operands into a new array
//! - [`broadcast_in_place`], [`broadcast_scalar_in_place`]: Mutate the left
//!   operand through its own storage
//! - [`select_strategy`]: Report which traversal the engine picks
//!
//! # Reductions and constructors
//!
//! - [`sum`], [`sum_axis`], [`min`], [`max`], [`minmax`], [`reduce`]
//! - [`eye`], [`diagonal`], [`linspace`], [`arange`], [`array!`]
//!
//! # Example
//!
//! ```rust
//! use strided_array::{array, Array};
//!
//! let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].unwrap();
//! let b = Array::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
//!
//! // [2, 3] + [3] broadcasts the row across both rows.
//! let c = &a + &b;
//! assert_eq!(c.shape(), &[2, 3]);
//! assert_eq!(c.at(&[1, 2]).unwrap(), 36.0);
//!
//! // Transpose is zero-copy.
//! let t = a.transpose().unwrap();
//! assert_eq!(t.at(&[2, 0]).unwrap(), 3.0);
//! assert!(t.shares_storage_with(&a));
//! ```
//!
//! # Aliasing
//!
//! Storage is built on `Rc` and `Cell`, so arrays are neither `Send` nor
//! `Sync`. Any holder may write; there is no copy-on-write and no locking.

mod arith;
mod array;
mod broadcast;
mod creation;
mod extents;
mod fuse;
mod iter;
mod kernel;
mod literal;
mod reduce;
mod slice;
mod storage;

// ============================================================================
// Containers
// ============================================================================
pub use array::Array;
pub use extents::{is_row_major, row_major_strides, Extents};
pub use storage::Storage;

// ============================================================================
// Element types and literals
// ============================================================================
pub use literal::{Element, NestedLiteral};

// ============================================================================
// Views and iteration
// ============================================================================
pub use iter::{AxisIter, Iter};
pub use slice::{Idx, SliceIndex, StridedRange};

// ============================================================================
// Broadcast operations
// ============================================================================
pub use broadcast::{
    broadcast, broadcast_in_place, broadcast_scalar_in_place, broadcast_scalar_left,
    broadcast_scalar_right, broadcast_shape, select_strategy, Strategy,
};

// ============================================================================
// Reductions and constructors
// ============================================================================
pub use creation::{arange, diagonal, eye, linspace};
pub use reduce::{max, min, minmax, reduce, sum, sum_axis};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur during array construction, views and broadcasting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// A shape is invalid for the requested operation.
    ///
    /// Raised for jagged nested literals, reshapes that change the element
    /// count, invalid permutations, bad slice ranges and empty reductions.
    #[error("shape error: {0}")]
    Shape(String),

    /// Two shapes fail the right-aligned broadcasting rule.
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },

    /// An in-place broadcast would have to grow the destination, e.g. a
    /// larger array broadcast onto a smaller one.
    #[error("cannot broadcast array of shape {src:?} onto array of shape {dst:?}")]
    BroadcastInto { dst: Vec<usize>, src: Vec<usize> },

    /// Wrong number of indices, or an index at or beyond its axis extent.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    Index { index: Vec<usize>, shape: Vec<usize> },

    /// Invalid axis for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// The requested element count cannot be allocated.
    #[error("cannot allocate {0} elements")]
    Allocation(usize),
}

/// Result type for array operations.
pub type Result<T> = std::result::Result<T, ArrayError>;
