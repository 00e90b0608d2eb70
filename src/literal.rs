//! Scalar element marker and nested-literal construction.

use crate::{ArrayError, Result};

/// Primitive numeric types accepted as bare scalar operands, as in
/// `&a * 2.0` or `a += 1`.
///
/// Arrays themselves hold any `Copy` type; this marker only keeps the scalar
/// operator impls from overlapping with the array-array ones.
pub trait Element: Copy + 'static {}

/// Values that describe an array by nesting, such as `[[1, 2], [3, 4]]`.
///
/// Implemented for the primitive numeric types (depth 0) and for arrays,
/// slices and vectors of nested literals. Fixed-size arrays are rectangular
/// by construction; vectors are checked when flattened.
pub trait NestedLiteral {
    /// Leaf element type.
    type Elem: Copy;

    /// Nesting depth, which is the rank of the described array.
    const DEPTH: usize;

    /// Append the extent of every nesting level, taken from the first entry
    /// at each level.
    fn push_shape(&self, shape: &mut Vec<usize>);

    /// Append the leaves in row-major order, checking that every level
    /// matches `shape`.
    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()>;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl Element for $t {}

            impl NestedLiteral for $t {
                type Elem = $t;
                const DEPTH: usize = 0;

                #[inline]
                fn push_shape(&self, _shape: &mut Vec<usize>) {}

                #[inline]
                fn flatten_into(&self, shape: &[usize], out: &mut Vec<$t>) -> Result<()> {
                    debug_assert!(shape.is_empty());
                    out.push(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

fn push_level_shape<L: NestedLiteral>(items: &[L], shape: &mut Vec<usize>) {
    shape.push(items.len());
    match items.first() {
        Some(first) => first.push_shape(shape),
        None => shape.extend(std::iter::repeat(0).take(L::DEPTH)),
    }
}

fn flatten_level<L: NestedLiteral>(items: &[L], shape: &[usize], out: &mut Vec<L::Elem>) -> Result<()> {
    if items.len() != shape[0] {
        return Err(ArrayError::Shape(format!(
            "cannot represent non-rectangular data: expected {} entries, found {}",
            shape[0],
            items.len()
        )));
    }
    for item in items {
        item.flatten_into(&shape[1..], out)?;
    }
    Ok(())
}

impl<L: NestedLiteral> NestedLiteral for [L] {
    type Elem = L::Elem;
    const DEPTH: usize = L::DEPTH + 1;

    fn push_shape(&self, shape: &mut Vec<usize>) {
        push_level_shape(self, shape);
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<L::Elem>) -> Result<()> {
        flatten_level(self, shape, out)
    }
}

impl<L: NestedLiteral, const N: usize> NestedLiteral for [L; N] {
    type Elem = L::Elem;
    const DEPTH: usize = L::DEPTH + 1;

    fn push_shape(&self, shape: &mut Vec<usize>) {
        push_level_shape(self, shape);
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<L::Elem>) -> Result<()> {
        flatten_level(self, shape, out)
    }
}

impl<L: NestedLiteral> NestedLiteral for Vec<L> {
    type Elem = L::Elem;
    const DEPTH: usize = L::DEPTH + 1;

    fn push_shape(&self, shape: &mut Vec<usize>) {
        push_level_shape(self, shape);
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<L::Elem>) -> Result<()> {
        flatten_level(self, shape, out)
    }
}

/// Build an [`Array`](crate::Array) from a nested literal.
///
/// Expands to [`Array::from_nested`](crate::Array::from_nested) and so
/// returns a `Result`.
///
/// ```rust
/// use strided_array::array;
///
/// let a = array![[1, 2, 3], [4, 5, 6]].unwrap();
/// assert_eq!(a.shape(), &[2, 3]);
/// assert_eq!(a.at(&[1, 0]).unwrap(), 4);
/// ```
#[macro_export]
macro_rules! array {
    ($($x:expr),* $(,)?) => {
        $crate::Array::from_nested(&[$($x),*])
    };
}
