//! Arithmetic operators on arrays.
//!
//! `+ - * /` between arrays broadcast both operands; an array and a bare
//! scalar combine element-wise with the scalar kept in its argument
//! position. The compound forms (`+=` and friends) write through the left
//! operand's storage and need the right operand to broadcast into it.
//!
//! The std operator traits cannot return errors, so the operators panic on a
//! shape mismatch. `try_add`, `try_sub`, `try_mul` and `try_div` are the
//! fallible spellings.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::array::Array;
use crate::broadcast::{
    broadcast, broadcast_in_place, broadcast_scalar_in_place, broadcast_scalar_left,
    broadcast_scalar_right, map_new,
};
use crate::literal::Element;
use crate::Result;

#[track_caller]
fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign:ident, $assign_method:ident, $try_method:ident, $name:literal) => {
        impl<A: Copy> Array<A> {
            #[doc = concat!("Element-wise ", $name, " with broadcasting.")]
            ///
            /// # Errors
            /// [`ArrayError::Broadcast`](crate::ArrayError::Broadcast) if the
            /// shapes are incompatible.
            pub fn $try_method<B, O>(&self, rhs: &Array<B>) -> Result<Array<O>>
            where
                A: $trait<B, Output = O>,
                B: Copy,
            {
                broadcast(self, rhs, |x, y| x.$method(y))
            }
        }

        /// # Panics
        /// If the shapes cannot be broadcast together.
        impl<'a, 'b, A, B, O> $trait<&'b Array<B>> for &'a Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Copy,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: &'b Array<B>) -> Array<O> {
                or_panic(self.$try_method(rhs))
            }
        }

        impl<'b, A, B, O> $trait<&'b Array<B>> for Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Copy,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: &'b Array<B>) -> Array<O> {
                (&self).$method(rhs)
            }
        }

        impl<'a, A, B, O> $trait<Array<B>> for &'a Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Copy,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: Array<B>) -> Array<O> {
                self.$method(&rhs)
            }
        }

        impl<A, B, O> $trait<Array<B>> for Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Copy,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: Array<B>) -> Array<O> {
                (&self).$method(&rhs)
            }
        }

        impl<'a, A, B, O> $trait<B> for &'a Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Element,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: B) -> Array<O> {
                or_panic(broadcast_scalar_right(self, rhs, |x, y| x.$method(y)))
            }
        }

        impl<A, B, O> $trait<B> for Array<A>
        where
            A: Copy + $trait<B, Output = O>,
            B: Element,
        {
            type Output = Array<O>;

            #[track_caller]
            fn $method(self, rhs: B) -> Array<O> {
                (&self).$method(rhs)
            }
        }

        /// # Panics
        /// If `rhs` does not broadcast onto the shape of `self`.
        impl<'b, A, B> $assign<&'b Array<B>> for Array<A>
        where
            A: Copy + $trait<B, Output = A>,
            B: Copy,
        {
            #[track_caller]
            fn $assign_method(&mut self, rhs: &'b Array<B>) {
                or_panic(broadcast_in_place(self, rhs, |x, y| x.$method(y)))
            }
        }

        impl<A, B> $assign<Array<B>> for Array<A>
        where
            A: Copy + $trait<B, Output = A>,
            B: Copy,
        {
            #[track_caller]
            fn $assign_method(&mut self, rhs: Array<B>) {
                self.$assign_method(&rhs)
            }
        }

        impl<A, B> $assign<B> for Array<A>
        where
            A: Copy + $trait<B, Output = A>,
            B: Element,
        {
            fn $assign_method(&mut self, rhs: B) {
                broadcast_scalar_in_place(self, rhs, |x, y| x.$method(y))
            }
        }

        impl_scalar_lhs!($trait, $method; i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
    };
}

macro_rules! impl_scalar_lhs {
    ($trait:ident, $method:ident; $($s:ty),*) => {
        $(
            impl<'a> $trait<&'a Array<$s>> for $s {
                type Output = Array<$s>;

                #[track_caller]
                fn $method(self, rhs: &'a Array<$s>) -> Array<$s> {
                    or_panic(broadcast_scalar_left(self, rhs, <$s as $trait>::$method))
                }
            }

            impl $trait<Array<$s>> for $s {
                type Output = Array<$s>;

                #[track_caller]
                fn $method(self, rhs: Array<$s>) -> Array<$s> {
                    <$s as $trait<&Array<$s>>>::$method(self, &rhs)
                }
            }
        )*
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, try_add, "addition");
impl_binary_op!(Sub, sub, SubAssign, sub_assign, try_sub, "subtraction");
impl_binary_op!(Mul, mul, MulAssign, mul_assign, try_mul, "multiplication");
impl_binary_op!(Div, div, DivAssign, div_assign, try_div, "division");

impl<'a, A, O> Neg for &'a Array<A>
where
    A: Copy + Neg<Output = O>,
{
    type Output = Array<O>;

    #[track_caller]
    fn neg(self) -> Array<O> {
        or_panic(map_new(self, |x| -x))
    }
}

impl<A, O> Neg for Array<A>
where
    A: Copy + Neg<Output = O>,
{
    type Output = Array<O>;

    #[track_caller]
    fn neg(self) -> Array<O> {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use crate::{Array, ArrayError};
    use approx::assert_relative_eq;

    #[test]
    fn test_array_array() {
        let a = Array::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let b = Array::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
        assert_eq!((&a + &b).to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
        assert_eq!((&a - &b).to_vec(), vec![-9.0, -18.0, -27.0, -6.0, -15.0, -24.0]);
        assert_eq!((&a * &b).to_vec(), vec![10.0, 40.0, 90.0, 40.0, 100.0, 180.0]);
        let q = &b / &a;
        assert_relative_eq!(q.at(&[1, 2]).unwrap(), 5.0);
    }

    #[test]
    fn test_owned_forms() {
        let a = Array::from_vec(vec![1, 2], &[2]).unwrap();
        let b = Array::from_vec(vec![3, 4], &[2]).unwrap();
        let c = a.clone() + b.clone();
        assert_eq!(c.to_vec(), vec![4, 6]);
        let d = &a * b;
        assert_eq!(d.to_vec(), vec![3, 8]);
        let e = a - &d;
        assert_eq!(e.to_vec(), vec![-2, -6]);
    }

    #[test]
    fn test_scalar_positions() {
        let a = Array::from_vec(vec![2.0f64, 4.0, 8.0], &[3]).unwrap();
        assert_eq!((&a - 1.0).to_vec(), vec![1.0, 3.0, 7.0]);
        assert_eq!((1.0 - &a).to_vec(), vec![-1.0, -3.0, -7.0]);
        assert_eq!((&a / 2.0).to_vec(), vec![1.0, 2.0, 4.0]);
        assert_eq!((8.0 / &a).to_vec(), vec![4.0, 2.0, 1.0]);
        assert_eq!((10.0 + a).to_vec(), vec![12.0, 14.0, 18.0]);
    }

    #[test]
    fn test_scalar_lhs_literal_follows_element_type() {
        let ints = Array::from_vec(vec![1i32, 2, 3], &[3]).unwrap();
        assert_eq!((100 - &ints).to_vec(), vec![99, 98, 97]);
        assert_eq!((2 * ints.share()).to_vec(), vec![2, 4, 6]);

        let singles = Array::from_vec(vec![0.5f32, 2.0], &[2, 1]).unwrap();
        let halves = 1.0 / &singles;
        assert_eq!(halves.shape(), &[2, 1]);
        assert_eq!(halves.to_vec(), vec![2.0f32, 0.5]);
    }

    #[test]
    fn test_compound_assign() {
        let mut a = Array::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let view = a.share();
        let row = Array::from_vec(vec![10, 20, 30], &[3]).unwrap();
        a += &row;
        assert_eq!(view.to_vec(), vec![11, 22, 33, 14, 25, 36]);
        a -= 1;
        a *= 2;
        assert_eq!(a.to_vec(), vec![20, 42, 64, 26, 48, 70]);
        let col = Array::from_vec(vec![2, 7], &[2, 1]).unwrap();
        a /= col;
        assert_eq!(a.to_vec(), vec![10, 21, 32, 3, 6, 10]);
    }

    #[test]
    fn test_negation() {
        let a = Array::from_vec(vec![1, -2, 3, -4], &[2, 2]).unwrap();
        let n = -a.transpose().unwrap();
        assert_eq!(n.to_vec(), vec![-1, -3, 2, 4]);
    }

    #[test]
    fn test_try_forms_report_errors() {
        let a = Array::<f32>::zeros(&[2, 3]).unwrap();
        let b = Array::<f32>::zeros(&[4, 3]).unwrap();
        assert!(matches!(a.try_add(&b), Err(ArrayError::Broadcast { .. })));
        assert!(a.try_mul(&a).is_ok());
    }

    #[test]
    #[should_panic(expected = "cannot broadcast shapes")]
    fn test_operator_panics_on_mismatch() {
        let a = Array::<f32>::zeros(&[2, 3]).unwrap();
        let b = Array::<f32>::zeros(&[4, 3]).unwrap();
        let _ = &a + &b;
    }

    #[test]
    #[should_panic(expected = "cannot broadcast array of shape")]
    fn test_compound_panics_on_larger_rhs() {
        let mut a = Array::<i32>::zeros(&[3]).unwrap();
        let b = Array::<i32>::zeros(&[2, 3]).unwrap();
        a += &b;
    }
}
