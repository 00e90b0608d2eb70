use approx::assert_relative_eq;
use num_complex::Complex64;
use strided_array::{
    array, broadcast, broadcast_in_place, broadcast_shape, max, min, select_strategy, sum,
    sum_axis, Array, ArrayError, Idx, Strategy, StridedRange,
};

fn make_array(rows: usize, cols: usize) -> Array<f64> {
    Array::from_fn(&[rows, cols], |idx| (idx[0] * cols + idx[1]) as f64).unwrap()
}

#[test]
fn test_add_scalar() {
    let a = array![[1, 2, 3], [4, 5, 6]].unwrap();
    let c = &a + 10;
    assert_eq!(c.shape(), &[2, 3]);
    assert_eq!(c, array![[11, 12, 13], [14, 15, 16]].unwrap());
}

#[test]
fn test_outer_product_by_broadcast() {
    let a = Array::from_vec(vec![1.0, 2.0, 3.0], &[3, 1]).unwrap();
    let b = Array::from_vec(vec![1.0, 10.0, 100.0, 1000.0], &[1, 4]).unwrap();
    let c = &a * &b;
    assert_eq!(c.shape(), &[3, 4]);
    for i in 0..3 {
        for j in 0..4 {
            assert_relative_eq!(
                c.at(&[i, j]).unwrap(),
                a.at(&[i, 0]).unwrap() * b.at(&[0, j]).unwrap()
            );
        }
    }
}

#[test]
fn test_incompatible_shapes() {
    let a = Array::<f64>::zeros(&[2, 3]).unwrap();
    let b = Array::<f64>::zeros(&[4, 3]).unwrap();
    let err = a.try_add(&b).unwrap_err();
    assert_eq!(
        err,
        ArrayError::Broadcast {
            lhs: vec![2, 3],
            rhs: vec![4, 3]
        }
    );
    assert!(broadcast_shape(&[2, 3], &[4, 3]).is_err());
}

#[test]
fn test_sum_over_first_axis() {
    let a = array![[1, 2, 3], [4, 5, 6]].unwrap();
    let s = sum_axis(&a, 0).unwrap();
    assert_eq!(s.shape(), &[3]);
    assert_eq!(s.to_vec(), vec![5, 7, 9]);
    assert_eq!(sum(&a), 21);
}

#[test]
fn test_transposed_element_access() {
    let a = make_array(2, 3);
    let t = a.transpose().unwrap();
    assert_eq!(t.at(&[1, 0]).unwrap(), a.at(&[0, 1]).unwrap());
}

#[test]
fn test_reshape_transposed_materializes_logical_order() {
    let a = array![[1, 2, 3], [4, 5, 6]].unwrap();
    let t = a.transpose().unwrap();
    let r = t.reshape(&[2, 3]).unwrap();
    assert_eq!(r.to_vec(), t.iter().collect::<Vec<_>>());
    assert_eq!(r.to_vec(), vec![1, 4, 2, 5, 3, 6]);
    // Physical order of the original buffer is not what comes out.
    assert_ne!(r.to_vec(), a.to_vec());
    assert!(!r.shares_storage_with(&a));
}

#[test]
fn test_in_place_requires_smaller_source() {
    let dst = Array::from_vec(vec![1, 2, 3], &[3]).unwrap();
    let src = Array::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    let err = broadcast_in_place(&dst, &src, |x, y| x + y).unwrap_err();
    assert!(matches!(err, ArrayError::BroadcastInto { .. }));
    assert_eq!(dst.to_vec(), vec![1, 2, 3]);
}

#[test]
fn test_in_place_into_view_updates_parent() {
    let a = make_array(3, 4);
    let middle = a.slice_axis(0, 1..2).unwrap();
    let ones = Array::<f64>::ones(&[4]).unwrap();
    broadcast_in_place(&middle, &ones, |x, y| x + y).unwrap();
    assert_eq!(
        a.view(&[1]).unwrap().to_vec(),
        vec![5.0, 6.0, 7.0, 8.0]
    );
    assert_eq!(a.at(&[0, 0]).unwrap(), 0.0);
    assert_eq!(a.at(&[2, 3]).unwrap(), 11.0);
}

#[test]
fn test_in_place_with_aliased_source() {
    // Doubling through a view of itself: every element is read before it is
    // written.
    let a = Array::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
    let alias = a.share();
    broadcast_in_place(&a, &alias, |x, y| x + y).unwrap();
    assert_eq!(a.to_vec(), vec![2, 4, 6, 8]);

    // Adding row 0 to every row: row 0 is updated first, and row 1 then sees
    // the new values.
    let b = Array::from_vec(vec![1, 2, 10, 20], &[2, 2]).unwrap();
    let row0 = b.view(&[0]).unwrap();
    broadcast_in_place(&b, &row0, |x, y| x + y).unwrap();
    assert_eq!(b.to_vec(), vec![2, 4, 12, 24]);
}

#[test]
fn test_zero_length_axes() {
    let a = Array::<f64>::zeros(&[0, 3]).unwrap();
    let b = Array::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
    let c = &a + &b;
    assert_eq!(c.shape(), &[0, 3]);
    assert!(c.is_empty());

    let mut d = Array::<f64>::zeros(&[2, 0, 3]).unwrap();
    d += &a;
    assert!(d.is_empty());
    // A non-empty source never fits into an empty destination.
    assert!(broadcast_in_place(&d, &b, |x, y| x + y).is_err());

    assert_eq!(sum(&a), 0.0);
    assert!(min(&a).is_err());
    assert_eq!(a.flatten().unwrap().shape(), &[0]);
}

#[test]
fn test_negative_stride_slices() {
    let a = make_array(3, 4);
    let flipped = a
        .slice_axis(0, StridedRange::reversed(3))
        .unwrap()
        .slice_axis(1, StridedRange::reversed(4))
        .unwrap();
    assert_eq!(flipped.strides(), &[-4, -1]);
    let expected: Vec<f64> = (0..12).rev().map(|x| x as f64).collect();
    assert_eq!(flipped.to_vec(), expected);

    let sum_with_original = &flipped + &a;
    assert!(sum_with_original.iter().all(|x| x == 11.0));

    assert_eq!(max(&flipped).unwrap(), 11.0);
    let reshaped = flipped.reshape(&[4, 3]).unwrap();
    assert_eq!(reshaped.at(&[0, 0]).unwrap(), 11.0);
}

#[test]
fn test_column_view_via_idx() {
    let a = make_array(3, 4);
    let col = a.slice_axis(1, Idx(2)).unwrap();
    assert_eq!(col.shape(), &[3]);
    assert_eq!(col.strides(), &[4]);
    assert_eq!(col.to_vec(), vec![2.0, 6.0, 10.0]);
    col.fill(-1.0);
    assert_eq!(a.at(&[1, 2]).unwrap(), -1.0);
}

#[test]
fn test_complex_elements() {
    let a = Array::from_vec(
        vec![Complex64::new(1.0, 1.0), Complex64::new(0.0, 2.0)],
        &[2, 1],
    )
    .unwrap();
    let b = Array::from_vec(vec![Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)], &[2]).unwrap();
    let c = broadcast(&a, &b, |x, y| x * y).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c.at(&[0, 0]).unwrap(), Complex64::new(2.0, 2.0));
    assert_eq!(c.at(&[0, 1]).unwrap(), Complex64::new(-1.0, 1.0));
    assert_eq!(c.at(&[1, 1]).unwrap(), Complex64::new(-2.0, 0.0));

    let d = &a + &b;
    assert_eq!(d.at(&[1, 0]).unwrap(), Complex64::new(2.0, 2.0));
}

#[test]
fn test_strategy_selection_matches_layout() {
    let a = make_array(4, 5);
    let b = make_array(4, 5);
    assert_eq!(select_strategy(&a, &b).unwrap(), Strategy::Linear);

    let s = Array::from_vec(vec![2.0], &[1, 1, 1]).unwrap();
    assert_eq!(select_strategy(&a, &s).unwrap(), Strategy::Scalar);
    assert_eq!((&a * &s).shape(), &[1, 4, 5]);

    let t = make_array(5, 4).transpose().unwrap();
    assert_eq!(select_strategy(&a, &t).unwrap(), Strategy::Strided);
    let c = &a + &t;
    for i in 0..4 {
        for j in 0..5 {
            assert_relative_eq!(
                c.at(&[i, j]).unwrap(),
                a.at(&[i, j]).unwrap() + t.at(&[i, j]).unwrap()
            );
        }
    }
}

#[test]
fn test_data_exposes_whole_buffer() {
    let a = make_array(2, 3);
    let row = a.view(&[1]).unwrap();
    assert_eq!(row.offset(), 3);
    assert_eq!(row.data().len(), 6);
    // Bulk fill through the cells, as a random initializer would.
    for (k, cell) in a.data().iter().enumerate() {
        cell.set(k as f64 * 0.5);
    }
    assert_eq!(row.to_vec(), vec![1.5, 2.0, 2.5]);
}

#[test]
fn test_sum_axis_matches_naive() {
    let a = Array::from_fn(&[4, 3, 2], |idx| (idx[0] + 2 * idx[1] + 3 * idx[2]) as f64).unwrap();
    for axis in 0..3 {
        let result = sum_axis(&a, axis).unwrap();
        let expected = sum_axis_expected(&a, axis);
        assert_eq!(result.shape(), expected.shape());
        for (x, y) in result.iter().zip(expected.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-10);
        }
    }
}

fn sum_axis_expected(a: &Array<f64>, axis: usize) -> Array<f64> {
    let mut shape = a.shape().to_vec();
    let len = shape.remove(axis);
    Array::from_fn(&shape, |idx| {
        let mut full = idx.to_vec();
        full.insert(axis, 0);
        (0..len)
            .map(|k| {
                full[axis] = k;
                a.at(&full).unwrap()
            })
            .sum()
    })
    .unwrap()
}
