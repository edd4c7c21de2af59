//! Sparse dot products agree with the dense reference.

use crate::*;
use dotprec_core::{DotLevel, Interval};
use proptest::prelude::*;

/// Doubles spread over many binades, with roughly half of them zero.
fn sparse_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        1 => (-1.0f64..1.0, -40i32..40).prop_map(|(m, e)| m * 2f64.powi(e)),
    ]
}

fn point_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (0usize..32).prop_flat_map(|n| {
        (
            prop::collection::vec(sparse_f64(), n),
            prop::collection::vec(sparse_f64(), n),
        )
    })
}

fn interval_pair() -> impl Strategy<Value = (Vec<Interval>, Vec<f64>)> {
    (0usize..16).prop_flat_map(|n| {
        (
            prop::collection::vec(
                (sparse_f64(), 0.0f64..1.0).prop_map(|(m, r)| Interval::new(m - r, m + r)),
                n,
            ),
            prop::collection::vec(sparse_f64(), n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// At the exact level every storage combination rounds the same exact sum.
    #[test]
    fn exact_dot_independent_of_storage((x, y) in point_pair()) {
        let (sx, sy) = (SparseVector::from_dense(&x), SparseVector::from_dense(&y));
        let reference = dense_dot_dense_with_level(&x, &y, DotLevel::EXACT).unwrap();
        prop_assert_eq!(dot_with_level(&sx, &sy, DotLevel::EXACT).unwrap(), reference);
        prop_assert_eq!(dot_dense_with_level(&sx, &y, DotLevel::EXACT).unwrap(), reference);
        prop_assert_eq!(dense_dot_with_level(&x, &sy, DotLevel::EXACT).unwrap(), reference);
    }

    /// Interval dot products enclose every point combination of the bounds
    /// and match the dense computation at the exact level.
    #[test]
    fn interval_dot_encloses_points((x, y) in interval_pair(), k in 1u32..4) {
        let sx = SparseVector::from_dense(&x);
        let level = DotLevel::new(k).unwrap();
        let enclosure = dot_dense_with_level(&sx, &y, level).unwrap();
        for pick in [0.0, 0.5, 1.0] {
            let points: Vec<f64> = x
                .iter()
                .map(|iv| (iv.lo + (iv.hi - iv.lo) * pick).clamp(iv.lo, iv.hi))
                .collect();
            let exact: Interval = dense_dot_dense_with_level(
                &points.iter().map(|&p| Interval::point(p)).collect::<Vec<_>>(),
                &y,
                DotLevel::EXACT,
            )
            .unwrap();
            prop_assert!(enclosure.contains_interval(&exact), "{} misses {}", enclosure, exact);
        }
        let exact_sparse = dot_dense_with_level(&sx, &y, DotLevel::EXACT).unwrap();
        let exact_dense = dense_dot_dense_with_level(&x, &y, DotLevel::EXACT).unwrap();
        prop_assert_eq!(exact_sparse, exact_dense);
        prop_assert!(enclosure.contains_interval(&exact_sparse));
    }

    /// Matrix-vector products agree with row-wise dot products.
    #[test]
    fn matrix_rows_are_dot_products(
        rows in prop::collection::vec(prop::collection::vec(sparse_f64(), 6), 1..6),
        x in prop::collection::vec(sparse_f64(), 6),
    ) {
        let m = SparseMatrix::from_dense(&rows).unwrap();
        let sx = SparseVector::from_dense(&x);
        let dense = m.mul_dense_with_level(&x, DotLevel::EXACT).unwrap();
        let sparse = m.mul_sparse_with_level(&sx, DotLevel::EXACT).unwrap();
        for (i, row) in rows.iter().enumerate() {
            let reference = dense_dot_dense_with_level(row, &x, DotLevel::EXACT).unwrap();
            prop_assert_eq!(dense[i], reference);
            prop_assert_eq!(sparse.get(i as isize).unwrap(), reference);
        }
    }
}
