//! End-to-end sparse vector scenarios.

use dotprec_core::{
    default_level, sparse_format, DotConfig, DotError, DotLevel, Interval, SparseFormat,
};
use dotprec_sparse::{
    dot, dot_with_level, hull, intersect, SparseMatrix, SparseVector, SparseView,
};
use std::sync::Mutex;

/// Held by every test that reads or changes the process-wide defaults.
static GLOBALS: Mutex<()> = Mutex::new(());

fn iv(lo: f64, hi: f64) -> Interval {
    Interval::new(lo, hi)
}

#[test]
fn hull_of_dimension_five_vectors() {
    let mut x = SparseVector::<Interval>::new(5);
    x.set(1, iv(1.0, 2.0)).unwrap();
    x.set(3, iv(-1.0, 1.0)).unwrap();
    let mut y = SparseVector::<Interval>::new(5);
    y.set(0, iv(0.0, 0.0)).unwrap();
    y.set(3, iv(0.0, 2.0)).unwrap();

    let h = hull(&x, &y).unwrap();
    let stored: Vec<(isize, Interval)> = h.iter().map(|(i, &v)| (i, v)).collect();
    assert_eq!(
        stored,
        vec![(0, iv(0.0, 0.0)), (1, iv(0.0, 2.0)), (3, iv(-1.0, 2.0))]
    );
    assert!(h.is_valid());
}

#[test]
fn intersection_failure_leaves_target_untouched() {
    let mut x = SparseVector::from_dense(&[iv(1.0, 2.0), iv(0.0, 1.0), iv(5.0, 6.0)]);
    let y = SparseVector::from_dense(&[iv(1.5, 3.0), iv(0.5, 0.5), iv(0.0, 1.0)]);
    let before = x.clone();
    assert_eq!(
        x.intersect_assign_view(&y),
        Err(DotError::EmptyIntersection { index: Some(2) })
    );
    assert_eq!(x, before);
    let first_two = intersect(&x.slice(0, 1).unwrap(), &y.slice(0, 1).unwrap()).unwrap();
    assert_eq!(first_two.to_dense(), vec![iv(1.5, 2.0), iv(0.5, 0.5)]);
}

#[test]
fn shifted_index_ranges() {
    let x = SparseVector::from_dense_with_lb(&[1.0, 0.0, 3.0], -1);
    let y = SparseVector::from_dense_with_lb(&[2.0, 5.0, 4.0], 10);
    // Dot products pair elements by position, not by logical index.
    assert_eq!(dot_with_level(&x, &y, DotLevel::EXACT).unwrap(), 14.0);
    assert_eq!(x.get(1).unwrap(), 3.0);
    assert!(x.get(2).is_err());
}

#[test]
fn display_follows_process_wide_format() {
    let _lock = GLOBALS.lock().unwrap_or_else(|e| e.into_inner());
    let v = SparseVector::from_dense(&[0.0, 1.5, 0.0]);
    let original = sparse_format();
    let sparse = {
        let _scope = DotConfig::global().with_sparse_format(SparseFormat::Sparse).apply_scoped();
        v.to_string()
    };
    let dense = {
        let _scope = DotConfig::global().with_sparse_format(SparseFormat::Dense).apply_scoped();
        v.to_string()
    };
    assert_eq!(sparse_format(), original);

    assert_eq!(sparse, "dim=3 nnz=1 {1: 1.5}");
    assert_eq!(dense, "[0.0, 1.5, 0.0]");
    assert_eq!(sparse.parse::<SparseVector<f64>>().unwrap(), v);
    assert_eq!(dense.parse::<SparseVector<f64>>().unwrap(), v);
}

#[test]
fn serde_round_trip() {
    let v = SparseVector::from_dense_with_lb(&[iv(0.0, 1.0), Interval::ZERO, iv(-2.0, 2.0)], 3);
    let json = serde_json::to_string(&v).unwrap();
    let back: SparseVector<Interval> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);

    let m = SparseMatrix::from_triplets(2, 2, vec![(1, 0, 2.5)]).unwrap();
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(serde_json::from_str::<SparseMatrix<f64>>(&json).unwrap(), m);
}

#[test]
fn point_vector_widened_to_interval_vector() {
    let x = SparseVector::from_dense(&[0.1, 0.0, 0.2]);
    let ix: SparseVector<Interval> = x.convert();
    assert_eq!(ix.nnz(), 2);
    assert!(ix.get(0).unwrap().is_point());
    let product = dot_with_level(&ix, &x, DotLevel::FLOAT).unwrap();
    let exact = dot_with_level(&ix, &x, DotLevel::EXACT).unwrap();
    assert!(product.contains_interval(&exact));
    assert!(exact.hi <= exact.lo.next_up());
}

#[test]
fn default_level_is_restored_after_scoped_override() {
    let _lock = GLOBALS.lock().unwrap_or_else(|e| e.into_inner());
    let original = default_level();
    let x = SparseVector::from_dense(&[1e300, 1.0, -1e300]);
    let y = SparseVector::from_dense(&[1.0, 1.0, 1.0]);
    {
        let _scope = DotConfig::global().with_level(DotLevel::FLOAT).apply_scoped();
        assert_eq!(default_level(), DotLevel::FLOAT);
        let _: f64 = dot(&x, &y).unwrap();
    }
    assert_eq!(default_level(), original);
    {
        let _scope = DotConfig::global().with_level(DotLevel::EXACT).apply_scoped();
        assert_eq!(dot(&x, &y).unwrap(), 1.0);
    }
    assert_eq!(default_level(), original);
}
