//! Sparse vectors and matrices with verified dot products.
//!
//! Vectors store their non-zero elements in ascending index order over an
//! arbitrary logical index range `[lb, ub]`. Elements absent from storage
//! are exact zeros for every operation, including hull and intersection.
//!
//! - [`SparseView`]: read access shared by vectors and slices, so every
//!   operation accepts either
//! - [`merge`]: elementwise `+ - | &` between two views, with element kind
//!   promotion
//! - [`dense`]: the same operations against dense slices
//! - [`dot`]: dot products routed through the accumulators of
//!   `dotprec-accum`, rounded once
//! - [`SparseMatrix`]: compressed-column matrices with accumulated
//!   matrix-vector products
//!
//! ```
//! use dotprec_core::{DotLevel, Interval};
//! use dotprec_sparse::{dot_with_level, hull, SparseVector, SparseView};
//!
//! let x = SparseVector::from_dense(&[1e300, 0.0, 1.0, -1e300]);
//! let y = SparseVector::from_dense(&[1e10, 2.0, 1.0, 1e10]);
//! assert_eq!(dot_with_level(&x, &y, DotLevel::EXACT).unwrap(), 1.0);
//!
//! let h = hull(&x, &y).unwrap();
//! assert_eq!(h.get(1).unwrap(), Interval::new(0.0, 2.0));
//! ```

pub mod dense;
pub mod dot;
pub mod io;
pub mod matrix;
pub mod merge;
pub mod slice;
pub mod vector;
pub mod view;

pub use dense::{
    add_dense, dense_add, dense_hull, dense_intersect, dense_sub, hull_dense, intersect_dense,
    sub_dense,
};
pub use dot::{
    accumulate_dense_dot, accumulate_dense_dot_dense, accumulate_dot, accumulate_dot_dense,
    dense_dot, dense_dot_dense, dense_dot_dense_with_level, dense_dot_with_level, dot, dot_dense,
    dot_dense_with_level, dot_with_level,
};
pub use matrix::SparseMatrix;
pub use merge::{add, hull, intersect, sub, HullKind, SumKind};
pub use slice::{SparseSlice, SparseSliceMut};
pub use vector::SparseVector;
pub use view::{Entries, SparseView};

#[cfg(test)]
mod tests;
