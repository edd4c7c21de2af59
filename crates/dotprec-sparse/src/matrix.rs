//! Sparse matrices in compressed-column storage.

use crate::slice::SparseSlice;
use crate::vector::SparseVector;
use crate::view::SparseView;
use dotprec_accum::{Accumulate, DotAccumulator};
use dotprec_core::{default_level, promote, DotError, DotLevel, Element, Promote, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

type Kind<A, B> = <A as Promote<B>>::Output;
type AccOf<A, B> = <Kind<A, B> as Accumulate>::Acc;

/// A `rows × cols` sparse matrix in compressed-column storage.
///
/// Column `j` occupies positions `col_ptr[j]..col_ptr[j + 1]` of `row_idx`
/// and `values`, with strictly increasing row indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawSparseMatrix<T>",
    bound(deserialize = "T: Element + Deserialize<'de>")
)]
pub struct SparseMatrix<T> {
    rows: usize,
    cols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

/// Unchecked wire form of [`SparseMatrix`].
#[derive(Deserialize)]
struct RawSparseMatrix<T> {
    rows: usize,
    cols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Element> TryFrom<RawSparseMatrix<T>> for SparseMatrix<T> {
    type Error = DotError;

    fn try_from(raw: RawSparseMatrix<T>) -> Result<Self> {
        let m = Self {
            rows: raw.rows,
            cols: raw.cols,
            col_ptr: raw.col_ptr,
            row_idx: raw.row_idx,
            values: raw.values,
        };
        if !m.is_valid() {
            return Err(DotError::InvalidStorage(format!(
                "inconsistent compressed-column layout for a {}x{} matrix",
                m.rows, m.cols
            )));
        }
        Ok(m)
    }
}

impl<T: Element> SparseMatrix<T> {
    /// Empty `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            col_ptr: vec![0; cols + 1],
            row_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Matrix from unordered `(row, column, value)` triplets. Explicit zeros
    /// are dropped; repeated positions are rejected.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, T)>) -> Result<Self> {
        for &(i, j, _) in &triplets {
            if i >= rows {
                return Err(DotError::IndexOutOfRange {
                    index: i as isize,
                    lb: 0,
                    ub: rows as isize - 1,
                });
            }
            if j >= cols {
                return Err(DotError::IndexOutOfRange {
                    index: j as isize,
                    lb: 0,
                    ub: cols as isize - 1,
                });
            }
        }
        triplets.sort_by_key(|&(i, j, _)| (j, i));
        for pair in triplets.windows(2) {
            if (pair[0].0, pair[0].1) == (pair[1].0, pair[1].1) {
                return Err(DotError::DuplicateIndex(format!(
                    "entry ({}, {}) given twice",
                    pair[0].0, pair[0].1
                )));
            }
        }

        let mut m = Self::new(rows, cols);
        for (i, j, v) in triplets.into_iter().filter(|(_, _, v)| !v.is_zero()) {
            m.col_ptr[j + 1] += 1;
            m.row_idx.push(i);
            m.values.push(v);
        }
        for j in 0..cols {
            m.col_ptr[j + 1] += m.col_ptr[j];
        }
        trace!(rows, cols, nnz = m.nnz(), "built sparse matrix");
        Ok(m)
    }

    /// Matrix from dense rows.
    pub fn from_dense(rows: &[Vec<T>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut triplets = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(DotError::dimension_mismatch(cols, row.len()));
            }
            triplets.extend(row.iter().enumerate().map(|(j, &v)| (i, j, v)));
        }
        Self::from_triplets(rows.len(), cols, triplets)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn check(&self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows {
            return Err(DotError::IndexOutOfRange {
                index: i as isize,
                lb: 0,
                ub: self.rows as isize - 1,
            });
        }
        if j >= self.cols {
            return Err(DotError::IndexOutOfRange {
                index: j as isize,
                lb: 0,
                ub: self.cols as isize - 1,
            });
        }
        Ok(())
    }

    /// Element `(i, j)`; zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        self.check(i, j)?;
        let col = self.col_ptr[j]..self.col_ptr[j + 1];
        Ok(self.row_idx[col.clone()]
            .binary_search(&i)
            .map_or_else(|_| T::zero(), |p| self.values[col.start + p]))
    }

    /// Column `j` as a view indexed from 0.
    pub fn column(&self, j: usize) -> Result<SparseSlice<'_, T>> {
        if j >= self.cols {
            return Err(DotError::IndexOutOfRange {
                index: j as isize,
                lb: 0,
                ub: self.cols as isize - 1,
            });
        }
        let (p0, p1) = (self.col_ptr[j], self.col_ptr[j + 1]);
        Ok(SparseSlice::new(
            0,
            self.rows,
            0,
            &self.row_idx[p0..p1],
            &self.values[p0..p1],
        ))
    }

    /// Row `i` as an owned sparse vector indexed from 0.
    pub fn row(&self, i: usize) -> Result<SparseVector<T>> {
        if i >= self.rows {
            return Err(DotError::IndexOutOfRange {
                index: i as isize,
                lb: 0,
                ub: self.rows as isize - 1,
            });
        }
        let entries = (0..self.cols).filter_map(|j| {
            let col = self.col_ptr[j]..self.col_ptr[j + 1];
            self.row_idx[col.clone()]
                .binary_search(&i)
                .ok()
                .map(|p| (j, self.values[col.start + p]))
        });
        Ok(SparseVector::from_entries(0, self.cols, entries))
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut counts = vec![0usize; self.rows + 1];
        for &i in &self.row_idx {
            counts[i + 1] += 1;
        }
        for i in 0..self.rows {
            counts[i + 1] += counts[i];
        }
        let col_ptr = counts.clone();
        let mut next = counts;
        let mut row_idx = vec![0; self.nnz()];
        let mut values = vec![T::zero(); self.nnz()];
        for j in 0..self.cols {
            for p in self.col_ptr[j]..self.col_ptr[j + 1] {
                let i = self.row_idx[p];
                let q = next[i];
                row_idx[q] = j;
                values[q] = self.values[p];
                next[i] += 1;
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            col_ptr,
            row_idx,
            values,
        }
    }

    /// Dense copy as a list of rows.
    pub fn to_dense(&self) -> Vec<Vec<T>> {
        let mut out = vec![vec![T::zero(); self.cols]; self.rows];
        for j in 0..self.cols {
            for p in self.col_ptr[j]..self.col_ptr[j + 1] {
                out[self.row_idx[p]][j] = self.values[p];
            }
        }
        out
    }

    /// `A · x` for a sparse `x`. Each output element is accumulated over all
    /// its terms and rounded once.
    pub fn mul_sparse_with_level<V>(&self, x: &V, level: DotLevel) -> Result<SparseVector<Kind<T, V::Item>>>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item>,
        Kind<T, V::Item>: Accumulate,
    {
        if x.dim() != self.cols {
            return Err(DotError::dimension_mismatch(self.cols, x.dim()));
        }
        trace!(rows = self.rows, cols = self.cols, nnz = x.nnz(), "sparse matrix-vector product");
        let mut accs: Vec<Option<AccOf<T, V::Item>>> = vec![None; self.rows];
        for (j, &xj) in x.entries() {
            for p in self.col_ptr[j]..self.col_ptr[j + 1] {
                let (a, b) = promote(self.values[p], xj);
                let acc = accs[self.row_idx[p]]
                    .get_or_insert_with(|| <AccOf<T, V::Item> as DotAccumulator>::with_level(level));
                <Kind<T, V::Item> as Accumulate>::accumulate(acc, &a, &b);
            }
        }
        let entries = accs
            .iter()
            .enumerate()
            .filter_map(|(i, acc)| acc.as_ref().map(|acc| (i, acc.result())));
        Ok(SparseVector::from_entries(0, self.rows, entries))
    }

    pub fn mul_sparse<V>(&self, x: &V) -> Result<SparseVector<Kind<T, V::Item>>>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item>,
        Kind<T, V::Item>: Accumulate,
    {
        self.mul_sparse_with_level(x, default_level())
    }

    /// `A · x` for a dense `x`.
    pub fn mul_dense_with_level<R>(&self, x: &[R], level: DotLevel) -> Result<Vec<Kind<T, R>>>
    where
        R: Element,
        T: Promote<R>,
        Kind<T, R>: Accumulate,
    {
        if x.len() != self.cols {
            return Err(DotError::dimension_mismatch(self.cols, x.len()));
        }
        trace!(rows = self.rows, cols = self.cols, "sparse matrix-dense vector product");
        let mut accs = vec![<AccOf<T, R> as DotAccumulator>::with_level(level); self.rows];
        for (j, &xj) in x.iter().enumerate() {
            for p in self.col_ptr[j]..self.col_ptr[j + 1] {
                let (a, b) = promote(self.values[p], xj);
                <Kind<T, R> as Accumulate>::accumulate(&mut accs[self.row_idx[p]], &a, &b);
            }
        }
        Ok(accs.iter().map(|acc| acc.result()).collect())
    }

    pub fn mul_dense<R>(&self, x: &[R]) -> Result<Vec<Kind<T, R>>>
    where
        R: Element,
        T: Promote<R>,
        Kind<T, R>: Accumulate,
    {
        self.mul_dense_with_level(x, default_level())
    }

    /// Check the storage invariants.
    pub fn is_valid(&self) -> bool {
        self.cols.checked_add(1) == Some(self.col_ptr.len())
            && self.col_ptr.first() == Some(&0)
            && self.col_ptr.last() == Some(&self.row_idx.len())
            && self.row_idx.len() == self.values.len()
            && self.col_ptr.windows(2).all(|w| w[0] <= w[1])
            && (0..self.cols).all(|j| {
                let col = &self.row_idx[self.col_ptr[j]..self.col_ptr[j + 1]];
                col.windows(2).all(|w| w[0] < w[1]) && col.iter().all(|&i| i < self.rows)
            })
    }
}
