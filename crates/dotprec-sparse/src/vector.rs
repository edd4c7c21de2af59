//! Sparse vectors with an arbitrary lower index bound.

use crate::slice::{SparseSlice, SparseSliceMut};
use crate::view::{Entries, SparseView};
use dotprec_core::{DotError, Element, Interval, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::ops::Neg;

/// A sparse vector over the logical index range `[lb, ub]`.
///
/// Stored indices are relative to `lb`, strictly increasing and below the
/// dimension. Explicit zeros may be stored; [`SparseVector::drop_zeros`]
/// removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawSparseVector<T>",
    bound(deserialize = "T: Element + Deserialize<'de>")
)]
pub struct SparseVector<T> {
    lb: isize,
    ub: isize,
    indices: Vec<usize>,
    values: Vec<T>,
}

/// Unchecked wire form of [`SparseVector`].
#[derive(Deserialize)]
struct RawSparseVector<T> {
    lb: isize,
    ub: isize,
    indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Element> TryFrom<RawSparseVector<T>> for SparseVector<T> {
    type Error = DotError;

    fn try_from(raw: RawSparseVector<T>) -> Result<Self> {
        let span = raw.ub.checked_sub(raw.lb).and_then(|d| d.checked_add(1));
        if !span.is_some_and(|n| n >= 0) {
            return Err(DotError::InvalidStorage(format!(
                "index range [{}, {}] is not a valid dimension",
                raw.lb, raw.ub
            )));
        }
        let v = Self {
            lb: raw.lb,
            ub: raw.ub,
            indices: raw.indices,
            values: raw.values,
        };
        if !v.is_valid() {
            return Err(DotError::InvalidStorage(format!(
                "{} indices for {} values, indices must be strictly increasing and below {}",
                v.indices.len(),
                v.values.len(),
                v.dim()
            )));
        }
        Ok(v)
    }
}

impl<T: Element> SparseVector<T> {
    /// Empty vector of dimension `n` indexed from 0.
    pub fn new(n: usize) -> Self {
        Self::with_lb(n, 0)
    }

    /// Empty vector of dimension `n` indexed from `lb`.
    pub fn with_lb(n: usize, lb: isize) -> Self {
        Self {
            lb,
            ub: lb + n as isize - 1,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Vector built from `(relative index, value)` pairs in strictly
    /// increasing index order.
    pub(crate) fn from_entries(lb: isize, n: usize, entries: impl Iterator<Item = (usize, T)>) -> Self {
        let mut v = Self::with_lb(n, lb);
        for (i, x) in entries {
            debug_assert!(i < n && v.indices.last().map_or(true, |&last| last < i));
            v.indices.push(i);
            v.values.push(x);
        }
        v
    }

    /// Copy of the non-zero elements of a dense vector, indexed from 0.
    pub fn from_dense(dense: &[T]) -> Self {
        Self::from_dense_with_lb(dense, 0)
    }

    pub fn from_dense_with_lb(dense: &[T], lb: isize) -> Self {
        Self::from_entries(
            lb,
            dense.len(),
            dense
                .iter()
                .enumerate()
                .filter(|(_, x)| !x.is_zero())
                .map(|(i, &x)| (i, x)),
        )
    }

    /// Vector of dimension `n` from unordered `(relative index, value)`
    /// pairs. Explicit zeros are dropped; repeated indices are rejected.
    pub fn from_triplets(n: usize, mut triplets: Vec<(usize, T)>) -> Result<Self> {
        triplets.sort_by_key(|&(i, _)| i);
        for pair in triplets.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(DotError::DuplicateIndex(format!("index {} given twice", pair[0].0)));
            }
        }
        if let Some(&(i, _)) = triplets.last() {
            if i >= n {
                return Err(DotError::IndexOutOfRange {
                    index: i as isize,
                    lb: 0,
                    ub: n as isize - 1,
                });
            }
        }
        Ok(Self::from_entries(
            0,
            n,
            triplets.into_iter().filter(|(_, x)| !x.is_zero()),
        ))
    }

    pub fn from_array(array: ArrayView1<'_, T>) -> Self {
        Self::from_entries(
            0,
            array.len(),
            array
                .iter()
                .enumerate()
                .filter(|(_, x)| !x.is_zero())
                .map(|(i, &x)| (i, x)),
        )
    }

    pub fn to_array(&self) -> Array1<T> {
        Array1::from_vec(self.to_dense())
    }

    /// Stored relative indices.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Stored values, parallel to [`SparseVector::indices`].
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consume the vector into `(relative index, value)` pairs.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (usize, T)> {
        self.indices.into_iter().zip(self.values)
    }

    /// Stored entries as `(logical index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (isize, &T)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(move |(&i, v)| (self.lb + i as isize, v))
    }

    /// Mutable access to element `i`, storing an explicit zero first if it
    /// is absent.
    pub fn get_mut(&mut self, i: isize) -> Result<&mut T> {
        let rel = self.relative(i)?;
        let pos = match self.indices.binary_search(&rel) {
            Ok(pos) => pos,
            Err(pos) => {
                self.indices.insert(pos, rel);
                self.values.insert(pos, T::zero());
                pos
            }
        };
        Ok(&mut self.values[pos])
    }

    /// Overwrite element `i`.
    pub fn set(&mut self, i: isize, value: T) -> Result<()> {
        *self.get_mut(i)? = value;
        Ok(())
    }

    /// Remove explicitly stored zeros.
    pub fn drop_zeros(&mut self) {
        let mut keep = 0;
        for pos in 0..self.indices.len() {
            if !self.values[pos].is_zero() {
                self.indices[keep] = self.indices[pos];
                self.values[keep] = self.values[pos];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    /// Permuted copy: element `perm[i]` of `self` becomes element `i` of the
    /// result. `perm` must be a permutation of `0..dim`.
    pub fn permute(&self, perm: &[usize]) -> Result<Self> {
        let n = self.dim();
        if perm.len() != n {
            return Err(DotError::dimension_mismatch(n, perm.len()));
        }
        let mut pinv = vec![usize::MAX; n];
        for (i, &j) in perm.iter().enumerate() {
            if j >= n {
                return Err(DotError::InvalidPermutation(format!(
                    "entry {j} at position {i} exceeds dimension {n}"
                )));
            }
            if pinv[j] != usize::MAX {
                return Err(DotError::InvalidPermutation(format!("{j} appears twice")));
            }
            pinv[j] = i;
        }
        let mut moved: Vec<(usize, T)> = self
            .indices
            .iter()
            .zip(self.values.iter())
            .map(|(&j, &v)| (pinv[j], v))
            .collect();
        moved.sort_unstable_by_key(|&(i, _)| i);
        let result = Self::from_entries(self.lb, n, moved.into_iter());
        debug_assert_eq!(result.nnz(), self.nnz());
        Ok(result)
    }

    /// Elementwise conversion to another element kind.
    pub fn convert<U>(&self) -> SparseVector<U>
    where
        U: Element + From<T>,
    {
        self.map(|&x| U::from(x))
    }

    /// Apply `f` to every stored element.
    pub fn map<U: Element>(&self, f: impl Fn(&T) -> U) -> SparseVector<U> {
        SparseVector {
            lb: self.lb,
            ub: self.ub,
            indices: self.indices.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }

    /// Change the dimension, dropping stored elements beyond the new end.
    pub fn resize(&mut self, n: usize) {
        let keep = self.indices.partition_point(|&i| i < n);
        self.indices.truncate(keep);
        self.values.truncate(keep);
        self.ub = self.lb + n as isize - 1;
    }

    /// Renumber the vector to start at `lb`.
    pub fn set_lb(&mut self, lb: isize) {
        let n = self.dim() as isize;
        self.lb = lb;
        self.ub = lb + n - 1;
    }

    /// Product with a scalar of the same kind.
    pub fn scale(&self, s: T) -> Self {
        self.map(|&x| x * s)
    }

    pub fn scale_assign(&mut self, s: T) {
        self.values.iter_mut().for_each(|x| *x = *x * s);
    }

    /// Quotient by a scalar; fails if `s` is or contains zero.
    pub fn div_scalar(&self, s: &T) -> Result<Self> {
        let values = self
            .values
            .iter()
            .map(|x| x.checked_div(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            lb: self.lb,
            ub: self.ub,
            indices: self.indices.clone(),
            values,
        })
    }

    /// Shared view of the logical range `[lo, hi]`.
    pub fn slice(&self, lo: isize, hi: isize) -> Result<SparseSlice<'_, T>> {
        let (start, dim) = self.range(lo, hi)?;
        let p0 = self.indices.partition_point(|&i| i < start);
        let p1 = self.indices.partition_point(|&i| i < start + dim);
        Ok(SparseSlice::new(
            lo,
            dim,
            start,
            &self.indices[p0..p1],
            &self.values[p0..p1],
        ))
    }

    /// Mutable view of the logical range `[lo, hi]`.
    pub fn slice_mut(&mut self, lo: isize, hi: isize) -> Result<SparseSliceMut<'_, T>> {
        let (start, dim) = self.range(lo, hi)?;
        Ok(SparseSliceMut::new(self, lo, start, dim))
    }

    /// Relative start and length of a logical range.
    fn range(&self, lo: isize, hi: isize) -> Result<(usize, usize)> {
        let start = self.relative(lo)?;
        if hi < lo - 1 {
            return Err(DotError::IndexOutOfRange {
                index: hi,
                lb: lo - 1,
                ub: self.ub,
            });
        }
        if hi >= lo {
            self.relative(hi)?;
        }
        Ok((start, (hi - lo + 1) as usize))
    }

    /// Replace the stored entries of the relative range `[start, start + dim)`
    /// with `entries`, whose indices are relative to `start`.
    pub(crate) fn splice_range(
        &mut self,
        start: usize,
        dim: usize,
        entries: impl Iterator<Item = (usize, T)>,
    ) {
        let p0 = self.indices.partition_point(|&i| i < start);
        let p1 = self.indices.partition_point(|&i| i < start + dim);
        let (idx, val): (Vec<usize>, Vec<T>) = entries
            .inspect(|&(i, _)| debug_assert!(i < dim))
            .map(|(i, v)| (i + start, v))
            .unzip();
        self.indices.splice(p0..p1, idx);
        self.values.splice(p0..p1, val);
    }

    /// Check the storage invariants.
    pub fn is_valid(&self) -> bool {
        self.indices.len() == self.values.len()
            && self.ub.checked_sub(self.lb).map_or(false, |d| d >= -1)
            && self.indices.windows(2).all(|w| w[0] < w[1])
            && self.indices.last().map_or(true, |&i| i < self.dim())
    }
}

impl<T: Element> SparseView for SparseVector<T> {
    type Item = T;

    #[inline]
    fn lb(&self) -> isize {
        self.lb
    }

    #[inline]
    fn dim(&self) -> usize {
        (self.ub - self.lb + 1) as usize
    }

    #[inline]
    fn entries(&self) -> Entries<'_, T> {
        Entries::new(&self.indices, &self.values, 0)
    }

    #[inline]
    fn nnz(&self) -> usize {
        self.indices.len()
    }
}

impl<T: Element> Neg for SparseVector<T> {
    type Output = SparseVector<T>;
    fn neg(mut self) -> SparseVector<T> {
        self.values.iter_mut().for_each(|x| *x = -*x);
        self
    }
}

impl<T: Element> Neg for &SparseVector<T> {
    type Output = SparseVector<T>;
    fn neg(self) -> SparseVector<T> {
        self.map(|&x| -x)
    }
}

impl SparseVector<Interval> {
    /// Lower bounds.
    pub fn inf(&self) -> SparseVector<f64> {
        self.map(|x| x.lo)
    }

    /// Upper bounds.
    pub fn sup(&self) -> SparseVector<f64> {
        self.map(|x| x.hi)
    }

    /// Midpoints.
    pub fn mid(&self) -> SparseVector<f64> {
        self.map(|x| x.mid())
    }

    /// Elementwise `{ |x| }`.
    pub fn abs(&self) -> SparseVector<Interval> {
        self.map(|x| x.abs())
    }

    /// Elementwise widths, rounded up.
    pub fn width(&self) -> SparseVector<f64> {
        self.map(|x| x.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseVector<Interval> {
        let mut v = SparseVector::new(5);
        v.set(1, Interval::new(1.0, 2.0)).unwrap();
        v.set(3, Interval::new(-1.0, 1.0)).unwrap();
        v
    }

    #[test]
    fn test_get_does_not_grow_but_get_mut_does() {
        let mut v = sample();
        assert_eq!(v.get(2).unwrap(), Interval::ZERO);
        assert_eq!(v.nnz(), 2);
        *v.get_mut(2).unwrap() = Interval::point(4.0);
        assert_eq!(v.nnz(), 3);
        assert_eq!(v.indices(), &[1, 2, 3]);
        assert!(v.is_valid());
    }

    #[test]
    fn test_out_of_range_access() {
        let mut v = sample();
        assert_eq!(
            v.get(5),
            Err(DotError::IndexOutOfRange {
                index: 5,
                lb: 0,
                ub: 4
            })
        );
        assert!(v.get_mut(-1).is_err());
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_lower_bound_renumbering() {
        let mut v = SparseVector::from_dense_with_lb(&[0.0, 2.0, 0.0, 3.0], 1);
        assert_eq!(v.lb(), 1);
        assert_eq!(v.ub(), 4);
        assert_eq!(v.get(2).unwrap(), 2.0);
        v.set_lb(-1);
        assert_eq!(v.get(0).unwrap(), 2.0);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, &2.0), (2, &3.0)]);
    }

    #[test]
    fn test_drop_zeros_keeps_value() {
        let mut v = sample();
        v.set(0, Interval::ZERO).unwrap();
        let dense = v.to_dense();
        assert_eq!(v.nnz(), 3);
        v.drop_zeros();
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.to_dense(), dense);
    }

    #[test]
    fn test_permute() {
        let v = SparseVector::from_dense(&[1.0, 0.0, 3.0, 0.0]);
        // element perm[i] moves to position i
        let p = v.permute(&[2, 3, 0, 1]).unwrap();
        assert_eq!(p.to_dense(), vec![3.0, 0.0, 1.0, 0.0]);
        assert_eq!(p.nnz(), v.nnz());
        assert!(p.is_valid());
        assert!(matches!(v.permute(&[0, 0, 1, 2]), Err(DotError::InvalidPermutation(_))));
        assert!(matches!(v.permute(&[0, 1]), Err(DotError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_from_triplets() {
        let v = SparseVector::from_triplets(4, vec![(3, 1.0), (0, 2.0), (1, 0.0)]).unwrap();
        assert_eq!(v.indices(), &[0, 3]);
        assert!(SparseVector::from_triplets(4, vec![(1, 1.0), (1, 2.0)]).is_err());
        assert!(SparseVector::from_triplets(2, vec![(2, 1.0)]).is_err());
    }

    #[test]
    fn test_resize_and_density() {
        let mut v = SparseVector::from_dense(&[1.0, 2.0, 0.0, 4.0]);
        assert_eq!(v.density(), 0.75);
        v.resize(2);
        assert_eq!(v.dim(), 2);
        assert_eq!(v.nnz(), 2);
        v.resize(6);
        assert_eq!(v.to_dense(), vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_array_interop() {
        let a = ndarray::arr1(&[0.0, 1.5, 0.0]);
        let v = SparseVector::from_array(a.view());
        assert_eq!(v.nnz(), 1);
        assert_eq!(v.to_array(), a);
    }

    #[test]
    fn test_interval_parts() {
        let v = sample();
        assert_eq!(v.inf().to_dense(), vec![0.0, 1.0, 0.0, -1.0, 0.0]);
        assert_eq!(v.sup().to_dense(), vec![0.0, 2.0, 0.0, 1.0, 0.0]);
        assert_eq!(v.abs().get(3).unwrap(), Interval::new(0.0, 1.0));
        let point: SparseVector<Interval> = SparseVector::from_dense(&[1.0, 0.0]).convert();
        assert_eq!(point.get(0).unwrap(), Interval::point(1.0));
    }

    #[test]
    fn test_scalar_operations() {
        let v = SparseVector::from_dense(&[2.0, 0.0, -4.0]);
        assert_eq!(v.scale(0.5).to_dense(), vec![1.0, 0.0, -2.0]);
        assert_eq!(v.div_scalar(&2.0).unwrap().to_dense(), vec![1.0, 0.0, -2.0]);
        assert_eq!(v.div_scalar(&0.0), Err(DotError::DivisionByZero));
        assert_eq!((-&v).to_dense(), vec![-2.0, 0.0, 4.0]);
    }

    #[test]
    fn test_deserialize_checks_storage() {
        let ok: SparseVector<f64> =
            serde_json::from_str(r#"{"lb":-1,"ub":1,"indices":[0,2],"values":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.to_dense(), vec![1.0, 0.0, 2.0]);
        assert_eq!(ok.lb(), -1);

        for bad in [
            r#"{"lb":0,"ub":1,"indices":[5,0],"values":[1.0]}"#,
            r#"{"lb":0,"ub":1,"indices":[1,0],"values":[1.0,2.0]}"#,
            r#"{"lb":0,"ub":1,"indices":[2],"values":[1.0]}"#,
            r#"{"lb":0,"ub":-5,"indices":[],"values":[]}"#,
        ] {
            let err = serde_json::from_str::<SparseVector<f64>>(bad).unwrap_err();
            assert!(err.to_string().contains("invalid sparse storage"), "{bad}: {err}");
        }
        let reversed = r#"{"lb":0,"ub":0,"indices":[0],"values":[{"lo":2.0,"hi":1.0}]}"#;
        assert!(serde_json::from_str::<SparseVector<Interval>>(reversed).is_err());
    }
}
