//! Contiguous index ranges of a sparse vector.

use crate::vector::SparseVector;
use crate::view::{Entries, SparseView};
use dotprec_core::{DotError, Element, Result};

/// Read-only view of `[lb, lb + dim)` of a sparse vector.
///
/// The view keeps the logical indices of its parent until renumbered with
/// [`SparseSlice::set_lb`].
#[derive(Debug, Clone, Copy)]
pub struct SparseSlice<'a, T> {
    lb: isize,
    dim: usize,
    offset: usize,
    indices: &'a [usize],
    values: &'a [T],
}

impl<'a, T: Element> SparseSlice<'a, T> {
    pub(crate) fn new(
        lb: isize,
        dim: usize,
        offset: usize,
        indices: &'a [usize],
        values: &'a [T],
    ) -> Self {
        Self {
            lb,
            dim,
            offset,
            indices,
            values,
        }
    }

    pub fn set_lb(&mut self, lb: isize) {
        self.lb = lb;
    }
}

impl<T: Element> SparseView for SparseSlice<'_, T> {
    type Item = T;

    #[inline]
    fn lb(&self) -> isize {
        self.lb
    }

    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    fn entries(&self) -> Entries<'_, T> {
        Entries::new(self.indices, self.values, self.offset)
    }
}

/// Mutable view of `[lb, lb + dim)` of a sparse vector.
///
/// Writes go straight to the parent, so element positions are looked up
/// again on every access.
#[derive(Debug)]
pub struct SparseSliceMut<'a, T> {
    vec: &'a mut SparseVector<T>,
    lb: isize,
    start: usize,
    dim: usize,
}

impl<'a, T: Element> SparseSliceMut<'a, T> {
    pub(crate) fn new(vec: &'a mut SparseVector<T>, lb: isize, start: usize, dim: usize) -> Self {
        Self {
            vec,
            lb,
            start,
            dim,
        }
    }

    pub fn set_lb(&mut self, lb: isize) {
        self.lb = lb;
    }

    /// Logical index of relative position `rel` in the parent vector.
    #[inline]
    fn parent_index(&self, rel: usize) -> isize {
        self.vec.lb() + (self.start + rel) as isize
    }

    /// Mutable access to element `i`; see [`SparseVector::get_mut`].
    pub fn get_mut(&mut self, i: isize) -> Result<&mut T> {
        let rel = self.relative(i)?;
        let parent = self.parent_index(rel);
        self.vec.get_mut(parent)
    }

    pub fn set(&mut self, i: isize, value: T) -> Result<()> {
        *self.get_mut(i)? = value;
        Ok(())
    }

    /// Overwrite the range with the contents of `other`.
    pub fn assign<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView,
        T: From<V::Item>,
    {
        if other.dim() != self.dim {
            return Err(DotError::dimension_mismatch(self.dim, other.dim()));
        }
        let entries: Vec<(usize, T)> = other.entries().map(|(i, &v)| (i, T::from(v))).collect();
        self.replace(entries);
        Ok(())
    }

    /// Replace all stored entries of the range; indices are relative.
    pub(crate) fn replace(&mut self, entries: Vec<(usize, T)>) {
        self.vec.splice_range(self.start, self.dim, entries.into_iter());
    }
}

impl<T: Element> SparseView for SparseSliceMut<'_, T> {
    type Item = T;

    #[inline]
    fn lb(&self) -> isize {
        self.lb
    }

    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    fn entries(&self) -> Entries<'_, T> {
        let indices = self.vec.indices();
        let p0 = indices.partition_point(|&i| i < self.start);
        let p1 = indices.partition_point(|&i| i < self.start + self.dim);
        Entries::new(&indices[p0..p1], &self.vec.values()[p0..p1], self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseVector<f64> {
        SparseVector::from_dense(&[1.0, 0.0, 2.0, 0.0, 3.0, 4.0])
    }

    #[test]
    fn test_slice_keeps_parent_indices() {
        let v = sample();
        let s = v.slice(2, 4).unwrap();
        assert_eq!(s.lb(), 2);
        assert_eq!(s.ub(), 4);
        assert_eq!(s.nnz(), 2);
        assert_eq!(s.get(4).unwrap(), 3.0);
        assert!(s.get(5).is_err());
        assert_eq!(s.to_dense(), vec![2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_slice_renumbering() {
        let v = sample();
        let mut s = v.slice(2, 4).unwrap();
        s.set_lb(1);
        assert_eq!(s.get(1).unwrap(), 2.0);
        let owned = s.to_sparse();
        assert_eq!(owned.lb(), 1);
        assert_eq!(owned.indices(), &[0, 2]);
        assert!(owned.is_valid());
    }

    #[test]
    fn test_slice_bounds() {
        let v = sample();
        assert!(v.slice(-1, 2).is_err());
        assert!(v.slice(0, 6).is_err());
        assert_eq!(v.slice(3, 2).unwrap().dim(), 0);
    }

    #[test]
    fn test_mutable_slice_writes_through() {
        let mut v = sample();
        {
            let mut s = v.slice_mut(1, 3).unwrap();
            s.set(1, 7.0).unwrap();
            *s.get_mut(3).unwrap() = -1.0;
            assert_eq!(s.nnz(), 3);
            assert!(s.set(4, 1.0).is_err());
        }
        assert_eq!(v.to_dense(), vec![1.0, 7.0, 2.0, -1.0, 3.0, 4.0]);
        assert!(v.is_valid());
    }

    #[test]
    fn test_assign_replaces_range() {
        let mut v = sample();
        let src = SparseVector::from_dense(&[0.0, 5.0, 0.0]);
        v.slice_mut(2, 4).unwrap().assign(&src).unwrap();
        assert_eq!(v.to_dense(), vec![1.0, 0.0, 0.0, 5.0, 0.0, 4.0]);
        assert_eq!(v.nnz(), 3);
        assert!(v.is_valid());

        let short = SparseVector::<f64>::new(2);
        assert!(v.slice_mut(2, 4).unwrap().assign(&short).is_err());
    }
}
