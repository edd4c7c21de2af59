//! Read access shared by sparse vectors and slices.

use crate::vector::SparseVector;
use dotprec_core::{DotError, Element, Result};

/// Stored entries of a sparse view in ascending index order, as
/// `(relative index, value)` pairs.
#[derive(Debug, Clone)]
pub struct Entries<'a, T> {
    indices: &'a [usize],
    values: &'a [T],
    offset: usize,
    pos: usize,
}

impl<'a, T> Entries<'a, T> {
    /// Entries of parallel index/value slices; `offset` is subtracted from
    /// every stored index.
    pub(crate) fn new(indices: &'a [usize], values: &'a [T], offset: usize) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self {
            indices,
            values,
            offset,
            pos: 0,
        }
    }

    /// Value stored at relative index `rel`, by binary search over the
    /// remaining entries.
    pub fn find(&self, rel: usize) -> Option<&'a T> {
        let stored = rel + self.offset;
        self.indices[self.pos..]
            .binary_search(&stored)
            .ok()
            .map(|p| &self.values[self.pos + p])
    }

    /// Relative index of the next entry without consuming it.
    #[inline]
    pub fn peek_index(&self) -> Option<usize> {
        self.indices.get(self.pos).map(|&i| i - self.offset)
    }
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (usize, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = *self.indices.get(self.pos)?;
        let v = &self.values[self.pos];
        self.pos += 1;
        Some((i - self.offset, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.indices.len() - self.pos;
        (n, Some(n))
    }
}

impl<T> ExactSizeIterator for Entries<'_, T> {}

/// A read-only sparse vector: a logical index range `[lb, ub]` and its
/// stored entries.
pub trait SparseView {
    type Item: Element;

    /// Logical index of the first element.
    fn lb(&self) -> isize;

    /// Number of elements, stored or not.
    fn dim(&self) -> usize;

    /// Stored entries with indices relative to `lb`.
    fn entries(&self) -> Entries<'_, Self::Item>;

    /// Logical index of the last element.
    #[inline]
    fn ub(&self) -> isize {
        self.lb() + self.dim() as isize - 1
    }

    #[inline]
    fn nnz(&self) -> usize {
        self.entries().len()
    }

    /// Relative position of logical index `i`.
    fn relative(&self, i: isize) -> Result<usize> {
        if i < self.lb() || i > self.ub() {
            return Err(DotError::IndexOutOfRange {
                index: i,
                lb: self.lb(),
                ub: self.ub(),
            });
        }
        Ok((i - self.lb()) as usize)
    }

    /// Element at logical index `i`; zero if not stored.
    fn get(&self, i: isize) -> Result<Self::Item> {
        let rel = self.relative(i)?;
        Ok(self
            .entries()
            .find(rel)
            .copied()
            .unwrap_or_else(Self::Item::zero))
    }

    /// Owned copy with the same bounds.
    fn to_sparse(&self) -> SparseVector<Self::Item> {
        SparseVector::from_entries(
            self.lb(),
            self.dim(),
            self.entries().map(|(i, &v)| (i, v)),
        )
    }

    /// Dense copy; absent entries become zero.
    fn to_dense(&self) -> Vec<Self::Item> {
        let mut out = vec![Self::Item::zero(); self.dim()];
        for (i, v) in self.entries() {
            out[i] = *v;
        }
        out
    }

    /// Fraction of stored elements.
    fn density(&self) -> f64 {
        if self.dim() == 0 {
            0.0
        } else {
            self.nnz() as f64 / self.dim() as f64
        }
    }

    /// Elementwise equality, treating absent entries as zero.
    fn sparse_eq<V>(&self, other: &V) -> bool
    where
        V: SparseView<Item = Self::Item>,
    {
        let zero = Self::Item::zero();
        self.dim() == other.dim()
            && union(self.entries(), other.entries())
                .all(|(_, a, b)| a.unwrap_or(&zero) == b.unwrap_or(&zero))
    }
}

/// Walk the union of two entry lists in ascending index order.
pub(crate) fn union<'a, A, B>(x: Entries<'a, A>, y: Entries<'a, B>) -> Union<'a, A, B> {
    Union { x, y }
}

pub(crate) struct Union<'a, A, B> {
    x: Entries<'a, A>,
    y: Entries<'a, B>,
}

impl<'a, A, B> Iterator for Union<'a, A, B> {
    type Item = (usize, Option<&'a A>, Option<&'a B>);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.x.peek_index(), self.y.peek_index()) {
            (None, None) => None,
            (Some(i), Some(j)) if i == j => {
                let (_, a) = self.x.next()?;
                let (_, b) = self.y.next()?;
                Some((i, Some(a), Some(b)))
            }
            (Some(i), Some(j)) if i < j => self.x.next().map(|(i, a)| (i, Some(a), None)),
            (Some(_), None) => self.x.next().map(|(i, a)| (i, Some(a), None)),
            _ => self.y.next().map(|(j, b)| (j, None, Some(b))),
        }
    }
}
