//! Elementwise merges of two sparse views.
//!
//! Every merge walks the union of both index lists once, in
//! `O(nnz(x) + nnz(y))`. A position stored in only one operand is combined
//! with an exact zero, for hull and intersection as well as for sums. The
//! result has the bounds of the left operand and stores every union
//! position, including results that happen to be zero.

use crate::slice::SparseSliceMut;
use crate::vector::SparseVector;
use crate::view::{union, SparseView};
use dotprec_core::{DotError, Element, HullPromote, IntervalElement, Promote, Result};
use tracing::trace;

/// Element kind of `x ± y` for views `X` and `Y`.
pub type SumKind<X, Y> =
    <<X as SparseView>::Item as Promote<<Y as SparseView>::Item>>::Output;

/// Element kind of `x | y` for views `X` and `Y`.
pub type HullKind<X, Y> =
    <<X as SparseView>::Item as HullPromote<<Y as SparseView>::Item>>::Output;

fn merge_with<X, Y, C, F>(x: &X, y: &Y, op: &'static str, mut f: F) -> Result<SparseVector<C>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    C: Element,
    F: FnMut(usize, Option<&X::Item>, Option<&Y::Item>) -> Result<C>,
{
    if x.dim() != y.dim() {
        return Err(DotError::dimension_mismatch(x.dim(), y.dim()));
    }
    trace!(op, dim = x.dim(), nnz_x = x.nnz(), nnz_y = y.nnz(), "sparse merge");
    let merged = union(x.entries(), y.entries())
        .map(|(i, a, b)| f(i, a, b).map(|v| (i, v)))
        .collect::<Result<Vec<_>>>()?;
    Ok(SparseVector::from_entries(x.lb(), x.dim(), merged.into_iter()))
}

#[inline]
fn lift<A, C>(a: Option<&A>) -> C
where
    A: Element,
    C: Element + From<A>,
{
    a.map_or_else(C::zero, |&a| C::from(a))
}

/// Elementwise sum.
pub fn add<X, Y>(x: &X, y: &Y) -> Result<SparseVector<SumKind<X, Y>>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
{
    merge_with(x, y, "add", |_, a, b| {
        let a: SumKind<X, Y> = lift(a);
        let b: SumKind<X, Y> = lift(b);
        Ok(a + b)
    })
}

/// Elementwise difference.
pub fn sub<X, Y>(x: &X, y: &Y) -> Result<SparseVector<SumKind<X, Y>>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
{
    merge_with(x, y, "sub", |_, a, b| {
        let a: SumKind<X, Y> = lift(a);
        let b: SumKind<X, Y> = lift(b);
        Ok(a - b)
    })
}

/// Elementwise convex hull. An element stored on one side only is hulled
/// with zero.
pub fn hull<X, Y>(x: &X, y: &Y) -> Result<SparseVector<HullKind<X, Y>>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: HullPromote<Y::Item>,
{
    merge_with(x, y, "hull", |_, a, b| {
        let a: HullKind<X, Y> = lift(a);
        let b: HullKind<X, Y> = lift(b);
        Ok(a.hull(&b))
    })
}

/// Elementwise intersection. Fails at the first logical index (of `x`)
/// whose elements are disjoint; an element stored on one side only is
/// intersected with zero.
pub fn intersect<X, Y>(x: &X, y: &Y) -> Result<SparseVector<SumKind<X, Y>>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
    SumKind<X, Y>: IntervalElement,
{
    let lb = x.lb();
    merge_with(x, y, "intersect", |i, a, b| {
        let a: SumKind<X, Y> = lift(a);
        let b: SumKind<X, Y> = lift(b);
        a.intersect(&b).map_err(|e| e.at_index(lb + i as isize))
    })
}

impl<T: Element> SparseVector<T> {
    /// `self += other`
    pub fn add_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T>,
    {
        *self = add(&*self, other)?;
        Ok(())
    }

    /// `self -= other`
    pub fn sub_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T>,
    {
        *self = sub(&*self, other)?;
        Ok(())
    }

    /// `self |= other`
    pub fn hull_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: HullPromote<V::Item, Output = T>,
    {
        *self = hull(&*self, other)?;
        Ok(())
    }

    /// `self &= other`; `self` is unchanged on failure.
    pub fn intersect_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T> + IntervalElement,
    {
        *self = intersect(&*self, other)?;
        Ok(())
    }
}

impl<T: Element> SparseSliceMut<'_, T> {
    fn store(&mut self, merged: SparseVector<T>) {
        self.replace(merged.into_entries().collect());
    }

    /// `self += other`, written through to the parent vector.
    pub fn add_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T>,
    {
        let merged = add(&*self, other)?;
        self.store(merged);
        Ok(())
    }

    pub fn sub_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T>,
    {
        let merged = sub(&*self, other)?;
        self.store(merged);
        Ok(())
    }

    pub fn hull_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: HullPromote<V::Item, Output = T>,
    {
        let merged = hull(&*self, other)?;
        self.store(merged);
        Ok(())
    }

    /// `self &= other`; the parent is unchanged on failure.
    pub fn intersect_assign_view<V>(&mut self, other: &V) -> Result<()>
    where
        V: SparseView + ?Sized,
        T: Promote<V::Item, Output = T> + IntervalElement,
    {
        let merged = intersect(&*self, other)?;
        self.store(merged);
        Ok(())
    }
}
