//! Elementwise operations between a sparse view and a dense slice.
//!
//! The result is dense. Each routine visits every dense element once and
//! every stored sparse entry once.

use crate::view::SparseView;
use dotprec_core::{DotError, Element, HullPromote, IntervalElement, Promote, Result};
use tracing::trace;

type Kind<A, B> = <A as Promote<B>>::Output;
type HullOf<A, B> = <A as HullPromote<B>>::Output;

/// Walk `x` and `y` position by position; `f` gets the sparse element (if
/// stored) and the dense one.
fn zip_dense<V, B, C, F>(x: &V, y: &[B], op: &'static str, mut f: F) -> Result<Vec<C>>
where
    V: SparseView + ?Sized,
    F: FnMut(usize, Option<&V::Item>, &B) -> Result<C>,
{
    if x.dim() != y.len() {
        return Err(DotError::dimension_mismatch(x.dim(), y.len()));
    }
    trace!(op, dim = y.len(), nnz = x.nnz(), "sparse-dense merge");
    let mut entries = x.entries();
    let mut out = Vec::with_capacity(y.len());
    for (i, d) in y.iter().enumerate() {
        let s = if entries.peek_index() == Some(i) {
            entries.next().map(|(_, v)| v)
        } else {
            None
        };
        out.push(f(i, s, d)?);
    }
    Ok(out)
}

#[inline]
fn lift<A, C>(a: Option<&A>) -> C
where
    A: Element,
    C: Element + From<A>,
{
    a.map_or_else(C::zero, |&a| C::from(a))
}

/// `x + y` with sparse `x`.
pub fn add_dense<V, B>(x: &V, y: &[B]) -> Result<Vec<Kind<V::Item, B>>>
where
    V: SparseView + ?Sized,
    B: Element,
    V::Item: Promote<B>,
{
    zip_dense(x, y, "add", |_, a, &b| {
        let a: Kind<V::Item, B> = lift(a);
        let b: Kind<V::Item, B> = b.into();
        Ok(a + b)
    })
}

/// `x + y` with sparse `y`.
pub fn dense_add<A, V>(x: &[A], y: &V) -> Result<Vec<Kind<A, V::Item>>>
where
    A: Element + Promote<V::Item>,
    V: SparseView + ?Sized,
{
    zip_dense(y, x, "add", |_, b, &a| {
        let b: Kind<A, V::Item> = lift(b);
        Ok(<Kind<A, V::Item>>::from(a) + b)
    })
}

/// `x - y` with sparse `x`.
pub fn sub_dense<V, B>(x: &V, y: &[B]) -> Result<Vec<Kind<V::Item, B>>>
where
    V: SparseView + ?Sized,
    B: Element,
    V::Item: Promote<B>,
{
    zip_dense(x, y, "sub", |_, a, &b| {
        let a: Kind<V::Item, B> = lift(a);
        let b: Kind<V::Item, B> = b.into();
        Ok(a - b)
    })
}

/// `x - y` with sparse `y`.
pub fn dense_sub<A, V>(x: &[A], y: &V) -> Result<Vec<Kind<A, V::Item>>>
where
    A: Element + Promote<V::Item>,
    V: SparseView + ?Sized,
{
    zip_dense(y, x, "sub", |_, b, &a| {
        let b: Kind<A, V::Item> = lift(b);
        Ok(<Kind<A, V::Item>>::from(a) - b)
    })
}

/// `x | y` with sparse `x`.
pub fn hull_dense<V, B>(x: &V, y: &[B]) -> Result<Vec<HullOf<V::Item, B>>>
where
    V: SparseView + ?Sized,
    B: Element,
    V::Item: HullPromote<B>,
{
    zip_dense(x, y, "hull", |_, a, &b| {
        let a: HullOf<V::Item, B> = lift(a);
        Ok(a.hull(&b.into()))
    })
}

/// `x | y` with sparse `y`.
pub fn dense_hull<A, V>(x: &[A], y: &V) -> Result<Vec<HullOf<A, V::Item>>>
where
    A: Element + HullPromote<V::Item>,
    V: SparseView + ?Sized,
{
    zip_dense(y, x, "hull", |_, b, &a| {
        let b: HullOf<A, V::Item> = lift(b);
        Ok(<HullOf<A, V::Item>>::from(a).hull(&b))
    })
}

/// `x & y` with sparse `x`; errors carry the logical index of `x`.
pub fn intersect_dense<V, B>(x: &V, y: &[B]) -> Result<Vec<Kind<V::Item, B>>>
where
    V: SparseView + ?Sized,
    B: Element,
    V::Item: Promote<B>,
    Kind<V::Item, B>: IntervalElement,
{
    let lb = x.lb();
    zip_dense(x, y, "intersect", |i, a, &b| {
        let a: Kind<V::Item, B> = lift(a);
        a.intersect(&b.into())
            .map_err(|e| e.at_index(lb + i as isize))
    })
}

/// `x & y` with sparse `y`; errors carry the logical index of `y`.
pub fn dense_intersect<A, V>(x: &[A], y: &V) -> Result<Vec<Kind<A, V::Item>>>
where
    A: Element + Promote<V::Item>,
    V: SparseView + ?Sized,
    Kind<A, V::Item>: IntervalElement,
{
    let lb = y.lb();
    zip_dense(y, x, "intersect", |i, b, &a| {
        let b: Kind<A, V::Item> = lift(b);
        <Kind<A, V::Item>>::from(a)
            .intersect(&b)
            .map_err(|e| e.at_index(lb + i as isize))
    })
}
