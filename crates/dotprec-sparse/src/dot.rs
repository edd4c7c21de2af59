//! Dot products between sparse views and dense slices.
//!
//! Every product is routed through the accumulator of the promoted element
//! kind, so the result is rounded once regardless of the number of terms.
//! The `accumulate_*` forms add into an existing accumulator instead of
//! finalizing, which lets callers build longer expressions such as
//! `x·y + u·v - w`.

use crate::view::{union, SparseView};
use dotprec_accum::{Accumulate, DotAccumulator};
use dotprec_core::{default_level, promote, DotError, DotLevel, Element, Promote, Result};
use tracing::trace;

type Kind<A, B> = <A as Promote<B>>::Output;
type AccOf<A, B> = <Kind<A, B> as Accumulate>::Acc;

fn check_dims(n: usize, m: usize) -> Result<()> {
    if n != m {
        return Err(DotError::dimension_mismatch(n, m));
    }
    Ok(())
}

/// Add `x · y` to `acc`; only indices stored in both views contribute.
pub fn accumulate_dot<X, Y>(acc: &mut AccOf<X::Item, Y::Item>, x: &X, y: &Y) -> Result<()>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
    Kind<X::Item, Y::Item>: Accumulate,
{
    check_dims(x.dim(), y.dim())?;
    trace!(dim = x.dim(), nnz_x = x.nnz(), nnz_y = y.nnz(), "sparse dot");
    for (_, a, b) in union(x.entries(), y.entries()) {
        if let (Some(&a), Some(&b)) = (a, b) {
            let (a, b) = promote(a, b);
            <Kind<X::Item, Y::Item> as Accumulate>::accumulate(acc, &a, &b);
        }
    }
    Ok(())
}

/// Add `x · y` to `acc` for sparse `x` and dense `y`, in `O(nnz(x))`.
pub fn accumulate_dot_dense<X, B>(acc: &mut AccOf<X::Item, B>, x: &X, y: &[B]) -> Result<()>
where
    X: SparseView + ?Sized,
    B: Element,
    X::Item: Promote<B>,
    Kind<X::Item, B>: Accumulate,
{
    check_dims(x.dim(), y.len())?;
    trace!(dim = y.len(), nnz = x.nnz(), "sparse-dense dot");
    for (i, &a) in x.entries() {
        let (a, b) = promote(a, y[i]);
        <Kind<X::Item, B> as Accumulate>::accumulate(acc, &a, &b);
    }
    Ok(())
}

/// Add `x · y` to `acc` for dense `x` and sparse `y`.
pub fn accumulate_dense_dot<A, Y>(acc: &mut AccOf<A, Y::Item>, x: &[A], y: &Y) -> Result<()>
where
    A: Element + Promote<Y::Item>,
    Y: SparseView + ?Sized,
    Kind<A, Y::Item>: Accumulate,
{
    check_dims(x.len(), y.dim())?;
    trace!(dim = x.len(), nnz = y.nnz(), "dense-sparse dot");
    for (i, &b) in y.entries() {
        let (a, b) = promote(x[i], b);
        <Kind<A, Y::Item> as Accumulate>::accumulate(acc, &a, &b);
    }
    Ok(())
}

/// Add `x · y` to `acc` for two dense slices.
pub fn accumulate_dense_dot_dense<A, B>(acc: &mut AccOf<A, B>, x: &[A], y: &[B]) -> Result<()>
where
    A: Element + Promote<B>,
    B: Element,
    Kind<A, B>: Accumulate,
{
    check_dims(x.len(), y.len())?;
    for (&a, &b) in x.iter().zip(y) {
        let (a, b) = promote(a, b);
        <Kind<A, B> as Accumulate>::accumulate(acc, &a, &b);
    }
    Ok(())
}

/// `x · y` at the given level.
pub fn dot_with_level<X, Y>(x: &X, y: &Y, level: DotLevel) -> Result<Kind<X::Item, Y::Item>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
    Kind<X::Item, Y::Item>: Accumulate,
{
    let mut acc = <AccOf<X::Item, Y::Item> as DotAccumulator>::with_level(level);
    accumulate_dot(&mut acc, x, y)?;
    Ok(acc.result())
}

/// `x · y` at the process-wide default level.
pub fn dot<X, Y>(x: &X, y: &Y) -> Result<Kind<X::Item, Y::Item>>
where
    X: SparseView + ?Sized,
    Y: SparseView + ?Sized,
    X::Item: Promote<Y::Item>,
    Kind<X::Item, Y::Item>: Accumulate,
{
    dot_with_level(x, y, default_level())
}

/// Sparse `x` times dense `y` at the given level.
pub fn dot_dense_with_level<X, B>(x: &X, y: &[B], level: DotLevel) -> Result<Kind<X::Item, B>>
where
    X: SparseView + ?Sized,
    B: Element,
    X::Item: Promote<B>,
    Kind<X::Item, B>: Accumulate,
{
    let mut acc = <AccOf<X::Item, B> as DotAccumulator>::with_level(level);
    accumulate_dot_dense(&mut acc, x, y)?;
    Ok(acc.result())
}

/// Sparse `x` times dense `y` at the process-wide default level.
pub fn dot_dense<X, B>(x: &X, y: &[B]) -> Result<Kind<X::Item, B>>
where
    X: SparseView + ?Sized,
    B: Element,
    X::Item: Promote<B>,
    Kind<X::Item, B>: Accumulate,
{
    dot_dense_with_level(x, y, default_level())
}

/// Dense `x` times sparse `y` at the given level.
pub fn dense_dot_with_level<A, Y>(x: &[A], y: &Y, level: DotLevel) -> Result<Kind<A, Y::Item>>
where
    A: Element + Promote<Y::Item>,
    Y: SparseView + ?Sized,
    Kind<A, Y::Item>: Accumulate,
{
    let mut acc = <AccOf<A, Y::Item> as DotAccumulator>::with_level(level);
    accumulate_dense_dot(&mut acc, x, y)?;
    Ok(acc.result())
}

/// Dense `x` times sparse `y` at the process-wide default level.
pub fn dense_dot<A, Y>(x: &[A], y: &Y) -> Result<Kind<A, Y::Item>>
where
    A: Element + Promote<Y::Item>,
    Y: SparseView + ?Sized,
    Kind<A, Y::Item>: Accumulate,
{
    dense_dot_with_level(x, y, default_level())
}

/// Dense reference dot product.
pub fn dense_dot_dense_with_level<A, B>(x: &[A], y: &[B], level: DotLevel) -> Result<Kind<A, B>>
where
    A: Element + Promote<B>,
    B: Element,
    Kind<A, B>: Accumulate,
{
    let mut acc = <AccOf<A, B> as DotAccumulator>::with_level(level);
    accumulate_dense_dot_dense(&mut acc, x, y)?;
    Ok(acc.result())
}

/// Dense reference dot product at the process-wide default level.
pub fn dense_dot_dense<A, B>(x: &[A], y: &[B]) -> Result<Kind<A, B>>
where
    A: Element + Promote<B>,
    B: Element,
    Kind<A, B>: Accumulate,
{
    dense_dot_dense_with_level(x, y, default_level())
}
