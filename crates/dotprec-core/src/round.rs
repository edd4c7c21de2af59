//! Directed rounding on `f64`.
//!
//! Rust gives no access to the floating-point rounding mode, so every
//! operation is evaluated in round-to-nearest and then corrected by one ulp
//! using an error-free transformation of the same operation:
//!
//! - addition: TwoSum
//! - multiplication: TwoProduct via FMA
//! - division: FMA residual `a - q·b`
//!
//! The transformations are exact unless the result is close to the underflow
//! range; there the sign of the rounding error is decided with
//! [`ExactProduct`] comparisons instead.

use crate::exact::ExactProduct;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rounding direction of a single operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Toward negative infinity.
    Down,
    /// Toward positive infinity.
    Up,
    /// To nearest, ties to even.
    #[default]
    Nearest,
    /// Toward zero.
    TowardZero,
}

impl RoundingMode {
    /// The mode that rounds `-x` the way `self` rounds `x`.
    pub fn mirrored(self) -> Self {
        match self {
            RoundingMode::Down => RoundingMode::Up,
            RoundingMode::Up => RoundingMode::Down,
            other => other,
        }
    }
}

/// Unit roundoff `2^-53`.
pub const UNIT_ROUNDOFF: f64 = f64::EPSILON / 2.0;

/// Smallest positive subnormal `2^-1074`.
pub const MIN_SUBNORMAL: f64 = f64::from_bits(1);

/// Below this magnitude (`2^-969`) the error term of a product or quotient
/// may itself underflow.
pub const EFT_THRESHOLD: f64 = f64::MIN_POSITIVE * 9_007_199_254_740_992.0;

/// Error-free addition: `s + e == a + b` exactly, `s = fl(a + b)`.
#[inline]
pub fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// Error-free multiplication: `p + e == a · b` exactly unless `|p|` is below
/// [`EFT_THRESHOLD`].
#[inline]
pub fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// Move the nearest result one ulp according to the sign of the rounding
/// error `err = exact - value`.
#[inline]
fn nudge(value: f64, err: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::Nearest => value,
        RoundingMode::Down if err < 0.0 => value.next_down(),
        RoundingMode::Up if err > 0.0 => value.next_up(),
        RoundingMode::TowardZero if value > 0.0 && err < 0.0 => value.next_down(),
        RoundingMode::TowardZero if value < 0.0 && err > 0.0 => value.next_up(),
        _ => value,
    }
}

#[inline]
fn sign_of(ord: Ordering) -> f64 {
    match ord {
        Ordering::Less => -1.0,
        Ordering::Equal => 0.0,
        Ordering::Greater => 1.0,
    }
}

/// Result of a finite operation that overflowed to `value = ±inf` in
/// round-to-nearest.
#[inline]
fn overflowed(value: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::Nearest => value,
        RoundingMode::Down if value > 0.0 => f64::MAX,
        RoundingMode::Up if value < 0.0 => f64::MIN,
        RoundingMode::TowardZero => value.signum() * f64::MAX,
        _ => value,
    }
}

/// `a + b` rounded in direction `mode`.
pub fn add(a: f64, b: f64, mode: RoundingMode) -> f64 {
    let (s, e) = two_sum(a, b);
    if !s.is_finite() {
        if s.is_infinite() && a.is_finite() && b.is_finite() {
            return overflowed(s, mode);
        }
        return s;
    }
    nudge(s, e, mode)
}

/// `a - b` rounded in direction `mode`.
#[inline]
pub fn sub(a: f64, b: f64, mode: RoundingMode) -> f64 {
    add(a, -b, mode)
}

/// `a · b` rounded in direction `mode`, IEEE semantics for special values.
pub fn mul(a: f64, b: f64, mode: RoundingMode) -> f64 {
    let (p, e) = two_prod(a, b);
    if !p.is_finite() {
        if p.is_infinite() && a.is_finite() && b.is_finite() {
            return overflowed(p, mode);
        }
        return p;
    }
    if p.abs() < EFT_THRESHOLD && a != 0.0 && b != 0.0 {
        let exact = ExactProduct::new(a, b);
        return nudge(p, sign_of(exact.cmp(&ExactProduct::from_f64(p))), mode);
    }
    nudge(p, e, mode)
}

/// `a · b` for interval bounds: like [`mul`], but `0 · ±inf = 0`.
#[inline]
pub fn mul_bound(a: f64, b: f64, mode: RoundingMode) -> f64 {
    if a == 0.0 || b == 0.0 {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else {
            0.0
        }
    } else {
        mul(a, b, mode)
    }
}

/// `a / b` rounded in direction `mode`. Division by zero follows IEEE; callers
/// that need to reject it check the divisor first.
pub fn div(a: f64, b: f64, mode: RoundingMode) -> f64 {
    let q = a / b;
    if !q.is_finite() {
        if q.is_infinite() && a.is_finite() && b.is_finite() && b != 0.0 {
            return overflowed(q, mode);
        }
        return q;
    }
    if b.is_infinite() || a == 0.0 {
        return q;
    }
    // sign(a/b - q) == sign(a - q·b) · sign(b)
    let residual_sign = if a.abs() < EFT_THRESHOLD || q.abs() < EFT_THRESHOLD {
        sign_of(ExactProduct::from_f64(a).cmp(&ExactProduct::new(q, b)))
    } else {
        (-q).mul_add(b, a)
    };
    let err = if b > 0.0 { residual_sign } else { -residual_sign };
    nudge(q, err, mode)
}

#[inline]
pub fn add_down(a: f64, b: f64) -> f64 {
    add(a, b, RoundingMode::Down)
}

#[inline]
pub fn add_up(a: f64, b: f64) -> f64 {
    add(a, b, RoundingMode::Up)
}

#[inline]
pub fn sub_down(a: f64, b: f64) -> f64 {
    sub(a, b, RoundingMode::Down)
}

#[inline]
pub fn sub_up(a: f64, b: f64) -> f64 {
    sub(a, b, RoundingMode::Up)
}

#[inline]
pub fn mul_down(a: f64, b: f64) -> f64 {
    mul_bound(a, b, RoundingMode::Down)
}

#[inline]
pub fn mul_up(a: f64, b: f64) -> f64 {
    mul_bound(a, b, RoundingMode::Up)
}

#[inline]
pub fn div_down(a: f64, b: f64) -> f64 {
    div(a, b, RoundingMode::Down)
}

#[inline]
pub fn div_up(a: f64, b: f64) -> f64 {
    div(a, b, RoundingMode::Up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    fn exact(x: f64) -> BigRational {
        BigRational::from_float(x).unwrap()
    }

    #[test]
    fn test_two_sum_is_exact() {
        let (s, e) = two_sum(1.0, 1e-20);
        assert_eq!(s, 1.0);
        assert_eq!(exact(s) + exact(e), exact(1.0) + exact(1e-20));
    }

    #[test]
    fn test_add_brackets_exact_sum() {
        let (a, b) = (0.1, 0.2);
        let lo = add_down(a, b);
        let hi = add_up(a, b);
        let sum = exact(a) + exact(b);
        assert!(exact(lo) <= sum && sum <= exact(hi));
        assert_eq!(hi, lo.next_up());
    }

    #[test]
    fn test_exact_operations_do_not_move() {
        assert_eq!(add_down(1.0, 2.0), 3.0);
        assert_eq!(add_up(1.0, 2.0), 3.0);
        assert_eq!(mul_down(1.5, 4.0), 6.0);
        assert_eq!(mul_up(1.5, 4.0), 6.0);
        assert_eq!(div_down(1.0, 4.0), 0.25);
        assert_eq!(div_up(1.0, 4.0), 0.25);
    }

    #[test]
    fn test_division_brackets_one_third() {
        let lo = div_down(1.0, 3.0);
        let hi = div_up(1.0, 3.0);
        let third = BigRational::new(1.into(), 3.into());
        assert!(exact(lo) < third && third < exact(hi));
        assert_eq!(hi, lo.next_up());

        let lo = div_down(1.0, -3.0);
        let hi = div_up(1.0, -3.0);
        assert!(exact(lo) < -third.clone() && -third < exact(hi));
    }

    #[test]
    fn test_underflowing_product() {
        let tiny = MIN_SUBNORMAL;
        // 2^-1074 * 0.5 rounds to zero (ties to even) but is positive.
        assert_eq!(mul(tiny, 0.5, RoundingMode::Nearest), 0.0);
        assert_eq!(mul(tiny, 0.5, RoundingMode::Down), 0.0);
        assert_eq!(mul(tiny, 0.5, RoundingMode::Up), tiny);
        assert_eq!(mul(-tiny, 0.5, RoundingMode::Down), -tiny);
    }

    #[test]
    fn test_overflow_saturates_in_the_safe_direction() {
        assert_eq!(add(f64::MAX, f64::MAX, RoundingMode::Down), f64::MAX);
        assert_eq!(add(f64::MAX, f64::MAX, RoundingMode::Up), f64::INFINITY);
        assert_eq!(mul(-f64::MAX, 2.0, RoundingMode::Up), f64::MIN);
        assert_eq!(mul(-f64::MAX, 2.0, RoundingMode::TowardZero), f64::MIN);
    }

    #[test]
    fn test_toward_zero() {
        let v = div(1.0, 3.0, RoundingMode::TowardZero);
        assert_eq!(v, div_down(1.0, 3.0));
        let v = div(-1.0, 3.0, RoundingMode::TowardZero);
        assert_eq!(v, div_up(-1.0, 3.0));
    }

    #[test]
    fn test_zero_times_infinity_for_bounds() {
        assert_eq!(mul_down(0.0, f64::INFINITY), 0.0);
        assert!(mul(0.0, f64::INFINITY, RoundingMode::Down).is_nan());
    }
}
