//! Exact products of two doubles.
//!
//! A product of two finite doubles is `±m · 2^e` with `m < 2^106`, which fits
//! a `u128` mantissa. Comparing such products needs no rounding at all, which
//! is what corner selection in interval accumulation and the underflow paths
//! of directed multiplication rely on.

use std::cmp::Ordering;

/// Split a finite double into `(negative, mantissa, exponent)` with
/// `|x| = mantissa · 2^exponent`.
#[inline]
pub fn decompose(x: f64) -> (bool, u64, i32) {
    debug_assert!(x.is_finite(), "decompose of non-finite value {x}");
    let bits = x.to_bits();
    let neg = bits >> 63 == 1;
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & ((1u64 << 52) - 1);
    if biased == 0 {
        (neg, frac, -1074)
    } else {
        (neg, frac | (1u64 << 52), biased - 1075)
    }
}

/// The exact value of `a · b` for finite `a`, `b`.
#[derive(Debug, Clone, Copy)]
pub struct ExactProduct {
    neg: bool,
    mant: u128,
    exp: i32,
}

impl ExactProduct {
    /// Exact product of two finite doubles.
    #[inline]
    pub fn new(a: f64, b: f64) -> Self {
        let (na, ma, ea) = decompose(a);
        let (nb, mb, eb) = decompose(b);
        let mant = ma as u128 * mb as u128;
        Self {
            neg: mant != 0 && (na != nb),
            mant,
            exp: ea + eb,
        }
    }

    /// Exact value of a single double.
    #[inline]
    pub fn from_f64(x: f64) -> Self {
        Self::new(x, 1.0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mant == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.neg
    }

    /// Integer significand, at most 106 bits wide.
    #[inline]
    pub fn mantissa(&self) -> u128 {
        self.mant
    }

    /// Binary exponent of the least significant significand bit.
    #[inline]
    pub fn exponent(&self) -> i32 {
        self.exp
    }

    /// Exact negation.
    #[inline]
    pub fn neg(self) -> Self {
        Self {
            neg: !self.neg && self.mant != 0,
            ..self
        }
    }

    /// Position just above the leading significand bit.
    #[inline]
    fn top(&self) -> i32 {
        self.exp + (128 - self.mant.leading_zeros() as i32)
    }

    /// Compare `|self|` and `|other|`.
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        match self.top().cmp(&other.top()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        // Equal leading positions bound the shift by the significand width.
        if self.exp >= other.exp {
            (self.mant << (self.exp - other.exp) as u32).cmp(&other.mant)
        } else {
            self.mant.cmp(&(other.mant << (other.exp - self.exp) as u32))
        }
    }
}

impl PartialEq for ExactProduct {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExactProduct {}

impl PartialOrd for ExactProduct {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactProduct {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.neg, other.neg) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_normal_and_subnormal() {
        let (neg, m, e) = decompose(-1.5);
        assert!(neg);
        assert_eq!(m as f64 * 2f64.powi(e), 1.5);

        let tiny = f64::from_bits(3);
        let (neg, m, e) = decompose(tiny);
        assert!(!neg);
        assert_eq!((m, e), (3, -1074));
    }

    #[test]
    fn test_products_compare_exactly() {
        // 0.1 * 0.3 and 0.3 * 0.1 are the same exact product.
        assert_eq!(ExactProduct::new(0.1, 0.3), ExactProduct::new(0.3, 0.1));
        // fl(0.1 * 3.0) differs from the exact product.
        let exact = ExactProduct::new(0.1, 3.0);
        let rounded = ExactProduct::from_f64(0.1 * 3.0);
        assert_ne!(exact, rounded);
        assert!(exact < rounded);
    }

    #[test]
    fn test_signed_ordering() {
        let a = ExactProduct::new(-2.0, 3.0);
        let b = ExactProduct::new(1.0, -5.0);
        let z = ExactProduct::new(0.0, -7.0);
        assert!(a < b);
        assert!(b < z);
        assert!(!z.is_negative());
        assert_eq!(z, ExactProduct::from_f64(0.0));
    }

    #[test]
    fn test_tiny_products_are_distinguished() {
        let min = f64::from_bits(1);
        let p1 = ExactProduct::new(min, min);
        let p2 = ExactProduct::new(min, f64::from_bits(2));
        assert!(p1 < p2);
        assert!(ExactProduct::from_f64(0.0) < p1);
    }
}
