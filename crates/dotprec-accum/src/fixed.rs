//! Exact fixed-point accumulation of double products.
//!
//! The register is a two's-complement integer of `LIMBS` 64-bit words whose
//! least significant bit weighs `2^-2148`, the weight of the smallest product
//! of two subnormals. Products of finite doubles stay below `2^2048`, which
//! leaves `HEADROOM_BITS` bits for carries: the register cannot overflow before
//! `2^HEADROOM_BITS` maximal terms have been added.

use dotprec_core::exact::{decompose, ExactProduct};
use dotprec_core::RoundingMode;
use std::cmp::Ordering;

/// Number of 64-bit limbs.
pub const LIMBS: usize = 70;

/// Weight exponent of bit 0 is `-BIAS`.
pub const BIAS: i32 = 2148;

/// Bits above the largest representable product, excluding the sign bit.
pub const HEADROOM_BITS: u32 = (LIMBS as u32) * 64 - 1 - (2048 + BIAS as u32);

/// Bit index of the smallest subnormal `2^-1074`.
const SUBNORMAL_BIT: usize = (BIAS - 1074) as usize;

/// Exact sum of products, rounded only on request.
#[derive(Clone, PartialEq, Eq)]
pub struct FixedAccumulator {
    limbs: [u64; LIMBS],
}

impl Default for FixedAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FixedAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedAccumulator")
            .field("nearest", &self.round(RoundingMode::Nearest))
            .finish()
    }
}

impl FixedAccumulator {
    pub fn new() -> Self {
        Self { limbs: [0; LIMBS] }
    }

    /// Register holding exactly `x`.
    pub fn from_f64(x: f64) -> Self {
        let mut acc = Self::new();
        acc.add_f64(x);
        acc
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.limbs[LIMBS - 1] >> 63 == 1
    }

    /// Sign of the accumulated value.
    pub fn sign(&self) -> Ordering {
        if self.is_negative() {
            Ordering::Less
        } else if self.is_zero() {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }

    /// Add the exact product `a · b` of two finite doubles.
    pub fn add_product(&mut self, a: f64, b: f64) {
        let p = ExactProduct::new(a, b);
        self.add_exact(&p);
    }

    /// Add a finite double exactly.
    pub fn add_f64(&mut self, x: f64) {
        if x == 0.0 {
            return;
        }
        let (neg, mant, exp) = decompose(x);
        self.add_shifted(neg, mant as u128, exp);
    }

    /// Add an exact product.
    pub fn add_exact(&mut self, p: &ExactProduct) {
        if p.is_zero() {
            return;
        }
        self.add_shifted(p.is_negative(), p.mantissa(), p.exponent());
    }

    fn add_shifted(&mut self, neg: bool, mant: u128, exp: i32) {
        let shift = (exp + BIAS) as usize;
        let (idx, bit) = (shift / 64, (shift % 64) as u32);
        let lo = mant << bit;
        let hi = if bit == 0 { 0 } else { mant >> (128 - bit) };
        let words = [lo as u64, (lo >> 64) as u64, hi as u64];
        debug_assert!(idx + words.len() <= LIMBS, "product outside register");

        let mut carry = false;
        for (i, limb) in self.limbs.iter_mut().enumerate().skip(idx) {
            let w = words.get(i - idx).copied().unwrap_or(0);
            if i >= idx + words.len() && !carry {
                break;
            }
            let (r, c) = if neg {
                let (d, b1) = limb.overflowing_sub(w);
                let (d, b2) = d.overflowing_sub(carry as u64);
                (d, b1 || b2)
            } else {
                let (s, c1) = limb.overflowing_add(w);
                let (s, c2) = s.overflowing_add(carry as u64);
                (s, c1 || c2)
            };
            *limb = r;
            carry = c;
        }
        self.check_headroom();
    }

    /// Add another register.
    pub fn add_fixed(&mut self, other: &FixedAccumulator) {
        let mut carry = false;
        for (limb, &w) in self.limbs.iter_mut().zip(other.limbs.iter()) {
            let (s, c1) = limb.overflowing_add(w);
            let (s, c2) = s.overflowing_add(carry as u64);
            *limb = s;
            carry = c1 || c2;
        }
        self.check_headroom();
    }

    /// Subtract another register.
    pub fn sub_fixed(&mut self, other: &FixedAccumulator) {
        let mut borrow = false;
        for (limb, &w) in self.limbs.iter_mut().zip(other.limbs.iter()) {
            let (d, b1) = limb.overflowing_sub(w);
            let (d, b2) = d.overflowing_sub(borrow as u64);
            *limb = d;
            borrow = b1 || b2;
        }
        self.check_headroom();
    }

    /// Negate in place.
    pub fn negate(&mut self) {
        let mut carry = true;
        for limb in self.limbs.iter_mut() {
            let (s, c) = (!*limb).overflowing_add(carry as u64);
            *limb = s;
            carry = c;
        }
    }

    pub fn clear(&mut self) {
        self.limbs = [0; LIMBS];
    }

    /// Panics if the top limb is no longer a pure sign extension.
    #[inline]
    fn check_headroom(&self) {
        let top = self.limbs[LIMBS - 1];
        if top != 0 && top != u64::MAX {
            panic!(
                "exact accumulator overflow: more than 2^{HEADROOM_BITS} maximal terms accumulated"
            );
        }
    }

    fn magnitude(&self) -> FixedAccumulator {
        let mut mag = self.clone();
        if mag.is_negative() {
            mag.negate();
        }
        mag
    }

    /// Index of the most significant set bit of a nonnegative register.
    fn top_bit(&self) -> Option<usize> {
        self.limbs
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &w)| w != 0)
            .map(|(i, &w)| i * 64 + 63 - w.leading_zeros() as usize)
    }

    /// `len <= 64` bits starting at bit `start`.
    fn extract(&self, start: usize, len: usize) -> u64 {
        let (idx, bit) = (start / 64, start % 64);
        let lo = self.limbs.get(idx).copied().unwrap_or(0) >> bit;
        let hi = if bit == 0 {
            0
        } else {
            self.limbs.get(idx + 1).copied().unwrap_or(0) << (64 - bit)
        };
        let value = lo | hi;
        if len >= 64 {
            value
        } else {
            value & ((1u64 << len) - 1)
        }
    }

    #[inline]
    fn bit(&self, i: usize) -> bool {
        (self.limbs[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Check if any bit strictly below `end` is set.
    fn any_below(&self, end: usize) -> bool {
        let (idx, bit) = (end / 64, end % 64);
        if self.limbs[..idx].iter().any(|&w| w != 0) {
            return true;
        }
        bit > 0 && idx < LIMBS && self.limbs[idx] & ((1u64 << bit) - 1) != 0
    }

    /// The accumulated value rounded to a double in direction `mode`.
    pub fn round(&self, mode: RoundingMode) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let neg = self.is_negative();
        let mag = self.magnitude();
        let Some(top) = mag.top_bit() else {
            return 0.0;
        };

        // Rounding of the magnitude: away from zero, toward zero or nearest.
        let magnitude_mode = if neg { mode.mirrored() } else { mode };

        let shift = top.saturating_sub(52).max(SUBNORMAL_BIT);
        let mut m = mag.extract(shift, 53);
        let round_bit = mag.bit(shift - 1);
        let sticky = mag.any_below(shift - 1);
        let increment = match magnitude_mode {
            RoundingMode::Up => round_bit || sticky,
            RoundingMode::Down | RoundingMode::TowardZero => false,
            RoundingMode::Nearest => round_bit && (sticky || m & 1 == 1),
        };
        let mut shift = shift;
        if increment {
            m += 1;
            if m == 1u64 << 53 {
                m >>= 1;
                shift += 1;
            }
        }

        let bits = if m < 1u64 << 52 {
            // Subnormal (only reachable at the lowest shift).
            m
        } else {
            let biased = shift as i64 - (BIAS as i64 - 1075);
            if biased >= 0x7ff {
                let truncate = matches!(
                    magnitude_mode,
                    RoundingMode::Down | RoundingMode::TowardZero
                );
                let overflow = if truncate { f64::MAX } else { f64::INFINITY };
                return if neg { -overflow } else { overflow };
            }
            ((biased as u64) << 52) | (m & ((1u64 << 52) - 1))
        };
        let value = f64::from_bits(bits);
        if neg {
            -value
        } else {
            value
        }
    }
}

impl PartialOrd for FixedAccumulator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedAccumulator {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut diff = self.clone();
        diff.sub_fixed(other);
        diff.sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headroom() {
        assert_eq!(HEADROOM_BITS, 283);
    }

    #[test]
    fn test_round_of_single_values_is_identity() {
        for &x in &[1.0, -1.5, 0.1, 1e300, -1e-300, f64::MAX, f64::MIN_POSITIVE, f64::from_bits(1)] {
            let acc = FixedAccumulator::from_f64(x);
            for mode in [
                RoundingMode::Down,
                RoundingMode::Up,
                RoundingMode::Nearest,
                RoundingMode::TowardZero,
            ] {
                assert_eq!(acc.round(mode), x, "value {x:e} mode {mode:?}");
            }
        }
    }

    #[test]
    fn test_cancellation_is_exact() {
        let mut acc = FixedAccumulator::new();
        acc.add_f64(1e300);
        acc.add_f64(1.0);
        acc.add_f64(-1e300);
        assert_eq!(acc.round(RoundingMode::Nearest), 1.0);
        acc.add_f64(-1.0);
        assert!(acc.is_zero());
    }

    #[test]
    fn test_product_rounding_brackets() {
        let mut acc = FixedAccumulator::new();
        acc.add_product(0.1, 3.0);
        let down = acc.round(RoundingMode::Down);
        let up = acc.round(RoundingMode::Up);
        assert_eq!(up, down.next_up());
        assert_eq!(acc.round(RoundingMode::Nearest), 0.1 * 3.0);
        assert_eq!(acc.round(RoundingMode::TowardZero), down);

        acc.negate();
        assert_eq!(acc.round(RoundingMode::Down), -up);
        assert_eq!(acc.round(RoundingMode::Up), -down);
        assert_eq!(acc.round(RoundingMode::TowardZero), -down);
    }

    #[test]
    fn test_subnormal_products() {
        let tiny = f64::from_bits(1);
        let mut acc = FixedAccumulator::new();
        acc.add_product(tiny, tiny);
        assert!(!acc.is_zero());
        assert_eq!(acc.round(RoundingMode::Down), 0.0);
        assert_eq!(acc.round(RoundingMode::Up), tiny);
        assert_eq!(acc.round(RoundingMode::Nearest), 0.0);
    }

    #[test]
    fn test_overflowing_sum_rounds_per_mode() {
        let mut acc = FixedAccumulator::new();
        acc.add_f64(f64::MAX);
        acc.add_f64(f64::MAX);
        assert_eq!(acc.round(RoundingMode::Down), f64::MAX);
        assert_eq!(acc.round(RoundingMode::Up), f64::INFINITY);
        assert_eq!(acc.round(RoundingMode::Nearest), f64::INFINITY);
        acc.negate();
        assert_eq!(acc.round(RoundingMode::Up), f64::MIN);
        assert_eq!(acc.round(RoundingMode::Down), f64::NEG_INFINITY);
    }

    #[test]
    fn test_ordering() {
        let a = FixedAccumulator::from_f64(-2.0);
        let b = FixedAccumulator::from_f64(1e-300);
        assert!(a < b);
        assert_eq!(b.cmp(&b.clone()), Ordering::Equal);
        assert_eq!(a.sign(), Ordering::Less);
    }

    #[test]
    fn test_register_arithmetic() {
        let mut a = FixedAccumulator::from_f64(3.0);
        let b = FixedAccumulator::from_f64(0.5);
        a.add_fixed(&b);
        assert_eq!(a.round(RoundingMode::Nearest), 3.5);
        a.sub_fixed(&b);
        a.sub_fixed(&b);
        assert_eq!(a.round(RoundingMode::Nearest), 2.5);
    }
}
