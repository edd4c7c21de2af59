//! Closed real intervals with outward-rounded arithmetic.

use crate::error::{DotError, Result};
use crate::round::{add_down, add_up, div_down, div_up, mul_down, mul_up, sub_down, sub_up};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, BitOr, Mul, MulAssign, Neg, RangeInclusive, Sub, SubAssign};
use std::str::FromStr;

/// A closed interval `[lo, hi]` with `lo <= hi`.
///
/// Every arithmetic operation rounds the lower bound down and the upper bound
/// up, so the result contains every value the operation can take on the
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

/// Unchecked wire form of [`Interval`].
#[derive(Deserialize)]
struct RawInterval {
    lo: f64,
    hi: f64,
}

impl TryFrom<RawInterval> for Interval {
    type Error = DotError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::try_new(raw.lo, raw.hi)
    }
}

impl Interval {
    /// `[0, 0]`.
    pub const ZERO: Interval = Interval { lo: 0.0, hi: 0.0 };

    /// `[-inf, +inf]`.
    pub const ENTIRE: Interval = Interval {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    /// Create a new interval.
    #[inline]
    pub fn new(lo: f64, hi: f64) -> Self {
        debug_assert!(lo <= hi, "Invalid interval: {lo} > {hi}");
        Self { lo, hi }
    }

    /// Create a new interval, rejecting `lo > hi` and NaN bounds.
    #[inline]
    pub fn try_new(lo: f64, hi: f64) -> Result<Self> {
        if lo <= hi {
            Ok(Self { lo, hi })
        } else {
            Err(DotError::InvalidInterval { lo, hi })
        }
    }

    /// Create a point interval.
    #[inline]
    pub fn point(value: f64) -> Self {
        Self {
            lo: value,
            hi: value,
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    /// Check if this interval contains a value.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Check if `other` is a subset of this interval.
    #[inline]
    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// Check if `other` lies in the interior of this interval.
    #[inline]
    pub fn interior_contains(&self, other: &Interval) -> bool {
        self.lo < other.lo && other.hi < self.hi
    }

    #[inline]
    pub fn contains_zero(&self) -> bool {
        self.contains(0.0)
    }

    /// Width rounded upward.
    #[inline]
    pub fn width(&self) -> f64 {
        sub_up(self.hi, self.lo)
    }

    /// Radius rounded upward.
    #[inline]
    pub fn rad(&self) -> f64 {
        // Halving is exact unless the width is subnormal; round that case up.
        let w = self.width();
        let half = w * 0.5;
        if half * 2.0 == w {
            half
        } else {
            half.next_up()
        }
    }

    /// A midpoint inside the interval (not an enclosure).
    #[inline]
    pub fn mid(&self) -> f64 {
        if self.lo == f64::NEG_INFINITY && self.hi == f64::INFINITY {
            return 0.0;
        }
        let m = self.lo * 0.5 + self.hi * 0.5;
        m.clamp(self.lo, self.hi)
    }

    /// Largest absolute value.
    #[inline]
    pub fn mag(&self) -> f64 {
        self.lo.abs().max(self.hi.abs())
    }

    /// Smallest absolute value.
    #[inline]
    pub fn mig(&self) -> f64 {
        if self.contains_zero() {
            0.0
        } else {
            self.lo.abs().min(self.hi.abs())
        }
    }

    /// Check if the bounds have exploded to infinity.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.lo.is_infinite() || self.hi.is_infinite()
    }

    /// `{ |x| : x in self }`.
    pub fn abs(&self) -> Interval {
        Interval::new(self.mig(), self.mag())
    }

    /// `{ x^2 : x in self }`, tighter than `self * self` for intervals
    /// straddling zero.
    pub fn sqr(&self) -> Interval {
        let m = self.mig();
        let big = self.mag();
        Interval::new(mul_down(m, m), mul_up(big, big))
    }

    /// Smallest interval containing both operands.
    #[inline]
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Overlap of both operands.
    #[inline]
    pub fn intersect(&self, other: &Interval) -> Result<Interval> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Ok(Interval { lo, hi })
        } else {
            Err(DotError::EmptyIntersection { index: None })
        }
    }

    /// Product with a point, rounded outward.
    pub fn scale(&self, s: f64) -> Interval {
        if s >= 0.0 {
            Interval::new(mul_down(self.lo, s), mul_up(self.hi, s))
        } else {
            Interval::new(mul_down(self.hi, s), mul_up(self.lo, s))
        }
    }

    /// Interval product, using the sign of both operands to evaluate only the
    /// corner products that can be extremal.
    pub fn mul_interval(&self, y: &Interval) -> Interval {
        let (a, b, c, d) = (self.lo, self.hi, y.lo, y.hi);
        if a >= 0.0 {
            if c >= 0.0 {
                Interval::new(mul_down(a, c), mul_up(b, d))
            } else if d <= 0.0 {
                Interval::new(mul_down(b, c), mul_up(a, d))
            } else {
                Interval::new(mul_down(b, c), mul_up(b, d))
            }
        } else if b <= 0.0 {
            if c >= 0.0 {
                Interval::new(mul_down(a, d), mul_up(b, c))
            } else if d <= 0.0 {
                Interval::new(mul_down(b, d), mul_up(a, c))
            } else {
                Interval::new(mul_down(a, d), mul_up(a, c))
            }
        } else if c >= 0.0 {
            Interval::new(mul_down(a, d), mul_up(b, d))
        } else if d <= 0.0 {
            Interval::new(mul_down(b, c), mul_up(a, c))
        } else {
            Interval::new(
                mul_down(a, d).min(mul_down(b, c)),
                mul_up(a, c).max(mul_up(b, d)),
            )
        }
    }

    /// Interval quotient. A divisor containing zero is rejected.
    pub fn div_interval(&self, y: &Interval) -> Result<Interval> {
        let (a, b, c, d) = (self.lo, self.hi, y.lo, y.hi);
        if y.contains_zero() {
            return Err(DotError::DivisionByZero);
        }
        let q = if c > 0.0 {
            if a >= 0.0 {
                Interval::new(div_down(a, d), div_up(b, c))
            } else if b <= 0.0 {
                Interval::new(div_down(a, c), div_up(b, d))
            } else {
                Interval::new(div_down(a, c), div_up(b, c))
            }
        } else if a >= 0.0 {
            Interval::new(div_down(b, d), div_up(a, c))
        } else if b <= 0.0 {
            Interval::new(div_down(b, c), div_up(a, d))
        } else {
            Interval::new(div_down(b, d), div_up(a, d))
        };
        Ok(q)
    }

    /// Add with explicit rounding on both bounds.
    #[inline]
    pub fn add_interval(&self, y: &Interval) -> Interval {
        Interval::new(add_down(self.lo, y.lo), add_up(self.hi, y.hi))
    }

    /// Subtract with explicit rounding on both bounds.
    #[inline]
    pub fn sub_interval(&self, y: &Interval) -> Interval {
        Interval::new(sub_down(self.lo, y.hi), sub_up(self.hi, y.lo))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::ZERO
    }
}

impl From<f64> for Interval {
    fn from(value: f64) -> Self {
        Interval::point(value)
    }
}

impl From<RangeInclusive<f64>> for Interval {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl Neg for Interval {
    type Output = Interval;
    fn neg(self) -> Interval {
        Interval {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}

impl Add for Interval {
    type Output = Interval;
    fn add(self, rhs: Interval) -> Interval {
        self.add_interval(&rhs)
    }
}

impl Sub for Interval {
    type Output = Interval;
    fn sub(self, rhs: Interval) -> Interval {
        self.sub_interval(&rhs)
    }
}

impl Mul for Interval {
    type Output = Interval;
    fn mul(self, rhs: Interval) -> Interval {
        self.mul_interval(&rhs)
    }
}

impl Mul<f64> for Interval {
    type Output = Interval;
    fn mul(self, rhs: f64) -> Interval {
        self.scale(rhs)
    }
}

impl BitOr for Interval {
    type Output = Interval;
    fn bitor(self, rhs: Interval) -> Interval {
        self.hull(&rhs)
    }
}

impl AddAssign for Interval {
    fn add_assign(&mut self, rhs: Interval) {
        *self = *self + rhs;
    }
}

impl SubAssign for Interval {
    fn sub_assign(&mut self, rhs: Interval) {
        *self = *self - rhs;
    }
}

impl MulAssign for Interval {
    fn mul_assign(&mut self, rhs: Interval) {
        *self = *self * rhs;
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}]", self.lo, self.hi)
    }
}

impl FromStr for Interval {
    type Err = DotError;

    /// Parse `[lo, hi]` or a single number (point interval).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            Some(inner) => {
                let (lo, hi) = inner
                    .split_once(',')
                    .ok_or_else(|| DotError::Parse(format!("expected `[lo, hi]`, got `{s}`")))?;
                Interval::try_new(parse_f64(lo)?, parse_f64(hi)?)
            }
            None => Ok(Interval::point(parse_f64(s)?)),
        }
    }
}

/// Parse a double, mapping failures into [`DotError::Parse`].
pub fn parse_f64(s: &str) -> Result<f64> {
    let s = s.trim();
    match s {
        "inf" | "+inf" | "Inf" => Ok(f64::INFINITY),
        "-inf" | "-Inf" => Ok(f64::NEG_INFINITY),
        _ => s
            .parse::<f64>()
            .map_err(|e| DotError::Parse(format!("invalid number `{s}`: {e}"))),
    }
}
