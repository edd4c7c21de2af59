//! Point complex numbers and rectangular complex intervals.

use crate::error::{DotError, Result};
use crate::interval::{parse_f64, Interval};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// A complex number with round-to-nearest arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    pub fn conj(&self) -> Complex {
        Complex::new(self.re, -self.im)
    }

    /// Quotient; a zero divisor is rejected.
    pub fn checked_div(&self, rhs: &Complex) -> Result<Complex> {
        let den = rhs.re * rhs.re + rhs.im * rhs.im;
        if den == 0.0 {
            return Err(DotError::DivisionByZero);
        }
        let num = *self * rhs.conj();
        Ok(Complex::new(num.re / den, num.im / den))
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Complex::new(re, 0.0)
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Neg for Complex {
    type Output = Complex;
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.re, self.im)
    }
}

impl FromStr for Complex {
    type Err = DotError;

    /// Parse `(re, im)` or a single real number.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match strip_parens(s) {
            Some(inner) => {
                let (re, im) = inner
                    .split_once(',')
                    .ok_or_else(|| DotError::Parse(format!("expected `(re, im)`, got `{s}`")))?;
                Ok(Complex::new(parse_f64(re)?, parse_f64(im)?))
            }
            None => Ok(Complex::from(parse_f64(s)?)),
        }
    }
}

/// A rectangular complex interval `re + i·im`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CInterval {
    pub re: Interval,
    pub im: Interval,
}

impl CInterval {
    pub const ZERO: CInterval = CInterval {
        re: Interval::ZERO,
        im: Interval::ZERO,
    };

    #[inline]
    pub fn new(re: Interval, im: Interval) -> Self {
        Self { re, im }
    }

    /// Check if the rectangle contains a point.
    #[inline]
    pub fn contains(&self, z: &Complex) -> bool {
        self.re.contains(z.re) && self.im.contains(z.im)
    }

    /// Check if `other` is a subset of this rectangle.
    #[inline]
    pub fn contains_cinterval(&self, other: &CInterval) -> bool {
        self.re.contains_interval(&other.re) && self.im.contains_interval(&other.im)
    }

    #[inline]
    pub fn conj(&self) -> CInterval {
        CInterval::new(self.re, -self.im)
    }

    pub fn hull(&self, other: &CInterval) -> CInterval {
        CInterval::new(self.re.hull(&other.re), self.im.hull(&other.im))
    }

    /// Componentwise intersection; empty if either component is empty.
    pub fn intersect(&self, other: &CInterval) -> Result<CInterval> {
        Ok(CInterval::new(
            self.re.intersect(&other.re)?,
            self.im.intersect(&other.im)?,
        ))
    }

    /// Enclosure of the quotient, computed as `x · conj(y) / |y|^2`.
    /// Divisors whose squared modulus encloses zero are rejected.
    pub fn checked_div(&self, rhs: &CInterval) -> Result<CInterval> {
        let den = rhs.re.sqr() + rhs.im.sqr();
        let num = *self * rhs.conj();
        Ok(CInterval::new(
            num.re.div_interval(&den)?,
            num.im.div_interval(&den)?,
        ))
    }
}

impl From<f64> for CInterval {
    fn from(re: f64) -> Self {
        CInterval::new(Interval::point(re), Interval::ZERO)
    }
}

impl From<Interval> for CInterval {
    fn from(re: Interval) -> Self {
        CInterval::new(re, Interval::ZERO)
    }
}

impl From<Complex> for CInterval {
    fn from(z: Complex) -> Self {
        CInterval::new(Interval::point(z.re), Interval::point(z.im))
    }
}

impl Add for CInterval {
    type Output = CInterval;
    fn add(self, rhs: CInterval) -> CInterval {
        CInterval::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for CInterval {
    type Output = CInterval;
    fn sub(self, rhs: CInterval) -> CInterval {
        CInterval::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for CInterval {
    type Output = CInterval;
    fn mul(self, rhs: CInterval) -> CInterval {
        CInterval::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Neg for CInterval {
    type Output = CInterval;
    fn neg(self) -> CInterval {
        CInterval::new(-self.re, -self.im)
    }
}

impl fmt::Display for CInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.re, self.im)
    }
}

impl FromStr for CInterval {
    type Err = DotError;

    /// Parse `([a, b], [c, d])` or a single real interval.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match strip_parens(s) {
            Some(inner) => {
                // The separator is the comma following the closing bracket of
                // the real part.
                let close = inner
                    .find(']')
                    .ok_or_else(|| DotError::Parse(format!("expected `([a, b], [c, d])`, got `{s}`")))?;
                let (re, rest) = inner.split_at(close + 1);
                let im = rest
                    .trim_start()
                    .strip_prefix(',')
                    .ok_or_else(|| DotError::Parse(format!("missing imaginary part in `{s}`")))?;
                Ok(CInterval::new(re.parse()?, im.parse()?))
            }
            None => Ok(CInterval::from(s.parse::<Interval>()?)),
        }
    }
}

fn strip_parens(s: &str) -> Option<&str> {
    s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_product_enclosed() {
        let x = Complex::new(1.0, 2.0);
        let y = Complex::new(3.0, -1.0);
        let p = x * y;
        assert_eq!(p, Complex::new(5.0, 5.0));
        let enclosure = CInterval::from(x) * CInterval::from(y);
        assert!(enclosure.contains(&p));
    }

    #[test]
    fn test_complex_division() {
        let x = Complex::new(5.0, 5.0);
        let y = Complex::new(3.0, -1.0);
        assert_eq!(x.checked_div(&y).unwrap(), Complex::new(1.0, 2.0));
        assert_eq!(x.checked_div(&Complex::ZERO), Err(DotError::DivisionByZero));
    }

    #[test]
    fn test_cinterval_division_encloses_point_quotient() {
        let x = CInterval::from(Complex::new(5.0, 5.0));
        let y = CInterval::from(Complex::new(3.0, -1.0));
        let q = x.checked_div(&y).unwrap();
        assert!(q.contains(&Complex::new(1.0, 2.0)));

        let around_zero = CInterval::new(Interval::new(-1.0, 1.0), Interval::ZERO);
        assert_eq!(x.checked_div(&around_zero), Err(DotError::DivisionByZero));
    }

    #[test]
    fn test_cinterval_intersection_needs_both_parts() {
        let a = CInterval::new(Interval::new(0.0, 1.0), Interval::new(0.0, 1.0));
        let b = CInterval::new(Interval::new(0.5, 2.0), Interval::new(3.0, 4.0));
        assert!(a.intersect(&b).is_err());
        let c = CInterval::new(Interval::new(0.5, 2.0), Interval::new(0.5, 4.0));
        assert_eq!(
            a.intersect(&c).unwrap(),
            CInterval::new(Interval::new(0.5, 1.0), Interval::new(0.5, 1.0))
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let z = Complex::new(-1.5, 0.25);
        assert_eq!(z.to_string().parse::<Complex>().unwrap(), z);
        let c = CInterval::new(Interval::new(-1.0, 2.0), Interval::new(0.5, 0.75));
        assert_eq!(c.to_string().parse::<CInterval>().unwrap(), c);
    }
}
