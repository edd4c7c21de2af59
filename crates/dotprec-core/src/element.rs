//! Element kinds and the promotion rules between them.
//!
//! Vectors and accumulators are generic over the element kind; mixed-kind
//! operations first promote both operands to a common kind.

use crate::complex::{CInterval, Complex};
use crate::error::{DotError, Result};
use crate::interval::{parse_f64, Interval};
use std::fmt::{self, Debug, Display};
use std::ops::{Add, Mul, Neg, Sub};

/// The four numeric element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Point,
    Interval,
    Complex,
    ComplexInterval,
}

impl ElementKind {
    /// Check if the kind encloses sets of values.
    pub fn is_enclosure(self) -> bool {
        matches!(self, ElementKind::Interval | ElementKind::ComplexInterval)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, ElementKind::Complex | ElementKind::ComplexInterval)
    }
}

/// A value that can be stored in a sparse vector and combined elementwise.
pub trait Element:
    Copy
    + Default
    + PartialEq
    + Debug
    + Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    const KIND: ElementKind;

    #[inline]
    fn zero() -> Self {
        Self::default()
    }

    /// Check if the value is exactly zero (for intervals: `[0, 0]`).
    fn is_zero(&self) -> bool;

    /// Quotient; divisors that are (or contain) zero are rejected.
    fn checked_div(&self, rhs: &Self) -> Result<Self>;

    /// Parse the textual form produced by `Display`.
    fn parse(s: &str) -> Result<Self>;

    /// Write the value as an element of a vector's textual form.
    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// An element kind that denotes a set of values.
pub trait IntervalElement: Element {
    /// Smallest enclosure of both operands.
    fn hull(&self, other: &Self) -> Self;

    /// Common part of both operands.
    fn intersect(&self, other: &Self) -> Result<Self>;

    /// Check if `other` is a subset of `self`.
    fn encloses(&self, other: &Self) -> bool;
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Point;

    #[inline]
    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn checked_div(&self, rhs: &Self) -> Result<Self> {
        if *rhs == 0.0 {
            return Err(DotError::DivisionByZero);
        }
        Ok(self / rhs)
    }

    fn parse(s: &str) -> Result<Self> {
        parse_f64(s)
    }

    /// Always keeps a decimal point or exponent, as the bounds of an
    /// `Interval` do.
    fn write_text(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Element for Interval {
    const KIND: ElementKind = ElementKind::Interval;

    #[inline]
    fn is_zero(&self) -> bool {
        self.lo == 0.0 && self.hi == 0.0
    }

    fn checked_div(&self, rhs: &Self) -> Result<Self> {
        self.div_interval(rhs)
    }

    fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl Element for Complex {
    const KIND: ElementKind = ElementKind::Complex;

    #[inline]
    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }

    fn checked_div(&self, rhs: &Self) -> Result<Self> {
        Complex::checked_div(self, rhs)
    }

    fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl Element for CInterval {
    const KIND: ElementKind = ElementKind::ComplexInterval;

    #[inline]
    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    fn checked_div(&self, rhs: &Self) -> Result<Self> {
        CInterval::checked_div(self, rhs)
    }

    fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl IntervalElement for Interval {
    fn hull(&self, other: &Self) -> Self {
        Interval::hull(self, other)
    }

    fn intersect(&self, other: &Self) -> Result<Self> {
        Interval::intersect(self, other)
    }

    fn encloses(&self, other: &Self) -> bool {
        self.contains_interval(other)
    }
}

impl IntervalElement for CInterval {
    fn hull(&self, other: &Self) -> Self {
        CInterval::hull(self, other)
    }

    fn intersect(&self, other: &Self) -> Result<Self> {
        CInterval::intersect(self, other)
    }

    fn encloses(&self, other: &Self) -> bool {
        self.contains_cinterval(other)
    }
}

/// Common kind of an arithmetic combination of `Self` and `Rhs`.
pub trait Promote<Rhs: Element>: Element {
    type Output: Element + From<Self> + From<Rhs>;
}

/// Enclosure kind of the hull of `Self` and `Rhs`.
pub trait HullPromote<Rhs: Element>: Element {
    type Output: IntervalElement + From<Self> + From<Rhs>;
}

macro_rules! promote {
    ($($lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(
            impl Promote<$rhs> for $lhs {
                type Output = $out;
            }
        )*
    };
}

macro_rules! hull_promote {
    ($($lhs:ty, $rhs:ty => $out:ty;)*) => {
        $(
            impl HullPromote<$rhs> for $lhs {
                type Output = $out;
            }
        )*
    };
}

promote! {
    f64, f64 => f64;
    f64, Interval => Interval;
    f64, Complex => Complex;
    f64, CInterval => CInterval;
    Interval, f64 => Interval;
    Interval, Interval => Interval;
    Interval, Complex => CInterval;
    Interval, CInterval => CInterval;
    Complex, f64 => Complex;
    Complex, Interval => CInterval;
    Complex, Complex => Complex;
    Complex, CInterval => CInterval;
    CInterval, f64 => CInterval;
    CInterval, Interval => CInterval;
    CInterval, Complex => CInterval;
    CInterval, CInterval => CInterval;
}

hull_promote! {
    f64, f64 => Interval;
    f64, Interval => Interval;
    f64, Complex => CInterval;
    f64, CInterval => CInterval;
    Interval, f64 => Interval;
    Interval, Interval => Interval;
    Interval, Complex => CInterval;
    Interval, CInterval => CInterval;
    Complex, f64 => CInterval;
    Complex, Interval => CInterval;
    Complex, Complex => CInterval;
    Complex, CInterval => CInterval;
    CInterval, f64 => CInterval;
    CInterval, Interval => CInterval;
    CInterval, Complex => CInterval;
    CInterval, CInterval => CInterval;
}

/// Promote a pair of operands to their common kind.
#[inline]
pub fn promote<A, B>(a: A, b: B) -> (<A as Promote<B>>::Output, <A as Promote<B>>::Output)
where
    B: Element,
    A: Promote<B>,
{
    (a.into(), b.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of<A: Promote<B>, B: Element>() -> ElementKind {
        <<A as Promote<B>>::Output as Element>::KIND
    }

    fn hull_kind_of<A: HullPromote<B>, B: Element>() -> ElementKind {
        <<A as HullPromote<B>>::Output as Element>::KIND
    }

    #[test]
    fn test_promotion_table() {
        assert_eq!(kind_of::<f64, f64>(), ElementKind::Point);
        assert_eq!(kind_of::<f64, Interval>(), ElementKind::Interval);
        assert_eq!(kind_of::<Complex, f64>(), ElementKind::Complex);
        assert_eq!(kind_of::<Interval, Complex>(), ElementKind::ComplexInterval);
        assert_eq!(kind_of::<CInterval, f64>(), ElementKind::ComplexInterval);
    }

    #[test]
    fn test_hull_always_encloses() {
        assert_eq!(hull_kind_of::<f64, f64>(), ElementKind::Interval);
        assert_eq!(hull_kind_of::<Complex, Complex>(), ElementKind::ComplexInterval);
        assert!(hull_kind_of::<f64, Interval>().is_enclosure());
    }

    #[test]
    fn test_promote_converts_values() {
        let (a, b) = promote(2.0, Interval::new(1.0, 3.0));
        assert_eq!(a, Interval::point(2.0));
        assert_eq!(b, Interval::new(1.0, 3.0));
    }

    #[test]
    fn test_zero_and_division() {
        assert!(Interval::zero().is_zero());
        assert!(CInterval::zero().is_zero());
        assert!(!Interval::new(0.0, 1.0).is_zero());
        assert_eq!(1.0f64.checked_div(&0.0), Err(DotError::DivisionByZero));
        assert_eq!(<f64 as Element>::parse(" 1.5 ").unwrap(), 1.5);
    }

    struct Text<T>(T);

    impl<T: Element> fmt::Display for Text<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.write_text(f)
        }
    }

    #[test]
    fn test_text_keeps_float_form() {
        assert_eq!(Text(3.0).to_string(), "3.0");
        assert_eq!(Text(0.0).to_string(), "0.0");
        assert_eq!(Text(-0.25).to_string(), "-0.25");
        assert_eq!(Text(Interval::new(0.0, 1.0)).to_string(), "[0.0, 1.0]");
        assert_eq!(<f64 as Element>::parse(&Text(1e300).to_string()).unwrap(), 1e300);
    }
}
