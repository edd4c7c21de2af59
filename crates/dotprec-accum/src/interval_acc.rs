//! Enclosing accumulation of interval products.

use crate::accumulator::Accumulator;
use dotprec_core::{
    default_level, DotConfig, DotError, DotLevel, ExactProduct, Interval, Result, RoundingMode,
};
use std::cmp::Ordering;

/// A pair of accumulators bounding a sum of interval products.
///
/// The lower accumulator receives the exact lower corner of every product and
/// the upper accumulator the exact upper corner, so only the final rounding
/// of each bound widens the enclosure.
#[derive(Debug, Clone)]
pub struct IntervalAccumulator {
    lo: Accumulator,
    hi: Accumulator,
}

impl Default for IntervalAccumulator {
    fn default() -> Self {
        Self::new(default_level())
    }
}

/// Pick the corner `(p, q)` whose exact product is smaller.
#[inline]
fn min_corner(c1: (f64, f64), c2: (f64, f64)) -> (f64, f64) {
    if ExactProduct::new(c1.0, c1.1) <= ExactProduct::new(c2.0, c2.1) {
        c1
    } else {
        c2
    }
}

#[inline]
fn max_corner(c1: (f64, f64), c2: (f64, f64)) -> (f64, f64) {
    if ExactProduct::new(c1.0, c1.1) >= ExactProduct::new(c2.0, c2.1) {
        c1
    } else {
        c2
    }
}

/// Lower and upper corners of `[a, b] · [c, d]` for bounded operands.
fn corners(x: &Interval, y: &Interval) -> ((f64, f64), (f64, f64)) {
    let (a, b, c, d) = (x.lo, x.hi, y.lo, y.hi);
    if a >= 0.0 {
        if c >= 0.0 {
            ((a, c), (b, d))
        } else if d <= 0.0 {
            ((b, c), (a, d))
        } else {
            ((b, c), (b, d))
        }
    } else if b <= 0.0 {
        if c >= 0.0 {
            ((a, d), (b, c))
        } else if d <= 0.0 {
            ((b, d), (a, c))
        } else {
            ((a, d), (a, c))
        }
    } else if c >= 0.0 {
        ((a, d), (b, d))
    } else if d <= 0.0 {
        ((b, c), (a, c))
    } else {
        (min_corner((a, d), (b, c)), max_corner((a, c), (b, d)))
    }
}

/// Check if a lower bound accumulator lies above an upper one.
fn bounds_cross(lo: &Accumulator, hi: &Accumulator) -> bool {
    match (lo.exact_value(), hi.exact_value()) {
        (Some(l), Some(h)) => l > h,
        _ => lo.round(RoundingMode::Down) > hi.round(RoundingMode::Up),
    }
}

impl IntervalAccumulator {
    pub fn new(level: DotLevel) -> Self {
        Self {
            lo: Accumulator::new(level),
            hi: Accumulator::new(level),
        }
    }

    pub fn with_config(config: &DotConfig) -> Self {
        Self::new(config.level)
    }

    /// Enclosure with the given bound accumulators.
    pub fn from_bounds(lo: Accumulator, hi: Accumulator) -> Result<Self> {
        if bounds_cross(&lo, &hi) {
            return Err(DotError::InvalidInterval {
                lo: lo.round(RoundingMode::Down),
                hi: hi.round(RoundingMode::Up),
            });
        }
        Ok(Self { lo, hi })
    }

    #[inline]
    pub fn level(&self) -> DotLevel {
        self.lo.level()
    }

    #[inline]
    pub fn lower(&self) -> &Accumulator {
        &self.lo
    }

    #[inline]
    pub fn upper(&self) -> &Accumulator {
        &self.hi
    }

    pub fn reset(&mut self) {
        self.lo.reset();
        self.hi.reset();
    }

    /// Add `x · y`.
    pub fn accumulate(&mut self, x: &Interval, y: &Interval) {
        if x.is_unbounded() || y.is_unbounded() {
            self.add_interval(&(*x * *y));
            return;
        }
        let ((la, lb), (ua, ub)) = corners(x, y);
        self.lo.accumulate(la, lb);
        self.hi.accumulate(ua, ub);
    }

    /// Add `a · b` for point operands.
    pub fn accumulate_point(&mut self, a: f64, b: f64) {
        self.lo.accumulate(a, b);
        self.hi.accumulate(a, b);
    }

    /// Add `a · y` for a point `a`.
    pub fn accumulate_mixed(&mut self, a: f64, y: &Interval) {
        if y.is_unbounded() || !a.is_finite() {
            self.add_interval(&y.scale(a));
            return;
        }
        if a >= 0.0 {
            self.lo.accumulate(a, y.lo);
            self.hi.accumulate(a, y.hi);
        } else {
            self.lo.accumulate(a, y.hi);
            self.hi.accumulate(a, y.lo);
        }
    }

    pub fn add_interval(&mut self, x: &Interval) {
        self.lo.add_scalar(x.lo);
        self.hi.add_scalar(x.hi);
    }

    pub fn sub_interval(&mut self, x: &Interval) {
        self.lo.sub_scalar(x.hi);
        self.hi.sub_scalar(x.lo);
    }

    pub fn add_scalar(&mut self, a: f64) {
        self.lo.add_scalar(a);
        self.hi.add_scalar(a);
    }

    /// Add a point accumulator to both bounds.
    pub fn add_point_acc(&mut self, acc: &Accumulator) {
        self.lo.add_acc(acc);
        self.hi.add_acc(acc);
    }

    pub fn add_acc(&mut self, other: &IntervalAccumulator) {
        self.lo.add_acc(&other.lo);
        self.hi.add_acc(&other.hi);
    }

    pub fn sub_acc(&mut self, other: &IntervalAccumulator) {
        self.lo.sub_acc(&other.hi);
        self.hi.sub_acc(&other.lo);
    }

    /// Negate in place.
    pub fn negate(&mut self) {
        std::mem::swap(&mut self.lo, &mut self.hi);
        self.lo.negate();
        self.hi.negate();
    }

    /// Widen to the hull with another accumulated enclosure.
    pub fn hull(&mut self, other: &IntervalAccumulator) {
        if self.lo.cmp_bounds(&other.lo, RoundingMode::Down) == Ordering::Greater {
            self.lo = other.lo.clone();
        }
        if self.hi.cmp_bounds(&other.hi, RoundingMode::Up) == Ordering::Less {
            self.hi = other.hi.clone();
        }
    }

    pub fn hull_interval(&mut self, x: &Interval) {
        let level = self.level();
        self.hull(&IntervalAccumulator {
            lo: Accumulator::from_scalar(x.lo, level),
            hi: Accumulator::from_scalar(x.hi, level),
        });
    }

    /// Narrow to the intersection with another accumulated enclosure.
    /// Fails without modifying `self` if the enclosures are disjoint.
    pub fn intersect(&mut self, other: &IntervalAccumulator) -> Result<()> {
        let lo = if self.lo.cmp_bounds(&other.lo, RoundingMode::Down) == Ordering::Less {
            &other.lo
        } else {
            &self.lo
        };
        let hi = if self.hi.cmp_bounds(&other.hi, RoundingMode::Up) == Ordering::Greater {
            &other.hi
        } else {
            &self.hi
        };
        if bounds_cross(lo, hi) {
            return Err(DotError::EmptyIntersection { index: None });
        }
        let (lo, hi) = (lo.clone(), hi.clone());
        self.lo = lo;
        self.hi = hi;
        Ok(())
    }

    pub fn intersect_interval(&mut self, x: &Interval) -> Result<()> {
        let level = self.level();
        self.intersect(&IntervalAccumulator {
            lo: Accumulator::from_scalar(x.lo, level),
            hi: Accumulator::from_scalar(x.hi, level),
        })
    }

    /// Enclosure of the accumulated sum.
    pub fn to_interval(&self) -> Interval {
        Interval::new(
            self.lo.round(RoundingMode::Down),
            self.hi.round(RoundingMode::Up),
        )
    }
}

impl std::ops::Neg for IntervalAccumulator {
    type Output = IntervalAccumulator;
    fn neg(mut self) -> IntervalAccumulator {
        self.negate();
        self
    }
}

impl std::ops::AddAssign<&Interval> for IntervalAccumulator {
    fn add_assign(&mut self, rhs: &Interval) {
        self.add_interval(rhs);
    }
}

impl std::ops::SubAssign<&Interval> for IntervalAccumulator {
    fn sub_assign(&mut self, rhs: &Interval) {
        self.sub_interval(rhs);
    }
}

impl std::ops::AddAssign<&IntervalAccumulator> for IntervalAccumulator {
    fn add_assign(&mut self, rhs: &IntervalAccumulator) {
        self.add_acc(rhs);
    }
}

impl std::ops::SubAssign<&IntervalAccumulator> for IntervalAccumulator {
    fn sub_assign(&mut self, rhs: &IntervalAccumulator) {
        self.sub_acc(rhs);
    }
}

impl std::ops::AddAssign<&Accumulator> for IntervalAccumulator {
    fn add_assign(&mut self, rhs: &Accumulator) {
        self.add_point_acc(rhs);
    }
}
