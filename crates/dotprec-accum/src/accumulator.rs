//! Dot-product accumulator with selectable accuracy level.

use crate::fixed::FixedAccumulator;
use dotprec_core::round::{
    add_up, mul_up, sub_down, sub_up, two_prod, two_sum, EFT_THRESHOLD, MIN_SUBNORMAL,
    UNIT_ROUNDOFF,
};
use dotprec_core::{default_level, DotConfig, DotLevel, Interval, RoundingMode};
use std::cmp::Ordering;
use std::ops::{AddAssign, Neg, SubAssign};
use tracing::warn;

#[derive(Debug, Clone)]
enum State {
    /// Level 0.
    Exact(Box<FixedAccumulator>),
    /// Level 1.
    Float { sum: f64 },
    /// Level k >= 2, `parts.len() == k`.
    Expansion { parts: Vec<f64> },
}

impl State {
    fn for_level(level: DotLevel) -> Self {
        match level.get() {
            0 => State::Exact(Box::default()),
            1 => State::Float { sum: 0.0 },
            k => State::Expansion {
                parts: vec![0.0; k as usize],
            },
        }
    }
}

/// Accumulates sums of products and rounds once at the end.
///
/// The accumulated value is `state + e` with `|e| <= err`. At level 0 the
/// state is exact and `err` stays zero unless inexact operands were merged
/// in. Once a non-finite operand or a floating overflow is seen the
/// accumulator only reports the entire real line.
#[derive(Debug, Clone)]
pub struct Accumulator {
    level: DotLevel,
    state: State,
    err: f64,
    non_finite: bool,
}

impl Default for Accumulator {
    /// Accumulator at the process-wide default level.
    fn default() -> Self {
        Self::new(default_level())
    }
}

impl Accumulator {
    pub fn new(level: DotLevel) -> Self {
        Self {
            level,
            state: State::for_level(level),
            err: 0.0,
            non_finite: false,
        }
    }

    pub fn with_config(config: &DotConfig) -> Self {
        Self::new(config.level)
    }

    /// Accumulator holding `x`.
    pub fn from_scalar(x: f64, level: DotLevel) -> Self {
        let mut acc = Self::new(level);
        acc.add_scalar(x);
        acc
    }

    #[inline]
    pub fn level(&self) -> DotLevel {
        self.level
    }

    /// Bound on the difference between the represented and the true value.
    #[inline]
    pub fn error_bound(&self) -> f64 {
        self.err
    }

    /// Check if the accumulated value is known exactly.
    #[inline]
    pub fn is_exact(&self) -> bool {
        matches!(self.state, State::Exact(_)) && self.err == 0.0 && !self.non_finite
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        !self.non_finite
    }

    /// Exact register, if the value is known exactly.
    pub fn exact_value(&self) -> Option<&FixedAccumulator> {
        match &self.state {
            State::Exact(fixed) if self.is_exact() => Some(fixed.as_ref()),
            _ => None,
        }
    }

    /// Forget everything accumulated so far; the level is kept.
    pub fn reset(&mut self) {
        self.state = State::for_level(self.level);
        self.err = 0.0;
        self.non_finite = false;
    }

    fn mark_non_finite(&mut self, what: &str) {
        if !self.non_finite {
            warn!(
                "Accumulator at level {} saw {}; result widened to the entire real line",
                self.level, what
            );
            self.non_finite = true;
        }
    }

    #[inline]
    fn grow_err(&mut self, bound: f64) {
        self.err = add_up(self.err, bound);
    }

    /// Add `a · b`.
    pub fn accumulate(&mut self, a: f64, b: f64) {
        if a.is_nan() || b.is_nan() {
            self.mark_non_finite("a NaN operand");
            return;
        }
        if a == 0.0 || b == 0.0 || self.non_finite {
            return;
        }
        if a.is_infinite() || b.is_infinite() {
            self.mark_non_finite("an infinite operand");
            return;
        }
        match &mut self.state {
            State::Exact(fixed) => fixed.add_product(a, b),
            State::Float { .. } => {
                let (p, e) = two_prod(a, b);
                if p.is_infinite() {
                    self.mark_non_finite("a product overflow");
                    return;
                }
                if p.abs() < EFT_THRESHOLD {
                    self.grow_err(add_up(mul_up(UNIT_ROUNDOFF, p.abs()), MIN_SUBNORMAL));
                } else if e != 0.0 {
                    self.grow_err(mul_up(UNIT_ROUNDOFF, p.abs()));
                }
                self.add_value(p);
            }
            State::Expansion { .. } => {
                let (p, q) = two_prod(a, b);
                if p.is_infinite() {
                    self.mark_non_finite("a product overflow");
                    return;
                }
                if p.abs() < EFT_THRESHOLD {
                    self.grow_err(MIN_SUBNORMAL);
                }
                self.add_value(p);
                self.add_value(q);
            }
        }
    }

    /// Add a finite double to the state, tracking rounding errors.
    fn add_value(&mut self, x: f64) {
        if x == 0.0 || self.non_finite {
            return;
        }
        match &mut self.state {
            State::Exact(fixed) => fixed.add_f64(x),
            State::Float { sum } => {
                let (s, e) = two_sum(*sum, x);
                if s.is_infinite() {
                    self.mark_non_finite("a summation overflow");
                    return;
                }
                *sum = s;
                if e != 0.0 {
                    self.grow_err(mul_up(UNIT_ROUNDOFF, s.abs()));
                }
            }
            State::Expansion { parts } => {
                let mut carry = x;
                for part in parts.iter_mut() {
                    let (s, e) = two_sum(*part, carry);
                    if !s.is_finite() {
                        carry = f64::INFINITY;
                        break;
                    }
                    *part = s;
                    carry = e;
                    if carry == 0.0 {
                        break;
                    }
                }
                if carry.is_infinite() {
                    self.mark_non_finite("a summation overflow");
                } else if carry != 0.0 {
                    self.grow_err(carry.abs());
                }
            }
        }
    }

    pub fn add_scalar(&mut self, x: f64) {
        if x.is_nan() || x.is_infinite() {
            self.mark_non_finite("a non-finite scalar");
            return;
        }
        self.add_value(x);
    }

    pub fn sub_scalar(&mut self, x: f64) {
        self.add_scalar(-x);
    }

    /// Add the value of another accumulator, of any level.
    ///
    /// An exact receiver absorbs the other state exactly. An inexact receiver
    /// absorbs an exact register as its nearest double and widens its error
    /// bound by the rounding of that value.
    pub fn add_acc(&mut self, other: &Accumulator) {
        if other.non_finite {
            self.mark_non_finite("a non-finite operand accumulator");
            return;
        }
        if self.non_finite {
            return;
        }
        if let State::Exact(fixed) = &mut self.state {
            match &other.state {
                State::Exact(theirs) => fixed.add_fixed(theirs),
                State::Float { sum } => fixed.add_f64(*sum),
                State::Expansion { parts } => parts.iter().for_each(|&p| fixed.add_f64(p)),
            }
        } else {
            match &other.state {
                State::Exact(theirs) => {
                    let nearest = theirs.round(RoundingMode::Nearest);
                    if nearest.is_infinite() {
                        self.mark_non_finite("an overflowing exact operand");
                        return;
                    }
                    let below = sub_up(nearest, theirs.round(RoundingMode::Down));
                    let above = sub_up(theirs.round(RoundingMode::Up), nearest);
                    self.grow_err(below.max(above));
                    self.add_value(nearest);
                }
                State::Float { sum } => self.add_value(*sum),
                State::Expansion { parts } => parts.iter().for_each(|&p| self.add_value(p)),
            }
        }
        self.grow_err(other.err);
    }

    /// Subtract the value of another accumulator.
    pub fn sub_acc(&mut self, other: &Accumulator) {
        let negated = -other.clone();
        self.add_acc(&negated);
    }

    /// Negate in place.
    pub fn negate(&mut self) {
        match &mut self.state {
            State::Exact(fixed) => fixed.negate(),
            State::Float { sum } => *sum = -*sum,
            State::Expansion { parts } => parts.iter_mut().for_each(|p| *p = -*p),
        }
    }

    /// Exact sum of the floating state.
    fn state_register(&self) -> FixedAccumulator {
        match &self.state {
            State::Exact(fixed) => (**fixed).clone(),
            State::Float { sum } => FixedAccumulator::from_f64(*sum),
            State::Expansion { parts } => {
                let mut fixed = FixedAccumulator::new();
                for &p in parts {
                    fixed.add_f64(p);
                }
                fixed
            }
        }
    }

    /// The accumulated value rounded in direction `mode`.
    ///
    /// `Down` and `Up` include the error bound. `Nearest` rounds the
    /// represented value and ignores the error bound. `TowardZero` returns a
    /// value between zero and the true sum.
    pub fn round(&self, mode: RoundingMode) -> f64 {
        if self.non_finite {
            return match mode {
                RoundingMode::Down => f64::NEG_INFINITY,
                RoundingMode::Up => f64::INFINITY,
                RoundingMode::Nearest | RoundingMode::TowardZero => f64::NAN,
            };
        }
        let register = match &self.state {
            State::Float { sum } if self.err == 0.0 || mode == RoundingMode::Nearest => {
                return *sum;
            }
            State::Exact(fixed) if self.err == 0.0 => return fixed.round(mode),
            _ => self.state_register(),
        };
        match mode {
            RoundingMode::Nearest => register.round(RoundingMode::Nearest),
            RoundingMode::Down => sub_down(register.round(RoundingMode::Down), self.err),
            RoundingMode::Up => add_up(register.round(RoundingMode::Up), self.err),
            RoundingMode::TowardZero => {
                let lo = sub_down(register.round(RoundingMode::Down), self.err);
                let hi = add_up(register.round(RoundingMode::Up), self.err);
                if lo >= 0.0 {
                    lo
                } else if hi <= 0.0 {
                    hi
                } else {
                    0.0
                }
            }
        }
    }

    /// Enclosure `[round(Down), round(Up)]` of the true sum.
    pub fn to_interval(&self) -> Interval {
        if self.non_finite {
            return Interval::ENTIRE;
        }
        Interval::new(self.round(RoundingMode::Down), self.round(RoundingMode::Up))
    }

    /// Sign of the true sum, `None` if it cannot be decided.
    pub fn sign(&self) -> Option<Ordering> {
        if let Some(fixed) = self.exact_value() {
            return Some(fixed.sign());
        }
        if self.non_finite {
            return None;
        }
        let enclosure = self.to_interval();
        if enclosure.lo > 0.0 {
            Some(Ordering::Greater)
        } else if enclosure.hi < 0.0 {
            Some(Ordering::Less)
        } else if enclosure.lo == 0.0 && enclosure.hi == 0.0 {
            Some(Ordering::Equal)
        } else {
            None
        }
    }

    /// Exact comparison when both values are known exactly, comparison of
    /// the enclosing bounds `round(mode)` otherwise.
    pub(crate) fn cmp_bounds(&self, other: &Accumulator, mode: RoundingMode) -> Ordering {
        match (self.exact_value(), other.exact_value()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => self
                .round(mode)
                .partial_cmp(&other.round(mode))
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialEq<f64> for Accumulator {
    fn eq(&self, other: &f64) -> bool {
        self.round(RoundingMode::Nearest) == *other
    }
}

impl PartialOrd<f64> for Accumulator {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.round(RoundingMode::Nearest).partial_cmp(other)
    }
}

impl PartialEq for Accumulator {
    fn eq(&self, other: &Accumulator) -> bool {
        self.round(RoundingMode::Nearest) == other.round(RoundingMode::Nearest)
    }
}

impl PartialOrd for Accumulator {
    fn partial_cmp(&self, other: &Accumulator) -> Option<Ordering> {
        self.round(RoundingMode::Nearest)
            .partial_cmp(&other.round(RoundingMode::Nearest))
    }
}

impl AddAssign<f64> for Accumulator {
    fn add_assign(&mut self, rhs: f64) {
        self.add_scalar(rhs);
    }
}

impl SubAssign<f64> for Accumulator {
    fn sub_assign(&mut self, rhs: f64) {
        self.sub_scalar(rhs);
    }
}

impl AddAssign<&Accumulator> for Accumulator {
    fn add_assign(&mut self, rhs: &Accumulator) {
        self.add_acc(rhs);
    }
}

impl SubAssign<&Accumulator> for Accumulator {
    fn sub_assign(&mut self, rhs: &Accumulator) {
        self.sub_acc(rhs);
    }
}

impl Neg for Accumulator {
    type Output = Accumulator;
    fn neg(mut self) -> Accumulator {
        self.negate();
        self
    }
}
