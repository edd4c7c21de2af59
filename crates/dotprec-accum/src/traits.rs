//! Binding element kinds to their accumulators.

use crate::{Accumulator, CIntervalAccumulator, ComplexAccumulator, IntervalAccumulator};
use dotprec_core::{CInterval, Complex, DotLevel, Element, Interval, RoundingMode};

/// An accumulator producing a finalized element of kind `Output`.
pub trait DotAccumulator: Clone + std::fmt::Debug {
    type Output: Element;

    fn with_level(level: DotLevel) -> Self;

    fn level(&self) -> DotLevel;

    /// Finalized value: the nearest value for point kinds, the enclosure for
    /// interval kinds.
    fn result(&self) -> Self::Output;

    /// Add a single element.
    fn add(&mut self, x: &Self::Output);

    /// Add the value of another accumulator of the same kind.
    fn merge(&mut self, other: &Self);
}

/// An element kind that can be accumulated.
pub trait Accumulate: Element {
    type Acc: DotAccumulator<Output = Self>;

    /// Add `a · b` to `acc`.
    fn accumulate(acc: &mut Self::Acc, a: &Self, b: &Self);
}

impl DotAccumulator for Accumulator {
    type Output = f64;

    fn with_level(level: DotLevel) -> Self {
        Accumulator::new(level)
    }

    fn level(&self) -> DotLevel {
        Accumulator::level(self)
    }

    fn result(&self) -> f64 {
        self.round(RoundingMode::Nearest)
    }

    fn add(&mut self, x: &f64) {
        self.add_scalar(*x);
    }

    fn merge(&mut self, other: &Self) {
        self.add_acc(other);
    }
}

impl DotAccumulator for IntervalAccumulator {
    type Output = Interval;

    fn with_level(level: DotLevel) -> Self {
        IntervalAccumulator::new(level)
    }

    fn level(&self) -> DotLevel {
        IntervalAccumulator::level(self)
    }

    fn result(&self) -> Interval {
        self.to_interval()
    }

    fn add(&mut self, x: &Interval) {
        self.add_interval(x);
    }

    fn merge(&mut self, other: &Self) {
        self.add_acc(other);
    }
}

impl DotAccumulator for ComplexAccumulator {
    type Output = Complex;

    fn with_level(level: DotLevel) -> Self {
        ComplexAccumulator::new(level)
    }

    fn level(&self) -> DotLevel {
        ComplexAccumulator::level(self)
    }

    fn result(&self) -> Complex {
        self.round(RoundingMode::Nearest)
    }

    fn add(&mut self, x: &Complex) {
        self.add_scalar(x);
    }

    fn merge(&mut self, other: &Self) {
        self.add_acc(other);
    }
}

impl DotAccumulator for CIntervalAccumulator {
    type Output = CInterval;

    fn with_level(level: DotLevel) -> Self {
        CIntervalAccumulator::new(level)
    }

    fn level(&self) -> DotLevel {
        CIntervalAccumulator::level(self)
    }

    fn result(&self) -> CInterval {
        self.to_cinterval()
    }

    fn add(&mut self, x: &CInterval) {
        self.add_cinterval(x);
    }

    fn merge(&mut self, other: &Self) {
        self.add_acc(other);
    }
}

impl Accumulate for f64 {
    type Acc = Accumulator;

    #[inline]
    fn accumulate(acc: &mut Accumulator, a: &f64, b: &f64) {
        acc.accumulate(*a, *b);
    }
}

impl Accumulate for Interval {
    type Acc = IntervalAccumulator;

    #[inline]
    fn accumulate(acc: &mut IntervalAccumulator, a: &Interval, b: &Interval) {
        acc.accumulate(a, b);
    }
}

impl Accumulate for Complex {
    type Acc = ComplexAccumulator;

    #[inline]
    fn accumulate(acc: &mut ComplexAccumulator, a: &Complex, b: &Complex) {
        acc.accumulate(a, b);
    }
}

impl Accumulate for CInterval {
    type Acc = CIntervalAccumulator;

    #[inline]
    fn accumulate(acc: &mut CIntervalAccumulator, a: &CInterval, b: &CInterval) {
        acc.accumulate(a, b);
    }
}
