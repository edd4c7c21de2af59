//! Accumulators for complex and complex-interval dot products.

use crate::accumulator::Accumulator;
use crate::interval_acc::IntervalAccumulator;
use dotprec_core::{default_level, CInterval, Complex, DotLevel, Result, RoundingMode};

/// Real and imaginary accumulators of a complex dot product.
#[derive(Debug, Clone)]
pub struct ComplexAccumulator {
    re: Accumulator,
    im: Accumulator,
}

impl Default for ComplexAccumulator {
    fn default() -> Self {
        Self::new(default_level())
    }
}

impl ComplexAccumulator {
    pub fn new(level: DotLevel) -> Self {
        Self {
            re: Accumulator::new(level),
            im: Accumulator::new(level),
        }
    }

    #[inline]
    pub fn level(&self) -> DotLevel {
        self.re.level()
    }

    pub fn real(&self) -> &Accumulator {
        &self.re
    }

    pub fn imag(&self) -> &Accumulator {
        &self.im
    }

    pub fn reset(&mut self) {
        self.re.reset();
        self.im.reset();
    }

    /// Add `x · y`, expanded into four real products.
    pub fn accumulate(&mut self, x: &Complex, y: &Complex) {
        self.re.accumulate(x.re, y.re);
        self.re.accumulate(-x.im, y.im);
        self.im.accumulate(x.re, y.im);
        self.im.accumulate(x.im, y.re);
    }

    pub fn add_scalar(&mut self, z: &Complex) {
        self.re.add_scalar(z.re);
        self.im.add_scalar(z.im);
    }

    pub fn sub_scalar(&mut self, z: &Complex) {
        self.re.sub_scalar(z.re);
        self.im.sub_scalar(z.im);
    }

    pub fn add_acc(&mut self, other: &ComplexAccumulator) {
        self.re.add_acc(&other.re);
        self.im.add_acc(&other.im);
    }

    pub fn sub_acc(&mut self, other: &ComplexAccumulator) {
        self.re.sub_acc(&other.re);
        self.im.sub_acc(&other.im);
    }

    pub fn negate(&mut self) {
        self.re.negate();
        self.im.negate();
    }

    /// Both parts rounded in direction `mode`.
    pub fn round(&self, mode: RoundingMode) -> Complex {
        Complex::new(self.re.round(mode), self.im.round(mode))
    }

    /// Rectangular enclosure of the accumulated sum.
    pub fn to_cinterval(&self) -> CInterval {
        CInterval::new(self.re.to_interval(), self.im.to_interval())
    }
}

/// Real and imaginary interval accumulators of a complex interval dot product.
#[derive(Debug, Clone)]
pub struct CIntervalAccumulator {
    re: IntervalAccumulator,
    im: IntervalAccumulator,
}

impl Default for CIntervalAccumulator {
    fn default() -> Self {
        Self::new(default_level())
    }
}

impl CIntervalAccumulator {
    pub fn new(level: DotLevel) -> Self {
        Self {
            re: IntervalAccumulator::new(level),
            im: IntervalAccumulator::new(level),
        }
    }

    #[inline]
    pub fn level(&self) -> DotLevel {
        self.re.level()
    }

    pub fn real(&self) -> &IntervalAccumulator {
        &self.re
    }

    pub fn imag(&self) -> &IntervalAccumulator {
        &self.im
    }

    pub fn reset(&mut self) {
        self.re.reset();
        self.im.reset();
    }

    /// Add `(a + bi)(c + di)`: `ac - bd` into the real part and `ad + bc`
    /// into the imaginary part, the `-bd` term through the exact negation of
    /// `b`.
    pub fn accumulate(&mut self, x: &CInterval, y: &CInterval) {
        self.re.accumulate(&x.re, &y.re);
        self.re.accumulate(&-x.im, &y.im);
        self.im.accumulate(&x.re, &y.im);
        self.im.accumulate(&x.im, &y.re);
    }

    /// Add `z · y` for a point complex `z`.
    pub fn accumulate_mixed(&mut self, z: &Complex, y: &CInterval) {
        self.re.accumulate_mixed(z.re, &y.re);
        self.re.accumulate_mixed(-z.im, &y.im);
        self.im.accumulate_mixed(z.re, &y.im);
        self.im.accumulate_mixed(z.im, &y.re);
    }

    pub fn add_cinterval(&mut self, z: &CInterval) {
        self.re.add_interval(&z.re);
        self.im.add_interval(&z.im);
    }

    pub fn sub_cinterval(&mut self, z: &CInterval) {
        self.re.sub_interval(&z.re);
        self.im.sub_interval(&z.im);
    }

    pub fn add_point_acc(&mut self, other: &ComplexAccumulator) {
        self.re.add_point_acc(other.real());
        self.im.add_point_acc(other.imag());
    }

    pub fn add_acc(&mut self, other: &CIntervalAccumulator) {
        self.re.add_acc(&other.re);
        self.im.add_acc(&other.im);
    }

    pub fn sub_acc(&mut self, other: &CIntervalAccumulator) {
        self.re.sub_acc(&other.re);
        self.im.sub_acc(&other.im);
    }

    pub fn negate(&mut self) {
        self.re.negate();
        self.im.negate();
    }

    pub fn hull(&mut self, other: &CIntervalAccumulator) {
        self.re.hull(&other.re);
        self.im.hull(&other.im);
    }

    /// Componentwise intersection; `self` is unchanged on failure.
    pub fn intersect(&mut self, other: &CIntervalAccumulator) -> Result<()> {
        let mut re = self.re.clone();
        re.intersect(&other.re)?;
        self.im.intersect(&other.im)?;
        self.re = re;
        Ok(())
    }

    pub fn to_cinterval(&self) -> CInterval {
        CInterval::new(self.re.to_interval(), self.im.to_interval())
    }
}
