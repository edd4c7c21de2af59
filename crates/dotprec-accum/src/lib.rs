//! Dot-product accumulators.
//!
//! An [`Accumulator`] collects a sum of products at a selectable accuracy
//! level and rounds once when finalized. [`IntervalAccumulator`] pairs two of
//! them to enclose sums of interval products; the complex variants pair
//! real and imaginary parts.
//!
//! ```
//! use dotprec_accum::Accumulator;
//! use dotprec_core::{DotLevel, RoundingMode};
//!
//! let mut acc = Accumulator::new(DotLevel::EXACT);
//! acc.accumulate(1e300, 1e10);
//! acc.accumulate(1.0, 1.0);
//! acc.accumulate(-1e300, 1e10);
//! assert_eq!(acc.round(RoundingMode::Nearest), 1.0);
//! ```

pub mod accumulator;
pub mod complex_acc;
pub mod fixed;
pub mod interval_acc;
pub mod traits;

pub use accumulator::Accumulator;
pub use complex_acc::{CIntervalAccumulator, ComplexAccumulator};
pub use fixed::FixedAccumulator;
pub use interval_acc::IntervalAccumulator;
pub use traits::{Accumulate, DotAccumulator};

#[cfg(test)]
mod tests;
