//! Property-based soundness tests for the accumulators.
//!
//! Every finalized enclosure is checked against an exact rational reference:
//! for every level the true sum must lie inside `[round(Down), round(Up)]`.

use crate::*;
use dotprec_core::{DotLevel, Interval, RoundingMode};
use num_rational::BigRational;
use num_traits::Zero;
use proptest::prelude::*;

fn exact(x: f64) -> BigRational {
    BigRational::from_float(x).expect("finite value")
}

/// Doubles spread over many binades.
fn spread_f64() -> impl Strategy<Value = f64> {
    (-1.0f64..1.0, -60i32..60).prop_map(|(m, e)| m * 2f64.powi(e))
}

fn products(max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((spread_f64(), spread_f64()), 0..max_len)
}

/// Strategy to generate valid interval bounds [lower, upper] where lower <= upper.
fn valid_interval(range: f64) -> impl Strategy<Value = Interval> {
    (-range..range).prop_flat_map(move |a| {
        (-range..range).prop_map(move |b| Interval::new(a.min(b), a.max(b)))
    })
}

/// Interval in one of the three sign classes: negative, straddling, positive.
fn signed_interval(class: u8, range: f64) -> impl Strategy<Value = Interval> {
    (0.0..range, 0.0..range).prop_map(move |(p, q)| {
        let (small, large) = (p.min(q), p.max(q));
        match class {
            0 => Interval::new(-large, -small),
            1 => Interval::new(-p, q),
            _ => Interval::new(small, large),
        }
    })
}

/// Sample points within an interval for soundness verification.
fn sample_points(lower: f64, upper: f64, num_samples: usize) -> Vec<f64> {
    if lower == upper {
        return vec![lower];
    }
    (0..=num_samples)
        .map(|i| {
            let t = i as f64 / num_samples as f64;
            let sample = lower + (upper - lower) * t;
            sample.clamp(lower, upper)
        })
        .collect()
}

fn reference_sum(terms: &[(f64, f64)]) -> BigRational {
    terms
        .iter()
        .fold(BigRational::zero(), |acc, &(a, b)| acc + exact(a) * exact(b))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For every level the enclosure contains the exact sum.
    #[test]
    fn soundness_every_level(terms in products(40), k in 0u32..6) {
        let mut acc = Accumulator::new(DotLevel::new(k).unwrap());
        for &(a, b) in &terms {
            acc.accumulate(a, b);
        }
        let reference = reference_sum(&terms);
        let lo = acc.round(RoundingMode::Down);
        let hi = acc.round(RoundingMode::Up);
        prop_assert!(
            exact(lo) <= reference && reference <= exact(hi),
            "level {} enclosure [{:e}, {:e}] misses the exact sum", k, lo, hi
        );
    }

    /// The exact level rounds the exact sum once: the bounds coincide or are
    /// adjacent doubles.
    #[test]
    fn exact_level_is_tight(terms in products(40)) {
        let mut acc = Accumulator::new(DotLevel::EXACT);
        for &(a, b) in &terms {
            acc.accumulate(a, b);
        }
        let lo = acc.round(RoundingMode::Down);
        let hi = acc.round(RoundingMode::Up);
        prop_assert!(lo == hi || hi == lo.next_up(), "[{:e}, {:e}] is not tight", lo, hi);
        let reference = reference_sum(&terms);
        if exact(lo) == reference {
            prop_assert_eq!(lo, hi);
        }
        let nearest = acc.round(RoundingMode::Nearest);
        prop_assert!(nearest == lo || nearest == hi);
    }

    /// Finalizing twice gives the same result.
    #[test]
    fn finalization_is_idempotent(terms in products(20), k in 0u32..4) {
        let mut acc = Accumulator::new(DotLevel::new(k).unwrap());
        for &(a, b) in &terms {
            acc.accumulate(a, b);
        }
        prop_assert_eq!(acc.to_interval(), acc.to_interval());
        prop_assert_eq!(acc.round(RoundingMode::Nearest), acc.round(RoundingMode::Nearest));
    }

    /// Merging two accumulators of arbitrary levels encloses the joint sum.
    #[test]
    fn merge_across_levels_is_sound(
        left in products(15),
        right in products(15),
        k1 in 0u32..4,
        k2 in 0u32..4,
    ) {
        let mut a = Accumulator::new(DotLevel::new(k1).unwrap());
        let mut b = Accumulator::new(DotLevel::new(k2).unwrap());
        for &(x, y) in &left {
            a.accumulate(x, y);
        }
        for &(x, y) in &right {
            b.accumulate(x, y);
        }
        a.sub_acc(&b);
        let reference = reference_sum(&left) - reference_sum(&right);
        let enclosure = a.to_interval();
        prop_assert!(exact(enclosure.lo) <= reference && reference <= exact(enclosure.hi));
    }

    /// Interval accumulation over all nine sign combinations contains every
    /// sampled point product and is never wider than interval multiplication.
    #[test]
    fn interval_sign_cases(
        x in (0u8..3).prop_flat_map(|c| signed_interval(c, 100.0)),
        y in (0u8..3).prop_flat_map(|c| signed_interval(c, 100.0)),
    ) {
        let mut acc = IntervalAccumulator::new(DotLevel::EXACT);
        acc.accumulate(&x, &y);
        let r = acc.to_interval();
        prop_assert!((x * y).contains_interval(&r), "{} wider than {}", r, x * y);
        for p in sample_points(x.lo, x.hi, 10) {
            for q in sample_points(y.lo, y.hi, 10) {
                let reference = exact(p) * exact(q);
                prop_assert!(
                    exact(r.lo) <= reference && reference <= exact(r.hi),
                    "{} * {} not in {}", p, q, r
                );
            }
        }
    }

    /// Interval dot products enclose the dot product of any sampled points.
    #[test]
    fn interval_dot_soundness(
        pairs in prop::collection::vec((valid_interval(1e3), valid_interval(1e3)), 1..10),
        k in 0u32..4,
    ) {
        let mut acc = IntervalAccumulator::new(DotLevel::new(k).unwrap());
        for (x, y) in &pairs {
            acc.accumulate(x, y);
        }
        let r = acc.to_interval();
        for corner in [0.0, 0.5, 1.0] {
            let reference = pairs.iter().fold(BigRational::zero(), |sum, (x, y)| {
                let p = x.lo + (x.hi - x.lo) * corner;
                let q = y.hi - (y.hi - y.lo) * corner;
                sum + exact(p.clamp(x.lo, x.hi)) * exact(q.clamp(y.lo, y.hi))
            });
            prop_assert!(exact(r.lo) <= reference && reference <= exact(r.hi));
        }
    }
}
