//! Error types for verified dot products and sparse interval vectors

use thiserror::Error;

/// Errors reported by the kernel.
///
/// Dimension, index and intersection failures are recoverable and reported to
/// the immediate caller. Invariant violations of the exact accumulator are not
/// represented here; they panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DotError {
    /// Unsupported accumulation level.
    #[error("invalid accumulation level {level}: supported levels are 0..={max}")]
    Configuration { level: u32, max: u32 },

    /// Operands of incompatible length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Two intervals (or two vector elements) do not overlap.
    #[error(
        "empty intersection{}",
        .index.map(|i| format!(" at index {i}")).unwrap_or_default()
    )]
    EmptyIntersection { index: Option<isize> },

    /// Division by an interval (or value) containing zero.
    #[error("division by an interval containing zero")]
    DivisionByZero,

    /// Access outside the declared index range of a vector.
    #[error("index {index} out of range [{lb}, {ub}]")]
    IndexOutOfRange { index: isize, lb: isize, ub: isize },

    /// Interval construction with `lo > hi` or a NaN bound.
    #[error("invalid interval: [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    /// Repeated index in triplet input.
    #[error("duplicate index: {0}")]
    DuplicateIndex(String),

    /// Permutation vector that is not a bijection.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Deserialized storage that breaks the layout invariants of a sparse
    /// vector or matrix.
    #[error("invalid sparse storage: {0}")]
    InvalidStorage(String),

    /// Malformed textual input.
    #[error("parse error: {0}")]
    Parse(String),
}

impl DotError {
    /// Shorthand for a dimension check failure.
    #[inline]
    pub fn dimension_mismatch(expected: usize, got: usize) -> Self {
        debug_assert_ne!(expected, got, "dimension mismatch raised for equal dimensions");
        DotError::DimensionMismatch { expected, got }
    }

    /// Attach a vector index to an intersection failure.
    pub fn at_index(self, index: isize) -> Self {
        match self {
            DotError::EmptyIntersection { .. } => DotError::EmptyIntersection { index: Some(index) },
            other => other,
        }
    }
}

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, DotError>;
