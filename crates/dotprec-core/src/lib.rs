//! Core numeric types for verified dot products.
//!
//! This crate provides directed rounding on `f64`, closed real intervals,
//! point and interval complex numbers, and the element-kind traits that let
//! accumulators and sparse vectors work generically over all four kinds.

pub mod complex;
pub mod config;
pub mod element;
pub mod error;
pub mod exact;
pub mod interval;
pub mod round;

pub use complex::{CInterval, Complex};
pub use config::{
    default_level, set_default_level, set_sparse_format, sparse_format, DotConfig, DotLevel,
    ScopedConfig, SparseFormat, MAX_LEVEL,
};
pub use element::{promote, Element, ElementKind, HullPromote, IntervalElement, Promote};
pub use error::{DotError, Result};
pub use exact::ExactProduct;
pub use interval::Interval;
pub use round::RoundingMode;
