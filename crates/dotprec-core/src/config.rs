//! Accumulation level and process-wide defaults.
//!
//! Every kernel entry point takes its level explicitly; the process-wide
//! default is only read when an accumulator is created without one.

use crate::error::{DotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use tracing::debug;

/// Highest supported k-fold level.
pub const MAX_LEVEL: u32 = 16;

/// Accuracy level of an accumulator.
///
/// - `0`: exact fixed-point accumulation, one rounding at the end
/// - `1`: plain floating-point summation with a running error bound
/// - `k >= 2`: k-fold floating expansion with a residual error bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DotLevel(u32);

impl DotLevel {
    pub const EXACT: DotLevel = DotLevel(0);
    pub const FLOAT: DotLevel = DotLevel(1);

    /// Validate a level.
    pub fn new(level: u32) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(DotError::Configuration {
                level,
                max: MAX_LEVEL,
            });
        }
        Ok(DotLevel(level))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_exact(self) -> bool {
        self.0 == 0
    }
}

impl Default for DotLevel {
    fn default() -> Self {
        DotLevel::EXACT
    }
}

impl TryFrom<u32> for DotLevel {
    type Error = DotError;

    fn try_from(level: u32) -> Result<Self> {
        DotLevel::new(level)
    }
}

impl From<DotLevel> for u32 {
    fn from(level: DotLevel) -> u32 {
        level.0
    }
}

impl fmt::Display for DotLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "exact"),
            1 => write!(f, "float"),
            k => write!(f, "{k}-fold"),
        }
    }
}

/// Textual layout of sparse vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SparseFormat {
    /// `[v0, v1, ...]` with every element written out.
    #[default]
    Dense,
    /// `dim=N nnz=K {i: v, ...}` with only stored elements.
    Sparse,
}

impl SparseFormat {
    fn to_u8(self) -> u8 {
        match self {
            SparseFormat::Dense => 0,
            SparseFormat::Sparse => 1,
        }
    }

    fn from_u8(raw: u8) -> Self {
        if raw == 1 {
            SparseFormat::Sparse
        } else {
            SparseFormat::Dense
        }
    }
}

static DEFAULT_LEVEL: AtomicU32 = AtomicU32::new(0);
static SPARSE_FORMAT: AtomicU8 = AtomicU8::new(0);

/// Set the level used by accumulators created without an explicit level.
pub fn set_default_level(level: DotLevel) {
    let previous = DEFAULT_LEVEL.swap(level.get(), Ordering::Relaxed);
    if previous != level.get() {
        debug!("Default accumulation level changed from {} to {}", previous, level.get());
    }
}

/// Level used by accumulators created without an explicit level.
pub fn default_level() -> DotLevel {
    // Only validated levels are ever stored.
    DotLevel(DEFAULT_LEVEL.load(Ordering::Relaxed))
}

/// Set the layout used when formatting sparse vectors.
pub fn set_sparse_format(format: SparseFormat) {
    let previous = SPARSE_FORMAT.swap(format.to_u8(), Ordering::Relaxed);
    if previous != format.to_u8() {
        debug!("Sparse output format set to {:?}", format);
    }
}

pub fn sparse_format() -> SparseFormat {
    SparseFormat::from_u8(SPARSE_FORMAT.load(Ordering::Relaxed))
}

/// Configuration for dot products and sparse vector I/O.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotConfig {
    /// Accumulation level of newly created accumulators.
    pub level: DotLevel,
    /// Layout of formatted sparse vectors.
    pub sparse_format: SparseFormat,
}

impl DotConfig {
    /// Snapshot of the process-wide defaults.
    pub fn global() -> Self {
        Self {
            level: default_level(),
            sparse_format: sparse_format(),
        }
    }

    /// Make this configuration the process-wide default.
    pub fn apply_global(&self) {
        debug!("Applying dot configuration: level={}, sparse_format={:?}", self.level, self.sparse_format);
        set_default_level(self.level);
        set_sparse_format(self.sparse_format);
    }

    /// Make this configuration the process-wide default until the returned
    /// guard is dropped.
    pub fn apply_scoped(&self) -> ScopedConfig {
        let previous = DotConfig::global();
        self.apply_global();
        ScopedConfig { previous }
    }

    pub fn with_level(mut self, level: DotLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_sparse_format(mut self, format: SparseFormat) -> Self {
        self.sparse_format = format;
        self
    }
}

/// Restores the process-wide configuration it replaced when dropped.
#[must_use = "the previous configuration is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedConfig {
    previous: DotConfig,
}

impl ScopedConfig {
    /// Configuration that becomes current again on drop.
    pub fn previous(&self) -> DotConfig {
        self.previous
    }
}

impl Drop for ScopedConfig {
    fn drop(&mut self) {
        self.previous.apply_global();
    }
}
