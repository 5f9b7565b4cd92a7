//! Errors reported while configuring a simulation.
//!
//! Evolution itself cannot fail: every lookup wraps around the torus and
//! the rule is total, so all errors surface before the first step.

use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("step count must be positive")]
    NoSteps,

    #[error("thread count must be positive")]
    NoThreads,

    #[error("block size must be positive")]
    ZeroBlockSize,

    #[error("density must be in [0, 1], got {0}")]
    DensityOutOfRange(f64),

    #[error("grid {rows}x{cols} is not divisible into {block_size}x{block_size} blocks")]
    BlockMismatch {
        rows: usize,
        cols: usize,
        block_size: usize,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
