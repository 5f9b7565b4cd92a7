//! Evolution strategies.
//!
//! Every evolver owns its buffers and advances them with the same rule;
//! they differ only in how much work they skip and how they split it
//! across threads.

mod barrier;
mod block;
mod naive;
mod partition;
mod pipelined;
mod shared;
mod sync;

use std::time::{Duration, Instant};

use crate::grid::Grid;

pub use barrier::BarrierEvolver;
pub use block::{ActivityPolicy, BlockEvolver, BlockStats, Direction};
pub use naive::NaiveEvolver;
pub use partition::{ThreadRange, partition_rows};
pub use pipelined::PipelinedLockEvolver;

/// A strategy for advancing a toroidal grid.
pub trait Evolver {
    /// Advance `n` full steps.
    fn step_n(&mut self, n: u64);

    /// Number of steps taken since construction.
    fn generation(&self) -> u64;

    /// Copy of the current generation.
    fn snapshot(&self) -> Grid;

    fn step(&mut self) {
        self.step_n(1);
    }

    /// Advance `steps` and return the wall time spent evolving only.
    fn run(&mut self, steps: u64) -> Duration {
        let start = Instant::now();
        self.step_n(steps);
        start.elapsed()
    }
}
