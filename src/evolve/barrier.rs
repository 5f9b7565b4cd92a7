//! Row-partitioned evolver with a full barrier per half-step.
//!
//! Each worker owns a fixed span of rows for the whole call to `step_n`.
//! Per half-step it writes its span into the next slot, then waits for
//! everyone: past the barrier, every row of the next slot is final and
//! nobody reads the old slot any more, so each worker flips its own view
//! of which slot is current without further coordination.

use std::sync::Barrier;

use tracing::debug;

use super::Evolver;
use super::partition::{ThreadRange, partition_rows};
use super::shared::SharedRows;
use crate::error::{Error, Result};
use crate::grid::{DoubleBuffer, Grid};

pub struct BarrierEvolver {
    buffers: DoubleBuffer,
    ranges: Vec<ThreadRange>,
    pool: rayon::ThreadPool,
    generation: u64,
}

impl BarrierEvolver {
    pub fn new(initial: Grid, thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(Error::NoThreads);
        }
        let ranges = partition_rows(initial.rows(), thread_count);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("barrier-worker-{i}"))
            .build()?;
        debug!(
            rows = initial.rows(),
            cols = initial.cols(),
            threads = thread_count,
            "barrier evolver ready"
        );
        Ok(Self {
            buffers: DoubleBuffer::new(initial),
            ranges,
            pool,
            generation: 0,
        })
    }

    pub fn ranges(&self) -> &[ThreadRange] {
        &self.ranges
    }

    pub fn buffers(&self) -> &DoubleBuffer {
        &self.buffers
    }
}

impl Evolver for BarrierEvolver {
    fn step_n(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        let start_slot = self.buffers.phase();
        let workers = self.ranges.len();
        let barrier = Barrier::new(workers);
        let ranges = &self.ranges;
        let shared = SharedRows::new(&mut self.buffers);
        let rows = shared.rows();

        self.pool.broadcast(|ctx| {
            let span = ranges[ctx.index()].span(rows);
            let mut src = start_slot;
            for _ in 0..n {
                for r in span.clone() {
                    // SAFETY: spans are disjoint, and the barrier below
                    // keeps every worker on the same half-step, so `src`
                    // is read-only and row `r` of the other slot is ours.
                    unsafe {
                        shared.advance(src, r);
                    }
                }
                barrier.wait();
                src ^= 1;
            }
        });

        if n % 2 == 1 {
            self.buffers.swap();
        }
        self.generation += n;
        debug!(steps = n, generation = self.generation, "barrier run finished");
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Grid {
        self.buffers.current().clone()
    }
}
