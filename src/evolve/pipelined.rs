//! Row-partitioned evolver gated per boundary row instead of per step.
//!
//! Workers own the same spans as in the barrier evolver. Only the first
//! and last row of a span read rows owned by another worker, so only those
//! rows wait. For half-step `h` (reading generation `h`, writing `h + 1`)
//! a worker:
//!
//! 1. computes its interior rows straight away,
//! 2. waits until the upstream worker's last row is at generation `h`,
//!    computes its own first row and publishes `h + 1`,
//! 3. does the same for its last row against the downstream first row.
//!
//! Waiting for "neighbor at `h`" covers both hazards at once: the neighbor
//! row is readable, and the neighbor has finished reading our row from the
//! slot we are about to overwrite. A worker can therefore run up to a full
//! half-step ahead of its neighbors on interior rows.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::Evolver;
use super::partition::{ThreadRange, partition_rows};
use super::shared::SharedRows;
use super::sync::RowGate;
use crate::error::{Error, Result};
use crate::grid::{DoubleBuffer, Grid};

/// Gates for the two boundary rows of one worker's span.
#[derive(Debug, Default)]
struct SpanGates {
    first: RowGate,
    last: RowGate,
}

/// Upstream/downstream worker per worker, among non-empty spans.
/// `None` for workers with nothing to do.
fn span_links(spans: &[std::ops::Range<usize>]) -> Vec<Option<(usize, usize)>> {
    let busy: Vec<usize> = (0..spans.len()).filter(|&w| !spans[w].is_empty()).collect();
    let mut links = vec![None; spans.len()];
    for (k, &worker) in busy.iter().enumerate() {
        let upstream = busy[(k + busy.len() - 1) % busy.len()];
        let downstream = busy[(k + 1) % busy.len()];
        links[worker] = Some((upstream, downstream));
    }
    links
}

pub struct PipelinedLockEvolver {
    buffers: DoubleBuffer,
    ranges: Vec<ThreadRange>,
    pool: rayon::ThreadPool,
    generation: u64,
    stalls: AtomicU64,
}

impl PipelinedLockEvolver {
    pub fn new(initial: Grid, thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(Error::NoThreads);
        }
        let ranges = partition_rows(initial.rows(), thread_count);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("pipeline-worker-{i}"))
            .build()?;
        debug!(
            rows = initial.rows(),
            cols = initial.cols(),
            threads = thread_count,
            "pipelined evolver ready"
        );
        Ok(Self {
            buffers: DoubleBuffer::new(initial),
            ranges,
            pool,
            generation: 0,
            stalls: AtomicU64::new(0),
        })
    }

    pub fn ranges(&self) -> &[ThreadRange] {
        &self.ranges
    }

    pub fn buffers(&self) -> &DoubleBuffer {
        &self.buffers
    }

    /// Boundary waits that actually blocked, over the evolver's lifetime.
    pub fn stalls(&self) -> u64 {
        self.stalls.load(Ordering::Relaxed)
    }
}

impl Evolver for PipelinedLockEvolver {
    fn step_n(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        let start_slot = self.buffers.phase();
        let rows = self.buffers.current().rows();
        let spans: Vec<_> = self.ranges.iter().map(|range| range.span(rows)).collect();
        let links = span_links(&spans);
        // Generations are counted from 0 within this call.
        let gates: Vec<SpanGates> = (0..spans.len()).map(|_| SpanGates::default()).collect();
        let stalls = &self.stalls;
        let shared = SharedRows::new(&mut self.buffers);

        self.pool.broadcast(|ctx| {
            let worker = ctx.index();
            let Some((upstream, downstream)) = links[worker] else {
                return;
            };
            let span = spans[worker].clone();
            let own = &gates[worker];
            // A worker spanning the whole torus is its own neighbor.
            let alone = span.len() == rows;
            let (first, last) = (span.start, span.end - 1);
            let mut waited = 0u64;
            let mut src = start_slot;

            for h in 0..n {
                for r in first + 1..last {
                    // SAFETY: interior rows read only rows of this span.
                    unsafe {
                        shared.advance(src, r);
                    }
                }

                if !alone {
                    waited += gates[upstream].last.wait_for(h) as u64;
                    if first == last {
                        waited += gates[downstream].first.wait_for(h) as u64;
                    }
                }
                // SAFETY: the upstream last row is at generation `h`, and
                // it has finished reading our first row from the slot we
                // overwrite; the downstream side was checked above when the
                // span is a single row.
                unsafe {
                    shared.advance(src, first);
                }
                own.first.publish(h + 1);

                if last != first {
                    if !alone {
                        waited += gates[downstream].first.wait_for(h) as u64;
                    }
                    // SAFETY: as above, against the downstream first row.
                    unsafe {
                        shared.advance(src, last);
                    }
                }
                own.last.publish(h + 1);

                src ^= 1;
            }

            if waited > 0 {
                stalls.fetch_add(waited, Ordering::Relaxed);
            }
        });

        if n % 2 == 1 {
            self.buffers.swap();
        }
        self.generation += n;
        debug!(
            steps = n,
            generation = self.generation,
            stalls = self.stalls(),
            "pipelined run finished"
        );
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Grid {
        self.buffers.current().clone()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::{PipelinedLockEvolver, span_links};
    use crate::error::Error;
    use crate::evolve::{Evolver, NaiveEvolver};
    use crate::grid::Grid;

    #[test]
    fn rejects_zero_threads() {
        let grid = Grid::new(4, 4).unwrap();
        assert!(matches!(PipelinedLockEvolver::new(grid, 0), Err(Error::NoThreads)));
    }

    #[test]
    fn links_skip_empty_spans() {
        let links = span_links(&[0..2, 2..3, 3..3, 3..3, 3..4]);
        assert_eq!(links, vec![Some((4, 1)), Some((0, 4)), None, None, Some((1, 0))]);
    }

    #[test]
    fn single_busy_worker_links_to_itself() {
        assert_eq!(span_links(&[0..5]), vec![Some((0, 0))]);
        assert_eq!(span_links(&[0..1, 1..1]), vec![Some((0, 0)), None]);
    }

    #[test]
    fn matches_naive_across_thread_counts() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x9197);
        let grid = Grid::random(19, 11, 0.45, &mut rng).unwrap();
        let mut naive = NaiveEvolver::new(grid.clone());
        naive.step_n(13);

        for threads in [1, 2, 5, 17, 24] {
            let mut pipelined = PipelinedLockEvolver::new(grid.clone(), threads).unwrap();
            pipelined.step_n(13);
            assert_eq!(pipelined.snapshot(), naive.snapshot(), "threads={threads}");
        }
    }

    #[test]
    fn stalls_are_bounded_by_boundary_waits() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x57A1);
        let grid = Grid::random(24, 16, 0.4, &mut rng).unwrap();
        let mut naive = NaiveEvolver::new(grid.clone());
        let mut pipelined = PipelinedLockEvolver::new(grid, 6).unwrap();
        let busy = pipelined
            .ranges()
            .iter()
            .filter(|range| !range.span(24).is_empty())
            .count() as u64;
        assert_eq!(busy, 6);

        let steps = 40;
        naive.step_n(steps);
        pipelined.step_n(steps);
        assert_eq!(pipelined.snapshot(), naive.snapshot());
        // At most one wait per boundary row per step.
        let after_first = pipelined.stalls();
        assert!(after_first <= 2 * steps * busy, "stalls={after_first}");

        pipelined.step_n(steps);
        assert!(pipelined.stalls() >= after_first);
        assert!(pipelined.stalls() <= 2 * 2 * steps * busy);
    }

    #[test]
    fn single_thread_never_stalls() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let grid = Grid::random(10, 10, 0.3, &mut rng).unwrap();
        let mut pipelined = PipelinedLockEvolver::new(grid, 1).unwrap();
        pipelined.step_n(20);
        assert_eq!(pipelined.stalls(), 0);
        assert_eq!(pipelined.buffers().phase(), 0);
    }
}
