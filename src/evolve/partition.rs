//! Static row partitioning for the threaded evolvers.
//!
//! Rows `1..=R-2` are split into contiguous interior ranges, remainder
//! first: the first `(R-2) % threads` workers get one extra row. The first
//! worker also owns row 0 and the last worker owns row `R-1`, so the spans
//! tile `0..R` in worker order.

use std::ops::Range;

/// Rows owned by one worker for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadRange {
    pub worker: usize,
    /// First interior row, inclusive.
    pub i0: usize,
    /// Last interior row, exclusive.
    pub i1: usize,
    /// Whether this worker also computes row 0.
    pub owns_first_row: bool,
    /// Whether this worker also computes row `R-1`.
    pub owns_last_row: bool,
}

impl ThreadRange {
    #[inline]
    pub fn interior(&self) -> Range<usize> {
        self.i0..self.i1
    }

    /// Every row this worker writes, boundary rows included.
    #[inline]
    pub fn span(&self, rows: usize) -> Range<usize> {
        let start = if self.owns_first_row { 0 } else { self.i0 };
        let end = if self.owns_last_row { rows } else { self.i1 };
        start..end.max(start)
    }
}

/// Split `rows` across `threads` workers.
///
/// Zero workers get nothing to do, so the result is empty. Workers beyond
/// the available rows get empty ranges. On one- and two-row grids there is
/// no interior and the first and last workers split the boundary rows
/// between them.
pub fn partition_rows(rows: usize, threads: usize) -> Vec<ThreadRange> {
    debug_assert!(rows > 0);
    if threads == 0 {
        return Vec::new();
    }
    let interior = rows.saturating_sub(2);
    let per_thread = interior / threads;
    let remainder = interior % threads;

    (0..threads)
        .map(|worker| {
            let i0 = if worker < remainder {
                worker * (per_thread + 1) + 1
            } else {
                remainder + worker * per_thread + 1
            };
            let len = per_thread + (worker < remainder) as usize;
            ThreadRange {
                worker,
                i0: i0.min(rows),
                i1: (i0 + len).min(rows),
                owns_first_row: worker == 0,
                owns_last_row: worker == threads - 1 && rows >= 2,
            }
        })
        .collect()
}
