//! Full-grid recompute, one cell at a time.
//!
//! No shortcuts: every cell looks up its eight wrapped neighbors on every
//! step. This is the oracle the other evolvers are checked against.

use super::Evolver;
use crate::grid::{DoubleBuffer, Grid};
use crate::rules::decide;

pub struct NaiveEvolver {
    buffers: DoubleBuffer,
    generation: u64,
}

impl NaiveEvolver {
    pub fn new(initial: Grid) -> Self {
        Self {
            buffers: DoubleBuffer::new(initial),
            generation: 0,
        }
    }

    pub fn buffers(&self) -> &DoubleBuffer {
        &self.buffers
    }

    pub fn current(&self) -> &Grid {
        self.buffers.current()
    }

    fn step_impl(&mut self) {
        let (current, next) = self.buffers.current_and_next_mut();
        for r in 0..current.rows() {
            for c in 0..current.cols() {
                let alive = decide(current.get(r, c), current.neighbor_count(r, c));
                next.set(r, c, alive);
            }
        }
        self.buffers.swap();
        self.generation += 1;
    }
}

impl Evolver for NaiveEvolver {
    fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step_impl();
        }
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
    use super::NaiveEvolver;
    use crate::evolve::Evolver;
    use crate::grid::Grid;

    fn grid_with(rows: usize, cols: usize, cells: &[(isize, isize)]) -> Grid {
        let mut grid = Grid::new(rows, cols).unwrap();
        grid.set_cells(cells);
        grid
    }

    #[test]
    fn blinker_oscillates() {
        let horizontal = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let vertical = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        let mut engine = NaiveEvolver::new(horizontal.clone());

        engine.step();
        assert_eq!(engine.current(), &vertical);
        engine.step();
        assert_eq!(engine.current(), &horizontal);
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn phase_tracks_step_parity() {
        let mut engine = NaiveEvolver::new(grid_with(6, 6, &[(0, 0), (0, 1), (0, 2)]));
        for step in 1..=7u64 {
            engine.step();
            assert_eq!(engine.buffers().phase() as u64, step % 2);
        }
    }

    #[test]
    fn blinker_across_the_seam() {
        // Horizontal blinker straddling column 0 turns vertical around (0, 0).
        let mut engine = NaiveEvolver::new(grid_with(6, 6, &[(0, 5), (0, 0), (0, 1)]));
        engine.step();
        assert_eq!(engine.current(), &grid_with(6, 6, &[(5, 0), (0, 0), (1, 0)]));
    }
}
