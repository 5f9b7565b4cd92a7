//! Toroidal cell storage.
//!
//! Storage is split in two layers:
//! - `Grid`: one generation of cells, row-major, one byte per cell
//! - `DoubleBuffer`: the current/next pair, swapped by flipping a phase bit

use std::fmt;

use rand::Rng;

use crate::error::{Error, Result};

/// One generation of a `rows x cols` torus.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyGrid { rows, cols });
        }
        Ok(Self::zeroed(rows, cols))
    }

    /// Dead grid of a shape already known to be valid.
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// A grid where each cell is alive with probability `density`.
    ///
    /// Cells are drawn in row-major order, one `f64` per cell, so the same
    /// seed always yields the same grid.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::DensityOutOfRange(density));
        }
        let mut grid = Self::new(rows, cols)?;
        for cell in grid.cells.iter_mut() {
            *cell = (rng.random::<f64>() < density) as u8;
        }
        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> bool {
        self.cells[r * self.cols + c] != 0
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, alive: bool) {
        self.cells[r * self.cols + c] = alive as u8;
    }

    /// Set every listed cell alive. Coordinates wrap around the torus.
    pub fn set_cells(&mut self, cells: &[(isize, isize)]) {
        for &(r, c) in cells {
            let (r, c) = self.wrap(r, c);
            self.set(r, c, true);
        }
    }

    /// Map any signed coordinate onto the torus.
    #[inline]
    pub fn wrap(&self, r: isize, c: isize) -> (usize, usize) {
        (
            r.rem_euclid(self.rows as isize) as usize,
            c.rem_euclid(self.cols as isize) as usize,
        )
    }

    #[inline]
    pub fn get_wrapped(&self, r: isize, c: isize) -> bool {
        let (r, c) = self.wrap(r, c);
        self.get(r, c)
    }

    /// Sum of the 8 wrapped neighbors of `(r, c)`.
    pub fn neighbor_count(&self, r: usize, c: usize) -> u8 {
        let (r, c) = (r as isize, c as isize);
        let mut count = 0u8;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                count += self.get_wrapped(r + dr, c + dc) as u8;
            }
        }
        count
    }

    #[inline]
    pub fn row(&self, r: usize) -> &[u8] {
        let start = r * self.cols;
        &self.cells[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [u8] {
        let start = r * self.cols;
        &mut self.cells[start..start + self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().map(|&cell| cell as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| cell == 0)
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        for (i, &cell) in self.cells.iter().enumerate() {
            if cell != 0 {
                f(i / self.cols, i % self.cols);
            }
        }
    }
}

/// Prints one `[ 0 1 0 ]` line per row.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            f.write_str("[ ")?;
            for &cell in self.row(r) {
                write!(f, "{cell} ")?;
            }
            f.write_str("]\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        fmt::Display::fmt(self, f)
    }
}

/// Current/next pair of equally sized grids.
///
/// `swap` only flips which slot is current; no cells move. After an even
/// number of swaps the slots are back in their original roles.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    grids: [Grid; 2],
    phase: u8,
}

impl DoubleBuffer {
    /// Wrap `initial` as the current generation, with a dead scratch grid.
    pub fn new(initial: Grid) -> Self {
        let scratch = Grid::zeroed(initial.rows, initial.cols);
        Self {
            grids: [initial, scratch],
            phase: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> &Grid {
        &self.grids[self.phase as usize]
    }

    #[inline]
    pub fn next(&self) -> &Grid {
        &self.grids[1 - self.phase as usize]
    }

    #[inline]
    pub fn next_mut(&mut self) -> &mut Grid {
        &mut self.grids[1 - self.phase as usize]
    }

    #[inline]
    pub fn current_and_next_mut(&mut self) -> (&Grid, &mut Grid) {
        let (a, b) = self.grids.split_at_mut(1);
        if self.phase == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    #[inline]
    pub fn swap(&mut self) {
        self.phase ^= 1;
    }

    /// Index of the slot currently holding the live generation.
    #[inline]
    pub fn phase(&self) -> usize {
        self.phase as usize
    }

    /// Both slots, in slot order (not role order).
    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Grid; 2] {
        &mut self.grids
    }

    pub fn into_current(self) -> Grid {
        let [a, b] = self.grids;
        if self.phase == 0 { a } else { b }
    }
}
