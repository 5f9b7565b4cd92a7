//! Blocked evolver that skips quiescent regions.
//!
//! The torus is cut into `size x size` blocks laid out on a toroidal block
//! grid. Each block carries an `active` flag meaning "changed during the
//! last step". Per step, reading only the current flags:
//!
//! - active block: recompute interior and border cells
//! - inactive block, some neighbor active: interior cannot have changed,
//!   copy it and recompute the border only
//! - inactive block, all neighbors inactive: copy everything
//!
//! Interior cells depend only on their own block, so they can only change
//! if the block itself changed last step. Border cells also see the eight
//! neighboring blocks. Cells and flags are both double-buffered.

use std::ops::AddAssign;

use tracing::debug;

use super::Evolver;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rules::decide;

/// The 8 cardinal and intercardinal directions on the block grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North = 0, // (br-1, bc)
    South = 1, // (br+1, bc)
    West  = 2, // (br, bc-1)
    East  = 3, // (br, bc+1)
    NW    = 4, // (br-1, bc-1)
    NE    = 5, // (br-1, bc+1)
    SW    = 6, // (br+1, bc-1)
    SE    = 7, // (br+1, bc+1)
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North, Direction::South,
        Direction::West,  Direction::East,
        Direction::NW,    Direction::NE,
        Direction::SW,    Direction::SE,
    ];

    /// (row, col) offset on the block grid.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West  => (0, -1),
            Direction::East  => (0, 1),
            Direction::NW    => (-1, -1),
            Direction::NE    => (-1, 1),
            Direction::SW    => (1, -1),
            Direction::SE    => (1, 1),
        }
    }

    #[inline]
    pub const fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West  => Direction::East,
            Direction::East  => Direction::West,
            Direction::NW    => Direction::SE,
            Direction::NE    => Direction::SW,
            Direction::SW    => Direction::NE,
            Direction::SE    => Direction::NW,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How the next `active` flag is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivityPolicy {
    /// Active next step iff a recomputed cell changed. Lets stable regions
    /// go quiet after a single step.
    #[default]
    ChangeTracking,
    /// Active next step whenever anything was recomputed. Never detects
    /// quiescence of an active block; kept for comparison.
    Sticky,
}

/// Work counters for block steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Blocks recomputed in full.
    pub recomputed: u64,
    /// Blocks with only their border recomputed.
    pub border_only: u64,
    /// Blocks copied unchanged.
    pub skipped: u64,
    /// Rule applications.
    pub cells_evaluated: u64,
}

impl AddAssign for BlockStats {
    fn add_assign(&mut self, other: Self) {
        self.recomputed += other.recomputed;
        self.border_only += other.border_only;
        self.skipped += other.skipped;
        self.cells_evaluated += other.cells_evaluated;
    }
}

/// Index-addressed toroidal block grid. Neighbors are recomputed from
/// coordinates on demand, so the mesh is closed and symmetric by
/// construction.
#[derive(Clone, Copy, Debug)]
struct BlockMesh {
    block_rows: usize,
    block_cols: usize,
}

impl BlockMesh {
    #[inline]
    fn len(self) -> usize {
        self.block_rows * self.block_cols
    }

    #[inline]
    fn offset(self, idx: usize, dr: isize, dc: isize) -> usize {
        let br = (idx / self.block_cols) as isize + dr;
        let bc = (idx % self.block_cols) as isize + dc;
        let br = br.rem_euclid(self.block_rows as isize) as usize;
        let bc = bc.rem_euclid(self.block_cols as isize) as usize;
        br * self.block_cols + bc
    }

    #[inline]
    fn neighbor(self, idx: usize, dir: Direction) -> usize {
        let (dr, dc) = dir.offset();
        self.offset(idx, dr, dc)
    }

    #[inline]
    fn neighbors(self, idx: usize) -> [usize; 8] {
        Direction::ALL.map(|dir| self.neighbor(idx, dir))
    }
}

/// Read-only view of one slot of block data.
#[derive(Clone, Copy)]
struct BlockView<'a> {
    mesh: BlockMesh,
    size: usize,
    cells: &'a [u8],
}

impl BlockView<'_> {
    #[inline]
    fn local(&self, block: usize, r: usize, c: usize) -> u8 {
        self.cells[(block * self.size + r) * self.size + c]
    }

    /// Cell at local `(r, c)` of `block`, where `r` and `c` may step one
    /// cell outside the block into a neighbor.
    #[inline]
    fn spill(&self, block: usize, r: isize, c: isize) -> u8 {
        let size = self.size as isize;
        let (dr, r) = if r < 0 {
            (-1, r + size)
        } else if r >= size {
            (1, r - size)
        } else {
            (0, r)
        };
        let (dc, c) = if c < 0 {
            (-1, c + size)
        } else if c >= size {
            (1, c - size)
        } else {
            (0, c)
        };
        let owner = if dr == 0 && dc == 0 {
            block
        } else {
            self.mesh.offset(block, dr, dc)
        };
        self.local(owner, r as usize, c as usize)
    }

    fn interior_neighbors(&self, block: usize, r: usize, c: usize) -> u8 {
        let mut count = 0;
        for nr in r - 1..=r + 1 {
            for nc in c - 1..=c + 1 {
                count += self.local(block, nr, nc);
            }
        }
        count - self.local(block, r, c)
    }

    fn border_neighbors(&self, block: usize, r: usize, c: usize) -> u8 {
        let (r, c) = (r as isize, c as isize);
        let mut count = 0;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                count += self.spill(block, r + dr, c + dc);
            }
        }
        count
    }
}

/// Recompute the interior of `block`. Returns whether any cell changed.
fn compute_interior(
    view: BlockView<'_>,
    block: usize,
    out: &mut [u8],
    stats: &mut BlockStats,
) -> bool {
    let size = view.size;
    let mut changed = false;
    for r in 1..size.saturating_sub(1) {
        for c in 1..size - 1 {
            let alive = view.local(block, r, c);
            let next = decide(alive != 0, view.interior_neighbors(block, r, c)) as u8;
            changed |= next != alive;
            out[r * size + c] = next;
        }
    }
    stats.cells_evaluated += (size.saturating_sub(2) * size.saturating_sub(2)) as u64;
    changed
}

/// Recompute the border ring of `block`. Returns whether any cell changed.
fn compute_border(
    view: BlockView<'_>,
    block: usize,
    out: &mut [u8],
    stats: &mut BlockStats,
) -> bool {
    let size = view.size;
    let mut changed = false;
    let mut visit = |r: usize, c: usize| {
        let alive = view.local(block, r, c);
        let next = decide(alive != 0, view.border_neighbors(block, r, c)) as u8;
        changed |= next != alive;
        out[r * size + c] = next;
        stats.cells_evaluated += 1;
    };
    for c in 0..size {
        visit(0, c);
    }
    if size > 1 {
        for c in 0..size {
            visit(size - 1, c);
        }
    }
    for r in 1..size.saturating_sub(1) {
        visit(r, 0);
        if size > 1 {
            visit(r, size - 1);
        }
    }
    changed
}

fn copy_interior(src: &[u8], out: &mut [u8], size: usize) {
    for r in 1..size.saturating_sub(1) {
        let row = r * size;
        out[row + 1..row + size - 1].copy_from_slice(&src[row + 1..row + size - 1]);
    }
}

pub struct BlockEvolver {
    mesh: BlockMesh,
    size: usize,
    rows: usize,
    cols: usize,
    /// Block-major cells: block `b` occupies `b * size^2 ..`, row-major.
    cells: [Vec<u8>; 2],
    active: [Vec<bool>; 2],
    phase: usize,
    policy: ActivityPolicy,
    generation: u64,
    last_stats: BlockStats,
    total_stats: BlockStats,
}

impl BlockEvolver {
    pub fn new(initial: Grid, block_size: usize) -> Result<Self> {
        Self::with_policy(initial, block_size, ActivityPolicy::default())
    }

    pub fn with_policy(initial: Grid, block_size: usize, policy: ActivityPolicy) -> Result<Self> {
        let (rows, cols) = (initial.rows(), initial.cols());
        if block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }
        if rows % block_size != 0 || cols % block_size != 0 {
            return Err(Error::BlockMismatch {
                rows,
                cols,
                block_size,
            });
        }
        let mesh = BlockMesh {
            block_rows: rows / block_size,
            block_cols: cols / block_size,
        };

        let mut cells = vec![0u8; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                let block = (r / block_size) * mesh.block_cols + c / block_size;
                let local = (r % block_size) * block_size + c % block_size;
                cells[block * block_size * block_size + local] = initial.get(r, c) as u8;
            }
        }

        debug!(
            rows,
            cols,
            block_size,
            blocks = mesh.len(),
            ?policy,
            "block evolver ready"
        );
        Ok(Self {
            mesh,
            size: block_size,
            rows,
            cols,
            cells: [cells, vec![0; rows * cols]],
            // No history yet: everything must be computed once.
            active: [vec![true; mesh.len()], vec![false; mesh.len()]],
            phase: 0,
            policy,
            generation: 0,
            last_stats: BlockStats::default(),
            total_stats: BlockStats::default(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.size
    }

    /// Blocks per row and per column of the block grid.
    pub fn block_dims(&self) -> (usize, usize) {
        (self.mesh.block_rows, self.mesh.block_cols)
    }

    /// Current active flags, row-major over the block grid.
    pub fn active_blocks(&self) -> &[bool] {
        &self.active[self.phase]
    }

    pub fn active_count(&self) -> usize {
        self.active_blocks().iter().filter(|&&a| a).count()
    }

    /// Neighbor of `block` in direction `dir` on the toroidal block grid.
    pub fn neighbor(&self, block: usize, dir: Direction) -> usize {
        self.mesh.neighbor(block, dir)
    }

    /// Counters for the most recent step.
    pub fn last_stats(&self) -> BlockStats {
        self.last_stats
    }

    /// Counters accumulated since construction.
    pub fn total_stats(&self) -> BlockStats {
        self.total_stats
    }

    /// Slot index holding the live generation.
    pub fn phase(&self) -> usize {
        self.phase
    }

    fn step_impl(&mut self) {
        let size = self.size;
        let area = size * size;
        let mesh = self.mesh;
        let policy = self.policy;
        let mut stats = BlockStats::default();

        let [cells_a, cells_b] = &mut self.cells;
        let [active_a, active_b] = &mut self.active;
        let (src, dst, now_active, next_active) = if self.phase == 0 {
            (&*cells_a, cells_b, &*active_a, active_b)
        } else {
            (&*cells_b, cells_a, &*active_b, active_a)
        };
        let view = BlockView {
            mesh,
            size,
            cells: src,
        };

        for block in 0..mesh.len() {
            let range = block * area..(block + 1) * area;
            let out = &mut dst[range.clone()];
            let own = &src[range];

            let recomputed = if now_active[block] {
                stats.recomputed += 1;
                let interior = compute_interior(view, block, out, &mut stats);
                let border = compute_border(view, block, out, &mut stats);
                Some(interior | border)
            } else if mesh.neighbors(block).iter().any(|&n| now_active[n]) {
                stats.border_only += 1;
                copy_interior(own, out, size);
                Some(compute_border(view, block, out, &mut stats))
            } else {
                stats.skipped += 1;
                out.copy_from_slice(own);
                None
            };

            next_active[block] = match (policy, recomputed) {
                (_, None) => false,
                (ActivityPolicy::ChangeTracking, Some(changed)) => changed,
                (ActivityPolicy::Sticky, Some(_)) => true,
            };
        }

        self.phase ^= 1;
        self.generation += 1;
        self.last_stats = stats;
        self.total_stats += stats;
    }
}

impl Evolver for BlockEvolver {
    fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step_impl();
        }
        if n > 0 {
            debug!(
                steps = n,
                generation = self.generation,
                active = self.active_count(),
                "block run finished"
            );
        }
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Grid {
        let size = self.size;
        let cells = &self.cells[self.phase];
        let mut grid = Grid::zeroed(self.rows, self.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                let block = (r / size) * self.mesh.block_cols + c / size;
                let local = (r % size) * size + c % size;
                grid.set(r, c, cells[block * size * size + local] != 0);
            }
        }
        grid
    }
}
