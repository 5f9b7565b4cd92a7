//! Row kernel shared by the row-partitioned evolvers.
//!
//! Advances one row from the three rows around it. Column sums are slid
//! across the row so each cell costs three additions instead of eight
//! lookups; the column index wraps at both ends.

use crate::rules::decide;

#[inline(always)]
fn column(above: &[u8], row: &[u8], below: &[u8], j: usize) -> u8 {
    above[j] + row[j] + below[j]
}

/// Advance one toroidal row into `out`.
/// Returns whether any cell differs from `row`.
///
/// `above` and `below` are the wrapped neighbors of `row`; on a one-row
/// grid all three slices are the same row. The result matches
/// `Grid::neighbor_count` + `decide` cell for cell, including on one and
/// two column grids where a wrapped neighbor is counted once per position.
#[inline]
pub fn advance_row(above: &[u8], row: &[u8], below: &[u8], out: &mut [u8]) -> bool {
    let cols = row.len();
    debug_assert!(cols > 0);
    debug_assert_eq!(above.len(), cols);
    debug_assert_eq!(below.len(), cols);
    debug_assert_eq!(out.len(), cols);

    let mut changed = false;
    let mut left = column(above, row, below, cols - 1);
    let mut mid = column(above, row, below, 0);
    for j in 0..cols {
        let right_index = if j + 1 == cols { 0 } else { j + 1 };
        let right = column(above, row, below, right_index);
        let neighbors = left + mid + right - row[j];
        let next = decide(row[j] != 0, neighbors) as u8;
        changed |= next != row[j];
        out[j] = next;
        left = mid;
        mid = right;
    }
    changed
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use super::advance_row;
    use crate::grid::Grid;
    use crate::rules::decide;

    fn reference_row(grid: &Grid, r: usize) -> Vec<u8> {
        (0..grid.cols())
            .map(|c| decide(grid.get(r, c), grid.neighbor_count(r, c)) as u8)
            .collect()
    }

    fn check_grid(grid: &Grid) {
        let rows = grid.rows();
        for r in 0..rows {
            let mut out = vec![0u8; grid.cols()];
            let above = grid.row((r + rows - 1) % rows);
            let below = grid.row((r + 1) % rows);
            let changed = advance_row(above, grid.row(r), below, &mut out);
            assert_eq!(out, reference_row(grid, r), "row {r} of {rows}x{}", grid.cols());
            assert_eq!(changed, out.as_slice() != grid.row(r));
        }
    }

    #[test]
    fn matches_neighbor_count_on_random_grids() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x0DD_C015);
        for (rows, cols) in [(1, 1), (1, 5), (5, 1), (2, 2), (2, 7), (3, 3), (9, 13)] {
            for _ in 0..8 {
                let density = rng.random::<f64>();
                let grid = Grid::random(rows, cols, density, &mut rng).expect("valid grid");
                check_grid(&grid);
            }
        }
    }

    #[test]
    fn blinker_row_turns_vertical() {
        let above = [0, 0, 0, 0, 0];
        let row = [0, 1, 1, 1, 0];
        let mut out = [0u8; 5];
        assert!(advance_row(&above, &row, &above, &mut out));
        assert_eq!(out, [0, 0, 1, 0, 0]);
    }
}
