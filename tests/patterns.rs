use torus_life::{
    BarrierEvolver, BlockEvolver, Evolver, Grid, NaiveEvolver, PipelinedLockEvolver,
};

const GLIDER: [(isize, isize); 5] = [(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)];

fn grid_with(rows: usize, cols: usize, cells: &[(isize, isize)]) -> Grid {
    let mut grid = Grid::new(rows, cols).unwrap();
    grid.set_cells(cells);
    grid
}

fn translated(cells: &[(isize, isize)], dr: isize, dc: isize) -> Vec<(isize, isize)> {
    cells.iter().map(|&(r, c)| (r + dr, c + dc)).collect()
}

fn assert_alive(grid: &Grid, cells: &[(isize, isize)]) {
    for &(r, c) in cells {
        assert!(grid.get_wrapped(r, c), "expected ({r}, {c}) alive");
    }
}

fn evolvers(grid: &Grid) -> Vec<(&'static str, Box<dyn Evolver>)> {
    let naive: Box<dyn Evolver> = Box::new(NaiveEvolver::new(grid.clone()));
    let block: Box<dyn Evolver> = Box::new(BlockEvolver::new(grid.clone(), 4).unwrap());
    let barrier: Box<dyn Evolver> = Box::new(BarrierEvolver::new(grid.clone(), 3).unwrap());
    let pipelined: Box<dyn Evolver> =
        Box::new(PipelinedLockEvolver::new(grid.clone(), 3).unwrap());
    vec![
        ("naive", naive),
        ("block", block),
        ("barrier", barrier),
        ("pipelined", pipelined),
    ]
}

#[test]
fn glider_moves_down_right_every_four_steps() {
    let start = grid_with(8, 8, &GLIDER);
    let expected = grid_with(8, 8, &translated(&GLIDER, 1, 1));
    for (name, mut evolver) in evolvers(&start) {
        evolver.step_n(4);
        let after = evolver.snapshot();
        assert_eq!(after.population(), 5, "{name}");
        assert_alive(&after, &translated(&GLIDER, 1, 1));
        assert_eq!(after, expected, "{name}");
    }
}

#[test]
fn glider_wraps_around_the_torus() {
    let start = grid_with(8, 8, &GLIDER);
    for (name, mut evolver) in evolvers(&start) {
        // Straddles both seams by now.
        evolver.step_n(20);
        assert_eq!(
            evolver.snapshot(),
            grid_with(8, 8, &translated(&GLIDER, 5, 5)),
            "{name}"
        );
        // 32 steps move it 8 cells each way: back where it started.
        evolver.step_n(12);
        assert_eq!(evolver.snapshot(), start, "{name}");
    }
}

#[test]
fn blinker_oscillates() {
    let horizontal = grid_with(8, 8, &[(4, 3), (4, 4), (4, 5)]);
    let vertical = grid_with(8, 8, &[(3, 4), (4, 4), (5, 4)]);
    for (name, mut evolver) in evolvers(&horizontal) {
        evolver.step();
        assert_eq!(evolver.snapshot(), vertical, "{name}");
        evolver.step();
        assert_eq!(evolver.snapshot(), horizontal, "{name}");
    }
}

#[test]
fn block_is_stable() {
    let still = grid_with(8, 8, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    for (name, mut evolver) in evolvers(&still) {
        evolver.step_n(7);
        assert_eq!(evolver.snapshot(), still, "{name}");
    }
}

#[test]
fn still_life_leaves_no_active_blocks() {
    let still = grid_with(8, 8, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
    let mut block = BlockEvolver::new(still.clone(), 4).unwrap();
    assert_eq!(block.active_count(), 4);

    block.step();
    assert_eq!(block.active_count(), 0);
    assert_eq!(block.last_stats().recomputed, 4);

    block.step_n(5);
    let stats = block.last_stats();
    assert_eq!(stats.cells_evaluated, 0);
    assert_eq!(stats.skipped, 4);
    assert_eq!(block.total_stats().cells_evaluated, 64);
    assert_eq!(block.snapshot(), still);
}

#[test]
fn block_straddling_a_block_seam_is_stable() {
    let still = grid_with(8, 8, &[(3, 3), (3, 4), (4, 3), (4, 4)]);
    let mut block = BlockEvolver::new(still.clone(), 4).unwrap();
    block.step_n(3);
    assert_eq!(block.active_count(), 0);
    assert_eq!(block.snapshot(), still);
}

#[test]
fn empty_grid_stays_empty() {
    for (name, mut evolver) in evolvers(&Grid::new(8, 8).unwrap()) {
        evolver.step_n(3);
        assert!(evolver.snapshot().is_empty(), "{name}");
    }
}

#[test]
fn buffer_roles_follow_step_parity() {
    let start = grid_with(10, 10, &GLIDER);
    for steps in [1, 2, 5, 6] {
        let mut naive = NaiveEvolver::new(start.clone());
        naive.step_n(steps);
        let expected_phase = (steps % 2) as usize;
        assert_eq!(naive.buffers().phase(), expected_phase);

        let mut barrier = BarrierEvolver::new(start.clone(), 2).unwrap();
        barrier.step_n(steps);
        assert_eq!(barrier.buffers().phase(), expected_phase);
        assert_eq!(barrier.snapshot(), naive.snapshot());

        let mut pipelined = PipelinedLockEvolver::new(start.clone(), 4).unwrap();
        pipelined.step_n(steps);
        assert_eq!(pipelined.buffers().phase(), expected_phase);
        assert_eq!(pipelined.snapshot(), naive.snapshot());

        let mut block = BlockEvolver::new(start.clone(), 5).unwrap();
        block.step_n(steps);
        assert_eq!(block.phase(), expected_phase);
        assert_eq!(block.snapshot(), naive.snapshot());
    }
}
