//! Validated, seeded, timed runs.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::LifeConfig;
use crate::error::Result;
use crate::evolve::{BarrierEvolver, BlockEvolver, Evolver, NaiveEvolver, PipelinedLockEvolver};
use crate::grid::Grid;

/// Which evolver drives a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Naive,
    Block,
    Barrier,
    Pipelined,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Naive,
        Strategy::Block,
        Strategy::Barrier,
        Strategy::Pipelined,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Block => "block",
            Strategy::Barrier => "barrier",
            Strategy::Pipelined => "pipelined",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(Strategy::Naive),
            "block" => Ok(Strategy::Block),
            "barrier" => Ok(Strategy::Barrier),
            "pipelined" | "locks" => Ok(Strategy::Pipelined),
            other => Err(format!(
                "unknown strategy: {other} (expected naive, block, barrier, or pipelined)"
            )),
        }
    }
}

/// Build the evolver for `strategy` around `initial`.
pub fn build_evolver(
    strategy: Strategy,
    initial: Grid,
    config: &LifeConfig,
) -> Result<Box<dyn Evolver + Send>> {
    Ok(match strategy {
        Strategy::Naive => Box::new(NaiveEvolver::new(initial)),
        Strategy::Block => Box::new(BlockEvolver::new(initial, config.block_size)?),
        Strategy::Barrier => Box::new(BarrierEvolver::new(initial, config.thread_count)?),
        Strategy::Pipelined => Box::new(PipelinedLockEvolver::new(initial, config.thread_count)?),
    })
}

/// What a run hands back to the caller.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub strategy: Strategy,
    pub initial: Grid,
    pub final_grid: Grid,
    /// Evolution time only; seeding and teardown are excluded.
    pub elapsed: Duration,
    pub generation: u64,
}

/// A configuration checked against one strategy.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: LifeConfig,
    strategy: Strategy,
}

impl Simulation {
    pub fn new(config: LifeConfig, strategy: Strategy) -> Result<Self> {
        config.validate_for(strategy)?;
        Ok(Self { config, strategy })
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Draw the initial grid from the configured seed.
    pub fn seed_grid(&self) -> Result<Grid> {
        let mut rng = self.config.rng();
        Grid::random(self.config.rows, self.config.cols, self.config.density, &mut rng)
    }

    /// Seed, evolve for the configured number of steps, and time it.
    pub fn run(&self) -> Result<Outcome> {
        self.run_from(self.seed_grid()?)
    }

    /// Evolve a caller-supplied initial grid instead of a seeded one.
    pub fn run_from(&self, initial: Grid) -> Result<Outcome> {
        let mut evolver = build_evolver(self.strategy, initial.clone(), &self.config)?;
        debug!(
            strategy = %self.strategy,
            rows = initial.rows(),
            cols = initial.cols(),
            steps = self.config.steps,
            "starting run"
        );
        let elapsed = evolver.run(self.config.steps);
        let final_grid = evolver.snapshot();
        info!(
            strategy = %self.strategy,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            population = final_grid.population(),
            "run finished"
        );
        Ok(Outcome {
            strategy: self.strategy,
            initial,
            final_grid,
            elapsed,
            generation: evolver.generation(),
        })
    }
}
