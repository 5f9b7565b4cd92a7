#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use torus_life::{LifeConfig, Outcome, Simulation, Strategy};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Naive,
    Block,
    Barrier,
    Pipelined,
    /// Run every strategy from the same initial grid and compare.
    All,
}

impl StrategyArg {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Naive => vec![Strategy::Naive],
            StrategyArg::Block => vec![Strategy::Block],
            StrategyArg::Barrier => vec![Strategy::Barrier],
            StrategyArg::Pipelined => vec![Strategy::Pipelined],
            StrategyArg::All => Strategy::ALL.to_vec(),
        }
    }
}

/// Evolve a random toroidal Game of Life grid and time it.
#[derive(Debug, Parser)]
#[command(name = "torus-life", version)]
struct Cli {
    rows: usize,
    cols: usize,
    /// Probability of each cell starting alive, in [0, 1].
    density: f64,
    steps: u64,

    /// RNG seed; negative seeds from OS entropy.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    seed: i64,

    #[arg(long, default_value_t = 1)]
    threads: usize,

    #[arg(long, default_value_t = 4)]
    block_size: usize,

    #[arg(long, value_enum, default_value_t = StrategyArg::Naive)]
    strategy: StrategyArg,

    /// Print the initial and final grids.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn config(&self) -> LifeConfig {
        LifeConfig::default()
            .dimensions(self.rows, self.cols)
            .density(self.density)
            .steps(self.steps)
            .seed(self.seed)
            .thread_count(self.threads)
            .block_size(self.block_size)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> torus_life::Result<bool> {
    let config = cli.config();
    let strategies = cli.strategy.strategies();

    let simulations = strategies
        .iter()
        .map(|&strategy| Simulation::new(config.clone(), strategy))
        .collect::<torus_life::Result<Vec<_>>>()?;

    // One draw, shared by every strategy, so negative seeds still compare.
    let initial = simulations[0].seed_grid()?;
    if cli.debug {
        println!("Initial grid:");
        print!("{initial}");
    }

    info!(strategies = strategies.len(), "seeded initial grid");
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(simulations.len());
    for sim in &simulations {
        let outcome = sim.run_from(initial.clone())?;
        println!(
            "{:<10} {:.6} s",
            outcome.strategy.name(),
            outcome.elapsed.as_secs_f64()
        );
        outcomes.push(outcome);
    }

    if cli.debug {
        if let Some(last) = outcomes.last() {
            println!("Final grid:");
            print!("{}", last.final_grid);
        }
    }

    let reference = &outcomes[0];
    let mut agree = true;
    for outcome in &outcomes[1..] {
        if outcome.final_grid != reference.final_grid {
            agree = false;
            println!(
                "MISMATCH: {} disagrees with {} (population {} vs {})",
                outcome.strategy,
                reference.strategy,
                outcome.final_grid.population(),
                reference.final_grid.population()
            );
        }
    }
    if outcomes.len() > 1 && agree {
        println!("All {} strategies agree.", outcomes.len());
    }
    Ok(agree)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
