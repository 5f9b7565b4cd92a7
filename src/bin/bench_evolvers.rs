//! Timing tables for the evolvers.
//!
//! Two tables: every strategy across grid sizes, then the threaded
//! strategies across thread counts on one grid. Each row is repeated with
//! seeds `1..=reps` and reports the mean and the fastest run. Use with
//! `--release` for meaningful results.

#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use rand::SeedableRng;
use torus_life::simulation::build_evolver;
use torus_life::{Grid, LifeConfig, Strategy};

#[derive(Debug, Parser)]
#[command(name = "bench_evolvers")]
struct BenchArgs {
    /// Edge length of the grid used for the thread sweep.
    #[arg(long, default_value_t = 2048)]
    size: usize,

    #[arg(long, default_value_t = 100)]
    steps: u64,

    #[arg(long, default_value_t = 0.5)]
    density: f64,

    /// Runs per row, seeded 1..=reps.
    #[arg(long, default_value_t = 10)]
    reps: u64,

    /// Largest thread count in the sweep; defaults to the available cores.
    #[arg(long)]
    max_threads: Option<usize>,

    /// Skip the grid-size table.
    #[arg(long)]
    sweep_only: bool,
}

struct Timing {
    mean_ms: f64,
    min_ms: f64,
}

fn seeded_grid(size: usize, density: f64, seed: u64) -> Grid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    match Grid::random(size, size, density, &mut rng) {
        Ok(grid) => grid,
        Err(err) => panic!("seeding {size}x{size} failed: {err}"),
    }
}

fn bench(strategy: Strategy, config: &LifeConfig, reps: u64) -> Timing {
    let mut total_ms = 0.0;
    let mut min_ms = f64::INFINITY;
    for seed in 1..=reps {
        let initial = seeded_grid(config.rows, config.density, seed);
        let mut evolver = match build_evolver(strategy, initial, config) {
            Ok(evolver) => evolver,
            Err(err) => panic!("{strategy} setup failed: {err}"),
        };
        let ms = evolver.run(config.steps).as_secs_f64() * 1000.0;
        std::hint::black_box(evolver.snapshot().population());
        total_ms += ms;
        min_ms = min_ms.min(ms);
    }
    Timing {
        mean_ms: total_ms / reps as f64,
        min_ms,
    }
}

fn print_header(first: &str) {
    println!(
        "{:<10} {:<10} {:>8} {:>12} {:>12} {:>10}",
        first, "Strategy", "Iters", "Mean(ms)", "Min(ms)", "Avg/iter"
    );
    println!("{}", "-".repeat(68));
}

fn print_row(first: &str, strategy: Strategy, iters: u64, timing: &Timing) {
    println!(
        "{:<10} {:<10} {:>8} {:>12.1} {:>12.1} {:>10.4}",
        first,
        strategy.name(),
        iters,
        timing.mean_ms,
        timing.min_ms,
        timing.mean_ms / iters as f64
    );
}

fn main() {
    let args = BenchArgs::parse();
    let reps = args.reps.max(1);
    let max_threads = args
        .max_threads
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, |n| n.get()))
        .max(1);

    if !args.sweep_only {
        let scales: &[(usize, u64)] = &[(128, 400), (512, 200), (1024, 100), (2048, 40)];
        println!("grid sizes ({max_threads} threads, {reps} reps)");
        print_header("Grid");
        for &(size, iters) in scales {
            let config = LifeConfig::default()
                .dimensions(size, size)
                .density(args.density)
                .steps(iters)
                .thread_count(max_threads)
                .block_size(16);
            for strategy in Strategy::ALL {
                let timing = bench(strategy, &config, reps);
                print_row(&format!("{}x{}", size, size), strategy, iters, &timing);
            }
        }
        println!();
    }

    let config = LifeConfig::default()
        .dimensions(args.size, args.size)
        .density(args.density)
        .steps(args.steps);
    println!(
        "thread sweep ({}x{}, {} reps)",
        args.size, args.size, reps
    );
    print_header("Threads");
    for threads in 1..=max_threads {
        let config = config.clone().thread_count(threads);
        for strategy in [Strategy::Barrier, Strategy::Pipelined] {
            let timing = bench(strategy, &config, reps);
            print_row(&threads.to_string(), strategy, args.steps, &timing);
        }
    }
}
