//! Toroidal Conway's Game of Life engine (B3/S23).
//!
//! Four evolvers advance the same torus with the same rule: a naive
//! per-cell recompute, a blocked recompute that skips quiet regions, and
//! two row-partitioned threaded evolvers, one synchronized by a barrier per
//! step and one by per-boundary-row gates.

pub mod config;
pub mod error;
pub mod evolve;
pub mod grid;
pub mod kernel;
pub mod rules;
pub mod simulation;

pub use config::LifeConfig;
pub use error::{Error, Result};
pub use evolve::{
    ActivityPolicy, BarrierEvolver, BlockEvolver, BlockStats, Evolver, NaiveEvolver,
    PipelinedLockEvolver,
};
pub use grid::{DoubleBuffer, Grid};
pub use simulation::{Outcome, Simulation, Strategy};
