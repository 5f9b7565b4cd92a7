//! Simulation configuration.
//!
//! Use `LifeConfig::default()` for a small sane setup, or customise
//! individual knobs via the builder methods. Nothing is checked until
//! `validate_for`, which reports the first problem it finds.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{Error, Result};
use crate::simulation::Strategy;

/// Configuration for one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct LifeConfig {
    pub rows: usize,
    pub cols: usize,
    /// Probability of each cell starting alive.
    pub density: f64,
    /// Full steps to evolve. Odd counts are fine.
    pub steps: u64,
    /// RNG seed for the initial state. Negative means seed from OS entropy.
    pub seed: i64,
    /// Worker count for the barrier and pipelined evolvers.
    pub thread_count: usize,
    /// Block edge length for the block evolver.
    pub block_size: usize,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            density: 0.5,
            steps: 100,
            seed: 0,
            thread_count: 1,
            block_size: 4,
        }
    }
}

impl LifeConfig {
    pub fn dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = n;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Check the fields `strategy` depends on.
    ///
    /// Thread count only matters for the threaded evolvers and block size
    /// only for the block evolver; the rest is always checked.
    pub fn validate_for(&self, strategy: Strategy) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.steps == 0 {
            return Err(Error::NoSteps);
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::DensityOutOfRange(self.density));
        }
        match strategy {
            Strategy::Naive => {}
            Strategy::Block => {
                if self.block_size == 0 {
                    return Err(Error::ZeroBlockSize);
                }
                if self.rows % self.block_size != 0 || self.cols % self.block_size != 0 {
                    return Err(Error::BlockMismatch {
                        rows: self.rows,
                        cols: self.cols,
                        block_size: self.block_size,
                    });
                }
            }
            Strategy::Barrier | Strategy::Pipelined => {
                if self.thread_count == 0 {
                    return Err(Error::NoThreads);
                }
            }
        }
        Ok(())
    }

    /// The RNG the initial state is drawn from.
    pub fn rng(&self) -> StdRng {
        if self.seed < 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(self.seed as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LifeConfig;
    use crate::error::Error;
    use crate::simulation::Strategy;

    #[test]
    fn default_is_valid_for_every_strategy() {
        let config = LifeConfig::default();
        for strategy in Strategy::ALL {
            config.validate_for(strategy).expect("default config should validate");
        }
    }

    #[test]
    fn rejects_bad_fields() {
        let base = LifeConfig::default();
        assert!(matches!(
            base.clone().dimensions(0, 8).validate_for(Strategy::Naive),
            Err(Error::EmptyGrid { .. })
        ));
        assert!(matches!(
            base.clone().steps(0).validate_for(Strategy::Naive),
            Err(Error::NoSteps)
        ));
        assert!(matches!(
            base.clone().density(1.01).validate_for(Strategy::Naive),
            Err(Error::DensityOutOfRange(_))
        ));
        assert!(matches!(
            base.clone().density(f64::NAN).validate_for(Strategy::Naive),
            Err(Error::DensityOutOfRange(_))
        ));
    }

    #[test]
    fn strategy_specific_fields() {
        let config = LifeConfig::default().thread_count(0).block_size(0);
        assert!(config.validate_for(Strategy::Naive).is_ok());
        assert!(matches!(config.validate_for(Strategy::Barrier), Err(Error::NoThreads)));
        assert!(matches!(config.validate_for(Strategy::Pipelined), Err(Error::NoThreads)));
        assert!(matches!(config.validate_for(Strategy::Block), Err(Error::ZeroBlockSize)));

        let uneven = LifeConfig::default().dimensions(10, 12).block_size(4);
        assert!(matches!(
            uneven.validate_for(Strategy::Block),
            Err(Error::BlockMismatch { rows: 10, cols: 12, block_size: 4 })
        ));
        assert!(uneven.validate_for(Strategy::Barrier).is_ok());
    }
}
