//! # evonet
//!
//! Genetic evolution of bit-encoded feedforward classifiers.
//!
//! A population of small networks is scored by sampled classification
//! accuracy and bred by elitism, fitness-proportionate selection, per-gene
//! crossover, and 7-bit gene mutation. No gradients anywhere.
//!
//! ## Features
//!
//! - **Bit-level genomes**: scalar weight/bias genes mutate as 7-bit
//!   patterns, connectivity masks flip cell by cell
//! - **Parallel**: per-organism fitness evaluation runs on all cores via
//!   rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: one seeded RNG drives every random draw in a run
//!
//! ## Quick start
//!
//! ```rust
//! use evonet::{AccuracyEvaluator, Config, Dataset, Population};
//!
//! let mut config = Config::default();
//! config.topology.input_dim = 12;
//! config.topology.hidden = vec![8];
//! config.topology.n_classes = 3;
//! config.evolution.population_size = 6;
//! config.evolution.n_survivors = 3;
//! config.evolution.sample_fraction = 1.0;
//!
//! let dataset = Dataset::synthetic(60, 12, 3, 42).unwrap();
//! let evaluator = AccuracyEvaluator::new(dataset, 1.0).unwrap();
//! let mut population = Population::new(&config, evaluator, 42).unwrap();
//!
//! for _ in 1..10 {
//!     population.breed().unwrap();
//! }
//! println!("best accuracy: {}", population.max_fitness());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod genome;
pub mod population;
pub mod report;

// Re-export main types
pub use config::Config;
pub use dataset::Dataset;
pub use error::EvolutionError;
pub use evaluate::{AccuracyEvaluator, Evaluator};
pub use genome::{Activation, Layer, MutationRates, Network};
pub use population::{GenerationStats, Population};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_evolution() {
        let mut config = Config::default();
        config.topology.input_dim = 8;
        config.topology.hidden = vec![6];
        config.topology.n_classes = 2;
        config.evolution.population_size = 4;
        config.evolution.n_survivors = 3;
        config.evolution.sample_fraction = 1.0;

        let dataset = Dataset::synthetic(20, 8, 2, 7).unwrap();
        let evaluator = AccuracyEvaluator::new(dataset, 1.0).unwrap();
        let population = Population::new(&config, evaluator, 7).unwrap();

        assert_eq!(population.organisms.len(), 4);
        assert_eq!(population.history().len(), 1);
    }
}
