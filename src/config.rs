//! Run configuration.
//!
//! YAML configuration files with sensible defaults. The defaults target an
//! MNIST-shaped task: 784 inputs, two hidden layers of 32 units, 10
//! classes.

use crate::error::EvolutionError;
use crate::genome::MutationRates;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub topology: TopologyConfig,
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub mutation: MutationRates,
}

/// Network topology, fixed for every organism in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Feature dimension D of the evaluation set.
    pub input_dim: usize,
    /// Hidden layer sizes, in feedforward order.
    pub hidden: Vec<usize>,
    /// Class count C; also the output layer size.
    pub n_classes: usize,
}

/// Evolutionary loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of generations to run (generation 0 included).
    pub generations: u64,
    /// Organisms per generation.
    pub population_size: usize,
    /// Breeding parents retained each generation, elite included.
    pub n_survivors: usize,
    /// Fraction of the evaluation set sampled per fitness call.
    pub sample_fraction: f32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            input_dim: 784,
            hidden: vec![32, 32],
            n_classes: 10,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            population_size: 10,
            n_survivors: 5,
            sample_fraction: 0.7,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology: TopologyConfig::default(),
            evolution: EvolutionConfig::default(),
            mutation: MutationRates::default(),
        }
    }
}

impl TopologyConfig {
    /// Layer dimensions from input to output: D, hidden sizes, C.
    pub fn dims(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.hidden.len() + 2);
        dims.push(self.input_dim);
        dims.extend_from_slice(&self.hidden);
        dims.push(self.n_classes);
        dims
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EvolutionError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| EvolutionError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EvolutionError> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| EvolutionError::InvalidFormat(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values; fails fast before any population is
    /// constructed.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.topology.input_dim == 0 || self.topology.n_classes == 0 {
            return Err(EvolutionError::Configuration(
                "input_dim and n_classes must be > 0".to_string(),
            ));
        }
        if self.topology.hidden.iter().any(|&h| h == 0) {
            return Err(EvolutionError::Configuration(
                "hidden layer sizes must be > 0".to_string(),
            ));
        }
        if self.evolution.generations == 0 {
            return Err(EvolutionError::Configuration(
                "generations must be > 0".to_string(),
            ));
        }
        if self.evolution.population_size < 2 {
            return Err(EvolutionError::Configuration(format!(
                "population_size must be at least 2, got {}",
                self.evolution.population_size
            )));
        }
        if self.evolution.n_survivors < 2
            || self.evolution.n_survivors > self.evolution.population_size
        {
            return Err(EvolutionError::Configuration(format!(
                "n_survivors must be in [2, population_size], got {}",
                self.evolution.n_survivors
            )));
        }
        if !(self.evolution.sample_fraction > 0.0 && self.evolution.sample_fraction <= 1.0) {
            return Err(EvolutionError::Configuration(format!(
                "sample_fraction must be in (0, 1], got {}",
                self.evolution.sample_fraction
            )));
        }
        self.mutation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dims() {
        let config = Config::default();
        assert_eq!(config.topology.dims(), vec![784, 32, 32, 10]);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.evolution.population_size, loaded.evolution.population_size);
        assert_eq!(config.topology.hidden, loaded.topology.hidden);
    }

    #[test]
    fn test_survivor_bounds() {
        let mut config = Config::default();
        config.evolution.n_survivors = 1;
        assert!(config.validate().is_err());

        config.evolution.n_survivors = config.evolution.population_size + 1;
        assert!(config.validate().is_err());

        config.evolution.n_survivors = config.evolution.population_size;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_fraction_bounds() {
        let mut config = Config::default();
        config.evolution.sample_fraction = 0.0;
        assert!(config.validate().is_err());
        config.evolution.sample_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_rate_rejected() {
        let mut config = Config::default();
        config.mutation.connections = -0.1;
        assert!(config.validate().is_err());
    }
}
