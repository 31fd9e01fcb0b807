//! Fitness evaluation: sampled classification accuracy.

use crate::dataset::Dataset;
use crate::error::EvolutionError;
use crate::genome::Network;
use ndarray::ArrayView1;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;

/// Scores organisms against a fixed evaluation set.
///
/// Sampling and scoring are split so that the population can draw every
/// organism's sample from its single shared RNG and then dispatch the pure
/// scoring step across a rayon worker pool without sharing mutable state.
pub trait Evaluator: Sync {
    /// Draw example indices without replacement from the evaluation set.
    fn draw_sample(&self, rng: &mut ChaCha8Rng) -> Vec<usize>;

    /// Score a network on a previously drawn sample. Pure: repeated calls
    /// with the same arguments return the same fitness.
    fn score(&self, network: &Network, sample: &[usize]) -> f32;

    /// Check a network can be scored at all. Called once per population at
    /// construction, before any organism is evaluated.
    fn check_compatibility(&self, _network: &Network) -> Result<(), EvolutionError> {
        Ok(())
    }
}

/// Classification accuracy over a random sample of the evaluation set.
///
/// The fitness denominator is the full dataset size, not the sample size.
/// With `sample_fraction < 1` this understates absolute accuracy but leaves
/// the ranking of organisms within a generation unchanged, since the divisor
/// is a per-generation constant.
pub struct AccuracyEvaluator {
    dataset: Dataset,
    sample_fraction: f32,
}

impl AccuracyEvaluator {
    pub fn new(dataset: Dataset, sample_fraction: f32) -> Result<Self, EvolutionError> {
        if !(sample_fraction > 0.0 && sample_fraction <= 1.0) {
            return Err(EvolutionError::Configuration(format!(
                "sample_fraction must be in (0, 1], got {}",
                sample_fraction
            )));
        }
        Ok(Self {
            dataset,
            sample_fraction,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Evaluator for AccuracyEvaluator {
    fn draw_sample(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let count = (self.sample_fraction * self.dataset.len() as f32) as usize;
        index::sample(rng, self.dataset.len(), count).into_vec()
    }

    fn check_compatibility(&self, network: &Network) -> Result<(), EvolutionError> {
        if network.input_dim() != self.dataset.feature_dim() {
            return Err(EvolutionError::Configuration(format!(
                "network takes {} inputs but the dataset has {} features",
                network.input_dim(),
                self.dataset.feature_dim()
            )));
        }
        if network.output_dim() != self.dataset.n_classes() {
            return Err(EvolutionError::Configuration(format!(
                "network outputs {} classes but the dataset has {}",
                network.output_dim(),
                self.dataset.n_classes()
            )));
        }
        Ok(())
    }

    fn score(&self, network: &Network, sample: &[usize]) -> f32 {
        let mut correct = 0usize;
        for &i in sample {
            let output = network.forward(&self.dataset.features_of(i).to_owned());
            let predicted = argmax(output.view());
            let truth = argmax(self.dataset.label_of(i));
            if predicted == truth {
                correct += 1;
            }
        }
        correct as f32 / self.dataset.len() as f32
    }
}

/// Index of the largest component; ties resolve to the first occurrence.
pub fn argmax(v: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}
