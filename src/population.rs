//! Population: one generation of organisms and the breeding cycle.
//!
//! A generation advances through a fixed pipeline: fitness evaluation
//! (cached per generation), elitist selection, fitness-proportionate
//! survivor draw, per-gene crossover, and whole-genome mutation. The elite
//! organism skips crossover and mutation entirely and is reinserted into the
//! next generation unchanged.

use crate::config::Config;
use crate::error::EvolutionError;
use crate::evaluate::Evaluator;
use crate::genome::{Layer, MutationRates, Network};
use ndarray::Zip;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One history entry: the best and mean fitness of a generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub max_fitness: f32,
    pub avg_fitness: f32,
}

/// The current generation of networks plus the machinery to breed the next.
///
/// All randomness (evaluation sampling, selection, crossover coin flips,
/// mutation) flows through one seeded RNG, so a run is reproducible from its
/// seed.
pub struct Population<E: Evaluator> {
    /// Current organisms; always `population_size` long between breeds.
    pub organisms: Vec<Network>,
    elite: Option<Network>,
    fitness: Vec<f32>,
    fitness_generation: Option<u64>,
    generation: u64,
    history: Vec<GenerationStats>,
    population_size: usize,
    n_survivors: usize,
    rates: MutationRates,
    evaluator: E,
    rng: ChaCha8Rng,
    seed: u64,
}

impl<E: Evaluator> Population<E> {
    /// Build a population of randomly initialized organisms from a config.
    ///
    /// Evaluates generation 0 and records its history entry before
    /// returning.
    pub fn new(config: &Config, evaluator: E, seed: u64) -> Result<Self, EvolutionError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dims = config.topology.dims();
        let mut organisms = Vec::with_capacity(config.evolution.population_size);
        for _ in 0..config.evolution.population_size {
            organisms.push(Network::random(&dims, &mut rng)?);
        }
        Self::assemble(
            organisms,
            config.evolution.n_survivors,
            config.mutation,
            evaluator,
            rng,
            seed,
        )
    }

    /// Build a population from pre-constructed organisms. Used to seed runs
    /// with known genomes and by tests that need controlled fitness.
    pub fn from_organisms(
        organisms: Vec<Network>,
        n_survivors: usize,
        rates: MutationRates,
        evaluator: E,
        seed: u64,
    ) -> Result<Self, EvolutionError> {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Self::assemble(organisms, n_survivors, rates, evaluator, rng, seed)
    }

    fn assemble(
        organisms: Vec<Network>,
        n_survivors: usize,
        rates: MutationRates,
        evaluator: E,
        rng: ChaCha8Rng,
        seed: u64,
    ) -> Result<Self, EvolutionError> {
        if organisms.len() < 2 {
            return Err(EvolutionError::Configuration(format!(
                "population_size must be at least 2, got {}",
                organisms.len()
            )));
        }
        if n_survivors < 2 || n_survivors > organisms.len() {
            return Err(EvolutionError::Configuration(format!(
                "n_survivors must be in [2, {}], got {}",
                organisms.len(),
                n_survivors
            )));
        }
        rates.validate()?;
        check_uniform_topology(&organisms)?;
        evaluator.check_compatibility(&organisms[0])?;

        let population_size = organisms.len();
        let mut population = Self {
            organisms,
            elite: None,
            fitness: Vec::new(),
            fitness_generation: None,
            generation: 0,
            history: Vec::new(),
            population_size,
            n_survivors,
            rates,
            evaluator,
            rng,
            seed,
        };
        population.evaluate_current();
        population.record_history();
        Ok(population)
    }

    /// Per-organism fitness of the current generation, evaluating on the
    /// first call per generation and serving the cache afterwards.
    pub fn organism_fitness(&mut self) -> &[f32] {
        self.evaluate_current();
        &self.fitness
    }

    /// Best fitness in the current generation.
    pub fn max_fitness(&mut self) -> f32 {
        self.evaluate_current();
        self.fitness.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Mean fitness of the current generation.
    pub fn average_fitness(&mut self) -> f32 {
        self.evaluate_current();
        self.fitness.iter().sum::<f32>() / self.fitness.len() as f32
    }

    /// Current generation counter; generation 0 is the initial population.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// One (max, average) entry per generation, including generation 0.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Seed this population's RNG was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluate every organism if the cache is stale for this generation.
    ///
    /// Sample indices are drawn sequentially from the shared RNG, then
    /// scoring runs in parallel as a pure function of (network, sample), so
    /// results are identical to a sequential evaluation with the same seed.
    fn evaluate_current(&mut self) {
        if self.fitness_generation == Some(self.generation) {
            return;
        }
        let mut samples = Vec::with_capacity(self.organisms.len());
        for _ in 0..self.organisms.len() {
            samples.push(self.evaluator.draw_sample(&mut self.rng));
        }

        let evaluator = &self.evaluator;
        self.fitness = self
            .organisms
            .par_iter()
            .zip(samples.par_iter())
            .map(|(organism, sample)| evaluator.score(organism, sample))
            .collect();
        self.fitness_generation = Some(self.generation);
    }

    fn record_history(&mut self) {
        let max = self.fitness.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let avg = self.fitness.iter().sum::<f32>() / self.fitness.len() as f32;
        self.history.push(GenerationStats {
            max_fitness: max,
            avg_fitness: avg,
        });
    }

    /// Remove the fittest organism as the elite and draw `n_survivors - 1`
    /// breeding parents from the rest, fitness-proportionate, without
    /// replacement.
    ///
    /// All degeneracy checks run before any state changes, so an error
    /// leaves the population exactly as it was.
    pub fn selection(&mut self) -> Result<Vec<Network>, EvolutionError> {
        if self.elite.is_some() {
            return Err(EvolutionError::DegenerateSelection(
                "selection already performed for this generation".to_string(),
            ));
        }
        self.evaluate_current();

        let elite_index = max_index(&self.fitness);
        let wanted = self.n_survivors - 1;
        if wanted > self.organisms.len() - 1 {
            return Err(EvolutionError::DegenerateSelection(format!(
                "{} survivors requested from a pool of {}",
                wanted,
                self.organisms.len() - 1
            )));
        }
        let nonzero = self
            .fitness
            .iter()
            .enumerate()
            .filter(|&(i, &f)| i != elite_index && f > 0.0)
            .count();
        if nonzero == 0 {
            return Err(EvolutionError::DegenerateSelection(
                "all non-elite fitness values are zero".to_string(),
            ));
        }
        if nonzero < wanted {
            return Err(EvolutionError::DegenerateSelection(format!(
                "only {} organisms with nonzero fitness for {} survivor slots",
                nonzero, wanted
            )));
        }

        self.elite = Some(self.organisms.remove(elite_index));
        let mut weights = self.fitness.clone();
        weights.remove(elite_index);

        // Roulette wheel without replacement: each draw removes the chosen
        // organism from the pool and its weight from the running total.
        // Accumulation runs in f64 so rounding at the wheel's end cannot
        // hand the draw to a zero-fitness organism; if the target still
        // lands past the last increment, the draw falls back to the last
        // slot that carries weight.
        let mut pool: Vec<usize> = (0..self.organisms.len()).collect();
        let mut total: f64 = weights.iter().map(|&w| w as f64).sum();
        let mut survivors = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let target = self.rng.gen::<f32>() as f64 * total;
            let mut acc = 0.0f64;
            let mut chosen = pool
                .iter()
                .rposition(|&idx| weights[idx] > 0.0)
                .unwrap_or(0);
            for (slot, &idx) in pool.iter().enumerate() {
                acc += weights[idx] as f64;
                if target < acc {
                    chosen = slot;
                    break;
                }
            }
            let idx = pool.swap_remove(chosen);
            total -= weights[idx] as f64;
            survivors.push(self.organisms[idx].clone());
        }
        Ok(survivors)
    }

    /// Produce `population_size - 1` children from the survivors plus the
    /// elite; the elite itself fills the final slot during [`breed`].
    ///
    /// Each child samples two distinct parents uniformly from the pool.
    /// Scalar genes (weight, bias, activation) each inherit from one parent
    /// on a single coin flip per layer; the connectivity matrix crosses over
    /// cell by cell.
    ///
    /// [`breed`]: Population::breed
    pub fn crossover(&mut self, parents: &[Network]) -> Result<Vec<Network>, EvolutionError> {
        let elite = self.elite.as_ref().ok_or_else(|| {
            EvolutionError::DegenerateSelection(
                "crossover requires a prior selection".to_string(),
            )
        })?;
        let mut pool: Vec<&Network> = parents.iter().collect();
        pool.push(elite);

        for parent in &pool[1..] {
            if !pool[0].topology_matches(parent) {
                return Err(EvolutionError::TopologyMismatch {
                    expected: pool[0].topology_string(),
                    found: parent.topology_string(),
                });
            }
        }

        let mut children = Vec::with_capacity(self.population_size - 1);
        while children.len() < self.population_size - 1 {
            let picks = rand::seq::index::sample(&mut self.rng, pool.len(), 2);
            let father = pool[picks.index(0)];
            let mother = pool[picks.index(1)];
            children.push(cross_pair(father, mother, &mut self.rng)?);
        }
        Ok(children)
    }

    /// Advance one generation: selection, crossover, mutation, elite
    /// reinsertion, then evaluation and history bookkeeping for the new
    /// generation.
    pub fn breed(&mut self) -> Result<(), EvolutionError> {
        let survivors = self.selection()?;
        let mut next = self.crossover(&survivors)?;
        for child in &mut next {
            child.mutate(&self.rates, &mut self.rng);
        }
        match self.elite.take() {
            Some(elite) => next.push(elite),
            None => {
                return Err(EvolutionError::DegenerateSelection(
                    "elite lost during breeding".to_string(),
                ))
            }
        }

        self.organisms = next;
        self.generation += 1;
        self.evaluate_current();
        self.record_history();
        Ok(())
    }
}

/// Index of the largest fitness value; ties resolve to the first occurrence.
fn max_index(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Crossover guard: every organism must share the first one's layer shapes.
fn check_uniform_topology(organisms: &[Network]) -> Result<(), EvolutionError> {
    for organism in &organisms[1..] {
        if !organisms[0].topology_matches(organism) {
            return Err(EvolutionError::TopologyMismatch {
                expected: organisms[0].topology_string(),
                found: organism.topology_string(),
            });
        }
    }
    Ok(())
}

/// Combine two parents layer by layer into a freshly constructed child.
fn cross_pair<R: Rng>(
    father: &Network,
    mother: &Network,
    rng: &mut R,
) -> Result<Network, EvolutionError> {
    if !father.topology_matches(mother) {
        return Err(EvolutionError::TopologyMismatch {
            expected: father.topology_string(),
            found: mother.topology_string(),
        });
    }

    let mut layers = Vec::with_capacity(father.layers().len());
    for (f, m) in father.layers().iter().zip(mother.layers().iter()) {
        let weight = if rng.gen_bool(0.5) { f.weight } else { m.weight };
        let bias = if rng.gen_bool(0.5) { f.bias } else { m.bias };
        let activation = if rng.gen_bool(0.5) {
            f.activation
        } else {
            m.activation
        };
        let connectivity = Zip::from(&f.connectivity)
            .and(&m.connectivity)
            .map_collect(|&a, &b| if rng.gen_bool(0.5) { a } else { b });

        layers.push(Layer::new(weight, connectivity, bias, activation, f.is_output)?);
    }
    Network::new(layers)
}
