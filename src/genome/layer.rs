//! Layer: the atomic evolvable gene group.

use super::activation::Activation;
use super::encoding;
use crate::error::EvolutionError;
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-gene mutation probabilities, shared by every layer of a network.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MutationRates {
    /// Per-bit flip probability on the 7-bit weight gene.
    pub weight: f32,
    /// Per-cell flip probability on the connectivity matrix.
    pub connections: f32,
    /// Per-bit flip probability on the 7-bit bias gene.
    pub bias: f32,
    /// Probability of redrawing the activation (hidden layers only).
    pub activation: f32,
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            weight: 0.1,
            connections: 0.3,
            bias: 0.1,
            activation: 0.1,
        }
    }
}

impl MutationRates {
    /// Check every rate is a probability.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        for (name, rate) in [
            ("weight", self.weight),
            ("connections", self.connections),
            ("bias", self.bias),
            ("activation", self.activation),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(EvolutionError::Configuration(format!(
                    "mutation rate '{}' must be in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        Ok(())
    }
}

/// One affine-plus-activation transform with a binary connectivity mask.
///
/// The connectivity matrix is simultaneously the structural mask and the
/// binarized weight matrix: a 1 cell is a unit-coefficient connection, a 0
/// cell is no connection. The scalar `weight` gene multiplies the whole
/// product and `bias` is added to every output unit; both are 7-bit unsigned
/// genes mutated by bit flips.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub weight: u8,
    pub connectivity: Array2<f32>,
    pub bias: u8,
    pub activation: Activation,
    /// Inert metadata, reserved for topology evolution. Never consulted.
    pub enabled: bool,
    /// Inert metadata, reserved for speciation. Never consulted.
    pub innovation: u32,
    pub is_output: bool,
}

impl Layer {
    /// Construct a layer, enforcing the genome invariants.
    pub fn new(
        weight: u8,
        connectivity: Array2<f32>,
        bias: u8,
        activation: Activation,
        is_output: bool,
    ) -> Result<Self, EvolutionError> {
        encoding::encode(weight)?;
        encoding::encode(bias)?;
        if is_output && activation != Activation::Softmax {
            return Err(EvolutionError::InvalidLayerConfiguration(format!(
                "output layer must use softmax, got {:?}",
                activation
            )));
        }
        if connectivity.nrows() == 0 || connectivity.ncols() == 0 {
            return Err(EvolutionError::InvalidLayerConfiguration(
                "connectivity matrix must have nonzero dimensions".to_string(),
            ));
        }
        if connectivity.iter().any(|&c| c != 0.0 && c != 1.0) {
            return Err(EvolutionError::InvalidLayerConfiguration(
                "connectivity matrix entries must be 0 or 1".to_string(),
            ));
        }
        Ok(Self {
            weight,
            connectivity,
            bias,
            activation,
            enabled: true,
            innovation: 0,
            is_output,
        })
    }

    /// Random layer for population initialization: Bernoulli(0.5)
    /// connectivity with weight 1 and bias 0.
    pub fn random<R: Rng>(
        out_dim: usize,
        in_dim: usize,
        activation: Activation,
        is_output: bool,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        let connectivity =
            Array2::from_shape_fn((out_dim, in_dim), |_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
        Self::new(1, connectivity, 0, activation, is_output)
    }

    /// Number of input units this layer accepts.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.connectivity.ncols()
    }

    /// Number of output units this layer produces.
    #[inline]
    pub fn output_dim(&self) -> usize {
        self.connectivity.nrows()
    }

    /// Forward pass: `activation(weight * (connectivity · input) + bias)`.
    ///
    /// Side-effect-free; the bias broadcasts to every output component.
    pub fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        debug_assert_eq!(input.len(), self.input_dim());
        let z = self.connectivity.dot(input) * self.weight as f32 + self.bias as f32;
        self.activation.apply(&z)
    }

    /// Mutate every gene of this layer in place.
    ///
    /// Weight and bias mutate as 7-bit patterns with independent per-bit
    /// flips; each connectivity cell flips 0↔1 independently; the activation
    /// is redrawn uniformly from the catalog with probability
    /// `rates.activation` unless this is the output layer, whose activation
    /// stays pinned to softmax. All draws are independent.
    pub fn mutate<R: Rng>(&mut self, rates: &MutationRates, rng: &mut R) {
        self.weight = encoding::mutate_bits(self.weight, rates.weight, rng);

        self.connectivity.mapv_inplace(|c| {
            if rng.gen::<f32>() < rates.connections {
                1.0 - c
            } else {
                c
            }
        });

        self.bias = encoding::mutate_bits(self.bias, rates.bias, rng);

        if !self.is_output && rng.gen::<f32>() < rates.activation {
            self.activation = Activation::random(rng);
        }
    }
}
