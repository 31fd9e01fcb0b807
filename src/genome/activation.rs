//! Activation function catalog.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The fixed set of elementwise activation functions a layer may carry.
///
/// `Softmax` is mandatory for the terminal output layer and exempt from
/// activation mutation there; hidden layers may use any catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

/// All catalog entries, in a fixed order for uniform random draws.
pub const CATALOG: [Activation; 5] = [
    Activation::Linear,
    Activation::Relu,
    Activation::Sigmoid,
    Activation::Tanh,
    Activation::Softmax,
];

impl Activation {
    /// Apply the function elementwise to a pre-activation vector.
    ///
    /// Softmax subtracts the vector maximum before exponentiating so large
    /// inputs cannot overflow, then normalizes to sum 1.
    pub fn apply(&self, z: &Array1<f32>) -> Array1<f32> {
        match self {
            Activation::Linear => z.clone(),
            Activation::Relu => z.mapv(|x| x.max(0.0)),
            Activation::Sigmoid => z.mapv(|x| 1.0 / (1.0 + (-x).exp())),
            Activation::Tanh => z.mapv(f32::tanh),
            Activation::Softmax => {
                let max = z.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let exp = z.mapv(|x| (x - max).exp());
                let sum = exp.sum();
                exp / sum
            }
        }
    }

    /// Draw a catalog entry uniformly at random. The draw may return the
    /// caller's current entry.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        CATALOG[rng.gen_range(0..CATALOG.len())]
    }
}
