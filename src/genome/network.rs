//! Feedforward classifier assembled from layers.

use super::activation::Activation;
use super::layer::{Layer, MutationRates};
use crate::error::EvolutionError;
use ndarray::Array1;
use rand::Rng;

/// An ordered, fixed-length sequence of layers.
///
/// Layer count and per-layer shapes are frozen at construction; evolution
/// only rewrites the genes inside each layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Assemble a network, enforcing the chaining invariants: consecutive
    /// layers must connect (output dim feeds input dim), exactly the last
    /// layer is flagged as output.
    pub fn new(layers: Vec<Layer>) -> Result<Self, EvolutionError> {
        if layers.is_empty() {
            return Err(EvolutionError::InvalidLayerConfiguration(
                "network must have at least one layer".to_string(),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_dim() != pair[1].input_dim() {
                return Err(EvolutionError::InvalidLayerConfiguration(format!(
                    "layer {} outputs {} units but layer {} expects {}",
                    i,
                    pair[0].output_dim(),
                    i + 1,
                    pair[1].input_dim()
                )));
            }
        }
        let last = layers.len() - 1;
        for (i, layer) in layers.iter().enumerate() {
            if layer.is_output != (i == last) {
                return Err(EvolutionError::InvalidLayerConfiguration(format!(
                    "layer {} has is_output = {}, only the terminal layer may be the output",
                    i, layer.is_output
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Random network: sigmoid hidden layers, softmax output, Bernoulli(0.5)
    /// connectivity. `dims` is input dim, hidden sizes, then class count.
    pub fn random<R: Rng>(dims: &[usize], rng: &mut R) -> Result<Self, EvolutionError> {
        if dims.len() < 2 {
            return Err(EvolutionError::InvalidLayerConfiguration(
                "a network needs at least an input and an output dimension".to_string(),
            ));
        }
        let last_pair = dims.len() - 2;
        let mut layers = Vec::with_capacity(dims.len() - 1);
        for (i, pair) in dims.windows(2).enumerate() {
            let (in_dim, out_dim) = (pair[0], pair[1]);
            let is_output = i == last_pair;
            let activation = if is_output {
                Activation::Softmax
            } else {
                Activation::Sigmoid
            };
            layers.push(Layer::random(out_dim, in_dim, activation, is_output, rng)?);
        }
        Self::new(layers)
    }

    /// The layers, in feedforward order.
    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].input_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].output_dim()
    }

    /// Forward pass through every layer in order. Pure function of the
    /// current genome state.
    pub fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let mut activation = self.layers[0].forward(input);
        for layer in &self.layers[1..] {
            activation = layer.forward(&activation);
        }
        activation
    }

    /// Mutate every layer independently with the same rate configuration.
    pub fn mutate<R: Rng>(&mut self, rates: &MutationRates, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(rates, rng);
        }
    }

    /// True when `other` has the same layer count and per-layer shapes.
    pub fn topology_matches(&self, other: &Self) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(other.layers.iter())
                .all(|(a, b)| a.connectivity.dim() == b.connectivity.dim())
    }

    /// Human-readable shape summary, used in topology mismatch errors.
    pub fn topology_string(&self) -> String {
        let shapes: Vec<String> = self
            .layers
            .iter()
            .map(|l| format!("{}x{}", l.output_dim(), l.input_dim()))
            .collect();
        shapes.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_network_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let net = Network::random(&[8, 6, 4], &mut rng).unwrap();
        assert_eq!(net.layers().len(), 2);
        assert_eq!(net.input_dim(), 8);
        assert_eq!(net.output_dim(), 4);
        assert!(net.layers().last().unwrap().is_output);
    }

    #[test]
    fn test_forward_shape_propagation() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let net = Network::random(&[10, 7, 5, 3], &mut rng).unwrap();
        let out = net.forward(&Array1::from_elem(10, 0.5));
        assert_eq!(out.len(), 3);
        // terminal softmax normalizes
        assert!((out.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mismatched_chain_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = Layer::random(6, 8, Activation::Sigmoid, false, &mut rng).unwrap();
        // expects 5 inputs, previous layer produces 6
        let b = Layer::random(3, 5, Activation::Softmax, true, &mut rng).unwrap();
        assert!(matches!(
            Network::new(vec![a, b]),
            Err(EvolutionError::InvalidLayerConfiguration(_))
        ));
    }

    #[test]
    fn test_interior_output_layer_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let a = Layer::random(4, 4, Activation::Softmax, true, &mut rng).unwrap();
        let b = Layer::random(4, 4, Activation::Softmax, true, &mut rng).unwrap();
        assert!(Network::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_empty_network_rejected() {
        assert!(Network::new(Vec::new()).is_err());
    }

    #[test]
    fn test_mutation_preserves_topology() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut net = Network::random(&[12, 8, 4], &mut rng).unwrap();
        let reference = net.clone();
        for _ in 0..20 {
            net.mutate(&MutationRates::default(), &mut rng);
        }
        assert!(net.topology_matches(&reference));
        assert!(net.layers().last().unwrap().is_output);
    }

    #[test]
    fn test_topology_string() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let net = Network::random(&[8, 6, 4], &mut rng).unwrap();
        assert_eq!(net.topology_string(), "6x8 -> 4x6");
    }
}
