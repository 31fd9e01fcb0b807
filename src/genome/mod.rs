//! Genome representation: gene encoding, activation catalog, layers, and
//! networks.

pub mod activation;
pub mod encoding;
pub mod layer;
pub mod network;

pub use activation::Activation;
pub use layer::{Layer, MutationRates};
pub use network::Network;
