//! Fixed-width gene encoding.
//!
//! Scalar genes (layer weight and bias) live in the unsigned range [0, 127]
//! and mutate as 7-bit patterns with independent per-bit flips. The encoding
//! operates directly on the integer bits; there is no intermediate string
//! representation.

use crate::error::EvolutionError;
use rand::Rng;

/// Number of bits in a scalar gene.
pub const GENE_BITS: u32 = 7;

/// Largest representable gene value (2^7 - 1).
pub const GENE_MAX: u8 = 0x7F;

/// Validate and encode a gene value as a 7-bit pattern.
///
/// The pattern is the value itself; encoding exists to enforce the range
/// contract. Values above [`GENE_MAX`] are rejected rather than clamped,
/// since clamping would bias the mutation distribution.
pub fn encode(value: u8) -> Result<u8, EvolutionError> {
    if value > GENE_MAX {
        return Err(EvolutionError::EncodingRange(value as u32));
    }
    Ok(value)
}

/// Decode a 7-bit pattern back to its gene value. Exact inverse of
/// [`encode`] for every value in [0, 127].
pub fn decode(pattern: u8) -> Result<u8, EvolutionError> {
    if pattern > GENE_MAX {
        return Err(EvolutionError::EncodingRange(pattern as u32));
    }
    Ok(pattern)
}

/// Flip each of the 7 bit positions independently with probability `rate`.
///
/// A rate of 0.0 leaves the pattern untouched; a rate of 1.0 inverts all
/// seven bits. The result stays within [0, 127] by construction.
pub fn mutate_bits<R: Rng>(pattern: u8, rate: f32, rng: &mut R) -> u8 {
    let mut mask = 0u8;
    for bit in 0..GENE_BITS {
        if rng.gen::<f32>() < rate {
            mask |= 1 << bit;
        }
    }
    (pattern ^ mask) & GENE_MAX
}
