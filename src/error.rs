//! Error types for the evolutionary engine.

use std::fmt;

/// Errors surfaced by the core engine.
///
/// The library never logs; every failure is returned to the caller at the
/// point of detection. No operation partially mutates a population before
/// failing.
#[derive(Debug)]
pub enum EvolutionError {
    /// Invalid population sizing, survivor count, or rate values.
    Configuration(String),
    /// Layer construction violated an invariant (output activation,
    /// matrix shape, non-binary connectivity).
    InvalidLayerConfiguration(String),
    /// Crossover attempted between parents with differing layer shapes.
    TopologyMismatch { expected: String, found: String },
    /// Selection probabilities are undefined (all non-elite fitness zero)
    /// or the survivor count exceeds the available pool.
    DegenerateSelection(String),
    /// A gene value left the representable 7-bit range [0, 127].
    EncodingRange(u32),
    /// Dataset or config file I/O failure.
    Io(std::io::Error),
    /// Malformed dataset or config contents.
    InvalidFormat(String),
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolutionError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            EvolutionError::InvalidLayerConfiguration(msg) => {
                write!(f, "invalid layer configuration: {}", msg)
            }
            EvolutionError::TopologyMismatch { expected, found } => {
                write!(f, "topology mismatch: expected {}, found {}", expected, found)
            }
            EvolutionError::DegenerateSelection(msg) => {
                write!(f, "degenerate selection: {}", msg)
            }
            EvolutionError::EncodingRange(value) => {
                write!(f, "gene value {} outside the 7-bit range [0, 127]", value)
            }
            EvolutionError::Io(e) => write!(f, "I/O error: {}", e),
            EvolutionError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
        }
    }
}

impl std::error::Error for EvolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvolutionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EvolutionError {
    fn from(e: std::io::Error) -> Self {
        EvolutionError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = EvolutionError::EncodingRange(200);
        assert!(e.to_string().contains("200"));

        let e = EvolutionError::DegenerateSelection("all fitness zero".to_string());
        assert!(e.to_string().contains("all fitness zero"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;
        let e = EvolutionError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(e.source().is_some());
    }
}
