use crate::device::Device;
use std::fmt;

/// Precondition failures reported by the generator and its layers.
///
/// Every check happens before any arithmetic, so a returned error never
/// leaves partial output behind.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorError {
    InvalidDimension { name: &'static str, value: usize },
    TokenOutOfRange { token: usize, vocab_size: usize },
    RaggedBatch { row: usize, expected: usize, found: usize },
    BatchSizeMismatch { expected: usize, found: usize },
    SeqLenMismatch { expected: usize, found: usize },
    PrefixTooLong { given_len: usize, seq_len: usize },
    EmptyPrefix,
    StateShape { expected: [usize; 3], found: Vec<usize> },
    DeviceUnavailable(Device),
    DeviceMismatch { expected: Device, found: Device },
    InvalidDistribution { row: usize },
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::InvalidDimension { name, value } => {
                write!(f, "{} must be positive, got {}", name, value)
            }
            GeneratorError::TokenOutOfRange { token, vocab_size } => write!(
                f,
                "token id {} is outside the vocabulary of size {}",
                token, vocab_size
            ),
            GeneratorError::RaggedBatch {
                row,
                expected,
                found,
            } => write!(
                f,
                "sequence {} has length {}, expected {}",
                row, found, expected
            ),
            GeneratorError::BatchSizeMismatch { expected, found } => {
                write!(f, "batch size {} does not match {}", found, expected)
            }
            GeneratorError::SeqLenMismatch { expected, found } => {
                write!(f, "sequence length {} does not match {}", found, expected)
            }
            GeneratorError::PrefixTooLong { given_len, seq_len } => write!(
                f,
                "prefix of length {} does not fit in sequences of length {}",
                given_len, seq_len
            ),
            GeneratorError::EmptyPrefix => write!(f, "prefix has no positions"),
            GeneratorError::StateShape { expected, found } => write!(
                f,
                "recurrent state has shape {:?}, expected {:?}",
                found, expected
            ),
            GeneratorError::DeviceUnavailable(device) => {
                write!(f, "device {} is not available in this build", device)
            }
            GeneratorError::DeviceMismatch { expected, found } => write!(
                f,
                "recurrent state lives on {} but the generator is on {}",
                found, expected
            ),
            GeneratorError::InvalidDistribution { row } => {
                write!(f, "row {} has no probability mass to sample from", row)
            }
        }
    }
}

impl std::error::Error for GeneratorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = GeneratorError::TokenOutOfRange {
            token: 12,
            vocab_size: 10,
        };
        assert_eq!(
            e.to_string(),
            "token id 12 is outside the vocabulary of size 10"
        );
        let e = GeneratorError::PrefixTooLong {
            given_len: 6,
            seq_len: 5,
        };
        assert_eq!(
            e.to_string(),
            "prefix of length 6 does not fit in sequences of length 5"
        );
    }
}
