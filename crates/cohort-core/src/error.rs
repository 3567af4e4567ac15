//! Errors raised while wiring up client entropy.
//!
//! Malformed layer definitions are never errors: they are dropped and reported
//! through [`crate::metrics::LayerMetrics`]. Only misconfigured entropy inputs,
//! which the host controls, surface as [`EntropyError`].

use thiserror::Error;

/// Result alias for entropy setup.
pub type Result<T> = std::result::Result<T, EntropyError>;

/// Invalid entropy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    #[error("entropy range must be non-zero")]
    EmptyRange,

    #[error("entropy value {value} is outside its range {range}")]
    ValueOutOfRange { value: u32, range: u32 },

    #[error("low entropy domain {range} exceeds the maximum of {max}")]
    DomainTooLarge { range: u32, max: u32 },

    #[error("high entropy source must not be empty")]
    MissingHighEntropySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_bad_value() {
        let err = EntropyError::ValueOutOfRange {
            value: 9000,
            range: 8000,
        };
        assert_eq!(err.to_string(), "entropy value 9000 is outside its range 8000");

        let err = EntropyError::DomainTooLarge {
            range: 1 << 20,
            max: 1 << 16,
        };
        assert_eq!(
            err.to_string(),
            "low entropy domain 1048576 exceeds the maximum of 65536"
        );
    }
}
