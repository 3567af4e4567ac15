//! Concrete entropy providers and the per-client bundle.
//!
//! Two provider shapes cover every source:
//!
//! - [`HashEntropyProvider`] hashes an opaque client string with the salt. It
//!   backs the default (high entropy) and limited sources.
//! - [`NormalizedEntropyProvider`] is seeded by a [`ValueInRange`]. For each
//!   salt it ranks the client's value among all values of its range by their
//!   salted hashes. Because every rank is hit by exactly one value, the output
//!   is exactly uniform over clients, and draws under different salts are
//!   decorrelated. It backs the low entropy source and every remainder
//!   provider derived by the layers registry. A draw hashes every value of
//!   the range, so the low entropy domain is capped at
//!   [`MAX_LOW_ENTROPY_DOMAIN`]. Remainder ranges never exceed that domain.

use serde::{Deserialize, Serialize};

use crate::conditioning::{HIGH_ENTROPY_TAG, hash_to_u64, salted_value_hash, scale_to_range};
use crate::error::{EntropyError, Result};
use crate::source::{EntropyProvider, EntropyProviders};
use crate::value::ValueInRange;

/// Size of the low entropy domain when none is configured.
pub const DEFAULT_LOW_ENTROPY_DOMAIN: u32 = 8000;

/// Largest accepted low entropy domain.
pub const MAX_LOW_ENTROPY_DOMAIN: u32 = 1 << 16;

// ---------------------------------------------------------------------------
// High entropy
// ---------------------------------------------------------------------------

/// Provider keyed by an opaque high entropy client string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntropyProvider {
    source: String,
}

impl HashEntropyProvider {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl EntropyProvider for HashEntropyProvider {
    fn get_pseudorandom_value(&self, salt: u32, range: u32) -> u32 {
        if range == 0 {
            return 0;
        }
        let x = hash_to_u64(&[
            HIGH_ENTROPY_TAG,
            self.source.as_bytes(),
            &salt.to_le_bytes(),
        ]);
        scale_to_range(x, range)
    }
}

// ---------------------------------------------------------------------------
// Normalized (enumerable domain)
// ---------------------------------------------------------------------------

/// Provider over an enumerable entropy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedEntropyProvider {
    entropy: ValueInRange,
}

impl NormalizedEntropyProvider {
    /// Each draw costs one hash per value of `entropy.range`.
    pub const fn new(entropy: ValueInRange) -> Self {
        Self { entropy }
    }

    /// Constant source that always yields 0.
    pub const fn nil() -> Self {
        Self::new(ValueInRange::NIL)
    }

    /// The entropy value this provider was seeded with.
    pub fn entropy(&self) -> ValueInRange {
        self.entropy
    }

    /// Position of the client's value among all values of the domain, ordered
    /// by salted hash with ties broken by value.
    fn rank(&self, salt: u32) -> u32 {
        let own = (salted_value_hash(salt, self.entropy.value), self.entropy.value);
        let below = (0..self.entropy.range)
            .filter(|&v| (salted_value_hash(salt, v), v) < own)
            .count();
        below as u32
    }
}

impl EntropyProvider for NormalizedEntropyProvider {
    fn get_pseudorandom_value(&self, salt: u32, range: u32) -> u32 {
        if range == 0 || self.entropy.range <= 1 {
            return 0;
        }
        let rank = u64::from(self.rank(salt));
        // An unvalidated value past its range ranks last of all.
        let scaled = rank * u64::from(range) / u64::from(self.entropy.range);
        scaled.min(u64::from(range - 1)) as u32
    }
}

// ---------------------------------------------------------------------------
// Per-client bundle
// ---------------------------------------------------------------------------

/// Client entropy inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyConfig {
    /// Opaque per-install identifier backing the default source.
    pub high_entropy_source: String,
    /// Low entropy value and the size of its domain.
    pub low_entropy: ValueInRange,
    /// Identifier backing the limited source, when the client has one.
    pub limited_entropy_source: Option<String>,
    /// Benchmarking runs activate no layers.
    pub benchmarking: bool,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            high_entropy_source: String::new(),
            low_entropy: ValueInRange {
                value: 0,
                range: DEFAULT_LOW_ENTROPY_DOMAIN,
            },
            limited_entropy_source: None,
            benchmarking: false,
        }
    }
}

/// Production [`EntropyProviders`] built from an [`EntropyConfig`].
#[derive(Debug, Clone)]
pub struct ClientEntropyProviders {
    default: HashEntropyProvider,
    low: NormalizedEntropyProvider,
    limited: Option<HashEntropyProvider>,
    benchmarking: bool,
}

impl ClientEntropyProviders {
    pub fn new(config: EntropyConfig) -> Result<Self> {
        if config.high_entropy_source.is_empty() {
            return Err(EntropyError::MissingHighEntropySource);
        }
        let low_entropy = config.low_entropy.validate()?;
        if low_entropy.range > MAX_LOW_ENTROPY_DOMAIN {
            return Err(EntropyError::DomainTooLarge {
                range: low_entropy.range,
                max: MAX_LOW_ENTROPY_DOMAIN,
            });
        }
        let limited = config
            .limited_entropy_source
            .filter(|source| !source.is_empty())
            .map(HashEntropyProvider::new);

        Ok(Self {
            default: HashEntropyProvider::new(config.high_entropy_source),
            low: NormalizedEntropyProvider::new(low_entropy),
            limited,
            benchmarking: config.benchmarking,
        })
    }
}

impl EntropyProviders for ClientEntropyProviders {
    fn default_entropy(&self) -> &dyn EntropyProvider {
        &self.default
    }

    fn low_entropy(&self) -> &dyn EntropyProvider {
        &self.low
    }

    fn limited_entropy(&self) -> Option<&dyn EntropyProvider> {
        self.limited.as_ref().map(|p| p as &dyn EntropyProvider)
    }

    fn low_entropy_domain(&self) -> u32 {
        self.low.entropy().range
    }

    fn benchmarking_enabled(&self) -> bool {
        self.benchmarking
    }
}
