//! Entropy capability traits.
//!
//! Every entropy provider implements [`EntropyProvider`]: one deterministic
//! draw per `(salt, range)`. [`EntropyProviders`] is the per-client bundle of
//! named sources the layers registry is injected with. The registry only reads
//! from it and never owns it.

use crate::layer::EntropyMode;

/// A deterministic per-client source of uniform values.
pub trait EntropyProvider: Send + Sync {
    /// Value in `[0, range)` for this client and `salt`. Returns 0 when
    /// `range == 0`.
    fn get_pseudorandom_value(&self, salt: u32, range: u32) -> u32;
}

/// The named entropy sources available for one client.
pub trait EntropyProviders {
    /// High entropy source, unique per install.
    fn default_entropy(&self) -> &dyn EntropyProvider;

    /// Low entropy source over [`low_entropy_domain`](Self::low_entropy_domain).
    fn low_entropy(&self) -> &dyn EntropyProvider;

    /// Limited entropy source, absent on clients that do not have one.
    fn limited_entropy(&self) -> Option<&dyn EntropyProvider>;

    /// Size of the low entropy domain. Every layer's slot math runs over it.
    fn low_entropy_domain(&self) -> u32;

    /// Benchmarking runs must not activate any layer.
    fn benchmarking_enabled(&self) -> bool;

    fn has_limited_entropy(&self) -> bool {
        self.limited_entropy().is_some()
    }

    /// Provider backing a layer's entropy mode. `None` only for
    /// [`EntropyMode::Limited`] without a limited source.
    fn provider_for(&self, mode: EntropyMode) -> Option<&dyn EntropyProvider> {
        match mode {
            EntropyMode::Default => Some(self.default_entropy()),
            EntropyMode::Low => Some(self.low_entropy()),
            EntropyMode::Limited => self.limited_entropy(),
        }
    }
}
