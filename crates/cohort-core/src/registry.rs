//! Layers registry: resolves every layer of a seed for one client.
//!
//! Construction is a single synchronous pass:
//! 1. Skip everything when benchmarking is enabled
//! 2. Drop every copy of a duplicated layer id
//! 3. Validate each remaining layer, reporting one reason per drop
//! 4. Draw from the layer's entropy source over the low entropy domain
//! 5. Choose a slot, then the first member owning it
//! 6. Derive the remainder entropy provider for the chosen member
//!
//! After construction the registry is immutable and answers lookups only.
//! Layers that were dropped and layers where no member owns the client's slot
//! look the same from the outside: both are inactive.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::layer::{EntropyMode, LayerDefinition, VariationsSeed};
use crate::metrics::{LayerMetrics, NoopMetrics};
use crate::providers::NormalizedEntropyProvider;
use crate::slots::{choose_slot, find_active_member, slot_of_member};
use crate::source::EntropyProviders;
use crate::validation::{InvalidLayerReason, duplicate_layer_ids, validate_layer};
use crate::value::{ValueInRange, combine_ranges};

/// Returned for layers that are not active.
static NIL_ENTROPY: NormalizedEntropyProvider = NormalizedEntropyProvider::nil();

/// Resolved outcome of one active layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    active_member_id: u32,
    entropy_mode: EntropyMode,
    remainder_entropy: NormalizedEntropyProvider,
}

impl LayerInfo {
    pub fn active_member_id(&self) -> u32 {
        self.active_member_id
    }

    pub fn entropy_mode(&self) -> EntropyMode {
        self.entropy_mode
    }

    /// Entropy scoped to the active member, independent of which member won.
    pub fn remainder_entropy(&self) -> &NormalizedEntropyProvider {
        &self.remainder_entropy
    }
}

/// Active layers and members for one client and one seed.
#[derive(Debug, Clone, Default)]
pub struct VariationsLayers {
    layers: HashMap<u32, LayerInfo>,
}

impl VariationsLayers {
    /// Resolve all layers of `seed`, discarding drop diagnostics.
    pub fn new<P>(seed: &VariationsSeed, providers: &P) -> Self
    where
        P: EntropyProviders + ?Sized,
    {
        Self::with_metrics(seed, providers, &NoopMetrics)
    }

    /// Resolve all layers of `seed`, reporting each dropped layer to `metrics`.
    pub fn with_metrics<P>(
        seed: &VariationsSeed,
        providers: &P,
        metrics: &dyn LayerMetrics,
    ) -> Self
    where
        P: EntropyProviders + ?Sized,
    {
        let mut registry = Self::default();

        if providers.benchmarking_enabled() {
            debug!(
                "benchmarking enabled, ignoring {} layer(s)",
                seed.layers.len()
            );
            return registry;
        }

        let duplicates = duplicate_layer_ids(&seed.layers);
        for &id in &duplicates {
            report_invalid_layer(metrics, id, InvalidLayerReason::LayerIdNotUnique);
        }

        for layer in &seed.layers {
            if duplicates.contains(&layer.id) {
                continue;
            }
            match validate_layer(layer, providers) {
                Ok(mode) => registry.construct_layer(layer, mode, providers, metrics),
                Err(reason) => report_invalid_layer(metrics, layer.id, reason),
            }
        }

        debug!(
            "resolved {} of {} layer(s)",
            registry.layers.len(),
            seed.layers.len()
        );
        registry
    }

    /// Pick the active member of a validated layer, if any.
    fn construct_layer<P>(
        &mut self,
        layer: &LayerDefinition,
        mode: EntropyMode,
        providers: &P,
        metrics: &dyn LayerMetrics,
    ) where
        P: EntropyProviders + ?Sized,
    {
        // A bundle may claim limited entropy it cannot hand out.
        let Some(provider) = providers.provider_for(mode) else {
            report_invalid_layer(metrics, layer.id, InvalidLayerReason::LimitedLayerDropped);
            return;
        };

        // Slot math always runs over the low entropy domain, whichever
        // source supplied the draw.
        let domain = providers.low_entropy_domain();
        let pseudorandom = ValueInRange {
            value: provider.get_pseudorandom_value(layer.effective_salt(), domain),
            range: domain,
        };
        let selection = choose_slot(pseudorandom, layer.num_slots);

        let Some(member) = find_active_member(layer, selection.slot) else {
            trace!("layer {} has no member at slot {}", layer.id, selection.slot);
            return;
        };

        let remainder =
            combine_ranges(slot_of_member(member, selection.slot), selection.remainder);
        debug!(
            "layer {} resolved to member {} ({} entropy, slot {})",
            layer.id, member.id, mode, selection.slot
        );
        self.layers.insert(
            layer.id,
            LayerInfo {
                active_member_id: member.id,
                entropy_mode: mode,
                remainder_entropy: NormalizedEntropyProvider::new(remainder),
            },
        );
    }

    /// Whether the layer resolved to an active member.
    pub fn is_layer_active(&self, layer_id: u32) -> bool {
        self.layers.contains_key(&layer_id)
    }

    /// Whether `member_id` is the layer's active member.
    pub fn is_layer_member_active(&self, layer_id: u32, member_id: u32) -> bool {
        member_id != 0 && self.active_member(layer_id) == Some(member_id)
    }

    /// Whether any of `member_ids` is the layer's active member.
    pub fn is_any_layer_member_active(&self, layer_id: u32, member_ids: &[u32]) -> bool {
        member_ids
            .iter()
            .any(|&member_id| self.is_layer_member_active(layer_id, member_id))
    }

    /// Whether the layer is active and was randomized on high entropy.
    pub fn active_layer_member_depends_on_high_entropy(&self, layer_id: u32) -> bool {
        self.layers
            .get(&layer_id)
            .is_some_and(|info| info.entropy_mode == EntropyMode::Default)
    }

    /// Remainder entropy of the layer's active member, or the constant nil
    /// provider when the layer is not active.
    pub fn get_remainder_entropy(&self, layer_id: u32) -> &NormalizedEntropyProvider {
        self.layers
            .get(&layer_id)
            .map_or(&NIL_ENTROPY, |info| &info.remainder_entropy)
    }

    pub fn active_member(&self, layer_id: u32) -> Option<u32> {
        self.layers.get(&layer_id).map(|info| info.active_member_id)
    }

    pub fn layer_info(&self, layer_id: u32) -> Option<&LayerInfo> {
        self.layers.get(&layer_id)
    }

    pub fn active_layer_count(&self) -> usize {
        self.layers.len()
    }
}

fn report_invalid_layer(metrics: &dyn LayerMetrics, layer_id: u32, reason: InvalidLayerReason) {
    warn!("dropping layer {layer_id}: {reason}");
    metrics.record_invalid_layer(reason);
}
