//! Layer validation.
//!
//! Each malformed layer is rejected with exactly one [`InvalidLayerReason`].
//! Checks run in a fixed order and stop at the first failure.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::layer::{EntropyMode, LayerDefinition};
use crate::source::EntropyProviders;

/// Why a layer was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidLayerReason {
    /// Two or more layers share the id; all copies are dropped.
    LayerIdNotUnique = 1,
    /// The layer or one of its members has unrecognized fields.
    UnknownFields = 2,
    /// Layer id is 0.
    InvalidId = 3,
    /// `num_slots` is 0.
    NoSlots = 4,
    /// No members.
    NoMembers = 5,
    /// Entropy mode is not a known value.
    InvalidEntropyMode = 6,
    /// Limited entropy requested but the client has none.
    LimitedLayerDropped = 7,
    /// The low entropy domain is not a multiple of `num_slots`.
    SlotsDoNotDivideLowEntropyDomain = 8,
    /// A member's slot ranges are out of bounds, reversed, unsorted or overlapping.
    InvalidSlotBounds = 9,
}

impl InvalidLayerReason {
    pub const ALL: [Self; 9] = [
        Self::LayerIdNotUnique,
        Self::UnknownFields,
        Self::InvalidId,
        Self::NoSlots,
        Self::NoMembers,
        Self::InvalidEntropyMode,
        Self::LimitedLayerDropped,
        Self::SlotsDoNotDivideLowEntropyDomain,
        Self::InvalidSlotBounds,
    ];

    /// Stable histogram bucket.
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LayerIdNotUnique => "layer_id_not_unique",
            Self::UnknownFields => "unknown_fields",
            Self::InvalidId => "invalid_id",
            Self::NoSlots => "no_slots",
            Self::NoMembers => "no_members",
            Self::InvalidEntropyMode => "invalid_entropy_mode",
            Self::LimitedLayerDropped => "limited_layer_dropped",
            Self::SlotsDoNotDivideLowEntropyDomain => "slots_do_not_divide_low_entropy_domain",
            Self::InvalidSlotBounds => "invalid_slot_bounds",
        }
    }
}

impl std::fmt::Display for InvalidLayerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate one layer, returning its entropy mode when usable.
///
/// Uniqueness of ids is checked across the whole seed by
/// [`duplicate_layer_ids`], not here.
pub fn validate_layer<P>(
    layer: &LayerDefinition,
    providers: &P,
) -> Result<EntropyMode, InvalidLayerReason>
where
    P: EntropyProviders + ?Sized,
{
    if layer.has_unknown_fields() {
        return Err(InvalidLayerReason::UnknownFields);
    }
    if layer.id == 0 {
        return Err(InvalidLayerReason::InvalidId);
    }
    if layer.num_slots == 0 {
        return Err(InvalidLayerReason::NoSlots);
    }
    if layer.members.is_empty() {
        return Err(InvalidLayerReason::NoMembers);
    }
    let mode = EntropyMode::try_from(layer.entropy_mode)
        .map_err(|_| InvalidLayerReason::InvalidEntropyMode)?;
    if mode == EntropyMode::Limited && !providers.has_limited_entropy() {
        return Err(InvalidLayerReason::LimitedLayerDropped);
    }
    // An empty domain has nothing to partition.
    let domain = providers.low_entropy_domain();
    if domain == 0 || domain % layer.num_slots != 0 {
        return Err(InvalidLayerReason::SlotsDoNotDivideLowEntropyDomain);
    }
    if !validate_slot_bounds(layer) {
        return Err(InvalidLayerReason::InvalidSlotBounds);
    }
    Ok(mode)
}

/// Every member's ranges must satisfy `start <= end < num_slots` and be
/// strictly increasing without overlap.
///
/// # Panics
/// If the running bound overflows, which `end < num_slots` rules out.
pub fn validate_slot_bounds(layer: &LayerDefinition) -> bool {
    layer.members.iter().all(|member| {
        let mut next_allowed_start = 0u32;
        for range in &member.slots {
            if range.start < next_allowed_start
                || range.end >= layer.num_slots
                || range.start > range.end
            {
                return false;
            }
            next_allowed_start = range
                .end
                .checked_add(1)
                .expect("slot range end is bounded by num_slots");
        }
        true
    })
}

/// Ids that appear on more than one layer.
pub fn duplicate_layer_ids(layers: &[LayerDefinition]) -> BTreeSet<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for layer in layers {
        *counts.entry(layer.id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(id, _)| id)
        .collect()
}
