//! Layer definitions as delivered in a variations seed.
//!
//! These are external, already-parsed inputs and may be malformed. Nothing
//! here enforces validity; see [`crate::validation`]. Keys the schema does
//! not know are kept in `unknown_fields` so validation can reject them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keys present in the input that the schema does not recognize.
pub type UnknownFields = BTreeMap<String, serde_json::Value>;

/// Which client entropy source a layer randomizes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntropyMode {
    /// High entropy, unique per install.
    Default,
    /// Coarse low entropy with an enumerable domain, shared across studies.
    Low,
    /// Limited entropy; only available on some clients.
    Limited,
}

impl EntropyMode {
    /// Integer encoding used in seeds.
    pub const fn wire_value(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Low => 1,
            Self::Limited => 2,
        }
    }
}

impl TryFrom<i32> for EntropyMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Default),
            1 => Ok(Self::Low),
            2 => Ok(Self::Limited),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for EntropyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Low => write!(f, "low"),
            Self::Limited => write!(f, "limited"),
        }
    }
}

/// Inclusive range of slots `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: u32,
    pub end: u32,
}

impl SlotRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of slots covered. Only meaningful once `start <= end` holds.
    pub fn size(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.start <= slot && slot <= self.end
    }
}

/// A named subset of a layer's slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMember {
    /// Member id. Zero never names an active member.
    #[serde(default)]
    pub id: u32,
    /// Owned slot ranges, sorted and non-overlapping when valid.
    #[serde(default)]
    pub slots: Vec<SlotRange>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl LayerMember {
    pub fn new(id: u32, slots: impl IntoIterator<Item = SlotRange>) -> Self {
        Self {
            id,
            slots: slots.into_iter().collect(),
            unknown_fields: UnknownFields::new(),
        }
    }

    /// Total number of slots this member owns.
    pub fn slot_count(&self) -> u32 {
        self.slots.iter().map(SlotRange::size).sum()
    }

    pub fn contains_slot(&self, slot: u32) -> bool {
        self.slots.iter().any(|range| range.contains(slot))
    }
}

/// One layer: a partition of the low entropy domain into `num_slots` slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    /// Layer id. Zero is invalid.
    #[serde(default)]
    pub id: u32,
    /// Salt mixed into the entropy draw; falls back to `id` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<u32>,
    #[serde(default)]
    pub num_slots: u32,
    /// Wire value of [`EntropyMode`]; unknown values are kept for validation.
    #[serde(default)]
    pub entropy_mode: i32,
    #[serde(default)]
    pub members: Vec<LayerMember>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl LayerDefinition {
    pub fn new(id: u32, num_slots: u32, entropy_mode: EntropyMode) -> Self {
        Self {
            id,
            num_slots,
            entropy_mode: entropy_mode.wire_value(),
            ..Self::default()
        }
    }

    pub fn with_salt(mut self, salt: u32) -> Self {
        self.salt = Some(salt);
        self
    }

    pub fn with_member(mut self, member: LayerMember) -> Self {
        self.members.push(member);
        self
    }

    /// Salt used for the entropy draw.
    pub fn effective_salt(&self) -> u32 {
        self.salt.unwrap_or(self.id)
    }

    /// Whether this layer or any of its members carries unrecognized keys.
    pub fn has_unknown_fields(&self) -> bool {
        !self.unknown_fields.is_empty()
            || self.members.iter().any(|m| !m.unknown_fields.is_empty())
    }
}

/// The parsed seed snapshot the registry is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariationsSeed {
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
}

impl From<Vec<LayerDefinition>> for VariationsSeed {
    fn from(layers: Vec<LayerDefinition>) -> Self {
        Self { layers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_mode_wire_values() {
        for mode in [EntropyMode::Default, EntropyMode::Low, EntropyMode::Limited] {
            assert_eq!(EntropyMode::try_from(mode.wire_value()), Ok(mode));
        }
        assert_eq!(EntropyMode::try_from(3), Err(3));
        assert_eq!(EntropyMode::try_from(-1), Err(-1));
    }

    #[test]
    fn salt_defaults_to_id() {
        let layer = LayerDefinition::new(42, 10, EntropyMode::Low);
        assert_eq!(layer.effective_salt(), 42);
        assert_eq!(layer.with_salt(7).effective_salt(), 7);
    }

    #[test]
    fn member_slot_arithmetic() {
        let member = LayerMember::new(1, [SlotRange::new(0, 4), SlotRange::new(10, 10)]);
        assert_eq!(member.slot_count(), 6);
        assert!(member.contains_slot(4));
        assert!(member.contains_slot(10));
        assert!(!member.contains_slot(5));
    }

    #[test]
    fn parses_seed_json_and_keeps_unknown_keys() {
        let json = r#"{
            "layers": [
                {
                    "id": 3,
                    "num_slots": 10,
                    "entropy_mode": 1,
                    "members": [{ "id": 1, "slots": [{ "start": 0, "end": 9 }] }]
                },
                {
                    "id": 4,
                    "num_slots": 10,
                    "rollout": true,
                    "members": [{ "id": 1, "slots": [], "weight": 3 }]
                }
            ]
        }"#;
        let seed: VariationsSeed = serde_json::from_str(json).unwrap();
        assert_eq!(seed.layers.len(), 2);

        let first = &seed.layers[0];
        assert_eq!(first.salt, None);
        assert_eq!(EntropyMode::try_from(first.entropy_mode), Ok(EntropyMode::Low));
        assert_eq!(first.members[0].slots, vec![SlotRange::new(0, 9)]);
        assert!(!first.has_unknown_fields());

        let second = &seed.layers[1];
        assert_eq!(second.entropy_mode, 0);
        assert!(second.unknown_fields.contains_key("rollout"));
        assert!(second.members[0].unknown_fields.contains_key("weight"));
        assert!(second.has_unknown_fields());
    }
}
