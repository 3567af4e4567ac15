//! Slot selection and member slot arithmetic.

use crate::layer::{LayerDefinition, LayerMember};
use crate::value::ValueInRange;

/// Outcome of dividing a pseudorandom value into slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    /// Chosen slot in `[0, num_slots)`.
    pub slot: u32,
    /// Entropy not consumed by the choice, uniform over the slot size.
    pub remainder: ValueInRange,
}

/// Split `pseudorandom` into a slot and the leftover within that slot.
///
/// Requires `num_slots > 0` and `pseudorandom.range % num_slots == 0`, so that
/// exactly `range / num_slots` input values land in each slot.
pub fn choose_slot(pseudorandom: ValueInRange, num_slots: u32) -> SlotSelection {
    debug_assert!(num_slots > 0);
    debug_assert!(pseudorandom.range > 0 && pseudorandom.range % num_slots == 0);

    let slot_size = pseudorandom.range / num_slots;
    SlotSelection {
        slot: pseudorandom.value / slot_size,
        remainder: ValueInRange {
            value: pseudorandom.value % slot_size,
            range: slot_size,
        },
    }
}

/// Position of `chosen_slot` among the slots owned by `member`.
///
/// `range` is the member's total slot count and `value` the number of its own
/// slots strictly below `chosen_slot`. Assumes validated, sorted ranges.
pub fn slot_of_member(member: &LayerMember, chosen_slot: u32) -> ValueInRange {
    let mut less_than = 0;
    for range in &member.slots {
        if range.end < chosen_slot {
            less_than += range.size();
        } else if range.start <= chosen_slot {
            less_than += chosen_slot - range.start;
        }
    }
    ValueInRange {
        value: less_than,
        range: member.slot_count(),
    }
}

/// First member, in declaration order, that owns `chosen_slot`. Members with
/// id 0 are skipped.
pub fn find_active_member(layer: &LayerDefinition, chosen_slot: u32) -> Option<&LayerMember> {
    layer
        .members
        .iter()
        .filter(|member| member.id != 0)
        .find(|member| member.contains_slot(chosen_slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{EntropyMode, SlotRange};

    #[test]
    fn worked_example() {
        let selection = choose_slot(ValueInRange { value: 255, range: 1000 }, 100);
        assert_eq!(selection.slot, 25);
        assert_eq!(selection.remainder, ValueInRange { value: 5, range: 10 });
    }

    #[test]
    fn every_slot_gets_an_equal_share() {
        let range = 1200;
        for num_slots in [1, 3, 10, 100, 1200] {
            let mut counts = vec![0u32; num_slots as usize];
            for value in 0..range {
                let s = choose_slot(ValueInRange { value, range }, num_slots);
                assert!(s.remainder.value < s.remainder.range);
                counts[s.slot as usize] += 1;
            }
            assert!(counts.iter().all(|&c| c == range / num_slots));
        }
    }

    #[test]
    fn slot_of_member_counts_own_slots_below() {
        let member = LayerMember::new(
            7,
            [SlotRange::new(2, 4), SlotRange::new(10, 12), SlotRange::new(20, 20)],
        );
        assert_eq!(slot_of_member(&member, 2), ValueInRange { value: 0, range: 7 });
        assert_eq!(slot_of_member(&member, 4), ValueInRange { value: 2, range: 7 });
        assert_eq!(slot_of_member(&member, 11), ValueInRange { value: 4, range: 7 });
        assert_eq!(slot_of_member(&member, 20), ValueInRange { value: 6, range: 7 });
    }

    #[test]
    fn slot_of_member_is_a_bijection_over_owned_slots() {
        let member = LayerMember::new(1, [SlotRange::new(0, 3), SlotRange::new(8, 9)]);
        let positions: Vec<u32> = (0..10)
            .filter(|&s| member.contains_slot(s))
            .map(|s| slot_of_member(&member, s).value)
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn first_matching_member_wins_and_zero_ids_are_skipped() {
        let layer = LayerDefinition::new(1, 10, EntropyMode::Low)
            .with_member(LayerMember::new(0, [SlotRange::new(0, 9)]))
            .with_member(LayerMember::new(5, [SlotRange::new(0, 4)]))
            .with_member(LayerMember::new(6, [SlotRange::new(3, 9)]));
        assert_eq!(find_active_member(&layer, 3).map(|m| m.id), Some(5));
        assert_eq!(find_active_member(&layer, 5).map(|m| m.id), Some(6));
    }

    #[test]
    fn uncovered_slot_has_no_member() {
        let layer = LayerDefinition::new(1, 10, EntropyMode::Low)
            .with_member(LayerMember::new(5, [SlotRange::new(0, 4)]));
        assert!(find_active_member(&layer, 7).is_none());
    }
}
