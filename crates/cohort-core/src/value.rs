//! Uniform values over a bounded range.
//!
//! [`ValueInRange`] is the unit all randomization math is expressed in: a
//! provider draw, the leftover of a slot selection, and the seed of a derived
//! remainder provider are all values in `[0, range)`.

use serde::{Deserialize, Serialize};

use crate::error::{EntropyError, Result};

/// A value in `[0, range)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueInRange {
    pub value: u32,
    pub range: u32,
}

impl ValueInRange {
    /// Degenerate source with exactly one possible value.
    pub const NIL: Self = Self { value: 0, range: 1 };

    /// Build a value, checking `value < range`.
    pub fn new(value: u32, range: u32) -> Result<Self> {
        if range == 0 {
            return Err(EntropyError::EmptyRange);
        }
        if value >= range {
            return Err(EntropyError::ValueOutOfRange { value, range });
        }
        Ok(Self { value, range })
    }

    /// Re-check the invariant, e.g. after deserializing.
    pub fn validate(self) -> Result<Self> {
        Self::new(self.value, self.range)
    }
}

impl std::fmt::Display for ValueInRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.value, self.range)
    }
}

/// Mixed-radix composition of two independent uniform values.
///
/// If `major` and `minor` are independent and uniform, the result is uniform
/// over `major.range * minor.range`. The product must fit in a `u32`.
pub fn combine_ranges(major: ValueInRange, minor: ValueInRange) -> ValueInRange {
    ValueInRange {
        value: major.value * minor.range + minor.value,
        range: major.range * minor.range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_and_out_of_range() {
        assert_eq!(ValueInRange::new(0, 0), Err(EntropyError::EmptyRange));
        assert_eq!(
            ValueInRange::new(10, 10),
            Err(EntropyError::ValueOutOfRange { value: 10, range: 10 })
        );
        assert!(ValueInRange::new(9, 10).is_ok());
    }

    #[test]
    fn combine_is_a_bijection_onto_the_product_range() {
        let mut seen = vec![false; 12];
        for major in 0..3 {
            for minor in 0..4 {
                let c = combine_ranges(
                    ValueInRange { value: major, range: 3 },
                    ValueInRange { value: minor, range: 4 },
                );
                assert_eq!(c.range, 12);
                assert!(!seen[c.value as usize]);
                seen[c.value as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn nil_is_a_single_value() {
        assert_eq!(ValueInRange::NIL.validate(), Ok(ValueInRange::NIL));
        assert_eq!(ValueInRange::NIL.to_string(), "0/1");
    }
}
