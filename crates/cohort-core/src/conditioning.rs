//! Centralized hashing for entropy providers.
//!
//! **ALL** mixing of client entropy with salts lives here. Providers decide
//! which bytes identify a draw; this module is the single place that turns
//! those bytes into pseudorandom integers.
//!
//! # Architecture
//!
//! ```text
//! Client entropy + salt → SHA-256 → u64 word → scaled into [0, range)
//! ```
//!
//! Output is deterministic for fixed input and stable across processes and
//! platforms (little-endian encoding throughout).

use sha2::{Digest, Sha256};

/// Domain tag for high-entropy draws.
pub const HIGH_ENTROPY_TAG: &[u8] = b"cohort.high";

/// Domain tag for the per-value hashes of normalized providers.
pub const NORMALIZED_TAG: &[u8] = b"cohort.normalized";

// ---------------------------------------------------------------------------
// SHA-256 words
// ---------------------------------------------------------------------------

/// SHA-256 over the concatenation of `parts`, first 8 digest bytes as a
/// little-endian `u64`.
///
/// Callers must keep part boundaries unambiguous: every variable-length part
/// has to be followed only by fixed-width parts.
pub fn hash_to_u64(parts: &[&[u8]]) -> u64 {
    let mut h = Sha256::new();
    for part in parts {
        h.update(part);
    }
    let digest: [u8; 32] = h.finalize().into();
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(word)
}

/// Hash of one candidate entropy value under a salt.
pub fn salted_value_hash(salt: u32, value: u32) -> u64 {
    hash_to_u64(&[NORMALIZED_TAG, &salt.to_le_bytes(), &value.to_le_bytes()])
}

// ---------------------------------------------------------------------------
// Range reduction
// ---------------------------------------------------------------------------

/// Map a full-width word into `[0, range)` by multiply-shift.
///
/// Equivalent to `floor(x / 2^64 * range)`. Returns 0 for `range == 0`.
pub fn scale_to_range(x: u64, range: u32) -> u32 {
    ((u128::from(x) * u128::from(range)) >> 64) as u32
}
