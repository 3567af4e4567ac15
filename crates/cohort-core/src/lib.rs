//! # cohort-core
//!
//! **Reproducible experiment populations without per-client state.**
//!
//! `cohort-core` assigns each client to members of experiment *layers* by
//! hashing stable client entropy into fixed-size slot spaces. The same client,
//! seed and entropy always produce the same assignment, and nothing has to be
//! stored to reproduce it.
//!
//! ## Quick Start
//!
//! ```
//! use cohort_core::{
//!     ClientEntropyProviders, EntropyConfig, EntropyMode, LayerDefinition, LayerMember,
//!     SlotRange, ValueInRange, VariationsLayers, VariationsSeed,
//! };
//!
//! let providers = ClientEntropyProviders::new(EntropyConfig {
//!     high_entropy_source: "client-id".to_string(),
//!     low_entropy: ValueInRange::new(1234, 8000)?,
//!     ..Default::default()
//! })?;
//!
//! // Two members splitting 100 slots evenly: every client lands in exactly one.
//! let seed = VariationsSeed::from(vec![
//!     LayerDefinition::new(1, 100, EntropyMode::Low)
//!         .with_member(LayerMember::new(10, [SlotRange::new(0, 49)]))
//!         .with_member(LayerMember::new(11, [SlotRange::new(50, 99)])),
//! ]);
//!
//! let layers = VariationsLayers::new(&seed, &providers);
//! assert!(layers.is_layer_active(1));
//! assert!(layers.is_layer_member_active(1, 10) != layers.is_layer_member_active(1, 11));
//! # Ok::<(), cohort_core::EntropyError>(())
//! ```
//!
//! ## Architecture
//!
//! Seed → Validation → Entropy draw → Slot → Member → Remainder entropy
//!
//! - Every draw goes through an [`EntropyProvider`], selected per layer by its
//!   [`EntropyMode`] from the injected [`EntropyProviders`].
//! - Slot math always runs over the low entropy domain.
//! - The entropy a slot choice leaves unused becomes a new provider scoped to
//!   the chosen member ([`VariationsLayers::get_remainder_entropy`]), so nested
//!   studies randomize independently of the layer assignment.
//! - Malformed layers are dropped one by one and reported through
//!   [`LayerMetrics`]; they never fail construction.

pub mod conditioning;
pub mod error;
pub mod layer;
pub mod metrics;
pub mod providers;
pub mod registry;
pub mod slots;
pub mod source;
pub mod validation;
pub mod value;

pub use error::{EntropyError, Result};
pub use layer::{
    EntropyMode, LayerDefinition, LayerMember, SlotRange, UnknownFields, VariationsSeed,
};
pub use metrics::{
    HistogramBucket, HistogramSnapshot, INVALID_LAYER_HISTOGRAM, InvalidLayerHistogram,
    LayerMetrics, NoopMetrics,
};
pub use providers::{
    ClientEntropyProviders, DEFAULT_LOW_ENTROPY_DOMAIN, EntropyConfig, HashEntropyProvider,
    MAX_LOW_ENTROPY_DOMAIN, NormalizedEntropyProvider,
};
pub use registry::{LayerInfo, VariationsLayers};
pub use slots::{SlotSelection, choose_slot, find_active_member, slot_of_member};
pub use source::{EntropyProvider, EntropyProviders};
pub use validation::{
    InvalidLayerReason, duplicate_layer_ids, validate_layer, validate_slot_bounds,
};
pub use value::{ValueInRange, combine_ranges};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
