//! Drop-reason diagnostics.
//!
//! The registry reports one event per invalidated layer through
//! [`LayerMetrics`]. Hosts forward these to their metrics pipeline;
//! [`InvalidLayerHistogram`] keeps them in memory as an enumerated histogram.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::validation::InvalidLayerReason;

/// Name of the invalid layer histogram.
pub const INVALID_LAYER_HISTOGRAM: &str = "Variations.InvalidLayerReason";

/// Sink for drop-reason events.
pub trait LayerMetrics: Send + Sync {
    fn record_invalid_layer(&self, reason: InvalidLayerReason);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl LayerMetrics for NoopMetrics {
    fn record_invalid_layer(&self, _reason: InvalidLayerReason) {}
}

/// Thread-safe per-reason counters.
#[derive(Debug, Default)]
pub struct InvalidLayerHistogram {
    counts: Mutex<BTreeMap<InvalidLayerReason, u64>>,
}

impl InvalidLayerHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded for `reason`.
    pub fn count(&self, reason: InvalidLayerReason) -> u64 {
        self.lock().get(&reason).copied().unwrap_or(0)
    }

    /// Events recorded across all reasons.
    pub fn total(&self) -> u64 {
        self.lock().values().sum()
    }

    /// Point-in-time copy of the non-empty buckets, ordered by reason code.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let buckets = self
            .lock()
            .iter()
            .map(|(&reason, &count)| HistogramBucket {
                reason,
                code: reason.code(),
                count,
            })
            .collect();
        HistogramSnapshot {
            name: INVALID_LAYER_HISTOGRAM.to_string(),
            buckets,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<InvalidLayerReason, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LayerMetrics for InvalidLayerHistogram {
    fn record_invalid_layer(&self, reason: InvalidLayerReason) {
        *self.lock().entry(reason).or_default() += 1;
    }
}

/// Serializable view of [`InvalidLayerHistogram`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub name: String,
    pub buckets: Vec<HistogramBucket>,
}

/// One histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub reason: InvalidLayerReason,
    pub code: u32,
    pub count: u64,
}
