//! Bounded statistical sampling of unbounded observation streams.
//!
//! A reservoir keeps a representative subset of every value ever recorded
//! and summarizes it on demand as a [`Snapshot`]. The default implementation
//! is [`ExponentiallyDecayingReservoir`], which biases retention toward
//! recent observations.

#![warn(missing_docs)]

pub mod decaying;
pub mod snapshot;

pub use decaying::ExponentiallyDecayingReservoir;
pub use snapshot::Snapshot;

use serde::{Deserialize, Serialize};

/// A single raw measurement plus an optional caller-supplied label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedValue {
    /// The recorded measurement.
    pub value: i64,
    /// Optional label attached by the caller, e.g. a request route.
    pub tag: Option<String>,
}

impl ObservedValue {
    /// Creates an observed value with an optional tag.
    pub fn new(value: i64, tag: Option<&str>) -> Self {
        Self {
            value,
            tag: tag.map(str::to_owned),
        }
    }

    /// The empty sentinel reported before any observation or after a reset.
    pub fn empty() -> Self {
        Self {
            value: 0,
            tag: None,
        }
    }
}

/// A retained reservoir entry: the observation, its tag, and the decayed
/// sampling priority it is ordered by.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSample {
    /// The recorded measurement.
    pub value: i64,
    /// Optional caller-supplied label.
    pub tag: Option<String>,
    /// Decayed sampling priority; higher survives eviction longer.
    pub priority: f64,
}

/// Capability set of a reservoir: anything that can accept updates, produce
/// snapshots, and reset qualifies, so metrics compose over injected behavior
/// rather than a concrete sampler.
pub trait Reservoir: Send + Sync {
    /// Records one observation with an optional tag.
    fn update(&self, value: i64, tag: Option<&str>);

    /// Summarizes the currently retained samples. With `reset` the store is
    /// cleared, the observation count zeroed, and the decay epoch
    /// re-anchored before this call returns; the returned snapshot reflects
    /// the pre-reset state.
    fn snapshot(&self, reset: bool) -> Snapshot;

    /// Clears retained samples and the observation count in place.
    fn reset(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_value_sentinel() {
        let empty = ObservedValue::empty();
        assert_eq!(empty.value, 0);
        assert_eq!(empty.tag, None);
    }

    #[test]
    fn test_observed_value_with_tag() {
        let observed = ObservedValue::new(99, Some("login"));
        assert_eq!(observed.value, 99);
        assert_eq!(observed.tag.as_deref(), Some("login"));
    }
}
