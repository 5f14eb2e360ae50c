//! Configuration for the sampling and rate-tracking primitives.
//!
//! The numeric defaults (reservoir size 1028, alpha 0.015, one hour rescale,
//! five second meter tick) are convention values inherited from the
//! load-average / forward-decay lineage of metrics libraries. They are
//! exposed as configuration rather than hard-coded so hosts with unusual
//! observation rates can tune them.

use crate::core::{MetronError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of samples retained by a decaying reservoir.
pub const DEFAULT_RESERVOIR_CAPACITY: usize = 1028;

/// Default exponential decay factor. Higher values bias the sample more
/// heavily toward recent observations.
pub const DEFAULT_ALPHA: f64 = 0.015;

/// Default interval between priority rescales.
pub const DEFAULT_RESCALE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default interval between EWMA ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for an exponentially-decaying reservoir.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirConfig {
    /// Maximum number of samples retained at any time.
    pub capacity: usize,
    /// Exponential decay factor applied to sample priorities.
    pub alpha: f64,
    /// How often retained priorities are renormalized to keep decay
    /// weights within floating-point range in long-running processes.
    #[serde(with = "humantime_serde")]
    pub rescale_interval: Duration,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RESERVOIR_CAPACITY,
            alpha: DEFAULT_ALPHA,
            rescale_interval: DEFAULT_RESCALE_INTERVAL,
        }
    }
}

impl ReservoirConfig {
    /// Validates the configuration, failing fast at construction time.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(MetronError::ZeroCapacity);
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(MetronError::InvalidAlpha(self.alpha));
        }
        if self.rescale_interval.is_zero() {
            return Err(MetronError::config("rescale interval must be non-zero"));
        }
        Ok(())
    }
}

/// Configuration for a meter's EWMA rate tracking.
///
/// The 1/5/15-minute decay windows are fixed; only the tick interval that
/// drives them is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Interval between EWMA updates. Elapsed intervals are caught up
    /// lazily on the next mark or read.
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl MeterConfig {
    /// Validates the configuration, failing fast at construction time.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(MetronError::ZeroTickInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reservoir_config_is_valid() {
        let config = ReservoirConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 1028);
        assert!((config.alpha - 0.015).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = ReservoirConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MetronError::ZeroCapacity)));
    }

    #[test]
    fn test_non_positive_alpha_rejected() {
        for alpha in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ReservoirConfig {
                alpha,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "alpha {alpha} should be rejected");
        }
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let config = MeterConfig {
            tick_interval: Duration::ZERO,
        };
        assert!(matches!(config.validate(), Err(MetronError::ZeroTickInterval)));
    }

    #[test]
    fn test_config_roundtrips_through_serde() {
        let config = ReservoirConfig {
            capacity: 256,
            alpha: 0.1,
            rescale_interval: Duration::from_secs(120),
        };
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: ReservoirConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.capacity, 256);
        assert_eq!(decoded.rescale_interval, Duration::from_secs(120));

        // Missing fields fall back to defaults.
        let defaults: ReservoirConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.capacity, DEFAULT_RESERVOIR_CAPACITY);
    }
}
