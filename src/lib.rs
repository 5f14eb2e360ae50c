//! Metron - in-process metrics instrumentation core.
//!
//! Metron records timing, rate, and distribution observations from
//! application code under concurrent load and produces point-in-time
//! statistical summaries on demand.
//!
//! # Features
//!
//! - **Striped accumulators**: counters that spread writes across cache
//!   lines instead of contending on one memory location
//! - **Decaying reservoirs**: bounded, representative samples of unbounded
//!   observation streams, biased toward recency
//! - **Composite metrics**: Meter (EWMA rates), Histogram (distribution +
//!   last value), Timer (the façade combining them)
//! - **Injected clocks**: every duration derives from a monotonic
//!   nanosecond [`Clock`], so tests drive time deterministically
//!
//! # Architecture
//!
//! Data flows one way, bottom-up:
//! - `adder`: lock-free-on-the-fast-path concurrent accumulator
//! - `reservoir`: decayed sampling and statistical snapshots
//! - `metrics`: the Meter/Histogram/Timer composites built on both
//! - `core`: errors and configuration
//!
//! Registries, reporters, and wire formats live upstream; this crate only
//! produces the typed value structs they consume.
//!
//! # Example
//!
//! ```
//! use metron::{TimeUnit, TimerMetric};
//!
//! let timer = TimerMetric::new();
//! timer.record(100, TimeUnit::Milliseconds, None);
//! let answer = timer.time(|| 6 * 7, Some("compute"));
//! assert_eq!(answer, 42);
//!
//! let value = timer.value(false);
//! assert_eq!(value.rate.count, 2);
//! assert_eq!(value.distribution().sample_size(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod adder;
pub mod clock;
pub mod core;
pub mod metrics;
pub mod reservoir;

// Re-export core types for convenience
pub use crate::adder::StripedAdder;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::core::{MeterConfig, MetronError, ReservoirConfig, Result};
pub use crate::metrics::{
    HistogramMetric, HistogramValue, MeterMetric, MeterValue, TimeUnit, TimerContext,
    TimerMetric, TimerValue,
};
pub use crate::reservoir::{
    ExponentiallyDecayingReservoir, ObservedValue, Reservoir, Snapshot, WeightedSample,
};
