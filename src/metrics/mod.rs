//! Composite metric types: meter, histogram, and timer.
//!
//! These combine the accumulator and reservoir primitives while preserving
//! per-sub-state snapshot/reset semantics under concurrent writers. Raw
//! observations flow in at the top; summarized value structs flow back out
//! on read via `value(reset)`.

#![warn(missing_docs)]

pub mod histogram;
pub mod meter;
pub mod timer;
pub mod unit;

pub use histogram::{HistogramMetric, HistogramValue};
pub use meter::{MeterMetric, MeterValue};
pub use timer::{TimerContext, TimerMetric, TimerValue};
pub use unit::TimeUnit;
