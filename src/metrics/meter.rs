//! Event rate tracking with exponentially-weighted moving averages.

use crate::adder::StripedAdder;
use crate::clock::Clock;
use crate::core::{MeterConfig, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Point-in-time rate summary of a meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterValue {
    /// Total events marked since creation or the last reset.
    pub count: i64,
    /// Lifetime events per second: count over elapsed time.
    pub mean_rate: f64,
    /// EWMA events per second over a one-minute decay window.
    pub rate_1min: f64,
    /// EWMA events per second over a five-minute decay window.
    pub rate_5min: f64,
    /// EWMA events per second over a fifteen-minute decay window.
    pub rate_15min: f64,
}

impl MeterValue {
    /// A zeroed meter value.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean_rate: 0.0,
            rate_1min: 0.0,
            rate_5min: 0.0,
            rate_15min: 0.0,
        }
    }
}

/// One moving average. Uninitialized until its first tick, which seeds the
/// rate directly instead of decaying from zero.
#[derive(Debug, Clone, Copy)]
struct Ewma {
    window_secs: f64,
    rate: Option<f64>,
}

impl Ewma {
    fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            rate: None,
        }
    }

    /// Applies one tick with the given instantaneous rate (events per
    /// second over the tick interval).
    fn tick(&mut self, instant_rate: f64, interval_secs: f64) {
        match self.rate {
            None => self.rate = Some(instant_rate),
            Some(rate) => {
                let alpha = 1.0 - (-interval_secs / self.window_secs).exp();
                self.rate = Some(rate + alpha * (instant_rate - rate));
            }
        }
    }

    /// Applies `ticks` consecutive zero-rate ticks in one step. Repeated
    /// multiplication by `1 - alpha` collapses to a single exponential.
    fn decay(&mut self, ticks: u64, interval_secs: f64) {
        if let Some(rate) = self.rate {
            let factor = (-(ticks as f64) * interval_secs / self.window_secs).exp();
            self.rate = Some(rate * factor);
        }
    }

    fn rate(&self) -> f64 {
        self.rate.unwrap_or(0.0)
    }
}

#[derive(Debug)]
struct TickState {
    start_nanos: i64,
    last_tick_nanos: i64,
    /// Events marked since the last tick, not yet folded into the EWMAs.
    uncounted: i64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

impl TickState {
    fn new(now: i64) -> Self {
        Self {
            start_nanos: now,
            last_tick_nanos: now,
            uncounted: 0,
            m1: Ewma::new(60.0),
            m5: Ewma::new(5.0 * 60.0),
            m15: Ewma::new(15.0 * 60.0),
        }
    }
}

/// Tracks the rate of events over 1-, 5-, and 15-minute decay windows plus
/// a lifetime mean, matching the Unix load-average decay constants for the
/// configured tick interval (five seconds by default).
///
/// The total count lives in a [`StripedAdder`]; EWMA state is a compound
/// calculation and sits behind a lock. Ticking is lazy: whole elapsed tick
/// intervals are caught up on the next mark or read, so long gaps between
/// calls decay correctly instead of applying one oversized step.
pub struct MeterMetric {
    count: StripedAdder,
    tick_nanos: i64,
    state: Mutex<TickState>,
    clock: Arc<dyn Clock>,
}

impl MeterMetric {
    /// Creates a meter with the default five-second tick interval.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(&MeterConfig::default(), clock).expect("default meter config is valid")
    }

    /// Creates a meter from an explicit configuration, failing fast on
    /// invalid parameters.
    pub fn with_config(config: &MeterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let now = clock.now_nanos();
        Ok(Self {
            count: StripedAdder::new(),
            tick_nanos: config.tick_interval.as_nanos() as i64,
            state: Mutex::new(TickState::new(now)),
            clock,
        })
    }

    /// Marks one event. The tag does not affect rates; it is accepted so
    /// callers can thread one uniformly through record paths.
    pub fn mark(&self, tag: Option<&str>) {
        self.mark_n(1, tag);
    }

    /// Marks `n` events at once.
    pub fn mark_n(&self, n: i64, _tag: Option<&str>) {
        self.count.add(n);
        let now = self.clock.now_nanos();
        let mut state = self.state.lock();
        self.tick_if_needed(&mut state, now);
        state.uncounted += n;
    }

    /// Folds elapsed whole tick intervals into the EWMAs. The first elapsed
    /// tick carries the accumulated instantaneous rate; any further elapsed
    /// ticks saw no events and are applied as pure decay.
    fn tick_if_needed(&self, state: &mut TickState, now: i64) {
        let elapsed = now - state.last_tick_nanos;
        if elapsed < self.tick_nanos {
            return;
        }
        let ticks = (elapsed / self.tick_nanos) as u64;
        let interval_secs = self.tick_nanos as f64 / NANOS_PER_SEC;
        let instant_rate = state.uncounted as f64 / interval_secs;
        state.uncounted = 0;

        state.m1.tick(instant_rate, interval_secs);
        state.m5.tick(instant_rate, interval_secs);
        state.m15.tick(instant_rate, interval_secs);
        if ticks > 1 {
            state.m1.decay(ticks - 1, interval_secs);
            state.m5.decay(ticks - 1, interval_secs);
            state.m15.decay(ticks - 1, interval_secs);
        }

        state.last_tick_nanos += (ticks as i64) * self.tick_nanos;
        trace!(ticks, instant_rate, "meter ticked");
    }

    /// Reads the meter. With `reset`, the count is drained and the EWMA
    /// state reinitialized after the returned value is captured.
    pub fn value(&self, reset: bool) -> MeterValue {
        let now = self.clock.now_nanos();
        let mut state = self.state.lock();
        self.tick_if_needed(&mut state, now);

        let count = if reset {
            self.count.sum_and_reset()
        } else {
            self.count.value()
        };
        let elapsed_secs = (now - state.start_nanos) as f64 / NANOS_PER_SEC;
        let mean_rate = if count == 0 || elapsed_secs <= 0.0 {
            0.0
        } else {
            count as f64 / elapsed_secs
        };

        let value = MeterValue {
            count,
            mean_rate,
            rate_1min: state.m1.rate(),
            rate_5min: state.m5.rate(),
            rate_15min: state.m15.rate(),
        };

        if reset {
            *state = TickState::new(now);
        }
        value
    }

    /// Zeroes the count and reinitializes the EWMA state and start time.
    pub fn reset(&self) {
        let now = self.clock.now_nanos();
        let mut state = self.state.lock();
        self.count.sum_and_reset();
        *state = TickState::new(now);
    }
}
