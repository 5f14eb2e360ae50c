//! Exponentially-decaying reservoir sampling.
//!
//! Keeps a bounded, statistically representative sample of an unbounded
//! observation stream, biased toward recent observations by forward decay:
//! each sample is inserted with priority `exp(alpha * age) / u` for a fresh
//! uniform `u` in `(0, 1]`, and the lowest-priority entry is evicted once
//! capacity is exceeded. Priorities are periodically rescaled so the decay
//! weight never overflows in long-running processes.

use crate::clock::Clock;
use crate::core::{ReservoirConfig, Result};
use crate::reservoir::{Reservoir, Snapshot, WeightedSample};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Map key ordering samples by priority. The sequence number breaks ties so
/// equal priorities never collide.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriorityKey {
    priority: f64,
    seq: u64,
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Debug)]
struct State {
    samples: BTreeMap<PriorityKey, WeightedSample>,
    start_nanos: i64,
    total_observed: u64,
    seq: u64,
}

/// Bounded, decayed random sample of a numeric stream.
///
/// Insert, evict, rescale, and snapshot all run under one short exclusive
/// section: sampling is not the hot-path cost driver (counting is), so
/// correctness wins over raw throughput here. Cost of a snapshot is bounded
/// by the capacity, never by the number of observations seen.
pub struct ExponentiallyDecayingReservoir {
    capacity: usize,
    alpha: f64,
    rescale_nanos: i64,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl ExponentiallyDecayingReservoir {
    /// Creates a reservoir with the default configuration (capacity 1028,
    /// alpha 0.015, one hour rescale interval).
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        // The default config is statically valid.
        Self::with_config(&ReservoirConfig::default(), clock)
            .expect("default reservoir config is valid")
    }

    /// Creates a reservoir from an explicit configuration, failing fast on
    /// invalid parameters.
    pub fn with_config(config: &ReservoirConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let start_nanos = clock.now_nanos();
        Ok(Self {
            capacity: config.capacity,
            alpha: config.alpha,
            rescale_nanos: config.rescale_interval.as_nanos() as i64,
            clock,
            state: Mutex::new(State {
                samples: BTreeMap::new(),
                start_nanos,
                total_observed: 0,
                seq: 0,
            }),
        })
    }

    /// Number of currently retained samples.
    pub fn size(&self) -> usize {
        self.state.lock().samples.len()
    }

    /// Renormalizes every retained priority against a new start time so
    /// decay weights stay within floating-point range. Must run under the
    /// same exclusive section as insertion, or a concurrent insert could
    /// use the stale start time.
    fn rescale(&self, state: &mut State, now: i64) {
        let elapsed_secs = (now - state.start_nanos) as f64 / NANOS_PER_SEC;
        let factor = (-self.alpha * elapsed_secs).exp();

        let old = std::mem::take(&mut state.samples);
        for (key, mut sample) in old {
            sample.priority *= factor;
            state.samples.insert(
                PriorityKey {
                    priority: sample.priority,
                    seq: key.seq,
                },
                sample,
            );
        }
        state.start_nanos = now;
        debug!(
            retained = state.samples.len(),
            factor, "rescaled reservoir priorities"
        );
    }
}

impl Reservoir for ExponentiallyDecayingReservoir {
    fn update(&self, value: i64, tag: Option<&str>) {
        let now = self.clock.now_nanos();
        let mut state = self.state.lock();

        if now - state.start_nanos >= self.rescale_nanos {
            self.rescale(&mut state, now);
        }

        let elapsed_secs = (now - state.start_nanos) as f64 / NANOS_PER_SEC;
        let weight = (self.alpha * elapsed_secs).exp();
        // fastrand::f64 is uniform in [0, 1); flip it to (0, 1] so the
        // division can never hit zero.
        let u = 1.0 - fastrand::f64();
        let priority = weight / u;

        state.seq += 1;
        let seq = state.seq;
        state.samples.insert(
            PriorityKey { priority, seq },
            WeightedSample {
                value,
                tag: tag.map(str::to_owned),
                priority,
            },
        );
        state.total_observed += 1;

        // Decay biases retention toward recency: the oldest entries carry
        // the smallest priorities and are evicted first.
        if state.samples.len() > self.capacity {
            state.samples.pop_first();
        }
    }

    fn snapshot(&self, reset: bool) -> Snapshot {
        let mut state = self.state.lock();
        let values: Vec<i64> = state.samples.values().map(|s| s.value).collect();
        let total_observed = state.total_observed;

        if reset {
            state.samples.clear();
            state.total_observed = 0;
            state.start_nanos = self.clock.now_nanos();
        }
        drop(state);

        Snapshot::new(values, total_observed)
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.samples.clear();
        state.total_observed = 0;
        state.start_nanos = self.clock.now_nanos();
    }
}
