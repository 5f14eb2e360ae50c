//! Distribution tracking over a sampling reservoir.

use crate::clock::Clock;
use crate::reservoir::{ExponentiallyDecayingReservoir, ObservedValue, Reservoir, Snapshot};
use arc_swap::ArcSwapOption;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time summary of a histogram: the most recent raw observation
/// alongside the statistical snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramValue {
    /// Most recently recorded value, or 0 before any observation.
    pub last_value: i64,
    /// Tag of the most recent observation, if one was supplied.
    pub last_tag: Option<String>,
    /// Statistical summary of the reservoir's retained samples.
    pub snapshot: Snapshot,
}

type ReservoirFactory = Box<dyn Fn() -> Box<dyn Reservoir> + Send + Sync>;

/// Records a stream of values into a decaying reservoir and keeps the most
/// recent observation for cheap introspection independent of sampling.
///
/// The reservoir is constructed lazily on first use, so histograms that are
/// declared but never observed pay no sampling-structure allocation. The
/// last-observed pair and the reservoir are separate sub-states: a composite
/// read is internally consistent per field but carries no cross-field
/// atomicity under concurrent writers.
pub struct HistogramMetric {
    reservoir: OnceCell<Box<dyn Reservoir>>,
    factory: ReservoirFactory,
    last: ArcSwapOption<ObservedValue>,
}

impl HistogramMetric {
    /// Creates a histogram backed by a default exponentially-decaying
    /// reservoir on the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_reservoir(move || {
            Box::new(ExponentiallyDecayingReservoir::new(clock.clone()))
        })
    }

    /// Creates a histogram whose reservoir is built by `factory` on first
    /// use. Any [`Reservoir`] implementation is acceptable.
    pub fn with_reservoir<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Reservoir> + Send + Sync + 'static,
    {
        Self {
            reservoir: OnceCell::new(),
            factory: Box::new(factory),
            last: ArcSwapOption::const_empty(),
        }
    }

    /// The reservoir, built on first use. Initialize-once under concurrent
    /// first updates.
    fn reservoir(&self) -> &dyn Reservoir {
        self.reservoir.get_or_init(|| (self.factory)()).as_ref()
    }

    /// Returns true once the reservoir has been constructed.
    pub fn is_sampled(&self) -> bool {
        self.reservoir.get().is_some()
    }

    /// Records one observation: stores it as the last observed pair and
    /// forwards it to the reservoir.
    pub fn update(&self, value: i64, tag: Option<&str>) {
        self.last
            .store(Some(Arc::new(ObservedValue::new(value, tag))));
        self.reservoir().update(value, tag);
    }

    /// Reads the histogram. With `reset`, the reservoir is drained and the
    /// last-observed pair cleared to its sentinel within this same call, so
    /// a reader never pairs a reset reservoir with a stale last value.
    pub fn value(&self, reset: bool) -> HistogramValue {
        let last = self.last.load_full();
        let snapshot = self.reservoir().snapshot(reset);
        if reset {
            self.last.store(None);
        }

        let (last_value, last_tag) = match last {
            Some(observed) => (observed.value, observed.tag.clone()),
            None => (0, None),
        };
        HistogramValue {
            last_value,
            last_tag,
            snapshot,
        }
    }

    /// Clears the last-observed pair and resets the reservoir. A reservoir
    /// that was never constructed has nothing to reset.
    pub fn reset(&self) {
        self.last.store(None);
        if let Some(reservoir) = self.reservoir.get() {
            reservoir.reset();
        }
    }
}
