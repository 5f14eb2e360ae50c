//! Duration recording: the top-level façade application code calls.

use crate::adder::StripedAdder;
use crate::clock::{Clock, MonotonicClock};
use crate::metrics::histogram::{HistogramMetric, HistogramValue};
use crate::metrics::meter::{MeterMetric, MeterValue};
use crate::metrics::unit::TimeUnit;
use crate::reservoir::Snapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time composite summary of a timer.
///
/// Each field is internally consistent, but the composite is a best-effort
/// point-in-time read: under heavy concurrent writers the fields may
/// reflect slightly different instants. There is deliberately no global
/// lock serializing writers for the sake of snapshot exactness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerValue {
    /// Event rates from the embedded meter.
    pub rate: MeterValue,
    /// Duration distribution from the embedded histogram.
    pub histogram: HistogramValue,
    /// Number of currently in-flight recording sessions.
    pub active_sessions: i64,
    /// Sum of all recorded durations in nanoseconds.
    pub total_time: i64,
    /// Unit of the distribution and total: always nanoseconds.
    pub unit: TimeUnit,
}

impl TimerValue {
    /// The duration distribution snapshot.
    pub fn distribution(&self) -> &Snapshot {
        &self.histogram.snapshot
    }
}

/// Records how long operations take and how often they happen.
///
/// Composes a [`MeterMetric`] (rate), a [`HistogramMetric`] (distribution),
/// and two [`StripedAdder`]s (in-flight session count, cumulative recorded
/// time) behind one façade.
pub struct TimerMetric {
    meter: MeterMetric,
    histogram: HistogramMetric,
    active_sessions: StripedAdder,
    total_time: StripedAdder,
    clock: Arc<dyn Clock>,
}

impl TimerMetric {
    /// Creates a timer on the default monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    /// Creates a timer on an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            meter: MeterMetric::new(clock.clone()),
            histogram: HistogramMetric::new(clock.clone()),
            active_sessions: StripedAdder::new(),
            total_time: StripedAdder::new(),
            clock,
        }
    }

    /// Creates a timer from explicitly constructed sub-metrics.
    pub fn from_parts(
        histogram: HistogramMetric,
        meter: MeterMetric,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            meter,
            histogram,
            active_sessions: StripedAdder::new(),
            total_time: StripedAdder::new(),
            clock,
        }
    }

    /// Records a completed duration with an optional tag.
    ///
    /// The duration is converted to nanoseconds; a negative result is a
    /// silent no-op (a defensive clamp, not an error), leaving the
    /// histogram, meter, and total untouched.
    pub fn record(&self, duration: i64, unit: TimeUnit, tag: Option<&str>) {
        let nanos = unit.to_nanos(duration);
        if nanos < 0 {
            return;
        }
        self.histogram.update(nanos, tag);
        self.meter.mark(tag);
        self.total_time.add(nanos);
    }

    /// Marks the start of a recording session and returns the current
    /// timestamp. Paired with [`end_recording`](Self::end_recording) when a
    /// span crosses ownership or thread boundaries; the caller computes the
    /// elapsed duration and passes it to [`record`](Self::record) itself.
    pub fn start_recording(&self) -> i64 {
        self.active_sessions.increment();
        self.clock.now_nanos()
    }

    /// Marks the end of a recording session and returns the current
    /// timestamp.
    pub fn end_recording(&self) -> i64 {
        self.active_sessions.decrement();
        self.clock.now_nanos()
    }

    /// Returns the current monotonic timestamp in nanoseconds.
    pub fn current_time(&self) -> i64 {
        self.clock.now_nanos()
    }

    /// Starts a scoped timing session. The returned context ends the
    /// session and records the elapsed duration exactly once, on
    /// [`TimerContext::stop`] or on drop, whichever comes first.
    pub fn context(&self, tag: Option<&str>) -> TimerContext<'_> {
        let start = self.start_recording();
        TimerContext {
            timer: self,
            start,
            tag: tag.map(str::to_owned),
            finished: false,
        }
    }

    /// Times a closure, returning its result.
    ///
    /// The active-session count is incremented around the call, and the
    /// elapsed duration is recorded exactly once even if the closure
    /// panics, before the panic propagates.
    pub fn time<T>(&self, action: impl FnOnce() -> T, tag: Option<&str>) -> T {
        let start = self.clock.now_nanos();
        self.active_sessions.increment();
        let _guard = SessionGuard {
            timer: self,
            start,
            tag: tag.map(str::to_owned),
        };
        action()
    }

    /// Reads the timer. With `reset`, the meter and histogram are drained;
    /// the active-session and total-time accumulators are never reset by a
    /// read (an in-flight session count must not be clobbered from a
    /// reporting cycle).
    pub fn value(&self, reset: bool) -> TimerValue {
        TimerValue {
            rate: self.meter.value(reset),
            histogram: self.histogram.value(reset),
            active_sessions: self.active_sessions.value(),
            total_time: self.total_time.value(),
            unit: TimeUnit::Nanoseconds,
        }
    }

    /// Resets the meter and histogram. Does not touch the active-session or
    /// total-time accumulators.
    pub fn reset(&self) {
        self.meter.reset();
        self.histogram.reset();
    }
}

impl Default for TimerMetric {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop guard for [`TimerMetric::time`]: ends the session and records the
/// elapsed duration whether the action returned or panicked.
struct SessionGuard<'a> {
    timer: &'a TimerMetric,
    start: i64,
    tag: Option<String>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.timer.active_sessions.decrement();
        let elapsed = self.timer.clock.now_nanos() - self.start;
        self.timer
            .record(elapsed, TimeUnit::Nanoseconds, self.tag.as_deref());
    }
}

/// Scoped timing handle from [`TimerMetric::context`].
///
/// On creation the session is started; on the single close (explicit
/// [`stop`](Self::stop) or drop) the session is ended and the elapsed
/// duration recorded, exactly once. Closing is idempotent: a stopped
/// context's drop is inert.
pub struct TimerContext<'a> {
    timer: &'a TimerMetric,
    start: i64,
    tag: Option<String>,
    finished: bool,
}

impl TimerContext<'_> {
    /// Nanoseconds elapsed since this context started, without closing it.
    pub fn elapsed(&self) -> i64 {
        self.timer.clock.now_nanos() - self.start
    }

    /// Ends the session, records the elapsed duration, and returns it in
    /// nanoseconds.
    pub fn stop(mut self) -> i64 {
        self.finish()
    }

    fn finish(&mut self) -> i64 {
        if self.finished {
            return 0;
        }
        self.finished = true;
        let end = self.timer.end_recording();
        let elapsed = end - self.start;
        self.timer
            .record(elapsed, TimeUnit::Nanoseconds, self.tag.as_deref());
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
