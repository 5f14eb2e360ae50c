//! Striped concurrent accumulator.
//!
//! A single atomic counter becomes a contention hotspot when many threads
//! increment it. [`StripedAdder`] spreads writes across a base cell plus a
//! growable array of cache-padded stripe cells: writers CAS the base, and on
//! contention hash a thread-local probe to pick a stripe instead. Reads sum
//! every cell without locking, trading exact point-in-time consistency for a
//! hot path that never blocks.

use arc_swap::ArcSwap;
use crossbeam_utils::CachePadded;
use once_cell::sync::Lazy;
use std::cell::Cell;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

type Cells = Vec<Arc<CachePadded<AtomicI64>>>;

/// Stripe arrays stop growing at a small multiple of the hardware
/// parallelism; past that point extra stripes only waste cache lines.
static MAX_CELLS: Lazy<usize> = Lazy::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 4
});

thread_local! {
    // Per-thread stripe probe, seeded lazily. Zero means unseeded.
    static PROBE: Cell<u64> = const { Cell::new(0) };
}

/// Returns this thread's stripe probe, seeding it on first use.
#[inline]
fn probe() -> u64 {
    PROBE.with(|p| {
        let v = p.get();
        if v != 0 {
            return v;
        }
        let seeded = fastrand::u64(1..=u64::MAX);
        p.set(seeded);
        seeded
    })
}

/// Rehashes this thread's probe after a CAS collision so it lands on a
/// different stripe next time.
#[inline]
fn rehash_probe() -> u64 {
    PROBE.with(|p| {
        let mut v = p.get();
        if v == 0 {
            v = fastrand::u64(1..=u64::MAX);
        }
        // xorshift64
        v ^= v << 13;
        v ^= v >> 17;
        v ^= v << 5;
        p.set(v);
        v
    })
}

/// Lock-free-on-the-fast-path concurrent `i64` accumulator.
///
/// Used for event counts, active-session counters, and cumulative totals.
///
/// # Consistency
///
/// [`value`](Self::value) is a weakly consistent read: an `add` racing with
/// the sum may or may not be reflected, but no update is ever permanently
/// lost from the running total. [`sum_and_reset`](Self::sum_and_reset) swaps
/// each cell to zero while summing; a writer racing with the reset may have
/// its delta missed by the returned sum but never double counted. This is a
/// deliberate tradeoff that keeps the increment path free of any global
/// lock, and callers must not assume exact reset atomicity under concurrent
/// writers.
#[derive(Debug)]
pub struct StripedAdder {
    base: CachePadded<AtomicI64>,
    cells: ArcSwap<Cells>,
}

impl StripedAdder {
    /// Creates an adder with a zero total and no stripes. Stripes are
    /// allocated only once contention is observed.
    pub fn new() -> Self {
        Self {
            base: CachePadded::new(AtomicI64::new(0)),
            cells: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Adds `delta` to the running total.
    #[inline]
    pub fn add(&self, delta: i64) {
        let current = self.base.load(Ordering::Relaxed);
        if self
            .base
            .compare_exchange(current, current + delta, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            return;
        }
        self.add_striped(delta);
    }

    /// Adds one to the running total.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    /// Subtracts one from the running total.
    #[inline]
    pub fn decrement(&self) {
        self.add(-1);
    }

    /// Contended path: probe a stripe cell, rehashing and growing the
    /// stripe array when collisions persist.
    #[cold]
    fn add_striped(&self, delta: i64) {
        let mut collisions = 0u32;
        loop {
            let cells = self.cells.load();
            if cells.is_empty() {
                self.grow();
                continue;
            }
            let cell = &cells[(probe() as usize) % cells.len()];
            let current = cell.load(Ordering::Relaxed);
            if cell
                .compare_exchange(current, current + delta, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
            rehash_probe();
            collisions += 1;
            if collisions >= 2 && cells.len() < *MAX_CELLS {
                self.grow();
            }
        }
    }

    /// Doubles the stripe array, carrying over the existing cells. Lost
    /// races just mean another thread already grew it.
    fn grow(&self) {
        let current = self.cells.load_full();
        let target = if current.is_empty() {
            2
        } else {
            (current.len() * 2).min(*MAX_CELLS)
        };
        if current.len() >= target {
            return;
        }
        let mut next: Cells = Vec::with_capacity(target);
        next.extend(current.iter().cloned());
        while next.len() < target {
            next.push(Arc::new(CachePadded::new(AtomicI64::new(0))));
        }
        let previous = self.cells.compare_and_swap(&current, Arc::new(next));
        if Arc::ptr_eq(&arc_swap::Guard::into_inner(previous), &current) {
            debug!(stripes = target, "grew striped adder");
        }
    }

    /// Returns the current total by summing the base and every stripe.
    ///
    /// Weakly consistent: concurrent adds may or may not be included.
    pub fn value(&self) -> i64 {
        let mut sum = self.base.load(Ordering::Relaxed);
        for cell in self.cells.load().iter() {
            sum += cell.load(Ordering::Relaxed);
        }
        sum
    }

    /// Returns the current total while zeroing every cell.
    ///
    /// A delta from a writer racing with the reset may be absent from the
    /// returned sum (it lands in a freshly zeroed cell and is counted by the
    /// next read), but it is never double counted.
    pub fn sum_and_reset(&self) -> i64 {
        let mut sum = self.base.swap(0, Ordering::Relaxed);
        for cell in self.cells.load().iter() {
            sum += cell.swap(0, Ordering::Relaxed);
        }
        sum
    }
}

impl Default for StripedAdder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_single_thread_arithmetic() {
        let adder = StripedAdder::new();
        adder.add(10);
        adder.increment();
        adder.decrement();
        adder.add(-3);
        assert_eq!(adder.value(), 7);
    }

    #[test]
    fn test_sum_and_reset_returns_total_and_zeroes() {
        let adder = StripedAdder::new();
        adder.add(100);
        adder.add(23);
        assert_eq!(adder.sum_and_reset(), 123);
        assert_eq!(adder.value(), 0);
        adder.add(5);
        assert_eq!(adder.value(), 5);
    }

    #[test]
    fn test_concurrent_adds_sum_exactly() {
        const THREADS: usize = 8;
        const PER_THREAD: i64 = 10_000;

        let adder = Arc::new(StripedAdder::new());
        let mut handles = vec![];
        for _ in 0..THREADS {
            let adder = adder.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    adder.increment();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Once all writers quiesce the total is exact: striping never
        // drops an update.
        assert_eq!(adder.value(), THREADS as i64 * PER_THREAD);
    }

    #[test]
    fn test_concurrent_reset_never_double_counts() {
        const THREADS: usize = 4;
        const PER_THREAD: i64 = 50_000;

        let adder = Arc::new(StripedAdder::new());
        let mut handles = vec![];
        for _ in 0..THREADS {
            let adder = adder.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    adder.increment();
                }
            }));
        }

        // Reader repeatedly drains while writers run.
        let mut drained = 0i64;
        loop {
            drained += adder.sum_and_reset();
            if handles.iter().all(|h| h.is_finished()) {
                break;
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }
        drained += adder.sum_and_reset();

        // Weak consistency allows a racing delta to be deferred to a later
        // drain, but the grand total over all drains is exact.
        assert_eq!(drained, THREADS as i64 * PER_THREAD);
    }

    #[test]
    fn test_mixed_signs_concurrent() {
        let adder = Arc::new(StripedAdder::new());
        let mut handles = vec![];
        for t in 0..6 {
            let adder = adder.clone();
            handles.push(thread::spawn(move || {
                let delta = if t % 2 == 0 { 3 } else { -2 };
                for _ in 0..10_000 {
                    adder.add(delta);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(adder.value(), (3 * 3 - 3 * 2) * 10_000);
    }
}
