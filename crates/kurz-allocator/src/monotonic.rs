use crate::clock::{Clock, SystemClock};
use crate::IdAllocator;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// An allocator seeded from and reconciled with a clock.
///
/// Every identifier is `max(previous + 1, now_in_microseconds)`, so the
/// stream is strictly increasing within the process and, after a restart,
/// resumes above anything issued before it as long as the clock has not been
/// set back. Bursts faster than one per microsecond run ahead of the clock
/// and are pulled back in line once the clock overtakes them.
#[derive(Debug)]
pub struct MonotonicAllocator<C: Clock = SystemClock> {
    last: AtomicU64,
    clock: C,
}

impl MonotonicAllocator<SystemClock> {
    /// Creates an allocator backed by the real system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MonotonicAllocator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MonotonicAllocator<C> {
    /// Creates an allocator that reads time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        let seed = clock.now_micros().saturating_sub(1);
        trace!(seed, "seeding monotonic allocator");
        Self {
            last: AtomicU64::new(seed),
            clock,
        }
    }
}

impl<C: Clock + 'static> IdAllocator for MonotonicAllocator<C> {
    fn next_id(&self) -> u64 {
        let now = self.clock.now_micros();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(last.checked_add(1).expect("monotonic allocator exhausted").max(now))
            })
            // The closure always returns Some.
            .unwrap_or_else(|last| last);
        previous
            .checked_add(1)
            .expect("monotonic allocator exhausted")
            .max(now)
    }
}
